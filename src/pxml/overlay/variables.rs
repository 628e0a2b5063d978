// SPDX-License-Identifier: MIT

//! Random-variable pool of an overlaid document, read as a probability table

use super::config::OverlayConfig;
use crate::pxml::document::{Document, NodeId, Tree};
use crate::pxml::probability::ProbabilityTable;

/// Local name of the pool element appended to the root
pub const VARIABLES_ELEMENT: &str = "variables";

/// Local name of the attribute holding the probability of value `value`
pub fn value_attribute(value: i32) -> String {
    format!("val-{}", value)
}

/// View over the `variables` element of a generated document
///
/// `var-3=1` resolves to the `val-1` attribute of the pool's `var-3`
/// child; anything missing resolves to 0.0.
pub struct VariablePool<'a> {
    doc: &'a Document,
    namespace: String,
    pool: Option<NodeId>,
}

impl<'a> VariablePool<'a> {
    pub fn new(doc: &'a Document, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let pool = doc
            .child_elements_named(doc.root(), Some(namespace.as_str()), VARIABLES_ELEMENT)
            .last();
        Self {
            doc,
            namespace,
            pool,
        }
    }

    /// Pool of a document generated with `config`
    pub fn for_config(doc: &'a Document, config: &OverlayConfig) -> Self {
        Self::new(doc, config.namespace_uri.clone())
    }

    /// Whether the document has a pool at all
    pub fn exists(&self) -> bool {
        self.pool.is_some()
    }

    /// Variable names in pool order
    pub fn names(&self) -> Vec<String> {
        let Some(pool) = self.pool else {
            return Vec::new();
        };
        self.doc
            .child_nodes(pool)
            .iter()
            .filter_map(|&var| self.doc.element(var))
            .filter(|e| e.name().namespace.as_deref() == Some(self.namespace.as_str()))
            .map(|e| e.name().local.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProbabilityTable for VariablePool<'_> {
    fn lookup(&self, variable: &str, value: i32) -> f64 {
        let Some(pool) = self.pool else {
            return 0.0;
        };
        let namespace = Some(self.namespace.as_str());
        self.doc
            .child_elements_named(pool, namespace, variable)
            .next()
            .and_then(|var| self.doc.attribute(var, namespace, &value_attribute(value)))
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}
