//! Document loader - YAML snapshots of document trees
//!
//! The command-line tool reads and writes documents in this shape:
//! ```yaml
//! name: catalog
//! attributes:
//!   xmlns:p: "http://www.cs.utwente.nl/~keulen/pxml"
//! children:
//!   - name: book
//!     attributes: { id: "1" }
//!     children:
//!       - text: "Dune"
//! ```
//! Prefixed names resolve against the `xmlns:` attributes in scope.

use super::tree::{Document, NodeId, NodeKind, QName, Tree, XMLNS_NAMESPACE};
use crate::pxml::error::PxmlError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Snapshot of a text node
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TextSpec {
    pub text: String,
}

/// Snapshot of an element and its subtree
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ElementSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

/// Snapshot of any child node
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(TextSpec),
    Element(ElementSpec),
}

/// In-scope prefix bindings; the empty prefix is the default namespace
type Scope = HashMap<String, String>;

/// Loads and stores documents as YAML snapshots
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a YAML file
    pub fn load_document<P: AsRef<Path>>(&self, path: P) -> Result<Document, PxmlError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Write a document to a YAML file
    pub fn save_document<P: AsRef<Path>>(&self, doc: &Document, path: P) -> Result<(), PxmlError> {
        fs::write(path, Self::to_yaml(doc)?)?;
        Ok(())
    }

    /// Parse a document from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Document, PxmlError> {
        let spec: ElementSpec = serde_yaml::from_str(content)?;
        Self::from_spec(&spec)
    }

    /// Render a document as a YAML string
    pub fn to_yaml(doc: &Document) -> Result<String, PxmlError> {
        Ok(serde_yaml::to_string(&Self::to_spec(doc, doc.root())?)?)
    }

    /// Build a document from a snapshot
    pub fn from_spec(spec: &ElementSpec) -> Result<Document, PxmlError> {
        let mut scope = Scope::new();
        scope_declarations(spec, &mut scope);
        let mut doc = Document::new(resolve_element_name(&spec.name, &scope)?);
        let root = doc.root();
        apply_attributes(&mut doc, root, spec, &scope)?;
        for child in &spec.children {
            build_node(&mut doc, root, child, &scope)?;
        }
        Ok(doc)
    }

    /// Snapshot the element `node` and everything below it
    pub fn to_spec(doc: &Document, node: NodeId) -> Result<ElementSpec, PxmlError> {
        let element = doc
            .element(node)
            .ok_or_else(|| PxmlError::other(format!("node {} is not an element", node)))?;

        let attributes = element
            .attributes()
            .iter()
            .map(|a| (a.name.to_string(), a.value.clone()))
            .collect();

        let mut children = Vec::new();
        for &child in doc.child_nodes(node) {
            match doc.kind(child) {
                Some(NodeKind::Text(text)) => children.push(NodeSpec::Text(TextSpec {
                    text: text.clone(),
                })),
                Some(NodeKind::Element(_)) => {
                    children.push(NodeSpec::Element(Self::to_spec(doc, child)?))
                }
                None => return Err(PxmlError::other(format!("unknown node {}", child))),
            }
        }

        Ok(ElementSpec {
            name: element.name().to_string(),
            attributes,
            children,
        })
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn build_node(
    doc: &mut Document,
    parent: NodeId,
    spec: &NodeSpec,
    scope: &Scope,
) -> Result<(), PxmlError> {
    match spec {
        NodeSpec::Text(text) => {
            doc.add_text(parent, text.text.clone())?;
        }
        NodeSpec::Element(element) => {
            let mut scope = scope.clone();
            scope_declarations(element, &mut scope);
            let node = doc.add_element(parent, resolve_element_name(&element.name, &scope)?)?;
            apply_attributes(doc, node, element, &scope)?;
            for child in &element.children {
                build_node(doc, node, child, &scope)?;
            }
        }
    }
    Ok(())
}

fn scope_declarations(spec: &ElementSpec, scope: &mut Scope) {
    for (name, value) in &spec.attributes {
        if name == "xmlns" {
            scope.insert(String::new(), value.clone());
        } else if let Some(prefix) = name.strip_prefix("xmlns:") {
            scope.insert(prefix.to_string(), value.clone());
        }
    }
}

fn apply_attributes(
    doc: &mut Document,
    node: NodeId,
    spec: &ElementSpec,
    scope: &Scope,
) -> Result<(), PxmlError> {
    for (name, value) in &spec.attributes {
        doc.set_attribute(node, resolve_attribute_name(name, scope)?, value)?;
    }
    Ok(())
}

fn resolve_element_name(name: &str, scope: &Scope) -> Result<QName, PxmlError> {
    match name.split_once(':') {
        Some((prefix, local)) => resolve_prefixed(prefix, local, scope),
        None => Ok(QName {
            prefix: None,
            namespace: scope.get("").cloned(),
            local: name.to_string(),
        }),
    }
}

fn resolve_attribute_name(name: &str, scope: &Scope) -> Result<QName, PxmlError> {
    if name == "xmlns" {
        return Ok(QName {
            prefix: None,
            namespace: Some(XMLNS_NAMESPACE.to_string()),
            local: name.to_string(),
        });
    }
    match name.split_once(':') {
        Some(("xmlns", local)) => Ok(QName::qualified("xmlns", XMLNS_NAMESPACE, local)),
        Some((prefix, local)) => resolve_prefixed(prefix, local, scope),
        None => Ok(QName::local(name)),
    }
}

fn resolve_prefixed(prefix: &str, local: &str, scope: &Scope) -> Result<QName, PxmlError> {
    let namespace = scope
        .get(prefix)
        .filter(|_| !prefix.is_empty())
        .ok_or_else(|| PxmlError::config(format!("undeclared namespace prefix '{}'", prefix)))?;
    Ok(QName::qualified(prefix, namespace.clone(), local))
}
