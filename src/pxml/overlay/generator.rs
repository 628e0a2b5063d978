//! Overlay generator
//!
//! Wraps randomly chosen runs of sibling nodes in probability nodes,
//! gives every probability node its type's attributes and appends the
//! random-variable pool to the root.

use super::attributes::variable_name;
use super::config::{OverlayConfig, TextNodeStrategy};
use super::types::{OverlaySummary, ProbabilityNodeType};
use super::variables::{value_attribute, VARIABLES_ELEMENT};
use crate::pxml::document::Tree;
use crate::pxml::error::{OverlayError, TreeError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Order in which typed nodes receive their attributes
const ATTRIBUTE_ORDER: [ProbabilityNodeType; 4] = [
    ProbabilityNodeType::Independent,
    ProbabilityNodeType::Mutex,
    ProbabilityNodeType::Explicit,
    ProbabilityNodeType::Events,
];

/// Inclusive bounds of a run of `length` siblings centred on `index`
///
/// The run is clamped to `[0, sibling_count - 1]` and may come out shorter
/// than `length` near the edges. It always contains `index`.
pub fn run_bounds(sibling_count: usize, index: usize, length: usize) -> (usize, usize) {
    let start = index.saturating_sub(length / 2);
    let end = (start + length.max(1) - 1).min(sibling_count.saturating_sub(1));
    (start, end)
}

/// Overlays probability nodes onto a document
///
/// Every random draw comes from the generator's own `rng`, so a fixed
/// seed and input document give the same overlay.
pub struct OverlayGenerator<R = StdRng> {
    config: OverlayConfig,
    rng: R,
}

impl OverlayGenerator<StdRng> {
    /// Create a generator seeded from `config.seed`, or from entropy
    pub fn new(config: OverlayConfig) -> Result<Self, OverlayError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> OverlayGenerator<R> {
    pub fn with_rng(config: OverlayConfig, rng: R) -> Result<Self, OverlayError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Overlay `doc` in place
    ///
    /// Fails before touching the document when the host already uses the
    /// configured prefix for another namespace. Any later error may leave
    /// the document half transformed; nothing is rolled back.
    pub fn transform<T: Tree>(&mut self, doc: &mut T) -> Result<OverlaySummary, OverlayError> {
        self.check_prefix(doc)?;
        let namespace = self.config.namespace_uri.clone();
        doc.declare_namespace(&self.config.namespace_prefix, &namespace)?;

        let candidates = doc.descendant_elements(doc.root())?;
        log::info!("document has {} candidate nodes", candidates.len());
        let num_variables = self.config.num_variables(candidates.len());
        log::info!("will use {} random variables", num_variables);

        let mut summary = OverlaySummary {
            candidates: candidates.len(),
            variables: num_variables,
            ..OverlaySummary::default()
        };

        for _ in 0..self.config.insertions(candidates.len()) {
            let candidate = *candidates
                .choose(&mut self.rng)
                .ok_or_else(|| OverlayError::Config("no candidate nodes".to_string()))?;
            let run = self.select_run(doc, candidate)?;
            let node_type = *self
                .config
                .distribution
                .choose(&mut self.rng)
                .ok_or_else(|| {
                    OverlayError::Config("node type distribution is empty".to_string())
                })?;
            self.wrap_run(doc, &run, node_type)?;
            summary.insertions += 1;
        }

        // Child counts are final only once every wrap is done.
        for node_type in ATTRIBUTE_ORDER {
            let nodes = doc.elements_named(Some(namespace.as_str()), node_type.node_name())?;
            log::info!(
                "inserted {} {:?} nodes as <{}:{}>",
                nodes.len(),
                node_type,
                self.config.namespace_prefix,
                node_type.node_name()
            );
            for &node in &nodes {
                self.assign_attributes(doc, node, node_type, num_variables)?;
                if node_type != ProbabilityNodeType::Events
                    && self.config.text_nodes == TextNodeStrategy::Wrap
                {
                    summary.wrapped_text += self.wrap_text_nodes(doc, node)?;
                }
            }
            summary.nodes.insert(node_type, nodes.len());
        }
        let deterministic = ProbabilityNodeType::Deterministic;
        let count = doc
            .elements_named(Some(namespace.as_str()), deterministic.node_name())?
            .len();
        summary.nodes.insert(deterministic, count);

        self.append_variables(doc, num_variables)?;
        Ok(summary)
    }

    /// Reject documents that bind or use the prefix for another namespace
    fn check_prefix<T: Tree>(&self, doc: &T) -> Result<(), OverlayError> {
        let prefix = self.config.namespace_prefix.as_str();
        let uri = self.config.namespace_uri.as_str();
        let root = doc.root();

        let mut elements = vec![root];
        elements.extend(doc.descendant_elements(root)?);
        for element in elements {
            let bound = doc.namespace_binding(element, prefix)?;
            let used = doc
                .element_name(element)?
                .filter(|name| name.prefix.as_deref() == Some(prefix))
                .map(|name| name.namespace.as_deref().unwrap_or(""));
            if let Some(other) = bound.or(used).filter(|&other| other != uri) {
                return Err(OverlayError::Config(format!(
                    "prefix '{}' is already bound to '{}' at {}; choose another namespace prefix",
                    prefix, other, element
                )));
            }
        }
        Ok(())
    }

    /// Pick a run of siblings around `candidate` of random length
    fn select_run<T: Tree>(
        &mut self,
        doc: &T,
        candidate: T::Node,
    ) -> Result<Vec<T::Node>, OverlayError> {
        let parent = doc
            .parent(candidate)?
            .ok_or_else(|| TreeError::NoParent(candidate.to_string()))?;
        let index = doc.child_index(candidate)?;
        let siblings = doc.children(parent)?;

        let length = self.rng.gen_range(1..=siblings.len());
        let (start, end) = run_bounds(siblings.len(), index, length);
        Ok(siblings[start..=end].to_vec())
    }

    /// Put a new probability node where the run starts and move the run into it
    fn wrap_run<T: Tree>(
        &self,
        doc: &mut T,
        run: &[T::Node],
        node_type: ProbabilityNodeType,
    ) -> Result<T::Node, OverlayError> {
        let first = *run
            .first()
            .ok_or_else(|| OverlayError::Config("empty sibling run".to_string()))?;
        let parent = doc
            .parent(first)?
            .ok_or_else(|| TreeError::NoParent(first.to_string()))?;

        let pnode = doc.create_element(self.config.name(node_type.node_name()));
        doc.replace_child(parent, first, pnode)?;
        for &node in run {
            doc.append_child(pnode, node)?;
        }
        log::debug!(
            "wrapped {} node(s) under {} in <{}>",
            run.len(),
            parent,
            node_type
        );
        Ok(pnode)
    }

    fn assign_attributes<T: Tree>(
        &mut self,
        doc: &mut T,
        node: T::Node,
        node_type: ProbabilityNodeType,
        num_variables: usize,
    ) -> Result<(), OverlayError> {
        let child_count = doc.children(node)?.len();
        let attributes =
            node_type.synthesize_attributes(&mut self.rng, child_count, num_variables);
        for (local, value) in attributes {
            doc.set_attribute(node, self.config.name(&local), &value)?;
        }
        Ok(())
    }

    /// Wrap each text child of `node` in a `text` element, in place
    fn wrap_text_nodes<T: Tree>(
        &self,
        doc: &mut T,
        node: T::Node,
    ) -> Result<usize, OverlayError> {
        let mut wrapped = 0;
        for child in doc.children(node)? {
            if doc.is_text(child)? {
                let wrapper = doc.create_element(self.config.name("text"));
                doc.replace_child(node, child, wrapper)?;
                doc.append_child(wrapper, child)?;
                wrapped += 1;
            }
        }
        Ok(wrapped)
    }

    /// Append `var-0 .. var-{n-1}`, each with `val-0 = 1 - p` and `val-1 = p`
    fn append_variables<T: Tree>(
        &mut self,
        doc: &mut T,
        num_variables: usize,
    ) -> Result<(), OverlayError> {
        let pool = doc.create_element(self.config.name(VARIABLES_ELEMENT));
        for i in 0..num_variables {
            let var = doc.create_element(self.config.name(&variable_name(i)));
            let p_true: f64 = self.rng.gen();
            let p_false = 1.0 - p_true;
            doc.set_attribute(
                var,
                self.config.name(&value_attribute(0)),
                &p_false.to_string(),
            )?;
            doc.set_attribute(
                var,
                self.config.name(&value_attribute(1)),
                &p_true.to_string(),
            )?;
            doc.append_child(pool, var)?;
        }
        let root = doc.root();
        doc.append_child(root, pool)?;
        Ok(())
    }
}
