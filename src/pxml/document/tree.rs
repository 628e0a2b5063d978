// SPDX-License-Identifier: MIT

//! Document tree contract and an arena-backed implementation

use crate::pxml::error::TreeError;
use std::fmt;

/// Namespace URI reserved for `xmlns` declarations
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A possibly namespaced name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    /// Name without prefix or namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            namespace: None,
            local: local.into(),
        }
    }

    /// Name in `namespace`, written with `prefix`
    pub fn qualified(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            prefix: Some(prefix.into()),
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Compare by namespace and local part, ignoring the prefix
    pub fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Structural operations the overlay generator needs from a tree
pub trait Tree {
    type Node: Copy + Eq + fmt::Debug + fmt::Display;

    /// The document element
    fn root(&self) -> Self::Node;

    /// All elements below `node` in document order, `node` excluded
    fn descendant_elements(&self, node: Self::Node) -> Result<Vec<Self::Node>, TreeError>;

    fn parent(&self, node: Self::Node) -> Result<Option<Self::Node>, TreeError>;

    /// Child nodes of `node` (elements and text) in order
    fn children(&self, node: Self::Node) -> Result<Vec<Self::Node>, TreeError>;

    /// Element name, `None` for text nodes
    fn element_name(&self, node: Self::Node) -> Result<Option<&QName>, TreeError>;

    /// Value of an attribute of `element`, `None` when it is not set
    fn attribute_value(
        &self,
        element: Self::Node,
        namespace: Option<&str>,
        local: &str,
    ) -> Result<Option<&str>, TreeError>;

    /// Create a detached, empty element
    fn create_element(&mut self, name: QName) -> Self::Node;

    /// Set (or overwrite) an attribute on an element
    fn set_attribute(
        &mut self,
        element: Self::Node,
        name: QName,
        value: &str,
    ) -> Result<(), TreeError>;

    /// Put `new` where `old` is among `parent`'s children; `old` ends up detached
    fn replace_child(
        &mut self,
        parent: Self::Node,
        old: Self::Node,
        new: Self::Node,
    ) -> Result<(), TreeError>;

    /// Move `node` to the end of `parent`'s children
    ///
    /// A node already in the tree is detached first, never duplicated.
    fn append_child(&mut self, parent: Self::Node, node: Self::Node) -> Result<(), TreeError>;

    /// Position of `node` among its parent's children
    fn child_index(&self, node: Self::Node) -> Result<usize, TreeError> {
        let parent = self
            .parent(node)?
            .ok_or_else(|| TreeError::NoParent(node.to_string()))?;
        self.children(parent)?
            .iter()
            .position(|&child| child == node)
            .ok_or_else(|| TreeError::NotAChild {
                parent: parent.to_string(),
                child: node.to_string(),
            })
    }

    fn is_text(&self, node: Self::Node) -> Result<bool, TreeError> {
        Ok(self.element_name(node)?.is_none())
    }

    /// Elements below the root named `namespace`:`local`, in document order
    fn elements_named(
        &self,
        namespace: Option<&str>,
        local: &str,
    ) -> Result<Vec<Self::Node>, TreeError> {
        let mut found = Vec::new();
        for node in self.descendant_elements(self.root())? {
            if let Some(name) = self.element_name(node)? {
                if name.matches(namespace, local) {
                    found.push(node);
                }
            }
        }
        Ok(found)
    }

    /// URI that an `xmlns:prefix` declaration on `element` binds
    fn namespace_binding(
        &self,
        element: Self::Node,
        prefix: &str,
    ) -> Result<Option<&str>, TreeError> {
        self.attribute_value(element, Some(XMLNS_NAMESPACE), prefix)
    }

    /// Bind `prefix` to `uri` on the root element
    fn declare_namespace(&mut self, prefix: &str, uri: &str) -> Result<(), TreeError> {
        let root = self.root();
        self.set_attribute(
            root,
            QName::qualified("xmlns", XMLNS_NAMESPACE, prefix),
            uri,
        )
    }
}

/// Handle to a node of a `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: QName,
    attributes: Vec<Attribute>,
}

impl Element {
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(namespace, local))
            .map(|a| a.value.as_str())
    }

    fn set_attribute(&mut self, name: QName, value: &str) {
        let existing = self
            .attributes
            .iter_mut()
            .find(|a| a.name.matches(name.namespace.as_deref(), &name.local));
        match existing {
            Some(attribute) => attribute.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name,
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document
///
/// Nodes are never freed; a detached node keeps its slot and can be
/// attached again.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    /// Create a document holding a single root element
    pub fn new(root: QName) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.alloc(NodeKind::Element(Element {
            name: root,
            attributes: Vec::new(),
        }));
        doc
    }

    /// Append a new element under `parent`
    pub fn add_element(&mut self, parent: NodeId, name: QName) -> Result<NodeId, TreeError> {
        let node = self.create_element(name);
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Append a new text node under `parent`
    pub fn add_text(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        let node = self.alloc(NodeKind::Text(text.into()));
        self.append_child(parent, node)?;
        Ok(node)
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.kind(node)? {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn attribute(&self, node: NodeId, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.element(node)?.attribute(namespace, local)
    }

    /// Children of `node`; empty for unknown handles
    pub fn child_nodes(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children of `node` named `namespace`:`local`
    pub fn child_elements_named<'a>(
        &'a self,
        node: NodeId,
        namespace: Option<&'a str>,
        local: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.child_nodes(node).iter().copied().filter(move |&child| {
            self.element(child)
                .is_some_and(|e| e.name().matches(namespace, local))
        })
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn data(&self, node: NodeId) -> Result<&NodeData, TreeError> {
        self.nodes
            .get(node.0)
            .ok_or_else(|| TreeError::UnknownNode(node.to_string()))
    }

    fn data_mut(&mut self, node: NodeId) -> Result<&mut NodeData, TreeError> {
        self.nodes
            .get_mut(node.0)
            .ok_or_else(|| TreeError::UnknownNode(node.to_string()))
    }

    fn require_element(&self, node: NodeId) -> Result<(), TreeError> {
        match self.data(node)?.kind {
            NodeKind::Element(_) => Ok(()),
            NodeKind::Text(_) => Err(TreeError::NotAnElement(node.to_string())),
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> Result<bool, TreeError> {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return Ok(true);
            }
            current = self.data(n)?.parent;
        }
        Ok(false)
    }

    fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        if let Some(parent) = self.data(node)?.parent {
            self.data_mut(parent)?.children.retain(|&c| c != node);
            self.data_mut(node)?.parent = None;
        }
        Ok(())
    }
}

impl Tree for Document {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn descendant_elements(&self, node: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.data(node)?.children.iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            let data = self.data(current)?;
            if let NodeKind::Element(_) = data.kind {
                found.push(current);
                stack.extend(data.children.iter().rev().copied());
            }
        }

        Ok(found)
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, TreeError> {
        Ok(self.data(node)?.parent)
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, TreeError> {
        Ok(self.data(node)?.children.clone())
    }

    fn element_name(&self, node: NodeId) -> Result<Option<&QName>, TreeError> {
        Ok(match &self.data(node)?.kind {
            NodeKind::Element(element) => Some(element.name()),
            NodeKind::Text(_) => None,
        })
    }

    fn attribute_value(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local: &str,
    ) -> Result<Option<&str>, TreeError> {
        match &self.data(element)?.kind {
            NodeKind::Element(e) => Ok(e.attribute(namespace, local)),
            NodeKind::Text(_) => Err(TreeError::NotAnElement(element.to_string())),
        }
    }

    fn create_element(&mut self, name: QName) -> NodeId {
        self.alloc(NodeKind::Element(Element {
            name,
            attributes: Vec::new(),
        }))
    }

    fn set_attribute(
        &mut self,
        element: NodeId,
        name: QName,
        value: &str,
    ) -> Result<(), TreeError> {
        match &mut self.data_mut(element)?.kind {
            NodeKind::Element(e) => {
                e.set_attribute(name, value);
                Ok(())
            }
            NodeKind::Text(_) => Err(TreeError::NotAnElement(element.to_string())),
        }
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<(), TreeError> {
        self.require_element(parent)?;
        if !self.data(parent)?.children.contains(&old) {
            return Err(TreeError::NotAChild {
                parent: parent.to_string(),
                child: old.to_string(),
            });
        }
        if old == new {
            return Ok(());
        }
        if self.is_ancestor_or_self(new, parent)? {
            return Err(TreeError::Cycle {
                parent: parent.to_string(),
                node: new.to_string(),
            });
        }

        self.detach(new)?;
        let children = &mut self.data_mut(parent)?.children;
        let position = children
            .iter()
            .position(|&c| c == old)
            .ok_or_else(|| TreeError::NotAChild {
                parent: parent.to_string(),
                child: old.to_string(),
            })?;
        children[position] = new;
        self.data_mut(new)?.parent = Some(parent);
        self.data_mut(old)?.parent = None;
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), TreeError> {
        self.require_element(parent)?;
        if self.is_ancestor_or_self(node, parent)? {
            return Err(TreeError::Cycle {
                parent: parent.to_string(),
                node: node.to_string(),
            });
        }

        self.detach(node)?;
        self.data_mut(parent)?.children.push(node);
        self.data_mut(node)?.parent = Some(parent);
        Ok(())
    }
}
