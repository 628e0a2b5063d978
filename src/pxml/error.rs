// SPDX-License-Identifier: MIT

//! Typed error handling for pxml-rs
//!
//! Each concern gets its own error enum; `PxmlError` aggregates them for
//! callers that do not care which layer failed.

use thiserror::Error;

/// Top-level error type for pxml-rs
#[derive(Debug, Error)]
pub enum PxmlError {
    /// Descriptor or condition parsing errors
    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// Overlay generation errors
    #[error(transparent)]
    Overlay(#[from] OverlayError),

    /// Document tree errors outside of overlay generation
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Configuration errors (invalid files, bad overrides)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

/// Errors raised while parsing conditions and descriptors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// A single `name=value` token could not be parsed
    #[error("Malformed condition '{input}': {reason}")]
    MalformedCondition { input: String, reason: String },

    /// A descriptor ended mid-condition or held a non-integer value
    #[error("Malformed descriptor at '{token}': {reason}")]
    MalformedDescriptor { token: String, reason: String },
}

/// Failures of the document tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Handle does not refer to a node of this tree
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// Node is detached or is the root
    #[error("Node {0} has no parent")]
    NoParent(String),

    /// Node is not among the children of the given parent
    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: String, child: String },

    /// Operation needs an element but got a text node
    #[error("Node {0} is not an element")]
    NotAnElement(String),

    /// Attaching would make a node its own ancestor
    #[error("Cannot attach {node} below its own descendant {parent}")]
    Cycle { parent: String, node: String },
}

/// Overlay generation errors
///
/// Generation is all-or-nothing: once one of these is returned the
/// document may be partially transformed and must be discarded.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// A structural query or mutation against the tree failed
    #[error("Overlay generation failed: {0}")]
    Tree(#[from] TreeError),

    /// Generator settings make generation undefined
    #[error("Invalid overlay configuration: {0}")]
    Config(String),
}

impl ConditionError {
    /// Create a malformed condition error
    pub fn condition(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedCondition {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed descriptor error
    pub fn descriptor(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

impl PxmlError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
