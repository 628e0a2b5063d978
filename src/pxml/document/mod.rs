// SPDX-License-Identifier: MIT

//! Document trees
//!
//! `Tree` is the contract the overlay generator works against;
//! `Document` is the arena implementation shipped with the crate and
//! `DocumentLoader` moves documents in and out of YAML snapshots.

pub mod loader;
mod tree;

pub use loader::{DocumentLoader, ElementSpec, NodeSpec, TextSpec};
pub use tree::{Attribute, Document, Element, NodeId, NodeKind, QName, Tree, XMLNS_NAMESPACE};
