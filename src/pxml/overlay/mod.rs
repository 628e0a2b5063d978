// SPDX-License-Identifier: MIT

//! Probability overlay generation
//!
//! This module provides:
//! - `ProbabilityNodeType` - the five kinds of probability node
//! - `OverlayConfig` / `ConfigLoader` - generator settings and their YAML form
//! - `OverlayGenerator` - turns an ordinary document into a probabilistic one
//! - `VariablePool` - reads the generated random variables back as a table

mod attributes;
mod config;
mod generator;
mod types;
mod variables;

pub use attributes::{child_attribute, variable_name, DESCRIPTORS_ATTRIBUTE};
pub use config::{
    ConfigLoader, OverlayConfig, TextNodeStrategy, DEFAULT_NAMESPACE_PREFIX,
    DEFAULT_NAMESPACE_URI,
};
pub use generator::{run_bounds, OverlayGenerator};
pub use types::{OverlaySummary, ProbabilityNodeType};
pub use variables::{value_attribute, VariablePool, VARIABLES_ELEMENT};
