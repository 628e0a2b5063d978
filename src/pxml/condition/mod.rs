// SPDX-License-Identifier: MIT

//! Conditions and descriptor algebra
//!
//! A descriptor is a string of `name=value` conditions such as
//! `var-0=1 var-3=0`. This module parses descriptors and answers:
//! - whether a descriptor is self-consistent
//! - whether two descriptors are mutually exclusive
//! - what the deduplicated union of several descriptors is

mod algebra;
mod parser;
mod types;

pub use algebra::{combine, consistent, mutually_exclusive};
pub use parser::{parse, ConditionParser};
pub use types::Condition;
