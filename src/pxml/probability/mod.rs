// SPDX-License-Identifier: MIT

//! Probability evaluation over descriptors
//!
//! This module provides:
//! - `ProbabilityTable` - lookup of a variable's probability for a value
//! - `ProbabilityCache` - per-session cache of resolved probabilities
//! - `ProbabilityResolver` - multiplies the probabilities of a descriptor

mod cache;
mod resolver;
mod table;

pub use cache::{CacheKey, ProbabilityCache};
pub use resolver::ProbabilityResolver;
pub use table::{MemoryTable, ProbabilityTable};
