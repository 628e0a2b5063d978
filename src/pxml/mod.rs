pub mod condition;
pub mod document;
pub mod error;
pub mod overlay;
pub mod probability;
