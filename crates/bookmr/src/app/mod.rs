//! Application layer orchestrating domain logic and infrastructure.

pub mod convert;
pub mod flatten;
pub mod section;
pub mod skip;
