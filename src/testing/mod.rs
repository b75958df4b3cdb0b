//! Test fixtures and data generators.

pub mod data;
pub mod store;
