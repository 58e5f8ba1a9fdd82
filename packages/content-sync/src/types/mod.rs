//! Data types for the content sync library.

pub mod config;
pub mod naming;
pub mod node;
pub mod report;
pub mod schema;
