//! Content source implementations.

pub mod cms;
