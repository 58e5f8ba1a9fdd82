//! Capability traits the sync pipeline depends on.
//!
//! The remote CMS and the host graph store are both injected behind narrow
//! interfaces, so the whole engine runs against in-memory fakes in tests.

pub mod source;
pub mod store;

pub use source::ContentSource;
pub use store::GraphStore;
