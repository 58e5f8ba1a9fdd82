//! The synchronization pipeline.

pub mod entry;
pub mod sync;

pub use entry::EntryResolver;
pub use sync::Synchronizer;
