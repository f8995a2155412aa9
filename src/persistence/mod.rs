//! Persistence layer: snapshot format and file management.

pub mod serialization;
pub mod snapshot;

pub use serialization::StoreSnapshot;
pub use snapshot::SnapshotManager;
