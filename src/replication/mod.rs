//! Replication plane: master/replica PSYNC handshake, backlog-ring partial
//! resync, and RDB-snapshot full resync (spec §4).

pub mod backlog;
pub mod controller;

pub use backlog::{BacklogRing, DEFAULT_BACKLOG_CAPACITY};
pub use controller::{CommandApplier, ReplicaSyncState, ReplicationController, ReplicationRole};
