//! Cluster slot-routing plane: 16384-slot hash-slot model with hash-tag
//! awareness and MOVED/ASK redirection.
//!
//! Three collaborating pieces:
//!
//! - [`slot`] — the Slot Hasher: key bytes → slot, no locks, no allocation.
//! - [`node`] — the Node Registry: per-node identity, flags, owned ranges.
//! - [`router`] — the Cluster Router: the node registry plus the global
//!   slot→node map and the `CLUSTER` command surface.
//!
//! No automatic failover and no slot-migration data copying are in scope:
//! the `fail` flag on a [`node::Node`] is observational only, and ASK
//! redirects only ever point at a migration target already recorded via
//! `Node::set_migrating` — nothing here moves key data between nodes.

pub mod node;
pub mod router;
pub mod slot;

pub use node::{generate_node_id, Node, NodeFlag, SlotRange};
pub use router::{Cluster, Redirect};
pub use slot::{slot as keyslot, SLOT_COUNT};
