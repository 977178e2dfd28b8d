//! Node Registry: per-node identity, flags, owned slot ranges, migration state.
//!
//! Every mutation of a single node is serialised by that node's own lock, so
//! slot lookups never block behind another node's write. The registry
//! (`Cluster`, in `router.rs`) adds one more lock on top for the map of
//! node-id → `Node` itself.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::error::SlotKvError;

use super::slot::SLOT_COUNT;

/// A node is considered failed if pong silence exceeds this many milliseconds.
pub const PONG_STALE_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeFlag {
    Master,
    Replica,
    Myself,
    Fail,
}

impl NodeFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeFlag::Master => "master",
            NodeFlag::Replica => "slave",
            NodeFlag::Myself => "myself",
            NodeFlag::Fail => "fail",
        }
    }
}

/// An inclusive range of slots `[start, end]`, `start <= end`, both `< 16384`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotRange {
    pub start: u16,
    pub end: u16,
}

impl SlotRange {
    pub fn new(start: u16, end: u16) -> Self {
        assert!(start <= end, "start must be <= end");
        assert!(end < SLOT_COUNT, "end must be < {}", SLOT_COUNT);
        Self { start, end }
    }

    pub fn contains(&self, slot: u16) -> bool {
        slot >= self.start && slot <= self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for SlotRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Generate a fresh 40-char lowercase hex node ID (160 random bits).
pub fn generate_node_id() -> String {
    let mut rng = rand::thread_rng();
    let mut out = String::with_capacity(40);
    for _ in 0..20 {
        let byte: u8 = rng.gen();
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Default)]
struct NodeInner {
    flags: Vec<NodeFlag>,
    master_id: Option<String>,
    ping_sent: u64,
    pong_recv: u64,
    config_epoch: u64,
    ranges: Vec<SlotRange>,
    /// slot -> source address, for slots this node is importing.
    importing: HashMap<u16, String>,
    /// slot -> target address, for slots this node is migrating away.
    migrating: HashMap<u16, String>,
}

impl NodeInner {
    /// Strip `slot` out of this node's owned ranges, splitting a range around
    /// it if necessary. No-op if the slot isn't owned here.
    fn revoke_slot(&mut self, slot: u16) {
        let mut next = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if !r.contains(slot) {
                next.push(r);
                continue;
            }
            if r.start < slot {
                next.push(SlotRange::new(r.start, slot - 1));
            }
            if r.end > slot {
                next.push(SlotRange::new(slot + 1, r.end));
            }
        }
        self.ranges = next;
    }

    /// Add `slot` as a degenerate one-slot range, then coalesce with
    /// adjacent ranges so contiguous coverage stays merged.
    fn claim_slot(&mut self, slot: u16) {
        self.ranges.push(SlotRange::new(slot, slot));
        self.coalesce();
    }

    /// Add a whole contiguous range in one step (used by `assign_slot_range`
    /// for O(1)-per-node bulk assignment instead of repeated single-slot
    /// claims).
    fn claim_range(&mut self, range: SlotRange) {
        self.ranges.push(range);
        self.coalesce();
    }

    fn coalesce(&mut self) {
        if self.ranges.is_empty() {
            return;
        }
        self.ranges.sort();
        let mut merged: Vec<SlotRange> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if r.start <= last.end.saturating_add(1) && r.start >= last.start => {
                    if r.end > last.end {
                        last.end = r.end;
                    }
                }
                _ => merged.push(r),
            }
        }
        self.ranges = merged;
    }
}

/// A single node in the cluster, identified by a 40-char hex ID.
pub struct Node {
    id: String,
    addr: String,
    inner: RwLock<NodeInner>,
}

impl Node {
    pub fn new(id: String, addr: String) -> Self {
        Self {
            id,
            addr,
            inner: RwLock::new(NodeInner::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn set_flag(&self, flag: NodeFlag) {
        let mut inner = self.inner.write().unwrap();
        if !inner.flags.contains(&flag) {
            inner.flags.push(flag);
        }
    }

    pub fn unset_flag(&self, flag: NodeFlag) {
        let mut inner = self.inner.write().unwrap();
        inner.flags.retain(|f| *f != flag);
    }

    pub fn has_flag(&self, flag: NodeFlag) -> bool {
        self.inner.read().unwrap().flags.contains(&flag)
    }

    pub fn flags(&self) -> Vec<NodeFlag> {
        self.inner.read().unwrap().flags.clone()
    }

    pub fn set_master_id(&self, master_id: Option<String>) {
        self.inner.write().unwrap().master_id = master_id;
    }

    pub fn master_id(&self) -> Option<String> {
        self.inner.read().unwrap().master_id.clone()
    }

    pub fn touch_ping(&self) {
        self.inner.write().unwrap().ping_sent = now_ms();
    }

    pub fn touch_pong(&self) {
        self.inner.write().unwrap().pong_recv = now_ms();
    }

    pub fn ping_sent(&self) -> u64 {
        self.inner.read().unwrap().ping_sent
    }

    pub fn pong_recv(&self) -> u64 {
        self.inner.read().unwrap().pong_recv
    }

    pub fn config_epoch(&self) -> u64 {
        self.inner.read().unwrap().config_epoch
    }

    pub fn set_config_epoch(&self, epoch: u64) {
        self.inner.write().unwrap().config_epoch = epoch;
    }

    /// Failure is observational only: the core never acts on it (§4.2).
    pub fn is_failed(&self) -> bool {
        let inner = self.inner.read().unwrap();
        if inner.flags.contains(&NodeFlag::Fail) {
            return true;
        }
        inner.pong_recv > 0 && now_ms().saturating_sub(inner.pong_recv) > PONG_STALE_MS
    }

    /// Defensive copy of the owned ranges, sorted.
    pub fn ranges(&self) -> Vec<SlotRange> {
        self.inner.read().unwrap().ranges.clone()
    }

    pub fn owns(&self, slot: u16) -> bool {
        self.inner.read().unwrap().ranges.iter().any(|r| r.contains(slot))
    }

    pub fn slot_count(&self) -> usize {
        self.inner.read().unwrap().ranges.iter().map(|r| r.len()).sum()
    }

    pub(crate) fn revoke_slot(&self, slot: u16) {
        self.inner.write().unwrap().revoke_slot(slot);
    }

    pub(crate) fn claim_slot(&self, slot: u16) {
        self.inner.write().unwrap().claim_slot(slot);
    }

    pub(crate) fn claim_range(&self, range: SlotRange) {
        self.inner.write().unwrap().claim_range(range);
    }

    pub fn set_importing(&self, slot: u16, source_addr: String) {
        self.inner.write().unwrap().importing.insert(slot, source_addr);
    }

    pub fn clear_importing(&self, slot: u16) {
        self.inner.write().unwrap().importing.remove(&slot);
    }

    pub fn is_importing(&self, slot: u16) -> bool {
        self.inner.read().unwrap().importing.contains_key(&slot)
    }

    pub fn set_migrating(&self, slot: u16, target_addr: String) {
        self.inner.write().unwrap().migrating.insert(slot, target_addr);
    }

    pub fn clear_migrating(&self, slot: u16) {
        self.inner.write().unwrap().migrating.remove(&slot);
    }

    pub fn is_migrating(&self, slot: u16) -> bool {
        self.inner.read().unwrap().migrating.contains_key(&slot)
    }

    pub fn migrating_target(&self, slot: u16) -> Option<String> {
        self.inner.read().unwrap().migrating.get(&slot).cloned()
    }
}

/// Error returned when a node ID collides with an existing distinct node
/// during an operation that requires uniqueness.
pub fn node_already_exists(id: &str) -> SlotKvError {
    SlotKvError::NodeAlreadyExists(id.to_string())
}

pub fn unknown_node(id: &str) -> SlotKvError {
    SlotKvError::UnknownNode(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_roundtrip() {
        let n = Node::new("a".into(), "127.0.0.1:7000".into());
        assert!(!n.has_flag(NodeFlag::Myself));
        n.set_flag(NodeFlag::Myself);
        n.set_flag(NodeFlag::Master);
        assert!(n.has_flag(NodeFlag::Myself));
        assert!(n.has_flag(NodeFlag::Master));
        n.unset_flag(NodeFlag::Myself);
        assert!(!n.has_flag(NodeFlag::Myself));
    }

    #[test]
    fn claim_and_coalesce() {
        let n = Node::new("a".into(), "127.0.0.1:7000".into());
        n.claim_slot(5);
        n.claim_slot(6);
        n.claim_slot(4);
        assert_eq!(n.ranges(), vec![SlotRange::new(4, 6)]);
        assert!(n.owns(5));
        assert!(!n.owns(7));
    }

    #[test]
    fn revoke_splits_range() {
        let n = Node::new("a".into(), "127.0.0.1:7000".into());
        n.claim_range(SlotRange::new(0, 10));
        n.revoke_slot(5);
        assert_eq!(n.ranges(), vec![SlotRange::new(0, 4), SlotRange::new(6, 10)]);
        assert!(!n.owns(5));
    }

    #[test]
    fn revoke_at_boundary() {
        let n = Node::new("a".into(), "127.0.0.1:7000".into());
        n.claim_range(SlotRange::new(0, 10));
        n.revoke_slot(0);
        assert_eq!(n.ranges(), vec![SlotRange::new(1, 10)]);
        n.revoke_slot(10);
        assert_eq!(n.ranges(), vec![SlotRange::new(1, 9)]);
    }

    #[test]
    fn failure_detection_observational() {
        let n = Node::new("a".into(), "127.0.0.1:7000".into());
        assert!(!n.is_failed());
        n.set_flag(NodeFlag::Fail);
        assert!(n.is_failed());
    }

    #[test]
    fn node_id_is_40_hex_chars() {
        let id = generate_node_id();
        assert_eq!(id.len(), 40);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
