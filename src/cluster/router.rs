//! Cluster Router: global slot→node map, MEET/FORGET/ADDSLOTS/KEYSLOT,
//! redirect decisions.
//!
//! The registry is protected by a single reader-writer lock; each `Node`
//! carries its own internal lock (`node.rs`) so a slot lookup never blocks
//! behind another node's metadata update. Slot lookups are expected to stay
//! fast because per-node range lists stay small (tens of entries).

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;

use crate::error::{Result, SlotKvError};
use crate::protocol::RespValue;

use super::node::{generate_node_id, node_already_exists, unknown_node, Node, NodeFlag, SlotRange};
use super::slot::{slot, SLOT_COUNT};

/// Redirect decision returned by `redirect_for`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Moved { slot: u16, addr: String },
    Ask { slot: u16, addr: String },
}

impl Redirect {
    pub fn into_resp_error(self) -> RespValue {
        match self {
            Redirect::Moved { slot, addr } => RespValue::Error(format!("MOVED {} {}", slot, addr)),
            Redirect::Ask { slot, addr } => RespValue::Error(format!("ASK {} {}", slot, addr)),
        }
    }
}

struct Registry {
    nodes: HashMap<String, Node>,
    myself: String,
    current_epoch: u64,
}

/// Cluster Router: owns the node registry and the global slot→node map
/// implicit in each node's owned `SlotRange`s.
pub struct Cluster {
    inner: RwLock<Registry>,
}

impl Cluster {
    /// Construct a single-node cluster owning the entire slot space.
    pub fn new(my_addr: impl Into<String>) -> Self {
        let my_id = generate_node_id();
        let me = Node::new(my_id.clone(), my_addr.into());
        me.set_flag(NodeFlag::Myself);
        me.set_flag(NodeFlag::Master);
        me.claim_range(SlotRange::new(0, SLOT_COUNT - 1));

        let mut nodes = HashMap::new();
        nodes.insert(my_id.clone(), me);

        Self {
            inner: RwLock::new(Registry {
                nodes,
                myself: my_id,
                current_epoch: 0,
            }),
        }
    }

    pub fn myself_id(&self) -> String {
        self.inner.read().unwrap().myself.clone()
    }

    pub fn keyslot(&self, key: &[u8]) -> u16 {
        slot(key)
    }

    /// Look up the node (by id) owning `slot`, if any.
    pub fn node_for_slot(&self, slot: u16) -> Option<String> {
        let reg = self.inner.read().unwrap();
        reg.nodes
            .values()
            .find(|n| n.owns(slot))
            .map(|n| n.id().to_string())
    }

    pub fn is_local(&self, slot: u16) -> bool {
        let reg = self.inner.read().unwrap();
        reg.nodes
            .get(&reg.myself)
            .map(|me| me.owns(slot))
            .unwrap_or(false)
    }

    /// Compute the redirect (if any) a client must follow for `key`.
    ///
    /// `None` means the command should be served locally. An `Ask` redirect
    /// is only produced while the local node is mid-migration and importing
    /// a slot it does not (yet) own outright; the common MOVED case covers
    /// slots wholly owned elsewhere.
    pub fn redirect_for(&self, key: &[u8]) -> Option<Redirect> {
        let slot = self.keyslot(key);
        let reg = self.inner.read().unwrap();
        let me = reg.nodes.get(&reg.myself)?;

        if me.owns(slot) {
            return None;
        }

        if let Some(target) = me.migrating_target(slot) {
            return Some(Redirect::Ask { slot, addr: target });
        }

        reg.nodes
            .values()
            .find(|n| n.owns(slot))
            .map(|owner| Redirect::Moved {
                slot,
                addr: owner.addr().to_string(),
            })
    }

    pub fn add_node(&self, node: Node) {
        let mut reg = self.inner.write().unwrap();
        reg.nodes.insert(node.id().to_string(), node);
    }

    /// `CLUSTER MEET host port`: synthesise a node with a fresh ID, no live
    /// gossip handshake — this is the bootstrap primitive only. A second
    /// `MEET` of an address already in the registry errors rather than
    /// inserting a duplicate entry for the same physical node.
    pub fn meet(&self, host: &str, port: u16) -> Result<String> {
        let addr = format!("{}:{}", host, port);
        {
            let reg = self.inner.read().unwrap();
            if let Some(existing) = reg.nodes.values().find(|n| n.addr() == addr) {
                return Err(node_already_exists(existing.id()));
            }
        }
        let id = generate_node_id();
        let node = Node::new(id.clone(), addr);
        node.set_flag(NodeFlag::Master);
        self.add_node(node);
        Ok(id)
    }

    pub fn forget(&self, node_id: &str) -> Result<()> {
        let mut reg = self.inner.write().unwrap();
        if node_id == reg.myself {
            return Err(SlotKvError::InvalidArgument(
                "cannot forget myself".to_string(),
            ));
        }
        if reg.nodes.remove(node_id).is_none() {
            return Err(unknown_node(node_id));
        }
        Ok(())
    }

    /// Strip `slot` from every other node, then claim it for `node_id`.
    pub fn assign_slot(&self, slot: u16, node_id: &str) -> Result<()> {
        let reg = self.inner.write().unwrap();
        if !reg.nodes.contains_key(node_id) {
            return Err(unknown_node(node_id));
        }
        for (id, node) in reg.nodes.iter() {
            if id != node_id {
                node.revoke_slot(slot);
            }
        }
        reg.nodes[node_id].claim_slot(slot);
        Ok(())
    }

    /// Equivalent to repeated `assign_slot(lo..=hi, node_id)` but O(1) per
    /// affected node: revoke each slot in the range from every other owner,
    /// then claim the whole range on the target in one step.
    pub fn assign_slot_range(&self, lo: u16, hi: u16, node_id: &str) -> Result<()> {
        let reg = self.inner.write().unwrap();
        if !reg.nodes.contains_key(node_id) {
            return Err(unknown_node(node_id));
        }
        for (id, node) in reg.nodes.iter() {
            if id != node_id {
                for s in lo..=hi {
                    node.revoke_slot(s);
                }
            }
        }
        reg.nodes[node_id].claim_range(SlotRange::new(lo, hi));
        Ok(())
    }

    pub fn current_epoch(&self) -> u64 {
        self.inner.read().unwrap().current_epoch
    }

    pub fn bump_epoch(&self) -> u64 {
        let mut reg = self.inner.write().unwrap();
        reg.current_epoch += 1;
        reg.current_epoch
    }

    fn slots_assigned(&self) -> usize {
        let reg = self.inner.read().unwrap();
        let mut covered = vec![false; SLOT_COUNT as usize];
        for node in reg.nodes.values() {
            for r in node.ranges() {
                for s in r.start..=r.end {
                    covered[s as usize] = true;
                }
            }
        }
        covered.into_iter().filter(|&b| b).count()
    }

    /// `CLUSTER INFO`.
    pub fn info(&self) -> RespValue {
        let reg = self.inner.read().unwrap();
        let assigned = self.slots_assigned();
        let state = if assigned == SLOT_COUNT as usize { "ok" } else { "fail" };
        let known_nodes = reg.nodes.len();
        let masters = reg
            .nodes
            .values()
            .filter(|n| n.has_flag(NodeFlag::Master))
            .count();
        let my_epoch = reg
            .nodes
            .get(&reg.myself)
            .map(|n| n.config_epoch())
            .unwrap_or(0);

        let text = format!(
            "cluster_enabled:1\r\n\
             cluster_state:{state}\r\n\
             cluster_slots_assigned:{assigned}\r\n\
             cluster_slots_ok:{assigned}\r\n\
             cluster_slots_pfail:0\r\n\
             cluster_slots_fail:0\r\n\
             cluster_known_nodes:{known_nodes}\r\n\
             cluster_size:{masters}\r\n\
             cluster_current_epoch:{current_epoch}\r\n\
             cluster_my_epoch:{my_epoch}\r\n\
             cluster_stats_messages_sent:0\r\n\
             cluster_stats_messages_received:0\r\n",
            state = state,
            assigned = assigned,
            known_nodes = known_nodes,
            masters = masters,
            current_epoch = reg.current_epoch,
            my_epoch = my_epoch,
        );
        RespValue::bulk_string(Bytes::from(text))
    }

    /// `CLUSTER NODES`.
    pub fn nodes(&self) -> RespValue {
        let reg = self.inner.read().unwrap();
        let mut lines = String::new();
        for node in reg.nodes.values() {
            let mut flags: Vec<&str> = node.flags().iter().map(|f| f.as_str()).collect();
            if flags.is_empty() {
                flags.push("noflags");
            }
            let master = node
                .master_id()
                .unwrap_or_else(|| "-".to_string());
            let ranges = node
                .ranges()
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            lines.push_str(&format!(
                "{id} {addr}@{cport} {flags} {master} {ping} {pong} {epoch} connected {ranges}\r\n",
                id = node.id(),
                addr = node.addr(),
                cport = cluster_bus_port(node.addr()),
                flags = flags.join(","),
                master = master,
                ping = node.ping_sent(),
                pong = node.pong_recv(),
                epoch = node.config_epoch(),
                ranges = ranges,
            ));
        }
        RespValue::bulk_string(Bytes::from(lines))
    }

    /// `CLUSTER SLOTS`: one array entry per maximal contiguous range.
    pub fn slots(&self) -> RespValue {
        let reg = self.inner.read().unwrap();
        let mut entries = Vec::new();
        for node in reg.nodes.values() {
            let (host, port) = split_addr(node.addr());
            for r in node.ranges() {
                entries.push(RespValue::array(vec![
                    RespValue::integer(r.start as i64),
                    RespValue::integer(r.end as i64),
                    RespValue::array(vec![
                        RespValue::bulk_string(Bytes::from(host.clone())),
                        RespValue::integer(port as i64),
                        RespValue::bulk_string(Bytes::from(node.id().to_string())),
                    ]),
                ]));
            }
        }
        RespValue::array(entries)
    }

    pub fn myid(&self) -> RespValue {
        RespValue::bulk_string(Bytes::from(self.myself_id()))
    }

    /// Dispatch a parsed `CLUSTER <subcommand> [args...]`.
    pub fn execute(&self, args: &[Bytes]) -> Result<RespValue> {
        if args.is_empty() {
            return Err(SlotKvError::WrongArgCount("CLUSTER".to_string()));
        }
        let sub = String::from_utf8_lossy(&args[0]).to_uppercase();
        match sub.as_str() {
            "KEYSLOT" => {
                if args.len() != 2 {
                    return Err(SlotKvError::WrongArgCount("CLUSTER KEYSLOT".to_string()));
                }
                Ok(RespValue::integer(self.keyslot(&args[1]) as i64))
            }
            "INFO" => Ok(self.info()),
            "NODES" => Ok(self.nodes()),
            "SLOTS" => Ok(self.slots()),
            "MYID" => Ok(self.myid()),
            "MEET" => {
                if args.len() != 3 {
                    return Err(SlotKvError::WrongArgCount("CLUSTER MEET".to_string()));
                }
                let host = String::from_utf8_lossy(&args[1]).to_string();
                let port: u16 = String::from_utf8_lossy(&args[2])
                    .parse()
                    .map_err(|_| SlotKvError::InvalidArgument("invalid port".to_string()))?;
                let id = self.meet(&host, port)?;
                Ok(RespValue::simple_string(id))
            }
            "FORGET" => {
                if args.len() != 2 {
                    return Err(SlotKvError::WrongArgCount("CLUSTER FORGET".to_string()));
                }
                let id = String::from_utf8_lossy(&args[1]).to_string();
                self.forget(&id)?;
                Ok(RespValue::ok())
            }
            "ADDSLOTS" => {
                if args.len() < 2 {
                    return Err(SlotKvError::WrongArgCount("CLUSTER ADDSLOTS".to_string()));
                }
                let myself = self.myself_id();
                for a in &args[1..] {
                    let s: u16 = String::from_utf8_lossy(a)
                        .parse()
                        .map_err(|_| SlotKvError::InvalidArgument("invalid slot".to_string()))?;
                    self.assign_slot(s, &myself)?;
                }
                Ok(RespValue::ok())
            }
            "ADDSLOTSRANGE" => {
                if args.len() < 3 || (args.len() - 1) % 2 != 0 {
                    return Err(SlotKvError::WrongArgCount(
                        "CLUSTER ADDSLOTSRANGE".to_string(),
                    ));
                }
                let myself = self.myself_id();
                let mut i = 1;
                while i < args.len() {
                    let lo: u16 = String::from_utf8_lossy(&args[i])
                        .parse()
                        .map_err(|_| SlotKvError::InvalidArgument("invalid slot".to_string()))?;
                    let hi: u16 = String::from_utf8_lossy(&args[i + 1])
                        .parse()
                        .map_err(|_| SlotKvError::InvalidArgument("invalid slot".to_string()))?;
                    self.assign_slot_range(lo, hi, &myself)?;
                    i += 2;
                }
                Ok(RespValue::ok())
            }
            _ => Err(SlotKvError::InvalidCommand(format!(
                "unknown CLUSTER subcommand '{}'",
                sub
            ))),
        }
    }
}

fn split_addr(addr: &str) -> (String, u16) {
    match addr.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse().unwrap_or(0)),
        None => (addr.to_string(), 0),
    }
}

fn cluster_bus_port(addr: &str) -> u16 {
    split_addr(addr).1.saturating_add(10000)
}
