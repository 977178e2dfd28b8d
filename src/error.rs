use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotKvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Wrong number of arguments for '{0}' command")]
    WrongArgCount(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Key not found")]
    KeyNotFound,

    #[error("Wrong type: {0}")]
    WrongType(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),

    // --- cluster slot-routing plane (spec §7) ---
    #[error("MOVED {0} {1}")]
    Moved(u16, String),

    #[error("ASK {0} {1}")]
    Ask(u16, String),

    #[error("CROSSSLOT Keys in request don't hash to the same slot")]
    CrossSlot,

    #[error("CLUSTERDOWN slot {0} is not assigned")]
    SlotUnassigned(u16),

    #[error("ERR node {0} already exists")]
    NodeAlreadyExists(String),

    #[error("ERR unknown node {0}")]
    UnknownNode(String),

    #[error("Cluster support is not enabled")]
    ClusterDisabled,

    // --- replication plane (spec §7) ---
    #[error("backlog cannot satisfy offset range [{0}, {1})")]
    BacklogOutOfRange(u64, u64),

    #[error("replication handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("replication stream lost: {0}")]
    StreamLost(String),

    // --- snapshot codec (spec §7) ---
    #[error("RDB decode error: {0}")]
    RdbDecode(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SlotKvError {
    /// The exact RESP error line this variant should produce on the wire
    /// (sans the leading `-` and trailing `\r\n`, which the protocol layer
    /// adds). Redirects and cluster errors already carry their own type
    /// word — `MOVED`, `ASK`, `CROSSSLOT`, `CLUSTERDOWN`, `ERR` — per
    /// spec §7/§4.3; prefixing those with another `ERR` would corrupt the
    /// redirect a cluster-aware client parses. Everything else is a plain
    /// error and gets the generic `ERR` prefix.
    pub fn resp_message(&self) -> String {
        match self {
            SlotKvError::Moved(..)
            | SlotKvError::Ask(..)
            | SlotKvError::CrossSlot
            | SlotKvError::SlotUnassigned(..)
            | SlotKvError::NodeAlreadyExists(..)
            | SlotKvError::UnknownNode(..) => self.to_string(),
            _ => format!("ERR {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SlotKvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moved_wire_form_has_no_err_prefix() {
        let e = SlotKvError::Moved(12182, "127.0.0.1:7001".to_string());
        assert_eq!(e.resp_message(), "MOVED 12182 127.0.0.1:7001");
    }

    #[test]
    fn ask_wire_form_has_no_err_prefix() {
        let e = SlotKvError::Ask(42, "127.0.0.1:7002".to_string());
        assert_eq!(e.resp_message(), "ASK 42 127.0.0.1:7002");
    }

    #[test]
    fn cross_slot_keeps_its_own_type_word() {
        assert_eq!(
            SlotKvError::CrossSlot.resp_message(),
            "CROSSSLOT Keys in request don't hash to the same slot"
        );
    }

    #[test]
    fn slot_unassigned_reports_clusterdown() {
        assert_eq!(
            SlotKvError::SlotUnassigned(7).resp_message(),
            "CLUSTERDOWN slot 7 is not assigned"
        );
    }

    #[test]
    fn node_already_exists_is_not_double_prefixed() {
        let msg = SlotKvError::NodeAlreadyExists("abc123".to_string()).resp_message();
        assert_eq!(msg, "ERR node abc123 already exists");
        assert!(!msg.starts_with("ERR ERR"));
    }

    #[test]
    fn generic_errors_get_err_prefix() {
        let msg = SlotKvError::InvalidArgument("bad port".to_string()).resp_message();
        assert_eq!(msg, "ERR Invalid argument: bad port");
    }
}
