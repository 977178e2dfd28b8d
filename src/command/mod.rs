pub mod database;
pub mod hash;
pub mod key;
pub mod list;
pub mod server;
pub mod set;
pub mod string;
pub mod zset;

use self::database::DatabaseCommands;
use self::hash::HashCommands;
use self::key::KeyCommands;
use self::list::ListCommands;
use self::server::ServerCommands;
use self::set::SetCommands;
use self::string::StringCommands;
use self::zset::ZSetCommands;
use crate::cluster::{Cluster, Redirect};
use crate::error::{Result, SlotKvError};
use crate::protocol::RespValue;
use crate::replication::ReplicationController;
use crate::storage::StorageEngine;
use bytes::Bytes;
use std::sync::Arc;

/// Redis commands that mutate the keyspace. A successful execution of any of
/// these is re-serialised and handed to the Replication Controller's
/// `propagate` (spec §4.5 "On every write applied locally").
const WRITE_COMMANDS: &[&str] = &[
    "SET", "SETNX", "SETEX", "PSETEX", "APPEND", "DEL", "UNLINK", "INCR", "DECR", "INCRBY",
    "DECRBY", "INCRBYFLOAT", "GETSET", "GETDEL", "SETRANGE", "MSET", "MSETNX", "EXPIRE",
    "PEXPIRE", "EXPIREAT", "PEXPIREAT", "PERSIST", "RENAME", "RENAMENX", "MOVE", "COPY",
    "FLUSHDB", "FLUSHALL", "RESTORE", "LPUSH", "RPUSH", "LPUSHX", "RPUSHX", "LPOP", "RPOP",
    "LSET", "LREM", "LTRIM", "LINSERT", "RPOPLPUSH", "LMOVE", "SADD", "SREM", "SMOVE", "SPOP",
    "SDIFFSTORE", "SINTERSTORE", "SUNIONSTORE", "HSET", "HSETNX", "HMSET", "HDEL", "HINCRBY",
    "HINCRBYFLOAT", "ZADD", "ZINCRBY", "ZREM", "ZREMRANGEBYSCORE", "ZREMRANGEBYRANK",
    "ZREMRANGEBYLEX", "ZPOPMIN", "ZPOPMAX",
];

/// Command executor with database context
pub struct CommandExecutor {
    string_commands: StringCommands,
    database_commands: DatabaseCommands,
    key_commands: KeyCommands,
    server_commands: ServerCommands,
    list_commands: ListCommands,
    hash_commands: HashCommands,
    set_commands: SetCommands,
    zset_commands: ZSetCommands,
    cluster: Arc<Cluster>,
    replication: Arc<ReplicationController>,
}

impl CommandExecutor {
    pub fn new(storage: StorageEngine) -> Self {
        Self::with_port(storage, 6379)
    }

    pub fn with_port(storage: StorageEngine, port: u16) -> Self {
        let cluster = Arc::new(Cluster::new(format!("127.0.0.1:{}", port)));
        let replication = Arc::new(ReplicationController::new(1024 * 1024));
        Self::with_cluster_and_replication(storage, port, cluster, replication)
    }

    /// Construct a `CommandExecutor` sharing the server-wide `Cluster` and
    /// `ReplicationController` instances. A fresh `CommandExecutor` is built
    /// per client connection (§5), but the cluster registry and the
    /// replication backlog/fan-out set must be shared across every
    /// connection on the node.
    pub fn with_cluster_and_replication(
        storage: StorageEngine,
        port: u16,
        cluster: Arc<Cluster>,
        replication: Arc<ReplicationController>,
    ) -> Self {
        let server_commands =
            ServerCommands::with_storage_port_and_cluster(storage.clone(), port, true);
        server_commands.set_replication(Arc::clone(&replication));

        Self {
            string_commands: StringCommands::new(storage.clone()),
            database_commands: DatabaseCommands::new(storage.clone()),
            key_commands: KeyCommands::new(storage.clone()),
            server_commands,
            list_commands: ListCommands::new(storage.clone()),
            hash_commands: HashCommands::new(storage.clone()),
            set_commands: SetCommands::new(storage.clone()),
            zset_commands: ZSetCommands::new(storage),
            cluster,
            replication,
        }
    }

    pub fn cluster(&self) -> &Arc<Cluster> {
        &self.cluster
    }

    pub fn replication(&self) -> &Arc<ReplicationController> {
        &self.replication
    }

    /// Check whether `key` belongs to this node's slot ownership.
    ///
    /// Returns `Err(SlotKvError::Moved(..))`/`Err(SlotKvError::Ask(..))` when
    /// the key's slot is owned (or being imported) elsewhere. `redirect_for`
    /// returns `None` both when `myself` owns the slot and when nobody does
    /// (e.g. after `CLUSTER FORGET` orphans a node's ranges without
    /// reassigning them) — those two cases must not be treated the same
    /// way, so an unowned slot is distinguished here and reported as
    /// `SlotUnassigned` (§7 "surfaced as CLUSTERDOWN to clients").
    fn check_key_routing(&self, key: &[u8]) -> Result<()> {
        match self.cluster.redirect_for(key) {
            Some(Redirect::Moved { slot, addr }) => Err(SlotKvError::Moved(slot, addr)),
            Some(Redirect::Ask { slot, addr }) => Err(SlotKvError::Ask(slot, addr)),
            None => {
                let slot = self.cluster.keyslot(key);
                if self.cluster.is_local(slot) {
                    Ok(())
                } else {
                    Err(SlotKvError::SlotUnassigned(slot))
                }
            }
        }
    }

    /// Check that multiple keys (e.g. MGET, MSET) all hash to the same slot,
    /// then apply the single-key routing check to that slot.
    fn check_keys_routing(&self, keys: &[&[u8]]) -> Result<()> {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(());
        };
        let first_slot = self.cluster.keyslot(first);
        for key in rest {
            if self.cluster.keyslot(key) != first_slot {
                return Err(SlotKvError::CrossSlot);
            }
        }
        self.check_key_routing(first)
    }

    /// Execute `command`, then fan it out to ready replicas if it succeeded
    /// and is one of the commands that mutate the keyspace (§4.5).
    pub fn execute(
        &self,
        command: &str,
        args: &[Bytes],
        current_db: &mut usize,
        client_id: usize,
    ) -> Result<RespValue> {
        let command_upper = command.to_uppercase();
        let result = self.execute_inner(&command_upper, args, current_db, client_id);
        if result.is_ok() && WRITE_COMMANDS.contains(&command_upper.as_str()) {
            self.replication.propagate(&command_upper, args);
        }
        result
    }

    fn execute_inner(
        &self,
        command: &str,
        args: &[Bytes],
        current_db: &mut usize,
        client_id: usize,
    ) -> Result<RespValue> {
        match command {
            // String commands - single key operations
            "GET" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.get(args, *current_db)
            }
            "SET" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.set(args, *current_db)
            }
            "DEL" => {
                // DEL can take multiple keys, check all of them
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.string_commands.del(args, *current_db)
            }
            "EXISTS" => {
                // EXISTS can take multiple keys
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.string_commands.exists(args, *current_db)
            }
            "MGET" => {
                // MGET takes multiple keys, all must be in the same slot
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.string_commands.mget(args, *current_db)
            }
            "MSET" => {
                // MSET takes key-value pairs, check all keys (every other arg starting at 0)
                if args.len() >= 2 {
                    let keys: Vec<&[u8]> = args.iter().step_by(2).map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.string_commands.mset(args, *current_db)
            }
            "STRLEN" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.strlen(args, *current_db)
            }
            "APPEND" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.append(args, *current_db)
            }
            "INCR" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.incr(args, *current_db)
            }
            "DECR" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.decr(args, *current_db)
            }
            "INCRBY" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.incrby(args, *current_db)
            }
            "DECRBY" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.decrby(args, *current_db)
            }
            "INCRBYFLOAT" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.incrbyfloat(args, *current_db)
            }
            "GETRANGE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.getrange(args, *current_db)
            }
            "SETRANGE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.setrange(args, *current_db)
            }
            "GETEX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.getex(args, *current_db)
            }
            "GETDEL" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.getdel(args, *current_db)
            }
            "SETNX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.setnx(args, *current_db)
            }
            "SETEX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.setex(args, *current_db)
            }
            "PSETEX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.string_commands.psetex(args, *current_db)
            }

            // Database commands - these are node-local, no routing needed
            "SELECT" => self.database_commands.select(args, current_db),
            "DBSIZE" => self.database_commands.dbsize(args, *current_db),
            "FLUSHDB" => self.database_commands.flushdb(args, *current_db),
            "FLUSHALL" => self.database_commands.flushall(args),
            "SWAPDB" => self.database_commands.swapdb(args),
            "MOVE" => self.database_commands.move_key(args, *current_db),

            // Key commands - most need routing checks
            "KEYS" => self.key_commands.keys(args, *current_db), // Local scan, no routing
            "SCAN" => self.key_commands.scan(args, *current_db), // Local scan, no routing
            "RANDOMKEY" => self.key_commands.randomkey(args, *current_db), // Local, no routing
            "RENAME" => {
                // RENAME takes two keys, both must be in the same slot
                if args.len() >= 2 {
                    let keys: Vec<&[u8]> = vec![args[0].as_ref(), args[1].as_ref()];
                    self.check_keys_routing(&keys)?;
                }
                self.key_commands.rename(args, *current_db)
            }
            "RENAMENX" => {
                if args.len() >= 2 {
                    let keys: Vec<&[u8]> = vec![args[0].as_ref(), args[1].as_ref()];
                    self.check_keys_routing(&keys)?;
                }
                self.key_commands.renamenx(args, *current_db)
            }
            "TYPE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.get_type(args, *current_db)
            }
            "COPY" => {
                // COPY takes source and destination keys
                if args.len() >= 2 {
                    let keys: Vec<&[u8]> = vec![args[0].as_ref(), args[1].as_ref()];
                    self.check_keys_routing(&keys)?;
                }
                self.key_commands.copy(args, *current_db)
            }
            "DUMP" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.dump(args, *current_db)
            }
            "RESTORE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.restore(args, *current_db)
            }
            "MIGRATE" => self.key_commands.migrate(args, *current_db), // MIGRATE handles routing internally

            // Key expiration commands - single key operations
            "EXPIRE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.expire(args, *current_db)
            }
            "EXPIREAT" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.expireat(args, *current_db)
            }
            "PEXPIRE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.pexpire(args, *current_db)
            }
            "PEXPIREAT" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.pexpireat(args, *current_db)
            }
            "TTL" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.ttl(args, *current_db)
            }
            "PTTL" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.pttl(args, *current_db)
            }
            "PERSIST" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.persist(args, *current_db)
            }
            "EXPIRETIME" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.expiretime(args, *current_db)
            }
            "PEXPIRETIME" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.key_commands.pexpiretime(args, *current_db)
            }

            // Server commands
            "INFO" => self.server_commands.info(args),
            "CONFIG" => {
                if args.is_empty() {
                    return Err(SlotKvError::WrongArgCount("CONFIG".to_string()));
                }
                let subcommand = String::from_utf8_lossy(&args[0]).to_uppercase();
                match subcommand.as_str() {
                    "GET" => self.server_commands.config_get(&args[1..]),
                    "SET" => self.server_commands.config_set(&args[1..]),
                    "REWRITE" => self.server_commands.config_rewrite(&args[1..]),
                    _ => Err(SlotKvError::InvalidCommand(format!(
                        "Unknown CONFIG subcommand: {}",
                        subcommand
                    ))),
                }
            }
            "SLOWLOG" => self.server_commands.slowlog(args),
            "TIME" => self.server_commands.time(args),
            "COMMAND" => self.server_commands.command(args),
            "SAVE" => self.server_commands.save(args),
            "BGSAVE" => self.server_commands.bgsave(args),
            "LASTSAVE" => self.server_commands.lastsave(args),
            "SHUTDOWN" => self.server_commands.shutdown(args),
            "CLIENT" => {
                if args.is_empty() {
                    return Err(SlotKvError::WrongArgCount("CLIENT".to_string()));
                }
                let subcommand = String::from_utf8_lossy(&args[0]).to_uppercase();
                match subcommand.as_str() {
                    "LIST" => self.server_commands.client_list(&args[1..]),
                    "SETNAME" => self.server_commands.client_setname(&args[1..], client_id),
                    "GETNAME" => self.server_commands.client_getname(&args[1..], client_id),
                    _ => Err(SlotKvError::InvalidCommand(format!(
                        "Unknown CLIENT subcommand: {}",
                        subcommand
                    ))),
                }
            }

            // List commands - single key operations
            "LPUSH" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.lpush(args, *current_db)
            }
            "RPUSH" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.rpush(args, *current_db)
            }
            "LPOP" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.lpop(args, *current_db)
            }
            "RPOP" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.rpop(args, *current_db)
            }
            "LLEN" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.llen(args, *current_db)
            }
            "LRANGE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.lrange(args, *current_db)
            }
            "LINDEX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.lindex(args, *current_db)
            }
            "LSET" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.lset(args, *current_db)
            }
            "LREM" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.lrem(args, *current_db)
            }
            "LTRIM" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.ltrim(args, *current_db)
            }
            "LINSERT" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.linsert(args, *current_db)
            }
            "LMOVE" => {
                // LMOVE takes source and destination keys
                if args.len() >= 2 {
                    let keys: Vec<&[u8]> = vec![args[0].as_ref(), args[1].as_ref()];
                    self.check_keys_routing(&keys)?;
                }
                self.list_commands.lmove(args, *current_db)
            }
            "LPOS" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.list_commands.lpos(args, *current_db)
            }

            // Hash commands - single key operations
            "HSET" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hset(args, *current_db)
            }
            "HSETNX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hsetnx(args, *current_db)
            }
            "HGET" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hget(args, *current_db)
            }
            "HMGET" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hmget(args, *current_db)
            }
            "HMSET" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hmset(args, *current_db)
            }
            "HDEL" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hdel(args, *current_db)
            }
            "HEXISTS" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hexists(args, *current_db)
            }
            "HLEN" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hlen(args, *current_db)
            }
            "HKEYS" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hkeys(args, *current_db)
            }
            "HVALS" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hvals(args, *current_db)
            }
            "HGETALL" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hgetall(args, *current_db)
            }
            "HINCRBY" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hincrby(args, *current_db)
            }
            "HINCRBYFLOAT" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hincrbyfloat(args, *current_db)
            }
            "HSCAN" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.hash_commands.hscan(args, *current_db)
            }

            // Set commands - single key and multi-key operations
            "SADD" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.set_commands.sadd(args, *current_db)
            }
            "SREM" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.set_commands.srem(args, *current_db)
            }
            "SISMEMBER" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.set_commands.sismember(args, *current_db)
            }
            "SMEMBERS" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.set_commands.smembers(args, *current_db)
            }
            "SCARD" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.set_commands.scard(args, *current_db)
            }
            "SPOP" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.set_commands.spop(args, *current_db)
            }
            "SRANDMEMBER" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.set_commands.srandmember(args, *current_db)
            }
            "SUNION" => {
                // SUNION takes multiple keys
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.set_commands.sunion(args, *current_db)
            }
            "SINTER" => {
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.set_commands.sinter(args, *current_db)
            }
            "SDIFF" => {
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.set_commands.sdiff(args, *current_db)
            }
            "SUNIONSTORE" => {
                // First arg is destination, rest are source keys
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.set_commands.sunionstore(args, *current_db)
            }
            "SINTERSTORE" => {
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.set_commands.sinterstore(args, *current_db)
            }
            "SDIFFSTORE" => {
                if !args.is_empty() {
                    let keys: Vec<&[u8]> = args.iter().map(|b| b.as_ref()).collect();
                    self.check_keys_routing(&keys)?;
                }
                self.set_commands.sdiffstore(args, *current_db)
            }
            "SSCAN" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.set_commands.sscan(args, *current_db)
            }
            "SMOVE" => {
                // SMOVE takes source and destination keys
                if args.len() >= 2 {
                    let keys: Vec<&[u8]> = vec![args[0].as_ref(), args[1].as_ref()];
                    self.check_keys_routing(&keys)?;
                }
                self.set_commands.smove(args, *current_db)
            }

            // Sorted Set commands - single key operations
            "ZADD" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zadd(args, *current_db)
            }
            "ZREM" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrem(args, *current_db)
            }
            "ZSCORE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zscore(args, *current_db)
            }
            "ZRANK" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrank(args, *current_db)
            }
            "ZREVRANK" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrevrank(args, *current_db)
            }
            "ZRANGE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrange(args, *current_db)
            }
            "ZREVRANGE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrevrange(args, *current_db)
            }
            "ZRANGEBYSCORE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrangebyscore(args, *current_db)
            }
            "ZREVRANGEBYSCORE" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrevrangebyscore(args, *current_db)
            }
            "ZCARD" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zcard(args, *current_db)
            }
            "ZCOUNT" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zcount(args, *current_db)
            }
            "ZINCRBY" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zincrby(args, *current_db)
            }
            "ZSCAN" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zscan(args, *current_db)
            }
            "ZPOPMIN" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zpopmin(args, *current_db)
            }
            "ZPOPMAX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zpopmax(args, *current_db)
            }
            "ZRANGEBYLEX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrangebylex(args, *current_db)
            }
            "ZREVRANGEBYLEX" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zrevrangebylex(args, *current_db)
            }
            "ZLEXCOUNT" => {
                if !args.is_empty() {
                    self.check_key_routing(&args[0])?;
                }
                self.zset_commands.zlexcount(args, *current_db)
            }

            // Cluster slot-routing plane (spec §4.3)
            "CLUSTER" => self.cluster.execute(args),
            // No slot migration in scope (spec §1 Non-goals); acknowledge so
            // Redis-aware clients don't choke on the handshake.
            "READONLY" | "READWRITE" | "ASKING" => Ok(RespValue::simple_string("OK")),

            // Replication plane (spec §4.5). `REPLICAOF host port` dials the
            // new master asynchronously and is intercepted by the connection
            // layer before reaching here; only the synchronous `NO ONE` form
            // (demote back to master) is handled in this dispatcher.
            "REPLICAOF" | "SLAVEOF" => {
                if args.len() == 2
                    && args[0].eq_ignore_ascii_case(b"no")
                    && args[1].eq_ignore_ascii_case(b"one")
                {
                    self.replication.replicaof_no_one();
                    Ok(RespValue::ok())
                } else {
                    Err(SlotKvError::InvalidCommand(
                        "REPLICAOF host port must be dialed asynchronously".to_string(),
                    ))
                }
            }
            // `REPLCONF capa ...` handshake preamble; ACKs on an already
            // promoted replica connection are consumed by the Replication
            // Controller's own reader task, never reaching this dispatcher.
            "REPLCONF" => Ok(RespValue::ok()),

            // Utility commands
            "PING" => {
                if args.is_empty() {
                    Ok(RespValue::simple_string("PONG"))
                } else if args.len() == 1 {
                    // Return a copy of the argument as a bulk string
                    Ok(RespValue::bulk_string(args[0].clone()))
                } else {
                    Err(SlotKvError::WrongArgCount("PING".to_string()))
                }
            }
            "ECHO" => {
                if args.len() != 1 {
                    return Err(SlotKvError::WrongArgCount("ECHO".to_string()));
                }
                Ok(RespValue::bulk_string(args[0].clone()))
            }

            _ => Err(SlotKvError::InvalidCommand(format!(
                "Unknown command: {}",
                command
            ))),
        }
    }

    pub fn server_commands(&self) -> &ServerCommands {
        &self.server_commands
    }
}

/// Lets the Replication Controller apply a replicated command on a replica
/// without depending on the command layer's types (§4.5 "command-application
/// helper"). Always applies against database 0 (spec §1 Non-goal: no
/// multi-database selection) and under a synthetic client id, since
/// replicated commands never originate from a real client connection.
impl crate::replication::CommandApplier for CommandExecutor {
    fn apply(&self, command: &str, args: &[Bytes]) -> Result<RespValue> {
        let mut db = 0usize;
        self.execute_inner(command, args, &mut db, usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageAdapter;

    /// A slot orphaned by `CLUSTER FORGET` (owner removed, slot never
    /// reassigned) must surface as `CLUSTERDOWN`, not be served locally
    /// just because `redirect_for` also returns `None` when `myself` is the
    /// owner (§7 `SlotUnassigned`).
    #[test]
    fn orphaned_slot_reports_clusterdown() {
        let storage = StorageAdapter::new();
        let executor = CommandExecutor::new(storage);
        let cluster = executor.cluster().clone();

        let other = crate::cluster::Node::new(
            crate::cluster::generate_node_id(),
            "127.0.0.1:7001".to_string(),
        );
        let other_id = other.id().to_string();
        cluster.add_node(other);
        cluster.assign_slot_range(0, 16383, &other_id).unwrap();
        cluster.forget(&other_id).unwrap();

        let mut db = 0usize;
        let err = executor
            .execute("GET", &[Bytes::from("foo")], &mut db, 0)
            .unwrap_err();
        assert!(matches!(err, SlotKvError::SlotUnassigned(_)));
    }

    #[test]
    fn locally_owned_slot_is_served() {
        let storage = StorageAdapter::new();
        let executor = CommandExecutor::new(storage);
        let mut db = 0usize;

        let set = executor.execute(
            "SET",
            &[Bytes::from("foo"), Bytes::from("bar")],
            &mut db,
            0,
        );
        assert!(set.is_ok());
    }
}
