use crate::command::CommandExecutor;
use crate::error::Result;
use crate::observability::Metrics;
use crate::protocol::{RespParser, RespValue};
use crate::replication::ReplicationController;
use crate::server::monitor::MonitorBroadcaster;
use crate::storage::KvStore;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::select;
use tracing::{debug, warn};

static CLIENT_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Commands that should not be broadcast to MONITOR clients.
/// These are typically internal, debugging, or replication commands.
const MONITOR_EXCLUDED_COMMANDS: &[&str] = &["MONITOR", "DEBUG", "SYNC", "PSYNC"];

/// Protocol version
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProtocolVersion {
    Resp2,
    Resp3,
}

/// Connection mode
#[derive(Debug, Clone, Copy, PartialEq)]
enum ConnectionMode {
    Normal,
    Monitor,
}

/// Connection handler for a single client. The connection loop is where a
/// plain client connection is promoted into a replica feed: once it issues
/// `PSYNC`, ownership of the socket moves to the Replication Controller
/// (§4.5) and this struct's `handle()` loop exits without closing it.
pub struct Connection {
    stream: Option<TcpStream>,
    parser: RespParser,
    executor: CommandExecutor,
    protocol_version: ProtocolVersion,
    current_db: usize,
    client_id: usize,
    metrics: Option<Arc<Metrics>>,
    client_addr: String,
    monitor_broadcaster: Option<Arc<MonitorBroadcaster>>,
    mode: ConnectionMode,
    replication: Arc<ReplicationController>,
    store: Arc<dyn KvStore>,
}

impl Connection {
    /// Create a new connection handler.
    ///
    /// # Arguments
    /// * `stream` - The TCP stream for this connection
    /// * `executor` - Command executor for processing Redis commands
    /// * `metrics` - Optional metrics collector for connection statistics
    /// * `monitor_broadcaster` - Optional broadcaster for MONITOR command support.
    ///   If None, MONITOR command will return an error. This is typically None
    ///   only in unit tests or when MONITOR support is intentionally disabled.
    /// * `replication` - The node-wide Replication Controller; a `PSYNC` on
    ///   this connection hands the socket to it.
    /// * `store` - The node-wide keyspace, handed to the Replication
    ///   Controller for RDB snapshotting on full resync.
    pub fn new(
        stream: TcpStream,
        executor: CommandExecutor,
        metrics: Option<Arc<Metrics>>,
        monitor_broadcaster: Option<Arc<MonitorBroadcaster>>,
        replication: Arc<ReplicationController>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        let client_id = CLIENT_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
        let peer_addr = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Register client
        if let Err(e) = executor
            .server_commands()
            .register_client(client_id, peer_addr.clone())
        {
            warn!("Failed to register client: {}", e);
        }

        Self {
            stream: Some(stream),
            parser: RespParser::new(8192),
            executor,
            protocol_version: ProtocolVersion::Resp2, // Default to RESP2
            current_db: 0,                            // Default to database 0
            client_id,
            metrics,
            client_addr: peer_addr,
            monitor_broadcaster,
            mode: ConnectionMode::Normal,
            replication,
            store,
        }
    }

    /// Handle the connection using a state machine
    pub async fn handle(&mut self) -> Result<()> {
        loop {
            match self.mode {
                ConnectionMode::Normal => {
                    if !self.handle_normal_mode().await? {
                        break;
                    }
                    // A `PSYNC` takes the socket and never gives it back;
                    // once that happens there's nothing left for this loop
                    // to read from.
                    if self.stream.is_none() {
                        return Ok(());
                    }
                }
                ConnectionMode::Monitor => {
                    if !self.handle_monitor_mode().await? {
                        break;
                    }
                }
            }
        }

        self.cleanup().await;
        Ok(())
    }

    /// Handle normal command mode. Returns false if connection should close.
    async fn handle_normal_mode(&mut self) -> Result<bool> {
        // Read data from the client
        let n = {
            let stream = self
                .stream
                .as_mut()
                .expect("handle_normal_mode called after stream was taken");
            stream.read_buf(self.parser.buffer_mut()).await?
        };

        if n == 0 {
            // Connection closed
            return Ok(false);
        }

        // Record bytes received
        if let Some(ref metrics) = self.metrics {
            metrics.connections.record_bytes_received(n as u64);
        }

        // Parse and process commands
        while let Some(value) = self.parser.parse()? {
            let Some((command_upper, args)) = extract_command(&value) else {
                self.write_response(RespValue::error("ERR invalid command format"))
                    .await?;
                continue;
            };

            // `PSYNC <replid> <offset>`: promote this connection to a
            // replica feed and hand the socket to the Replication
            // Controller (§4.5). Nothing more is read or written here.
            if command_upper == "PSYNC" {
                self.promote_to_replica(&args).await?;
                return Ok(false);
            }

            // `REPLICAOF host port` / `SLAVEOF host port` (but not the
            // synchronous `NO ONE` form): dial the new master
            // asynchronously. The command layer only knows how to handle
            // `NO ONE` (spec §4.5); everything else is intercepted here.
            if (command_upper == "REPLICAOF" || command_upper == "SLAVEOF")
                && !is_replicaof_no_one(&args)
            {
                let response = self.dial_replicaof(&args).await;
                self.write_response(response).await?;
                continue;
            }

            // `WAIT numreplicas timeout`: a thin async read of ack offsets
            // already tracked by the Replication Controller (§4.5, spec
            // Supplemental Features). Needs `.await`, so it is handled here
            // rather than in the synchronous command dispatcher.
            if command_upper == "WAIT" {
                let response = self.handle_wait(&args).await;
                self.write_response(response).await?;
                continue;
            }

            let response = self
                .process_command(&command_upper, &args, &value)
                .await;
            self.write_response(response).await?;

            // Check if mode changed to monitor
            if self.mode == ConnectionMode::Monitor {
                return Ok(true);
            }
        }

        Ok(true)
    }

    /// Handle monitor mode - stream all commands to this client.
    /// Returns false if connection should close.
    async fn handle_monitor_mode(&mut self) -> Result<bool> {
        let broadcaster = match &self.monitor_broadcaster {
            Some(b) => b.clone(),
            None => {
                warn!("Monitor mode enabled but no broadcaster available");
                self.mode = ConnectionMode::Normal;
                return Ok(true);
            }
        };

        let mut receiver = broadcaster.subscribe();
        let stream = self
            .stream
            .as_mut()
            .expect("handle_monitor_mode called after stream was taken");

        loop {
            select! {
                // Receive monitor messages
                msg = receiver.recv() => {
                    match msg {
                        Ok(monitor_msg) => {
                            // Format and send the monitor message
                            let formatted = monitor_msg.format();
                            let data = RespValue::simple_string(formatted).serialize();
                            if stream.write_all(&data).await.is_err() || stream.flush().await.is_err() {
                                debug!("Monitor client write error");
                                return Ok(false);
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            // We missed some messages due to slow reading
                            debug!("Monitor client {} lagged behind by {} messages", self.client_id, n);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                            // Broadcaster closed
                            return Ok(false);
                        }
                    }
                }
                // Check for client input (QUIT, RESET, or disconnect)
                result = stream.read_buf(self.parser.buffer_mut()) => {
                    match result {
                        Ok(0) => {
                            // Client disconnected
                            broadcaster.unregister_monitor(self.client_id).await;
                            return Ok(false);
                        }
                        Ok(_) => {
                            // Client sent data - check for QUIT or RESET
                            while let Some(value) = self.parser.parse()? {
                                if let RespValue::Array(Some(arr)) = &value {
                                    if !arr.is_empty() {
                                        if let RespValue::BulkString(Some(cmd)) = &arr[0] {
                                            let command = String::from_utf8_lossy(cmd).to_uppercase();
                                            if command == "QUIT" {
                                                broadcaster.unregister_monitor(self.client_id).await;
                                                let data = RespValue::ok().serialize();
                                                let stream = self.stream.as_mut().unwrap();
                                                stream.write_all(&data).await?;
                                                stream.flush().await?;
                                                return Ok(false);
                                            } else if command == "RESET" {
                                                broadcaster.unregister_monitor(self.client_id).await;
                                                self.mode = ConnectionMode::Normal;
                                                let data = RespValue::simple_string("RESET").serialize();
                                                let stream = self.stream.as_mut().unwrap();
                                                stream.write_all(&data).await?;
                                                stream.flush().await?;
                                                return Ok(true);
                                            }
                                        }
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            debug!("Monitor client read error: {}", e);
                            broadcaster.unregister_monitor(self.client_id).await;
                            return Ok(false);
                        }
                    }
                }
            }
        }
    }

    /// Cleanup on connection close
    async fn cleanup(&mut self) {
        // Unregister client
        if let Err(e) = self
            .executor
            .server_commands()
            .unregister_client(self.client_id)
        {
            warn!("Failed to unregister client: {}", e);
        }

        // Unregister from monitor if in monitor mode
        if self.mode == ConnectionMode::Monitor {
            if let Some(ref broadcaster) = self.monitor_broadcaster {
                broadcaster.unregister_monitor(self.client_id).await;
            }
        }
    }

    /// Hand the socket to the Replication Controller's PSYNC handshake. The
    /// controller writes `+FULLRESYNC`/`+CONTINUE`, streams the snapshot or
    /// backlog tail, and spawns the long-lived writer/reader tasks that own
    /// the connection from here on (§4.5).
    async fn promote_to_replica(&mut self, args: &[Bytes]) -> Result<()> {
        let requested_replid = args
            .first()
            .map(|b| String::from_utf8_lossy(b).to_string())
            .unwrap_or_else(|| "?".to_string());
        let requested_offset = args
            .get(1)
            .and_then(|b| String::from_utf8_lossy(b).parse::<i64>().ok())
            .unwrap_or(-1);

        let stream = self
            .stream
            .take()
            .expect("promote_to_replica called after stream was taken");
        let peer_addr = self.client_addr.clone();
        let replication = Arc::clone(&self.replication);
        let store = Arc::clone(&self.store);

        replication
            .handle_psync(stream, peer_addr, &requested_replid, requested_offset, store)
            .await
    }

    /// `REPLICAOF host port` / `SLAVEOF host port`: dial the new master and
    /// wait for the handshake's dial step to either succeed or time out
    /// (§4.5 "Timeouts"); streaming continues in a background task.
    async fn dial_replicaof(&mut self, args: &[Bytes]) -> RespValue {
        if args.len() != 2 {
            return RespValue::error("ERR wrong number of arguments for 'replicaof' command");
        }
        let host = String::from_utf8_lossy(&args[0]).to_string();
        let port = String::from_utf8_lossy(&args[1]).to_string();
        let addr = format!("{}:{}", host, port);

        let replication = Arc::clone(&self.replication);
        let store = Arc::clone(&self.store);
        match replication.start_replication(addr, store).await {
            Ok(()) => RespValue::ok(),
            Err(e) => RespValue::error(e.resp_message()),
        }
    }

    /// `WAIT numreplicas timeout`: block (up to `timeout` ms, or forever if
    /// `timeout == 0`) until at least `numreplicas` replicas have
    /// acknowledged the current master offset, then reply with however many
    /// actually have.
    async fn handle_wait(&mut self, args: &[Bytes]) -> RespValue {
        if args.len() != 2 {
            return RespValue::error("ERR wrong number of arguments for 'wait' command");
        }
        let num_replicas: usize = match String::from_utf8_lossy(&args[0]).parse() {
            Ok(n) => n,
            Err(_) => return RespValue::error("ERR value is not an integer or out of range"),
        };
        let timeout_ms: u64 = match String::from_utf8_lossy(&args[1]).parse() {
            Ok(n) => n,
            Err(_) => return RespValue::error("ERR timeout is not an integer or out of range"),
        };

        let acked = self.replication.wait(num_replicas, timeout_ms).await;
        RespValue::integer(acked as i64)
    }

    async fn process_command(
        &mut self,
        command_upper: &str,
        args: &[Bytes],
        raw: &RespValue,
    ) -> RespValue {
        let start = Instant::now();

        if !matches!(raw, RespValue::Array(Some(arr)) if !arr.is_empty()) {
            return RespValue::error("ERR invalid command format");
        }

        // Handle HELLO command for protocol version negotiation
        if command_upper == "HELLO" {
            return self.handle_hello(args);
        }

        // Handle MONITOR command
        if command_upper == "MONITOR" {
            return self.handle_monitor().await;
        }

        // Broadcast to monitors (except excluded internal/debugging commands)
        if !MONITOR_EXCLUDED_COMMANDS.contains(&command_upper) {
            self.broadcast_to_monitors(command_upper, args);
        }

        let result =
            self.executor
                .execute(command_upper, args, &mut self.current_db, self.client_id);

        // Record metrics
        if let Some(ref metrics) = self.metrics {
            let duration = start.elapsed();
            match &result {
                Ok(_) => {
                    metrics.commands.record_command(command_upper, duration);
                    debug!(
                        command = %command_upper,
                        duration_us = duration.as_micros(),
                        client = %self.client_addr,
                        db = self.current_db,
                        "Command executed"
                    );
                }
                Err(_) => {
                    metrics.commands.record_error(command_upper);
                }
            }
        }

        match result {
            Ok(resp) => resp,
            Err(e) => RespValue::error(e.resp_message()),
        }
    }

    /// Broadcast command to all monitoring clients
    fn broadcast_to_monitors(&self, command: &str, args: &[Bytes]) {
        if let Some(ref broadcaster) = self.monitor_broadcaster {
            if broadcaster.has_monitors() {
                let args_str: Vec<String> = args
                    .iter()
                    .map(|b| String::from_utf8_lossy(b).to_string())
                    .collect();
                broadcaster.broadcast_command(
                    self.current_db,
                    &self.client_addr,
                    command,
                    &args_str,
                );
            }
        }
    }

    /// Handle MONITOR command
    async fn handle_monitor(&mut self) -> RespValue {
        if let Some(ref broadcaster) = self.monitor_broadcaster {
            broadcaster
                .register_monitor(self.client_id, self.client_addr.clone())
                .await;
            self.mode = ConnectionMode::Monitor;
            RespValue::ok()
        } else {
            RespValue::error("ERR MONITOR not supported")
        }
    }

    fn handle_hello(&mut self, args: &[Bytes]) -> RespValue {
        if args.is_empty() {
            return RespValue::error("ERR wrong number of arguments for 'hello' command");
        }

        let version_str = String::from_utf8_lossy(&args[0]).to_string();
        let version = match version_str.as_str() {
            "2" => ProtocolVersion::Resp2,
            "3" => ProtocolVersion::Resp3,
            _ => return RespValue::error("NOPROTO unsupported protocol version"),
        };

        self.protocol_version = version;

        // The protocol layer only speaks RESP2 (spec §6 Non-goal: no RESP3
        // push/map types), so HELLO 3 negotiates the same array reply as
        // HELLO 2 rather than failing the handshake.
        RespValue::array(vec![
            RespValue::bulk_string("server"),
            RespValue::bulk_string("slotkv"),
            RespValue::bulk_string("version"),
            RespValue::bulk_string(env!("CARGO_PKG_VERSION")),
            RespValue::bulk_string("proto"),
            RespValue::integer(match self.protocol_version {
                ProtocolVersion::Resp2 => 2,
                ProtocolVersion::Resp3 => 3,
            }),
        ])
    }

    async fn write_response(&mut self, response: RespValue) -> Result<()> {
        let data = response.serialize();

        // Record bytes sent
        if let Some(ref metrics) = self.metrics {
            metrics.connections.record_bytes_sent(data.len() as u64);
        }

        let stream = self
            .stream
            .as_mut()
            .expect("write_response called after stream was taken");
        stream.write_all(&data).await?;
        stream.flush().await?;
        Ok(())
    }
}

/// Extract `(COMMAND, args)` from a parsed RESP value, uppercasing the
/// command name. Returns `None` for anything that isn't a non-empty array
/// of bulk strings led by a bulk-string command name.
fn extract_command(value: &RespValue) -> Option<(String, Vec<Bytes>)> {
    let RespValue::Array(Some(arr)) = value else {
        return None;
    };
    let (head, rest) = arr.split_first()?;
    let RespValue::BulkString(Some(cmd)) = head else {
        return None;
    };
    let command_upper = String::from_utf8_lossy(cmd).to_uppercase();
    let args = rest
        .iter()
        .filter_map(|v| match v {
            RespValue::BulkString(Some(b)) => Some(b.clone()),
            _ => None,
        })
        .collect();
    Some((command_upper, args))
}

fn is_replicaof_no_one(args: &[Bytes]) -> bool {
    args.len() == 2 && args[0].eq_ignore_ascii_case(b"no") && args[1].eq_ignore_ascii_case(b"one")
}
