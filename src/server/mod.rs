pub mod connection;
pub mod monitor;

use self::connection::Connection;
use self::monitor::MonitorBroadcaster;
use crate::cluster::Cluster;
use crate::command::CommandExecutor;
use crate::error::Result;
use crate::observability::Metrics;
use crate::persistence::PersistenceConfig;
use crate::replication::ReplicationController;
use crate::storage::{KvStore, StorageEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Default capacity (bytes) of the replication backlog ring (spec §3
/// "BacklogRing ... default 1 MiB").
const DEFAULT_BACKLOG_CAPACITY: usize = 1024 * 1024;

/// SlotKv server: accepts client connections and wires each one to the
/// shared cluster registry and replication controller.
pub struct Server {
    addr: String,
    port: u16,
    storage: StorageEngine,
    metrics: Arc<Metrics>,
    cluster: Arc<Cluster>,
    replication: Arc<ReplicationController>,
    monitor: Arc<MonitorBroadcaster>,
    persistence: PersistenceConfig,
}

impl Server {
    /// Create a new server with the specified address and storage engine
    pub fn new(addr: String, storage: StorageEngine) -> Self {
        Self::with_backlog_capacity(addr, storage, DEFAULT_BACKLOG_CAPACITY)
    }

    /// Create a new server with an explicit replication backlog capacity
    /// (`ServerConfig::backlog_capacity`, spec §3).
    pub fn with_backlog_capacity(addr: String, storage: StorageEngine, backlog_capacity: usize) -> Self {
        Self::with_persistence(addr, storage, backlog_capacity, PersistenceConfig::default())
    }

    /// Create a new server with explicit replication and persistence
    /// settings (`ServerConfig::persistence`). A periodic RDB save task
    /// (spec's Supplemental Features) is spawned from `run()` using
    /// `persistence.rdb_save_interval`, mirroring Redis's `save` directive.
    pub fn with_persistence(
        addr: String,
        storage: StorageEngine,
        backlog_capacity: usize,
        persistence: PersistenceConfig,
    ) -> Self {
        // Extract port from address string using proper SocketAddr parsing
        // This handles both IPv4 (127.0.0.1:6379) and IPv6 ([::1]:6379) formats
        let port = addr
            .parse::<SocketAddr>()
            .map(|a| a.port())
            .unwrap_or_else(|_| {
                // Fallback: try to extract port from the end after last ':'
                // This handles edge cases where the string isn't a valid SocketAddr
                addr.rsplit(':')
                    .next()
                    .and_then(|p| p.trim_end_matches(']').parse().ok())
                    .unwrap_or(6379)
            });

        let cluster = Arc::new(Cluster::new(addr.clone()));
        let replication = Arc::new(ReplicationController::new(backlog_capacity));

        Self {
            addr,
            port,
            storage,
            metrics: Arc::new(Metrics::new()),
            cluster,
            replication,
            monitor: Arc::new(MonitorBroadcaster::new()),
            persistence,
        }
    }

    /// Get server metrics
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// The node's slot registry, shared across every connection (§4.3).
    pub fn cluster(&self) -> Arc<Cluster> {
        Arc::clone(&self.cluster)
    }

    /// The node's replication controller, shared across every connection
    /// (§4.5). A connection that issues `PSYNC` is promoted into a replica
    /// fan-out target of this controller.
    pub fn replication(&self) -> Arc<ReplicationController> {
        Arc::clone(&self.replication)
    }

    /// Run the server
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        info!("SlotKv server listening on {}", self.addr);

        // The applier lets a replica apply commands streamed from its
        // master without the Replication Controller depending on the
        // command layer (§4.5). It shares the same cluster/storage/
        // replication state as every client connection, so applied writes
        // observe consistent state.
        let applier_executor = Arc::new(CommandExecutor::with_cluster_and_replication(
            self.storage.clone(),
            self.port,
            Arc::clone(&self.cluster),
            Arc::clone(&self.replication),
        ));
        self.replication.set_applier(applier_executor);

        if self.persistence.enable_rdb && self.persistence.rdb_save_interval > 0 {
            let storage = self.storage.clone();
            let rdb_path = self.persistence.rdb_path.clone();
            let interval = Duration::from_secs(self.persistence.rdb_save_interval);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await; // first tick fires immediately; skip it
                loop {
                    ticker.tick().await;
                    let store: Arc<dyn KvStore> = Arc::new(storage.clone());
                    match crate::persistence::save_stored_value_rdb(&rdb_path, store.as_ref()) {
                        Ok(()) => info!("periodic RDB save wrote {:?}", rdb_path),
                        Err(e) => warn!("periodic RDB save failed: {}", e),
                    }
                }
            });
        }

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    info!("New connection from: {}", addr);

                    // Record connection metrics
                    self.metrics.connections.record_connection();

                    let executor = CommandExecutor::with_cluster_and_replication(
                        self.storage.clone(),
                        self.port,
                        Arc::clone(&self.cluster),
                        Arc::clone(&self.replication),
                    );
                    let metrics = Arc::clone(&self.metrics);
                    let replication = Arc::clone(&self.replication);
                    let store: Arc<dyn KvStore> = Arc::new(self.storage.clone());
                    let monitor = Arc::clone(&self.monitor);

                    tokio::spawn(async move {
                        let mut conn = Connection::new(
                            stream,
                            executor,
                            Some(metrics.clone()),
                            Some(monitor),
                            replication,
                            store,
                        );

                        if let Err(e) = conn.handle().await {
                            error!("Connection error: {}", e);
                        }

                        // Record disconnection
                        metrics.connections.record_disconnection();
                        info!("Connection closed: {}", addr);
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}
