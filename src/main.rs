use slotkv::config::{LogFormat, ServerConfig};
use slotkv::storage::StorageAdapter;
use slotkv::Server;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let first = args.next();

    let (config_path, addr_override) = match first {
        Some(ref arg) if arg.ends_with(".toml") => (Some(arg.clone()), args.next()),
        other => (None, other),
    };

    let mut config = match &config_path {
        Some(path) => ServerConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("failed to load config {}: {}", path, e);
            std::process::exit(1);
        }),
        None => ServerConfig::default(),
    };
    if let Some(addr) = addr_override {
        config.bind_addr = addr;
    }

    let filter = format!("slotkv={},tower=info", config.log_level);
    let subscriber = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }

    let storage = StorageAdapter::new();
    if config.persistence.enable_rdb && config.persistence.rdb_path.exists() {
        match slotkv::persistence::load_stored_value_rdb(&config.persistence.rdb_path, &storage) {
            Ok(()) => info!("loaded RDB snapshot from {:?}", config.persistence.rdb_path),
            Err(e) => warn!("failed to load RDB snapshot: {}", e),
        }
    }

    let server = Server::with_persistence(
        config.bind_addr.clone(),
        storage,
        config.backlog_capacity,
        config.persistence.clone(),
    );
    info!("starting slotkv on {}", config.bind_addr);

    if let Err(e) = server.run().await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
