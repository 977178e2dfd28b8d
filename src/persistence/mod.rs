pub mod aof;
pub mod config;
pub mod rdb;

pub use aof::{load_aof, AofReader, AofWriter};
pub use config::{AofSyncPolicy, PersistenceConfig};
pub use rdb::{load_stored_value_rdb, save_stored_value_rdb};
