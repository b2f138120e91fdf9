// Database infrastructure - backend selection, connections and schema

mod backend;
mod connection_provider;
mod db_config;
mod db_error;
mod embedded_connection;
mod remote_pool;
pub mod resilience;
pub mod schema;

pub use backend::Backend;
pub use connection_provider::{ConnectionProvider, DbConnection};
pub use db_config::{BackendSettings, DatabaseConfig, PoolSettings, RemoteSettings};
pub use db_error::DatabaseError;
pub use embedded_connection::EmbeddedConnection;
pub use remote_pool::RemotePool;
pub use resilience::RetryPolicy;
