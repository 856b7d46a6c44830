//! Command line / environment configuration.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

use crate::{
    domain::DEFAULT_ROOM,
    infrastructure::auth::StaticToken,
    usecase::{
        broadcast::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WRITE_TIMEOUT},
        get_history::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT},
    },
};

/// Where accepted messages are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Process memory; history is lost on restart
    Memory,
    /// SQLite file at `--db-path`
    Sqlite,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "chatrelay-server", version, about = "Room-scoped WebSocket chat relay")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Message store backend
    #[arg(long, env = "CHAT_STORE", value_enum, default_value_t = StoreBackend::Memory)]
    pub store: StoreBackend,

    /// SQLite database file (used with `--store sqlite`)
    #[arg(long, env = "DB_PATH", default_value = "./chat.db")]
    pub db_path: PathBuf,

    /// HS256 secret for verifying access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Fixed `TOKEN:USER_ID:USERNAME` entry, used when no JWT secret is set. Repeatable.
    #[arg(long = "static-token", value_name = "TOKEN:USER_ID:USERNAME")]
    pub static_tokens: Vec<StaticToken>,

    /// Room used when a client does not ask for one
    #[arg(long, env = "DEFAULT_ROOM", default_value = DEFAULT_ROOM)]
    pub default_room: String,

    /// Accepted messages that may wait for dispatch before senders block
    #[arg(long, env = "BROADCAST_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub broadcast_capacity: usize,

    /// Outgoing frames buffered per connection
    #[arg(long, env = "CLIENT_BUFFER", default_value_t = 64)]
    pub client_buffer: usize,

    /// Per-peer write deadline in milliseconds
    #[arg(
        long,
        env = "WRITE_TIMEOUT_MS",
        default_value_t = DEFAULT_WRITE_TIMEOUT.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub write_timeout_ms: u64,

    /// History size when `limit` is not given
    #[arg(long, env = "HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,

    /// Largest `limit` accepted by the history endpoint
    #[arg(long, env = "HISTORY_MAX_LIMIT", default_value_t = MAX_HISTORY_LIMIT)]
    pub history_max_limit: usize,

    /// Log level used when `RUST_LOG` is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}
