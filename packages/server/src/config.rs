//! Command line / environment configuration.

use std::time::Duration;

use clap::Parser;

use crate::infrastructure::hub::{
    ConnectionConfig, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_PONG_WAIT, DEFAULT_SEND_QUEUE_CAPACITY,
    DEFAULT_WRITE_WAIT,
};

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "agora-server")]
#[command(about = "Live debate room hub over WebSocket", long_about = None)]
pub struct ServerArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "AGORA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "AGORA_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Seconds of inbound silence before a connection is dropped
    #[arg(long, env = "AGORA_PONG_WAIT_SECS", default_value_t = DEFAULT_PONG_WAIT.as_secs())]
    pub pong_wait_secs: u64,

    /// Upper bound in seconds for a single socket flush
    #[arg(long, env = "AGORA_WRITE_WAIT_SECS", default_value_t = DEFAULT_WRITE_WAIT.as_secs())]
    pub write_wait_secs: u64,

    /// Messages buffered per connection before it is evicted
    #[arg(long, env = "AGORA_SEND_QUEUE_CAPACITY", default_value_t = DEFAULT_SEND_QUEUE_CAPACITY)]
    pub send_queue_capacity: usize,

    /// Maximum inbound message size in bytes
    #[arg(long, env = "AGORA_MAX_MESSAGE_SIZE", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub connection: ConnectionConfig,
}

impl ServerArgs {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            connection: ConnectionConfig::new(
                Duration::from_secs(self.pong_wait_secs),
                Duration::from_secs(self.write_wait_secs),
                self.send_queue_capacity,
                self.max_message_size,
            ),
        }
    }
}
