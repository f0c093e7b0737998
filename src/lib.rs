pub mod argument;
pub mod client;
pub mod cluster;
pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod shard;

pub use argument::Argument;
pub use client::Client;
pub use cluster::{Cluster, MultiResult, ShardFailure, ShardReply};
pub use commands::{KvPair, Status};
pub use config::ClientConfig;
pub use error::Error;
pub use frame::Frame;

pub type Result<T> = std::result::Result<T, Error>;
