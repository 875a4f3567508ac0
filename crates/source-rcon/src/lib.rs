//! Async client for Valve's [Source RCON protocol](https://developer.valvesoftware.com/wiki/Source_RCON_Protocol).
//!
//! ```rust,no_run
//! use source_rcon::{RconClient, RconClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), source_rcon::errors::RconError> {
//!     let config = RconClientConfig::new("127.0.0.1", 27015, "password")
//!         .max_retries(3)
//!         .retry_delay_secs(1);
//!
//!     let mut client = RconClient::new(config);
//!     client.connect().await?;
//!     println!("{}", client.execute("status").await?);
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod packet;
pub mod client;
pub mod errors;
pub mod connect;
pub mod connector;
pub mod execute;
pub mod client_config;
mod client_io;

#[cfg(test)]
mod test_support;

pub use client_config::RconClientConfig;
pub use client::RconClient;
pub use common::PacketType;
pub use connector::{Connector, TcpConnector};
pub use errors::{AuthFailure, RconError};
pub use tokio_util::sync::CancellationToken;
