use tokio_util::sync::CancellationToken;

use crate::RconClientConfig;
use crate::connector::{Connector, TcpConnector};

/// A single RCON session.
///
/// The client owns at most one transport. Every operation takes `&mut self`, so one
/// request is in flight at a time; callers sharing a client must serialize access.
pub struct RconClient<C: Connector = TcpConnector> {
    pub(crate) connector: C,
    pub(crate) stream: Option<C::Stream>,
    pub(crate) client_config: RconClientConfig,
    pub(crate) cancel: CancellationToken,
}

impl RconClient<TcpConnector> {
    pub fn new(client_config: RconClientConfig) -> Self {
        RconClient::with_connector(client_config, TcpConnector)
    }
}

impl<C: Connector> RconClient<C> {
    pub fn with_connector(client_config: RconClientConfig, connector: C) -> Self {
        RconClient {
            connector,
            stream: None,
            client_config,
            cancel: CancellationToken::new(),
        }
    }

    /// Aborts any connect, read, write or retry pause in progress once `token` is
    /// cancelled. The transport is dropped and the operation fails with `Cancelled`.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &RconClientConfig {
        &self.client_config
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Drops the transport. Does nothing when already disconnected.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            log::debug!("Closed connection to {}", self.client_config.socket_address());
        }
    }
}
