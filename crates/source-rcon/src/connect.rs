use std::io;

use crate::client_io::guarded;
use crate::{
    client::RconClient,
    common::{PacketType, SENTINEL_ID},
    connector::Connector,
    errors::{AuthFailure, RconError},
};

/// Frames tolerated ahead of the auth response before giving up on the server.
const MAX_SKIPPED_AUTH_FRAMES: usize = 8;

impl<C: Connector> RconClient<C> {
    /// Opens a fresh transport, replacing any existing one, and authenticates when a
    /// password is configured. Succeeds only if both steps succeed.
    ///
    /// Connection and authentication failures are returned as-is, never retried here.
    pub async fn connect(&mut self) -> Result<(), RconError> {
        self.close();

        let address = self.client_config.socket_address();
        log::debug!("Connecting to {}...", address);

        let opened = guarded(&self.cancel, self.client_config.connect_timeout, async {
            self.connector
                .connect(&self.client_config.address, self.client_config.port)
                .await
                .map_err(|source| RconError::Connection {
                    address: address.clone(),
                    source,
                })
        })
        .await;

        let stream = match opened {
            Ok(stream) => stream,
            Err(RconError::Timeout) => {
                return Err(RconError::Connection {
                    address,
                    source: io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
                });
            }
            Err(e) => return Err(e),
        };

        self.stream = Some(stream);
        log::info!("Connected to {}", address);

        if self.client_config.requires_auth() {
            if let Err(e) = self.authenticate().await {
                self.close();
                return Err(e);
            }
        }

        Ok(())
    }

    /// Runs the auth round trip on the current transport.
    ///
    /// Source servers send an empty response value ahead of the auth response, so
    /// frames are read until one carries the auth response type. Its id must echo the
    /// request id; anything else (usually `-1`) means the password was rejected.
    pub async fn authenticate(&mut self) -> Result<(), RconError> {
        log::debug!("Starting authentication...");
        if !self.is_connected() {
            return Err(RconError::NotConnected);
        }

        let password = self.client_config.password.clone();
        self.send(PacketType::Auth, password.as_bytes())
            .await
            .map_err(auth_interrupted)?;

        let mut skipped = 0;
        loop {
            let packet = self.receive().await.map_err(auth_interrupted)?;
            if packet.packet_type(true) != Some(PacketType::AuthResponse) {
                skipped += 1;
                if skipped > MAX_SKIPPED_AUTH_FRAMES {
                    self.close();
                    return Err(RconError::Auth(AuthFailure::NoResponse(format!(
                        "{} frames arrived without an auth response",
                        skipped
                    ))));
                }
                log::debug!("Received non-auth response packet while waiting for auth response, ignoring: {:?}", packet);
                continue;
            }

            if packet.id != SENTINEL_ID {
                log::warn!("Server rejected the password (reply id {})", packet.id);
                return Err(RconError::Auth(AuthFailure::Rejected {
                    received_id: packet.id,
                }));
            }

            log::info!("Authenticated");
            return Ok(());
        }
    }
}

/// Transport trouble during auth is an auth failure; a corrupt frame or a
/// cancellation keeps its own kind.
fn auth_interrupted(err: RconError) -> RconError {
    match err {
        RconError::Framing(_) | RconError::Cancelled | RconError::NotConnected => err,
        other => RconError::Auth(AuthFailure::NoResponse(other.to_string())),
    }
}
