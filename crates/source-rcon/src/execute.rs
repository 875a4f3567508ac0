use crate::{
    client::RconClient,
    common::{MAX_BODY_LEN, PacketType, SENTINEL_ID},
    connector::Connector,
    errors::RconError,
};

impl<C: Connector> RconClient<C> {
    /// Runs `command` and returns the server's response text.
    ///
    /// When there is no transport, or the round trip fails, the client waits the
    /// configured retry delay, reconnects and tries again, at most `max_retries` times.
    /// A reconnect whose password is rejected ends the retries at once.
    pub async fn execute(&mut self, command: &str) -> Result<String, RconError> {
        if command.len() > MAX_BODY_LEN {
            return Err(RconError::CommandTooLong {
                len: command.len(),
                max: MAX_BODY_LEN,
            });
        }

        let max_retries = self.client_config.max_retries;
        let mut retries_remaining = max_retries;
        let mut attempts = 0;
        let mut last_error: Option<RconError> = None;

        loop {
            attempts += 1;
            log::debug!("Executing command with attempt {}/{}", attempts, max_retries.saturating_add(1));

            let failure = if self.is_connected() {
                match self.exchange(command).await {
                    Ok(response) => return Ok(response),
                    Err(RconError::Cancelled) => return Err(RconError::Cancelled),
                    Err(e) => {
                        log::warn!("Failed to execute command on attempt {}/{}. Error: {}", attempts, max_retries.saturating_add(1), e);
                        e
                    }
                }
            } else {
                last_error.take().unwrap_or(RconError::NotConnected)
            };

            if retries_remaining == 0 {
                return Err(RconError::Execution {
                    attempts,
                    source: Box::new(failure),
                });
            }
            retries_remaining -= 1;

            self.pause(self.client_config.retry_delay).await?;

            log::warn!("Attempting to reconnect client and retry command execution ({} retries left)", retries_remaining);
            match self.connect().await {
                Ok(()) => {}
                Err(RconError::Cancelled) => return Err(RconError::Cancelled),
                Err(e) if e.is_auth_rejection() => {
                    return Err(RconError::Execution {
                        attempts,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    log::warn!("Reconnect failed: {}", e);
                    last_error = Some(e);
                }
            }
        }
    }

    async fn exchange(&mut self, command: &str) -> Result<String, RconError> {
        log::debug!("Executing command: {:?}", command);
        self.send(PacketType::ExecCommand, command.as_bytes()).await?;

        let packet = self.receive().await?;
        if packet.id != SENTINEL_ID {
            log::debug!("Response id {} does not match request id {}", packet.id, SENTINEL_ID);
        }

        Ok(packet.body_text())
    }
}
