use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::packet::{Packet, read_packet, write_packet};
use crate::{
    client::RconClient,
    common::{PacketType, SENTINEL_ID},
    connector::Connector,
    errors::RconError,
};

/// Runs `fut` until it finishes, `limit` elapses, or `cancel` fires.
/// A zero `limit` means no time limit.
pub(crate) async fn guarded<F, T>(
    cancel: &CancellationToken,
    limit: Duration,
    fut: F,
) -> Result<T, RconError>
where
    F: Future<Output = Result<T, RconError>>,
{
    let bounded = async {
        if limit.is_zero() {
            fut.await
        } else {
            match timeout(limit, fut).await {
                Ok(res) => res,
                Err(_) => Err(RconError::Timeout),
            }
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RconError::Cancelled),
        res = bounded => res,
    }
}

impl<C: Connector> RconClient<C> {
    /// Writes one frame carrying `body` with the sentinel id.
    /// Any failure drops the transport, so a broken stream is never reused.
    pub(crate) async fn send(&mut self, packet_type: PacketType, body: &[u8]) -> Result<(), RconError> {
        let cancel = self.cancel.clone();
        let limit = self.client_config.io_timeout;
        let stream = self.stream.as_mut().ok_or(RconError::NotConnected)?;

        let res = guarded(&cancel, limit, write_packet(stream, SENTINEL_ID, packet_type, body)).await;
        match res {
            Ok(()) => log::debug!("Sent {:?} packet with id: {:?}", packet_type, SENTINEL_ID),
            Err(ref e) => {
                log::debug!("Failed to send {:?} packet: {}", packet_type, e);
                self.close();
            }
        }
        res
    }

    /// Reads exactly one frame. Any failure drops the transport.
    pub(crate) async fn receive(&mut self) -> Result<Packet, RconError> {
        let cancel = self.cancel.clone();
        let limit = self.client_config.io_timeout;
        let stream = self.stream.as_mut().ok_or(RconError::NotConnected)?;

        log::debug!("Waiting for packet...");
        let res = guarded(&cancel, limit, read_packet(stream)).await;
        match res {
            Ok(ref packet) => log::debug!("Received packet: {:?}", packet),
            Err(ref e) => {
                log::debug!("Failed to receive packet: {}", e);
                self.close();
            }
        }
        res
    }

    /// Sleeps between retry attempts, waking early on cancellation.
    pub(crate) async fn pause(&self, delay: Duration) -> Result<(), RconError> {
        if delay.is_zero() {
            return Ok(());
        }
        log::debug!("Waiting {:?} before next attempt", delay);
        guarded(&self.cancel, Duration::ZERO, async {
            sleep(delay).await;
            Ok(())
        })
        .await
    }
}
