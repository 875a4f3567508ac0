use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{DuplexStream, duplex};
use tokio::task::JoinHandle;

use crate::common::{PacketType, SENTINEL_ID};
use crate::connector::Connector;
use crate::packet::{read_packet, write_packet};

const DUPLEX_BUF_SIZE: usize = 16384;

type Handler = Box<dyn FnOnce(DuplexStream) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// What the fake server does with one connection attempt.
pub(crate) enum Attempt {
    Refuse,
    Serve(Handler),
}

pub(crate) fn serve<F, Fut>(handler: F) -> Attempt
where
    F: FnOnce(DuplexStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Attempt::Serve(Box::new(move |stream| Box::pin(handler(stream))))
}

/// Connector backed by in-memory pipes. Each connect call consumes the next scripted
/// attempt; once the script runs out every attempt is refused.
#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    attempts: Arc<AtomicUsize>,
    script: Arc<Mutex<VecDeque<Attempt>>>,
    servers: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl MockConnector {
    pub(crate) fn new(script: Vec<Attempt>) -> Self {
        Self {
            attempts: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(Mutex::new(script.into())),
            servers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Waits for every fake server spawned so far, re-raising any assertion that
    /// failed inside one.
    pub(crate) async fn join_servers(&self) {
        let servers: Vec<JoinHandle<()>> = self.servers.lock().unwrap().drain(..).collect();
        for server in servers {
            if let Err(e) = server.await {
                match e.try_into_panic() {
                    Ok(panic) => std::panic::resume_unwind(panic),
                    Err(e) => panic!("fake server did not finish: {}", e),
                }
            }
        }
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    type Stream = DuplexStream;

    async fn connect(&self, _host: &str, _port: u16) -> io::Result<DuplexStream> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();

        match next {
            Some(Attempt::Serve(handler)) => {
                let (client, server) = duplex(DUPLEX_BUF_SIZE);
                let task = tokio::spawn(handler(server));
                self.servers.lock().unwrap().push(task);
                Ok(client)
            }
            Some(Attempt::Refuse) | None => {
                Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
            }
        }
    }
}

/// Reads the auth request, checks the password, and answers the way Source servers do:
/// an empty response value followed by the auth response.
pub(crate) async fn answer_auth(stream: &mut DuplexStream, password: &str, reply_id: i32) {
    let request = read_packet(stream).await.unwrap();
    assert_eq!(request.packet_type(false), Some(PacketType::Auth));
    assert_eq!(request.id, SENTINEL_ID);
    assert_eq!(request.body_text(), password);

    write_packet(stream, request.id, PacketType::ResponseValue, b"").await.unwrap();
    write_packet(stream, reply_id, PacketType::AuthResponse, b"").await.unwrap();
}

/// Reads one command and replies with `response`.
pub(crate) async fn answer_command(stream: &mut DuplexStream, command: &str, response: &str) {
    let request = read_packet(stream).await.unwrap();
    assert_eq!(request.packet_type(false), Some(PacketType::ExecCommand));
    assert_eq!(request.body_text(), command);

    write_packet(stream, request.id, PacketType::ResponseValue, response.as_bytes())
        .await
        .unwrap();
}

/// Reads one command and hangs up without replying.
pub(crate) async fn drop_command(mut stream: DuplexStream) {
    let _ = read_packet(&mut stream).await;
}
