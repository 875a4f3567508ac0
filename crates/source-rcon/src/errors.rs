use thiserror::Error;

#[derive(Debug, Error)]
pub enum RconError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not connect to {address}: {source}")]
    Connection {
        address: String,
        source: std::io::Error,
    },

    #[error("authentication failed: {0}")]
    Auth(AuthFailure),

    #[error("malformed packet: {0}")]
    Framing(String),

    #[error("command failed after {attempts} attempt(s): {source}")]
    Execution {
        attempts: usize,
        source: Box<RconError>,
    },

    #[error("no connection established")]
    NotConnected,

    #[error("command is {len} bytes, the protocol allows at most {max}")]
    CommandTooLong { len: usize, max: usize },

    #[error("operation timed out")]
    Timeout,

    #[error("operation cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("wrong password (server replied with id {received_id})")]
    Rejected { received_id: i32 },

    #[error("no auth response, probably a wrong password: {0}")]
    NoResponse(String),
}

impl RconError {
    /// True when the server answered the auth request and said no.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, RconError::Auth(AuthFailure::Rejected { .. }))
    }
}
