use std::io;

use thiserror::Error;

/// Transport-level failure on one SMTP connection.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("I/O failure on SMTP connection: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    #[error("malformed SMTP reply: {detail}")]
    MalformedReply { detail: String },
}

impl SessionError {
    pub(crate) fn connect(host: &str, port: u16, source: io::Error) -> Self {
        Self::Connect {
            host: host.to_string(),
            port,
            source,
        }
    }

    pub(crate) fn io(source: io::Error) -> Self {
        Self::Io { source }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedReply {
            detail: detail.into(),
        }
    }
}

/// Why an SMTP command did not achieve its goal: the transport broke, or the
/// server answered with a refusal.
#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("server answered {code} {message}")]
    Refused { code: u16, message: String },
}

/// Failure of a whole mailbox probe. Rejection verdicts are not errors; these
/// cover the cases where no verdict could be obtained at all.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no working mail server could be found after {attempted} attempt(s)")]
    NoUsableServer { attempted: usize },
    #[error("HELO handshake with {host} failed: {source}")]
    HandshakeFailed {
        host: String,
        #[source]
        source: CommandFailure,
    },
    #[error("sender was rejected by {host}: {source}")]
    SenderRejected {
        host: String,
        #[source]
        source: CommandFailure,
    },
    #[error("recipient probe against {host} failed: {source}")]
    ProtocolError {
        host: String,
        #[source]
        source: SessionError,
    },
}

impl ProbeError {
    pub(crate) fn handshake(host: &str, source: CommandFailure) -> Self {
        Self::HandshakeFailed {
            host: host.to_string(),
            source,
        }
    }

    pub(crate) fn sender(host: &str, source: CommandFailure) -> Self {
        Self::SenderRejected {
            host: host.to_string(),
            source,
        }
    }

    pub(crate) fn protocol(host: &str, source: SessionError) -> Self {
        Self::ProtocolError {
            host: host.to_string(),
            source,
        }
    }
}
