use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::error::SessionError;

/// One (possibly multiline) SMTP server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

/// Exclusive owner of the TCP connection for one probe. Dropping the session
/// closes the socket; [`SmtpSession::quit`] consumes it so a terminated
/// session cannot be reused.
pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl SmtpSession {
    /// Connect to `host:port` within `connect_timeout`, then bound every read
    /// and write by `command_timeout`. The host's addresses come from the
    /// system resolver; each one is tried in turn.
    pub(crate) fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let addrs: Vec<_> = format!("{host}:{port}")
            .to_socket_addrs()
            .map_err(|source| SessionError::connect(host, port, source))?
            .collect();

        let mut last_err = None;
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(command_timeout))
                        .map_err(SessionError::io)?;
                    stream
                        .set_write_timeout(Some(command_timeout))
                        .map_err(SessionError::io)?;
                    let reader = BufReader::new(stream.try_clone().map_err(SessionError::io)?);
                    return Ok(Self {
                        host: host.to_string(),
                        stream,
                        reader,
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(SessionError::connect(
            host,
            port,
            last_err.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::AddrNotAvailable, "no socket address resolved")
            }),
        ))
    }

    pub(crate) fn host(&self) -> &str {
        &self.host
    }

    /// Read the banner the server volunteers before any command.
    pub(crate) fn read_greeting(&mut self) -> Result<SmtpReply, SessionError> {
        self.read_reply()
    }

    /// Send one command line and read the single reply to it.
    pub(crate) fn command(&mut self, line: &str) -> Result<SmtpReply, SessionError> {
        self.send_line(line)?;
        self.read_reply()
    }

    /// Best-effort `QUIT`. All errors are discarded: termination must never
    /// mask the probe outcome.
    pub(crate) fn quit(mut self) {
        if self.send_line("QUIT").is_ok() {
            let _ = self.read_reply();
        }
    }

    fn send_line(&mut self, line: &str) -> Result<(), SessionError> {
        let mut bytes = line.as_bytes().to_vec();
        bytes.extend_from_slice(b"\r\n");
        self.stream.write_all(&bytes).map_err(SessionError::io)?;
        self.stream.flush().map_err(SessionError::io)
    }

    fn read_reply(&mut self) -> Result<SmtpReply, SessionError> {
        read_reply_from(&mut self.reader)
    }
}

/// Parse one SMTP reply, following `-` continuation lines and requiring one
/// consistent code across them.
pub(crate) fn read_reply_from<R: BufRead>(reader: &mut R) -> Result<SmtpReply, SessionError> {
    let mut code = None;
    let mut message_lines = Vec::new();
    loop {
        let mut raw = String::new();
        let bytes = reader.read_line(&mut raw).map_err(SessionError::io)?;
        if bytes == 0 {
            return Err(SessionError::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            )));
        }
        if raw.ends_with('\n') {
            raw.pop();
            if raw.ends_with('\r') {
                raw.pop();
            }
        }

        if raw.len() < 3 {
            return Err(SessionError::malformed(format!(
                "reply line too short: {raw:?}"
            )));
        }
        // get() keeps a multibyte char straddling the code boundary from
        // panicking; it parses as a bad code instead.
        let code_part = raw.get(..3).unwrap_or_default();
        let parsed_code = code_part
            .parse::<u16>()
            .map_err(|_| SessionError::malformed(format!("bad status code: {code_part:?}")))?;
        match code {
            Some(existing) if existing != parsed_code => {
                return Err(SessionError::malformed(format!(
                    "inconsistent reply codes: {existing} vs {parsed_code}"
                )));
            }
            Some(_) => {}
            None => code = Some(parsed_code),
        }
        let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
        let text_start = if raw.len() > 3 { 4 } else { 3 };
        let text = raw.get(text_start..).unwrap_or_default();
        message_lines.push(text.to_string());
        if !continuation {
            break;
        }
    }
    Ok(SmtpReply {
        code: code.ok_or_else(|| SessionError::malformed("reply missing status code"))?,
        message: message_lines.join("\n"),
    })
}
