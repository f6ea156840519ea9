use std::borrow::Cow;
use std::time::Duration;

/// Default SMTP port for plaintext sessions.
pub const SMTP_PORT: u16 = 25;

/// Implicit-TLS SMTP port. Never dialed today; declared as the extension
/// point for an encrypted transport path.
pub const SMTP_TLS_PORT: u16 = 465;

/// Controls how [`check_mailbox`](crate::probe::check_mailbox) interrogates a
/// candidate mail server.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub port: u16,
    /// Identity announced in the `EHLO`/`HELO` handshake.
    pub helo_domain: String,
    /// Envelope sender; `postmaster@<helo_domain>` when unset.
    pub mail_from: Option<String>,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: SMTP_PORT,
            helo_domain: "localhost".to_string(),
            mail_from: None,
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(5),
        }
    }
}

impl ProbeOptions {
    /// Returns the envelope sender used in the `MAIL FROM` command. When
    /// unspecified a `postmaster@<helo_domain>` placeholder is synthesised.
    pub fn mail_from(&self) -> Cow<'_, str> {
        self.mail_from
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(format!("postmaster@{}", self.helo_domain)))
    }
}
