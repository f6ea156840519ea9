//! SMTP recipient probing.
//!
//! [`check_mailbox`] drives a plaintext session with one of the domain's mail
//! exchangers through the envelope commands (`EHLO`/`HELO`, `MAIL FROM`,
//! `RCPT TO`) and interprets the recipient reply, without ever transferring a
//! message.

mod error;
mod options;
mod session;
mod verdict;

pub use error::{CommandFailure, ProbeError, SessionError};
pub use options::{ProbeOptions, SMTP_PORT, SMTP_TLS_PORT};
pub use session::SmtpReply;
pub use verdict::{ProbeReport, Verdict};

use tracing::{debug, warn};

use crate::mx::MxRecord;
use session::SmtpSession;

/// Probe `address` against `servers` with [`ProbeOptions::default`].
pub fn check_mailbox(address: &str, servers: &[MxRecord]) -> Result<ProbeReport, ProbeError> {
    check_mailbox_with_options(address, servers, &ProbeOptions::default())
}

/// Probe whether a mail server for `address` would accept it as a recipient.
///
/// `servers` is tried in order; the first exchanger that yields a live
/// session (connection established, positive greeting) is interrogated and
/// every later candidate is left untouched. The session always ends with a
/// best-effort `QUIT`, whatever the outcome.
///
/// A parsed reply to the recipient probe is a success carrying a [`Verdict`],
/// rejection codes included; an error means the probe itself could not run to
/// completion.
pub fn check_mailbox_with_options(
    address: &str,
    servers: &[MxRecord],
    options: &ProbeOptions,
) -> Result<ProbeReport, ProbeError> {
    let mut session = select_server(servers, options)?;
    let server = session.host().to_string();

    let outcome = run_envelope(&mut session, address, options);
    session.quit();

    let reply = outcome?;
    let report = ProbeReport::from_reply(server, &reply);
    if !report.verdict.is_conclusive() {
        warn!(
            "unrecognized reply code {} from {}",
            report.code, report.server
        );
    }
    Ok(report)
}

/// Walk the candidate list and return the first live session: connection
/// within the timeout and a positive greeting. Failing candidates are logged
/// and skipped; their connections close on drop.
fn select_server(servers: &[MxRecord], options: &ProbeOptions) -> Result<SmtpSession, ProbeError> {
    for record in servers {
        let mut session = match SmtpSession::connect(
            &record.exchange,
            options.port,
            options.connect_timeout,
            options.command_timeout,
        ) {
            Ok(session) => session,
            Err(err) => {
                debug!("skipping {}: {}", record.exchange, err);
                continue;
            }
        };
        match session.read_greeting() {
            Ok(greeting) if greeting.is_positive_completion() => {
                debug!("connected to {} ({})", record.exchange, greeting.code);
                return Ok(session);
            }
            Ok(greeting) => {
                warn!(
                    "{} refused the session: {} {}",
                    record.exchange, greeting.code, greeting.message
                );
            }
            Err(err) => {
                warn!(
                    "could not establish session with {}: {}",
                    record.exchange, err
                );
            }
        }
    }
    Err(ProbeError::NoUsableServer {
        attempted: servers.len(),
    })
}

/// `EHLO`, `MAIL FROM`, `RCPT TO`, in order, one reply each. Returns the raw
/// recipient reply; the caller interprets it.
fn run_envelope(
    session: &mut SmtpSession,
    address: &str,
    options: &ProbeOptions,
) -> Result<SmtpReply, ProbeError> {
    let host = session.host().to_string();

    hello(session, &options.helo_domain).map_err(|source| ProbeError::handshake(&host, source))?;

    let sender = options.mail_from();
    let reply = session
        .command(&format!("MAIL FROM:<{sender}>"))
        .map_err(|source| ProbeError::sender(&host, source.into()))?;
    if !reply.is_positive_completion() {
        return Err(ProbeError::sender(
            &host,
            CommandFailure::Refused {
                code: reply.code,
                message: reply.message,
            },
        ));
    }

    session
        .command(&format!("RCPT TO:<{address}>"))
        .map_err(|source| ProbeError::protocol(&host, source))
}

/// `EHLO` first, `HELO` when the server rejects it. Either form succeeding
/// completes the handshake.
fn hello(session: &mut SmtpSession, identity: &str) -> Result<(), CommandFailure> {
    let ehlo = session.command(&format!("EHLO {identity}"))?;
    if ehlo.is_positive_completion() {
        return Ok(());
    }
    let helo = session.command(&format!("HELO {identity}"))?;
    if helo.is_positive_completion() {
        return Ok(());
    }
    Err(CommandFailure::Refused {
        code: helo.code,
        message: helo.message,
    })
}
