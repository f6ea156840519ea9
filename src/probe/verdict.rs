use std::fmt;

use super::session::SmtpReply;

/// Classification of the reply to a recipient probe.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 250: the server accepted the recipient.
    Valid,
    /// 550: the server does not know the mailbox.
    Invalid,
    /// 554: the server refused the transaction outright, which usually says
    /// more about the probing host's reputation than about the mailbox.
    Blocked,
    /// Any other code: the server answered but disclosed nothing usable.
    Indeterminate,
}

impl Verdict {
    /// Map a reply code to a verdict. Total: unrecognized codes land on
    /// [`Verdict::Indeterminate`].
    pub fn from_reply_code(code: u16) -> Self {
        match code {
            250 => Self::Valid,
            550 => Self::Invalid,
            554 => Self::Blocked,
            _ => Self::Indeterminate,
        }
    }

    /// True when the probe produced a definite answer about the recipient.
    pub fn is_conclusive(self) -> bool {
        !matches!(self, Self::Indeterminate)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Blocked => "blocked",
            Self::Indeterminate => "indeterminate",
        };
        f.write_str(label)
    }
}

/// Outcome of a completed probe against one mail exchanger.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Exchange host that answered the probe.
    pub server: String,
    /// Raw SMTP reply code to `RCPT TO`.
    pub code: u16,
    pub verdict: Verdict,
    /// The server's reply text, when it said anything.
    pub reason: Option<String>,
}

impl ProbeReport {
    pub(crate) fn from_reply(server: impl Into<String>, reply: &SmtpReply) -> Self {
        let reason = if reply.message.is_empty() {
            None
        } else {
            Some(reply.message.clone())
        };
        Self {
            server: server.into(),
            code: reply.code,
            verdict: Verdict::from_reply_code(reply.code),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_codes_map_to_their_verdicts() {
        assert_eq!(Verdict::from_reply_code(250), Verdict::Valid);
        assert_eq!(Verdict::from_reply_code(550), Verdict::Invalid);
        assert_eq!(Verdict::from_reply_code(554), Verdict::Blocked);
        assert_eq!(Verdict::from_reply_code(451), Verdict::Indeterminate);
    }

    #[test]
    fn report_keeps_reply_text_as_reason() {
        let reply = SmtpReply {
            code: 550,
            message: "5.1.1 user unknown".to_string(),
        };
        let report = ProbeReport::from_reply("mx1.example.com", &reply);
        assert_eq!(report.verdict, Verdict::Invalid);
        assert_eq!(report.code, 550);
        assert_eq!(report.reason.as_deref(), Some("5.1.1 user unknown"));
        assert!(report.verdict.is_conclusive());
    }

    #[test]
    fn report_drops_empty_reply_text() {
        let reply = SmtpReply {
            code: 250,
            message: String::new(),
        };
        let report = ProbeReport::from_reply("mx1.example.com", &reply);
        assert_eq!(report.reason, None);
    }

    #[test]
    fn verdict_displays_lowercase() {
        assert_eq!(Verdict::Valid.to_string(), "valid");
        assert_eq!(Verdict::Indeterminate.to_string(), "indeterminate");
    }

    proptest! {
        #[test]
        fn verdict_is_total_over_reply_codes(code in 100u16..=999) {
            let verdict = Verdict::from_reply_code(code);
            match code {
                250 => prop_assert_eq!(verdict, Verdict::Valid),
                550 => prop_assert_eq!(verdict, Verdict::Invalid),
                554 => prop_assert_eq!(verdict, Verdict::Blocked),
                _ => prop_assert_eq!(verdict, Verdict::Indeterminate),
            }
        }
    }
}
