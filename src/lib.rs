#![forbid(unsafe_code)]
//! mailprobe_lib — SMTP mailbox deliverability probing (MX lookup + envelope walk)

pub mod address;
pub use address::{MalformedAddress, extract_domain, split_address};

pub mod mx;
pub use mx::{MxError, MxLookupOptions, MxRecord, lookup_mx, lookup_mx_with_options};

pub mod probe;
pub use probe::{
    CommandFailure, ProbeError, ProbeOptions, ProbeReport, SessionError, SmtpReply, Verdict,
    check_mailbox, check_mailbox_with_options,
};
