//! DNS MX resolution against a pinned resolver endpoint.
//!
//! The public entry points are [`lookup_mx`] and [`lookup_mx_with_options`],
//! which perform a synchronous lookup and return the domain's mail exchangers
//! sorted by ascending preference. An empty list is a valid outcome: the
//! domain accepts no mail.

mod error;
mod resolver;
mod types;

pub use error::MxError;
pub use resolver::{MxLookupOptions, lookup_mx, lookup_mx_with_options};
pub use types::MxRecord;

#[cfg(test)]
mod tests;
