//! Address splitting: the minimal decomposition needed before a deliverability
//! probe. No syntax validation beyond the single `@` rule; the raw input is
//! never rewritten.

use thiserror::Error;

/// Input that cannot be decomposed into a local part and a domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed address {address:?}: expected exactly one '@'")]
pub struct MalformedAddress {
    /// The offending input, unmodified.
    pub address: String,
}

/// Split an address into `(local_part, domain)`.
///
/// Exactly one `@` is required. Either side may be empty here; an empty
/// domain is rejected later by the resolver, not by the split.
pub fn split_address(address: &str) -> Result<(&str, &str), MalformedAddress> {
    match address.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => Ok((local, domain)),
        _ => Err(MalformedAddress {
            address: address.to_string(),
        }),
    }
}

/// Return the domain portion of `address`.
pub fn extract_domain(address: &str) -> Result<&str, MalformedAddress> {
    split_address(address).map(|(_, domain)| domain)
}
