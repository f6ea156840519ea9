use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tracing::debug;
use trust_dns_resolver::{
    Resolver,
    config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
};

use super::{MxError, MxRecord};

/// Where and how MX queries are sent.
///
/// Lookups never consult the system resolver configuration: every query goes
/// to one pinned endpoint over UDP, bounded by `timeout` per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxLookupOptions {
    pub nameserver: IpAddr,
    pub port: u16,
    pub timeout: Duration,
    pub attempts: usize,
}

impl Default for MxLookupOptions {
    fn default() -> Self {
        Self {
            nameserver: IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
            port: 53,
            timeout: Duration::from_secs(5),
            attempts: 2,
        }
    }
}

/// Lookup MX records for `domain` with [`MxLookupOptions::default`].
pub fn lookup_mx(domain: &str) -> Result<Vec<MxRecord>, MxError> {
    lookup_mx_with_options(domain, &MxLookupOptions::default())
}

/// Lookup MX records for `domain`.
///
/// The domain is normalized via IDNA before querying DNS. Records come back
/// sorted by ascending preference and deduplicated. An empty vector is not an
/// error: the domain exists but advertises no usable mail exchanger (no MX
/// records at all, or only a null MX). A nonexistent domain is an error.
pub fn lookup_mx_with_options(
    domain: &str,
    options: &MxLookupOptions,
) -> Result<Vec<MxRecord>, MxError> {
    let ascii = normalize_domain(domain)?;
    let resolver = build_resolver(options)?;
    resolve_with(&resolver, &ascii)
}

fn build_resolver(options: &MxLookupOptions) -> Result<Resolver, MxError> {
    let mut config = ResolverConfig::new();
    config.add_name_server(NameServerConfig::new(
        SocketAddr::new(options.nameserver, options.port),
        Protocol::Udp,
    ));

    let mut opts = ResolverOpts::default();
    opts.timeout = options.timeout;
    opts.attempts = options.attempts;

    Resolver::new(config, opts).map_err(MxError::resolver_init)
}

pub(crate) fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Result<Vec<MxRecord>, MxError>
where
    R: LookupMx,
{
    let mut records = resolver
        .lookup_mx(ascii_domain)
        .map_err(|source| MxError::resolution_failed(ascii_domain, source))?;

    records.sort();
    records.dedup();
    // A null MX (RFC 7505) normalizes to an empty exchange: the domain is
    // declaring that it accepts no mail.
    records.retain(|record| !record.exchange.is_empty());

    debug!("resolved {} mx record(s) for {}", records.len(), ascii_domain);
    Ok(records)
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, MxError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(MxError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(MxError::idna)
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

pub(crate) trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => lookup,
            Err(err) if is_nodata(&err) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

/// NODATA (the domain exists but holds no MX records) maps to the empty
/// record set. NXDOMAIN does not: a nonexistent domain stays a failure.
fn is_nodata(err: &ResolveError) -> bool {
    matches!(
        err.kind(),
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code != ResponseCode::NXDomain
    )
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        (self.on_lookup)(domain)
    }
}
