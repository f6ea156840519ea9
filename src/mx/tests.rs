use super::{MxError, MxRecord, resolver};
use trust_dns_resolver::error::ResolveError;

type LookupResult = Result<Vec<MxRecord>, ResolveError>;
type LookupFn = dyn Fn(&str) -> LookupResult;

pub(crate) struct StubResolver {
    pub on_lookup: Box<LookupFn>,
}

impl StubResolver {
    fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> LookupResult + 'static,
    {
        Self {
            on_lookup: Box::new(f),
        }
    }
}

#[test]
fn normalize_domain_rejects_empty() {
    let err = resolver::normalize_domain("   ").expect_err("empty domain should fail");
    assert!(matches!(err, MxError::EmptyDomain));
}

#[test]
fn normalize_domain_converts_idn() {
    let ascii = resolver::normalize_domain("bücher.example").expect("conversion succeeds");
    assert_eq!(ascii, "xn--bcher-kva.example");
}

#[test]
fn resolve_with_sorts_and_dedups_records() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(vec![
            MxRecord::new(20, "mx2.example.com"),
            MxRecord::new(10, "mx1.example.com"),
            MxRecord::new(10, "mx1.example.com"),
            MxRecord::new(30, "mx3.example.com"),
        ])
    });

    let records = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].preference, 10);
    assert_eq!(records[0].exchange, "mx1.example.com");
    assert_eq!(records[2].preference, 30);
}

#[test]
fn resolve_with_returns_empty_list_when_no_records() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(Vec::new())
    });

    let records = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    assert!(records.is_empty());
}

#[test]
fn resolve_with_discards_null_mx() {
    // "." normalizes to "", the RFC 7505 no-mail marker.
    let stub = StubResolver::new(|_| Ok(vec![MxRecord::new(0, "")]));

    let records = resolver::resolve_with(&stub, "nomail.example").expect("lookup succeeds");
    assert!(records.is_empty());
}

#[test]
fn resolve_with_wraps_lookup_failure() {
    let stub = StubResolver::new(|_| Err(ResolveError::from("connection refused")));

    let err = resolver::resolve_with(&stub, "example.com").expect_err("lookup should fail");
    match err {
        MxError::ResolutionFailed { domain, .. } => assert_eq!(domain, "example.com"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");

    let root = resolver::normalize_exchange(".".to_string());
    assert_eq!(root, "");
}

#[test]
#[ignore = "requires outbound DNS to 1.1.1.1"]
fn lookup_mx_resolves_real_domain() {
    let records = super::lookup_mx("gmail.com").expect("lookup succeeds");
    assert!(!records.is_empty());
}
