use tracing::{error, info, warn};

use mailprobe_lib::{
    MxError, MxRecord, ProbeError, ProbeReport, Verdict, check_mailbox_with_options,
    extract_domain, lookup_mx_with_options,
};

use crate::args::Cli;

/// One output row per checked address. At most one of `report`, `error` and
/// `no_mail_servers` is populated.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct CheckRow {
    pub address: String,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub report: Option<ProbeReport>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
    pub no_mail_servers: bool,
}

impl CheckRow {
    fn from_report(address: &str, report: ProbeReport) -> Self {
        Self {
            address: address.to_string(),
            report: Some(report),
            error: None,
            no_mail_servers: false,
        }
    }

    fn from_error(address: &str, error: impl Into<String>) -> Self {
        Self {
            address: address.to_string(),
            report: None,
            error: Some(error.into()),
            no_mail_servers: false,
        }
    }

    fn without_mail_servers(address: &str) -> Self {
        Self {
            address: address.to_string(),
            report: None,
            error: None,
            no_mail_servers: true,
        }
    }

    /// True when a server answered and the answer refutes the address.
    pub fn refuted(&self) -> bool {
        matches!(
            self.report.as_ref().map(|report| report.verdict),
            Some(Verdict::Invalid | Verdict::Blocked)
        )
    }
}

pub fn check_address(address: &str, cli: &Cli) -> CheckRow {
    check_address_with(
        address,
        |domain| lookup_mx_with_options(domain, &cli.mx_options()),
        |address, servers| check_mailbox_with_options(address, servers, &cli.probe_options()),
    )
}

fn check_address_with<R, P>(address: &str, resolve: R, probe: P) -> CheckRow
where
    R: FnOnce(&str) -> Result<Vec<MxRecord>, MxError>,
    P: FnOnce(&str, &[MxRecord]) -> Result<ProbeReport, ProbeError>,
{
    let domain = match extract_domain(address) {
        Ok(domain) => domain,
        Err(err) => {
            error!("{err}");
            return CheckRow::from_error(address, err.to_string());
        }
    };

    let servers = match resolve(domain) {
        Ok(servers) => servers,
        Err(err) => {
            error!("could not resolve mail servers for {address}: {err}");
            return CheckRow::from_error(address, err.to_string());
        }
    };

    if servers.is_empty() {
        info!("no mail servers found for {address}");
        return CheckRow::without_mail_servers(address);
    }

    match probe(address, &servers) {
        Ok(report) => {
            info!(
                "{address}: {} ({} via {})",
                report.verdict, report.code, report.server
            );
            CheckRow::from_report(address, report)
        }
        Err(err) => {
            warn!("could not verify {address}: {err}");
            CheckRow::from_error(address, err.to_string())
        }
    }
}
