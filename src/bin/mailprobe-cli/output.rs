#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use mailprobe_lib::Verdict;

use crate::args::Cli;
use crate::run::CheckRow;

pub fn write_reports(rows: &[CheckRow], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

/// Exit codes: 0 all checks completed, 2 at least one address refuted,
/// 1 at least one check failed outright. Failures dominate refutations.
pub fn exit_code(rows: &[CheckRow]) -> i32 {
    if rows.iter().any(|row| row.error.is_some()) {
        1
    } else if rows.iter().any(CheckRow::refuted) {
        2
    } else {
        0
    }
}

fn write_human(rows: &[CheckRow]) -> Result<()> {
    for row in rows {
        println!("{}", human_line(row));
    }
    Ok(())
}

fn human_line(row: &CheckRow) -> String {
    if let Some(report) = &row.report {
        let label = match report.verdict {
            Verdict::Valid => "[OK]",
            Verdict::Invalid => "[INVALID]",
            Verdict::Blocked => "[BLOCKED]",
            Verdict::Indeterminate => "[UNKNOWN]",
        };
        let mut line = format!(
            "{:<9} {} ({} via {})",
            label, row.address, report.code, report.server
        );
        if report.verdict != Verdict::Valid {
            if let Some(reason) = &report.reason {
                line.push_str(" :: ");
                line.push_str(reason);
            }
        }
        line
    } else if row.no_mail_servers {
        format!(
            "{:<9} {} :: domain has no mail servers",
            "[NO-MX]", row.address
        )
    } else {
        let error = row.error.as_deref().unwrap_or("unknown failure");
        format!("{:<9} {} :: {}", "[ERROR]", row.address, error)
    }
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[CheckRow], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[CheckRow], _: &Cli) -> Result<()> {
    bail!("format=json requires the 'with-serde' feature")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[CheckRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[CheckRow], _: &Cli) -> Result<()> {
    bail!("format=ndjson requires the 'with-serde' feature")
}

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[CheckRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[CheckRow], _: &Cli) -> Result<()> {
    bail!("format=csv requires the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &CheckRow) -> Vec<String> {
    let (status, code, server, detail) = if let Some(report) = &row.report {
        (
            report.verdict.to_string(),
            report.code.to_string(),
            report.server.clone(),
            report.reason.clone().unwrap_or_default(),
        )
    } else if row.no_mail_servers {
        (
            "no_mx".to_string(),
            String::new(),
            String::new(),
            String::new(),
        )
    } else {
        (
            "error".to_string(),
            String::new(),
            String::new(),
            row.error.clone().unwrap_or_default(),
        )
    };
    vec![row.address.clone(), status, code, server, detail]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprobe_lib::ProbeReport;

    fn report_row(address: &str, verdict: Verdict, code: u16, reason: Option<&str>) -> CheckRow {
        CheckRow {
            address: address.to_string(),
            report: Some(ProbeReport {
                server: "mx1.example.com".to_string(),
                code,
                verdict,
                reason: reason.map(str::to_string),
            }),
            error: None,
            no_mail_servers: false,
        }
    }

    fn error_row(address: &str, error: &str) -> CheckRow {
        CheckRow {
            address: address.to_string(),
            report: None,
            error: Some(error.to_string()),
            no_mail_servers: false,
        }
    }

    fn no_mx_row(address: &str) -> CheckRow {
        CheckRow {
            address: address.to_string(),
            report: None,
            error: None,
            no_mail_servers: true,
        }
    }

    #[test]
    fn human_lines_cover_every_outcome() {
        insta::assert_snapshot!(
            human_line(&report_row("user@example.com", Verdict::Valid, 250, Some("2.1.5 Ok"))),
            @"[OK]      user@example.com (250 via mx1.example.com)"
        );
        insta::assert_snapshot!(
            human_line(&report_row("ghost@example.com", Verdict::Invalid, 550, Some("5.1.1 user unknown"))),
            @"[INVALID] ghost@example.com (550 via mx1.example.com) :: 5.1.1 user unknown"
        );
        insta::assert_snapshot!(
            human_line(&report_row("user@corp.example", Verdict::Blocked, 554, None)),
            @"[BLOCKED] user@corp.example (554 via mx1.example.com)"
        );
        insta::assert_snapshot!(
            human_line(&report_row("odd@example.com", Verdict::Indeterminate, 252, Some("2.0.0 try delivery"))),
            @"[UNKNOWN] odd@example.com (252 via mx1.example.com) :: 2.0.0 try delivery"
        );
        insta::assert_snapshot!(
            human_line(&no_mx_row("nobody@parked.example")),
            @"[NO-MX]   nobody@parked.example :: domain has no mail servers"
        );
        insta::assert_snapshot!(
            human_line(&error_row("user@dead.example", "domain is empty")),
            @"[ERROR]   user@dead.example :: domain is empty"
        );
    }

    #[test]
    fn exit_code_precedence() {
        let ok = report_row("a@example.com", Verdict::Valid, 250, None);
        let unknown = report_row("b@example.com", Verdict::Indeterminate, 252, None);
        let refuted = report_row("c@example.com", Verdict::Invalid, 550, None);
        let failed = error_row("d@example.com", "no working mail server");
        let silent = no_mx_row("e@parked.example");

        assert_eq!(exit_code(&[ok.clone(), unknown, silent]), 0);
        assert_eq!(exit_code(&[ok, refuted.clone()]), 2);
        assert_eq!(exit_code(&[refuted, failed]), 1);
        assert_eq!(exit_code(&[]), 0);
    }

    #[cfg(feature = "with-csv")]
    #[test]
    fn csv_record_flattens_outcomes() {
        let record = csv_record(&report_row(
            "user@example.com",
            Verdict::Valid,
            250,
            Some("Ok"),
        ));
        assert_eq!(
            record,
            vec!["user@example.com", "valid", "250", "mx1.example.com", "Ok"]
        );

        let record = csv_record(&no_mx_row("x@parked.example"));
        assert_eq!(record, vec!["x@parked.example", "no_mx", "", "", ""]);
    }
}
