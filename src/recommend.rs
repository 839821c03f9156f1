//! Recommendation rules
//!
//! [`recommend`] is a pure function of the result sequence. Every rule looks at
//! the whole sequence on its own, several can fire, and they are always emitted
//! in the order they appear here.

use crate::{
    config::{AuthMethod, Variant},
    probes::driver::sql_server_alternatives,
    report::{Check, CheckResult, FailureKind, Outcome},
};
use std::collections::BTreeSet;

struct Cell<'a> {
    auth: AuthMethod,
    timeout_secs: u64,
    variant: &'a Variant,
    database: &'a str,
    outcome: Outcome,
}

struct Facts<'a> {
    reachability: Option<(&'a str, Outcome)>,
    port: Option<(&'a str, u16, Outcome)>,
    driver: Option<(&'a str, &'a [String], Outcome)>,
    matrix: Vec<Cell<'a>>,
    variants: Vec<Cell<'a>>,
    any_failure: bool,
}

impl<'a> Facts<'a> {
    fn gather(results: &'a [CheckResult]) -> Self {
        let mut facts = Self {
            reachability: None,
            port: None,
            driver: None,
            matrix: Vec::new(),
            variants: Vec::new(),
            any_failure: false,
        };

        for result in results {
            facts.any_failure |= result.outcome.failure().is_some();
            match &result.check {
                Check::Reachability { host } => {
                    facts.reachability = Some((host.as_str(), result.outcome));
                }
                Check::Port { host, port } => {
                    facts.port = Some((host.as_str(), *port, result.outcome));
                }
                Check::Driver { driver, available } => {
                    facts.driver = Some((driver.as_str(), available.as_slice(), result.outcome));
                }
                Check::Connection {
                    auth,
                    timeout_secs,
                    variant,
                    database,
                } => {
                    let cell = Cell {
                        auth: *auth,
                        timeout_secs: *timeout_secs,
                        variant,
                        database: database.as_str(),
                        outcome: result.outcome,
                    };
                    if *variant == Variant::Standard {
                        facts.matrix.push(cell);
                    } else {
                        facts.variants.push(cell);
                    }
                }
            }
        }
        facts
    }

    fn attempted_matrix(&self) -> impl Iterator<Item = &Cell<'a>> {
        self.matrix.iter().filter(|c| c.outcome.was_attempted())
    }

    fn variant_passed(&self, wanted: fn(&Variant) -> bool) -> Option<&Cell<'a>> {
        self.variants
            .iter()
            .find(|c| wanted(c.variant) && c.outcome.is_pass())
    }

    fn port_passed(&self) -> bool {
        self.port.is_some_and(|(_, _, outcome)| outcome.is_pass())
    }
}

/// Derive human readable recommendations from the check results
#[must_use]
pub fn recommend(results: &[CheckResult]) -> Vec<String> {
    let facts = Facts::gather(results);
    let mut out = Vec::new();

    network(&facts, &mut out);
    port(&facts, &mut out);
    driver(&facts, &mut out);
    credentials(&facts, &mut out);
    timeouts(&facts, &mut out);
    variants(&facts, &mut out);

    if out.is_empty() {
        if facts.any_failure {
            out.push(
                "Review the client library errors above, check the connection string parameters \
                 and the server's connection settings."
                    .to_string(),
            );
        } else {
            out.push("No connectivity problems detected.".to_string());
        }
    }
    out
}

fn network(facts: &Facts, out: &mut Vec<String>) {
    let Some((host, outcome)) = facts.reachability else {
        return;
    };
    match outcome {
        Outcome::Fail(FailureKind::NetworkUnreachable) if !facts.port_passed() => {
            out.push(format!(
                "Verify the server hostname/IP address '{host}' and the network route to it; \
                 make sure no firewall blocks traffic to the server."
            ));
        }
        Outcome::Indeterminate
            if matches!(
                facts.port,
                Some((_, _, Outcome::Fail(FailureKind::PortTimedOut)))
            ) =>
        {
            out.push(format!(
                "Reachability of '{host}' could not be confirmed (ping may be blocked by policy); \
                 confirm the server is up through another path."
            ));
        }
        _ => {}
    }
}

fn port(facts: &Facts, out: &mut Vec<String>) {
    match facts.port {
        Some((_, port, Outcome::Fail(FailureKind::PortRefused))) => out.push(format!(
            "Verify SQL Server is running and listening on port {port}: enable the TCP/IP \
             protocol in SQL Server Configuration Manager and allow remote connections."
        )),
        Some((host, port, Outcome::Fail(FailureKind::PortTimedOut))) => out.push(format!(
            "Check firewall rules between this machine and {host}:{port}; the connection \
             attempt timed out, which usually means packets are being dropped."
        )),
        _ => {}
    }
}

fn driver(facts: &Facts, out: &mut Vec<String>) {
    match facts.driver {
        Some((driver, available, Outcome::Fail(FailureKind::DriverMissing))) => {
            let alternatives = sql_server_alternatives(available);
            if alternatives.is_empty() {
                out.push(format!("Install the ODBC driver '{driver}'."));
            } else {
                out.push(format!(
                    "Install the ODBC driver '{driver}', or use one of the installed SQL Server drivers: {}.",
                    alternatives.join(", ")
                ));
            }
        }
        Some((_, _, Outcome::Fail(_))) => out.push(
            "Install an ODBC driver manager (unixODBC or iODBC on Linux/macOS) and make sure \
             this tool was built with ODBC support."
                .to_string(),
        ),
        _ => {}
    }
}

fn credentials(facts: &Facts, out: &mut Vec<String>) {
    // a successful login against master proves the SQL credentials
    let master_passed = facts
        .variant_passed(|v| *v == Variant::SystemDatabase)
        .is_some();

    let mut methods: Vec<AuthMethod> = Vec::new();
    for cell in &facts.matrix {
        if !methods.contains(&cell.auth) {
            methods.push(cell.auth);
        }
    }

    for auth in methods {
        let mut attempted = facts.attempted_matrix().filter(|c| c.auth == auth).peekable();
        if attempted.peek().is_none() {
            continue;
        }
        let all_auth = attempted
            .all(|c| c.outcome == Outcome::Fail(FailureKind::AuthenticationFailed));
        if !all_auth {
            continue;
        }
        match auth {
            AuthMethod::SqlLogin if !master_passed => out.push(
                "Verify the username and password, that SQL Server accepts SQL Server \
                 authentication (mixed mode), and that the login may access the server."
                    .to_string(),
            ),
            AuthMethod::SqlLogin => {}
            AuthMethod::Trusted => out.push(
                "Integrated authentication was rejected: make sure the account running this \
                 tool has a login on the server and Kerberos/Active Directory is configured \
                 on this machine."
                    .to_string(),
            ),
        }
    }
}

fn timeouts(facts: &Facts, out: &mut Vec<String>) {
    let attempted: Vec<&Cell> = facts.attempted_matrix().collect();
    if attempted.is_empty() {
        return;
    }

    let smallest_success = attempted
        .iter()
        .filter(|c| c.outcome.is_pass())
        .map(|c| c.timeout_secs)
        .min();

    match smallest_success {
        Some(success) => {
            let timed_out: BTreeSet<u64> = attempted
                .iter()
                .filter(|c| {
                    c.outcome == Outcome::Fail(FailureKind::ConnectionTimedOut)
                        && c.timeout_secs < success
                })
                .map(|c| c.timeout_secs)
                .collect();
            if !timed_out.is_empty() {
                let list = timed_out
                    .iter()
                    .map(|t| format!("{t}s"))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push(format!(
                    "Connections timed out at {list} but succeeded at {success}s: increase the \
                     connection timeout in your application to at least {success}s and check \
                     server load and network latency."
                ));
            }
        }
        None => {
            let all_timed_out = attempted
                .iter()
                .all(|c| c.outcome == Outcome::Fail(FailureKind::ConnectionTimedOut));
            if all_timed_out {
                let longest = attempted.iter().map(|c| c.timeout_secs).max().unwrap_or_default();
                out.push(format!(
                    "Every connection attempt timed out, even at {longest}s: increase the \
                     timeout, check network latency, and review the SQL Server logs for \
                     resource pressure or blocking."
                ));
            }
        }
    }
}

fn variants(facts: &Facts, out: &mut Vec<String>) {
    let matrix_passed = facts.matrix.iter().any(|c| c.outcome.is_pass());

    if facts
        .variant_passed(|v| *v == Variant::SystemDatabase)
        .is_some()
    {
        let failed = facts.matrix.iter().find(|c| {
            c.auth == AuthMethod::SqlLogin
                && matches!(c.outcome, Outcome::Fail(kind) if kind != FailureKind::ConnectionTimedOut)
        });
        if let Some(cell) = failed {
            out.push(format!(
                "The login works against 'master' but not against '{}': check that the database \
                 exists and the login is mapped to a user in it.",
                cell.database
            ));
        }
    }

    if matrix_passed {
        return;
    }

    if facts.variant_passed(|v| *v == Variant::NoPort).is_some() {
        out.push(
            "The server answered when no port was given: it may be a named instance on a \
             dynamic port, so connect by instance name or pin the instance to a fixed port."
                .to_string(),
        );
    }

    if let Some(cell) = facts.variant_passed(|v| matches!(v, Variant::Instance(_))) {
        out.push(format!(
            "The server answered through the {}: use the instance name in your connection string.",
            cell.variant
        ));
    }
}
