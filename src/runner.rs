use crate::{
    client::DatabaseClient,
    config::{AuthMethod, Plan, TargetConfig, Variant},
    probes::{Transport, connection, driver, port, reachability},
    recommend::recommend,
    report::{CheckResult, DiagnosticReport, Outcome},
};
use chrono::Utc;
use tracing::{error, info, warn};

/// Runs the fixed probe pipeline against one target
#[derive(Debug)]
pub struct Runner<'a, T, C> {
    target: &'a TargetConfig,
    plan: &'a Plan,
    transport: &'a T,
    client: &'a C,
}

impl<'a, T: Transport, C: DatabaseClient> Runner<'a, T, C> {
    pub const fn new(
        target: &'a TargetConfig,
        plan: &'a Plan,
        transport: &'a T,
        client: &'a C,
    ) -> Self {
        Self {
            target,
            plan,
            transport,
            client,
        }
    }

    /// Run every probe in order and assemble the report
    ///
    /// Never fails: each probe failure is recorded and the pipeline moves on.
    pub async fn run(&self) -> DiagnosticReport {
        let started_at = Utc::now();
        let target = self.target;
        let plan = self.plan;
        let mut results = Vec::new();

        info!("checking if {} is reachable", target.host);
        record(
            &mut results,
            reachability::probe(self.transport, &target.host, plan.ping_timeout).await,
        );

        info!("checking if port {} is open on {}", target.port, target.host);
        let port_result =
            port::probe(self.transport, &target.host, target.port, plan.port_timeout).await;
        let skip_reason = (!port_result.outcome.is_pass()).then(|| {
            format!(
                "port {} on {} is not open ({})",
                target.port, target.host, port_result.outcome
            )
        });
        record(&mut results, port_result);

        info!("checking ODBC driver '{}'", target.driver);
        record(&mut results, driver::probe(self.client, &target.driver));

        info!(
            "testing {} connection(s) across auth methods and timeouts",
            plan.matrix().len()
        );
        for (auth, timeout) in plan.matrix() {
            let variant = Variant::Standard;
            let result = match &skip_reason {
                Some(reason) => connection::skipped(target, auth, timeout, &variant, reason),
                None => connection::probe(self.client, target, auth, timeout, &variant).await,
            };
            record(&mut results, result);
        }

        let variants = plan.variants(target);
        info!("testing {} connection variant(s)", variants.len());
        for variant in variants {
            let auth = AuthMethod::SqlLogin;
            let timeout = plan.variant_timeout;
            let result = match &skip_reason {
                Some(reason) => connection::skipped(target, auth, timeout, &variant, reason),
                None => connection::probe(self.client, target, auth, timeout, &variant).await,
            };
            record(&mut results, result);
        }

        let recommendations = recommend(&results);

        DiagnosticReport {
            target: target.summary(),
            started_at,
            finished_at: Utc::now(),
            results,
            recommendations,
        }
    }
}

fn record(results: &mut Vec<CheckResult>, result: CheckResult) {
    match result.outcome {
        Outcome::Pass => info!("{result}"),
        Outcome::Fail(_) => error!("{result}"),
        Outcome::Skip | Outcome::Indeterminate => warn!("{result}"),
    }
    results.push(result);
}
