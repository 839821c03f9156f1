#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{DRIVER, FakeClient, FakeTransport, login_failed, plan, target};
use odbcprobe::{
    config::AuthMethod,
    diagnose,
    probes::{PingObservation, PortObservation},
    runner::Runner,
    telemetry,
};

#[tokio::test]
async fn test_results_and_recommendations_reach_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sql_connection_diagnostic.log");

    let target = target();
    let plan = plan(vec![AuthMethod::SqlLogin], &[5]);
    let transport = FakeTransport::new(PingObservation::Reply, PortObservation::Open);
    let client = FakeClient::new(vec![DRIVER], |_| Err(login_failed()));

    let report = {
        let file = telemetry::open_log_file(&path).unwrap();
        let _guard = tracing::subscriber::set_default(telemetry::subscriber(file));
        let report = Runner::new(&target, &plan, &transport, &client).run().await;
        diagnose::present(&report);
        report
    };

    let content = std::fs::read_to_string(&path).unwrap();

    for result in &report.results {
        assert!(
            content.contains(&result.to_string()),
            "missing check line: {result}"
        );
    }
    assert!(content.contains("RECOMMENDATIONS:"));
    assert!(!report.recommendations.is_empty());
    for recommendation in &report.recommendations {
        assert!(content.contains(recommendation.as_str()));
    }
    assert!(!content.contains("s3cret"));
}
