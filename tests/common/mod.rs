#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use odbcprobe::client::{ClientError, ConnectRequest, DatabaseClient, ServerInfo};
use odbcprobe::config::{AuthMethod, Plan, TargetConfig};
use odbcprobe::probes::{PingObservation, PortObservation, Transport};
use std::{cell::RefCell, net::IpAddr, time::Duration};

pub const DRIVER: &str = "ODBC Driver 17 for SQL Server";

pub fn target() -> TargetConfig {
    TargetConfig {
        host: "db.example.com".into(),
        port: 1433,
        database: "master".into(),
        username: "app".into(),
        password: "s3cret".into(),
        driver: DRIVER.into(),
        instance: None,
    }
}

pub fn plan(auth_methods: Vec<AuthMethod>, timeouts: &[u64]) -> Plan {
    Plan {
        auth_methods,
        timeouts: timeouts.iter().copied().map(Duration::from_secs).collect(),
        ping_timeout: Duration::from_secs(1),
        port_timeout: Duration::from_secs(1),
        variant_timeout: Duration::from_secs(30),
    }
}

/// Scripted network: every call answers with the configured observation
pub struct FakeTransport {
    pub resolve: Result<Vec<IpAddr>, String>,
    pub ping: PingObservation,
    pub port: PortObservation,
}

impl FakeTransport {
    pub fn new(ping: PingObservation, port: PortObservation) -> Self {
        Self {
            resolve: Ok(vec!["10.0.0.5".parse().unwrap()]),
            ping,
            port,
        }
    }
}

impl Transport for FakeTransport {
    async fn resolve(&self, _host: &str) -> Result<Vec<IpAddr>, String> {
        self.resolve.clone()
    }

    async fn ping(&self, _host: &str, _timeout: Duration) -> PingObservation {
        self.ping.clone()
    }

    async fn connect_tcp(&self, _host: &str, _port: u16, _timeout: Duration) -> PortObservation {
        self.port.clone()
    }
}

type ConnectFn = Box<dyn Fn(&ConnectRequest) -> Result<ServerInfo, ClientError>>;

/// Scripted client library that remembers every connection string it was handed
pub struct FakeClient {
    pub drivers: Result<Vec<String>, ClientError>,
    connect: ConnectFn,
    pub attempts: RefCell<Vec<(String, Duration)>>,
}

impl FakeClient {
    pub fn new(
        drivers: Vec<&str>,
        connect: impl Fn(&ConnectRequest) -> Result<ServerInfo, ClientError> + 'static,
    ) -> Self {
        Self {
            drivers: Ok(drivers.into_iter().map(String::from).collect()),
            connect: Box::new(connect),
            attempts: RefCell::new(Vec::new()),
        }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.borrow().len()
    }
}

impl DatabaseClient for FakeClient {
    fn drivers(&self) -> Result<Vec<String>, ClientError> {
        self.drivers.clone()
    }

    async fn connect(&self, request: &ConnectRequest) -> Result<ServerInfo, ClientError> {
        self.attempts.borrow_mut().push((
            request.connection_string.as_str().to_string(),
            request.timeout,
        ));
        (self.connect)(request)
    }
}

pub fn connected() -> Result<ServerInfo, ClientError> {
    Ok(ServerInfo {
        version: Some("Microsoft SQL Server 2019 (RTM-CU22) - 15.0.4322.2 (X64)".into()),
    })
}

pub fn login_failed() -> ClientError {
    ClientError::diagnostic(
        "28000",
        18456,
        "[Microsoft][ODBC Driver 17 for SQL Server][SQL Server]Login failed for user 'app'.",
    )
}

pub fn login_timeout() -> ClientError {
    ClientError::diagnostic(
        "HYT00",
        0,
        "[Microsoft][ODBC Driver 17 for SQL Server]Login timeout expired",
    )
}

pub fn driver_not_loadable() -> ClientError {
    ClientError::diagnostic(
        "01000",
        0,
        "[unixODBC][Driver Manager]Can't open lib 'ODBC Driver 17 for SQL Server' : file not found",
    )
}
