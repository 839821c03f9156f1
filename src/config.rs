use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1433;
pub const DEFAULT_DATABASE: &str = "master";
pub const DEFAULT_USERNAME: &str = "sa";
pub const DEFAULT_DRIVER: &str = "ODBC Driver 17 for SQL Server";
pub const DEFAULT_TIMEOUTS: [u64; 5] = [5, 15, 30, 60, 120];
pub const DEFAULT_LOG_FILE: &str = "sql_connection_diagnostic.log";
/// Upper bound for every timeout given on the command line
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Connection parameters under test, built once at startup
#[derive(Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub driver: String,
    /// Named instance, probed as `host\instance`
    pub instance: Option<String>,
}

impl TargetConfig {
    /// Database used by the `master` connection variant
    pub const SYSTEM_DATABASE: &'static str = "master";

    #[must_use]
    pub fn is_loopback(&self) -> bool {
        is_loopback(&self.host)
    }

    /// Summary safe to log and serialize (no password)
    #[must_use]
    pub fn summary(&self) -> TargetSummary {
        TargetSummary {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            username: self.username.clone(),
            driver: self.driver.clone(),
            instance: self.instance.clone(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            driver: DEFAULT_DRIVER.to_string(),
            instance: None,
        }
    }
}

// the password must never reach a log line
impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("driver", &self.driver)
            .field("instance", &self.instance)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub driver: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

#[must_use]
pub fn is_loopback(host: &str) -> bool {
    matches!(
        host.to_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "::1" | "[::1]"
    )
}

/// How credentials are presented to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    /// SQL Server authentication with UID/PWD
    SqlLogin,
    /// Integrated (Windows/Kerberos) authentication
    Trusted,
}

impl AuthMethod {
    /// Every accepted spelling, matched case-insensitively
    pub const NAMES: [(&'static str, Self); 6] = [
        ("sql", Self::SqlLogin),
        ("sql-login", Self::SqlLogin),
        ("sqllogin", Self::SqlLogin),
        ("trusted", Self::Trusted),
        ("integrated", Self::Trusted),
        ("windows", Self::Trusted),
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SqlLogin => "sql-login",
            Self::Trusted => "trusted",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Self::NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, method)| *method)
            .ok_or_else(|| format!("Invalid auth method: {s}"))
    }
}

/// Which connection string shape a connection probe uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum Variant {
    /// `SERVER=host,port` against the target database
    Standard,
    /// `SERVER=host`, leaving port resolution to the driver
    NoPort,
    /// target login against the `master` database
    SystemDatabase,
    /// `SERVER=host\instance`
    Instance(String),
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::NoPort => f.write_str("no-port"),
            Self::SystemDatabase => f.write_str("master"),
            Self::Instance(name) => write!(f, "instance {name}"),
        }
    }
}

/// Probe bounds and the connection matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub auth_methods: Vec<AuthMethod>,
    pub timeouts: Vec<Duration>,
    pub ping_timeout: Duration,
    pub port_timeout: Duration,
    pub variant_timeout: Duration,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            auth_methods: vec![AuthMethod::SqlLogin, AuthMethod::Trusted],
            timeouts: DEFAULT_TIMEOUTS
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect(),
            ping_timeout: Duration::from_secs(5),
            port_timeout: Duration::from_secs(3),
            variant_timeout: Duration::from_secs(30),
        }
    }
}

impl Plan {
    /// Matrix cells in execution order: auth-major, then timeouts as given
    #[must_use]
    pub fn matrix(&self) -> Vec<(AuthMethod, Duration)> {
        self.auth_methods
            .iter()
            .flat_map(|auth| self.timeouts.iter().map(move |timeout| (*auth, *timeout)))
            .collect()
    }

    /// Supplementary variants, run with `sql-login` after the matrix
    #[must_use]
    pub fn variants(&self, target: &TargetConfig) -> Vec<Variant> {
        let mut variants = vec![Variant::NoPort];
        if !target
            .database
            .eq_ignore_ascii_case(TargetConfig::SYSTEM_DATABASE)
        {
            variants.push(Variant::SystemDatabase);
        }
        if let Some(instance) = &target.instance {
            variants.push(Variant::Instance(instance.clone()));
        }
        variants
    }
}
