pub mod connection_string;
#[cfg(feature = "odbc")]
pub mod odbc;

pub use connection_string::ConnectionString;

use crate::report::FailureKind;
use std::{error, fmt, future::Future, time::Duration};

// SQL Server native error codes
const LOGIN_FAILED: i32 = 18_456;
const UNTRUSTED_DOMAIN_LOGIN: i32 = 18_452;

/// Error reported by the database client library, kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    /// Five character SQLSTATE, when the library produced a diagnostic record
    pub sqlstate: Option<String>,
    pub native: Option<i32>,
    pub message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sqlstate: None,
            native: None,
            message: message.into(),
        }
    }

    pub fn diagnostic(sqlstate: &str, native: i32, message: impl Into<String>) -> Self {
        Self {
            sqlstate: Some(sqlstate.to_string()),
            native: Some(native),
            message: message.into(),
        }
    }

    /// Map the raw diagnostic onto the failure taxonomy
    #[must_use]
    pub fn classify(&self) -> FailureKind {
        let state = self.sqlstate.as_deref().unwrap_or_default();
        let message = self.message.to_lowercase();

        if state == "28000"
            || matches!(self.native, Some(LOGIN_FAILED | UNTRUSTED_DOMAIN_LOGIN))
            || message.contains("login failed")
        {
            FailureKind::AuthenticationFailed
        } else if matches!(state, "HYT00" | "HYT01")
            || message.contains("timeout expired")
            || message.contains("timeout error")
            || message.contains("timed out")
        {
            FailureKind::ConnectionTimedOut
        } else {
            FailureKind::UnknownClientError
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.sqlstate, self.native) {
            (Some(state), Some(native)) => write!(f, "[{state}] ({native}) {}", self.message),
            (Some(state), None) => write!(f, "[{state}] {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

impl error::Error for ClientError {}

/// One connection attempt
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub connection_string: ConnectionString,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    /// `SELECT @@VERSION`, first line
    pub version: Option<String>,
}

/// The external database client library
pub trait DatabaseClient {
    /// Drivers registered with the local driver manager
    ///
    /// # Errors
    ///
    /// Returns an error if the driver manager cannot be queried
    fn drivers(&self) -> Result<Vec<String>, ClientError>;

    /// Open a connection, query the server version and close it
    fn connect(
        &self,
        request: &ConnectRequest,
    ) -> impl Future<Output = Result<ServerInfo, ClientError>>;
}

/// Client used by the binary: ODBC when available, otherwise a stand-in
/// that explains why nothing can be attempted
#[derive(Debug)]
pub enum SystemClient {
    #[cfg(feature = "odbc")]
    Odbc(odbc::OdbcClient),
    Unavailable(String),
}

impl SystemClient {
    #[must_use]
    pub fn new() -> Self {
        #[cfg(feature = "odbc")]
        {
            match odbc::OdbcClient::new() {
                Ok(client) => Self::Odbc(client),
                Err(e) => Self::Unavailable(format!("ODBC driver manager unavailable: {e}")),
            }
        }
        #[cfg(not(feature = "odbc"))]
        {
            Self::Unavailable(
                "ODBC driver manager unavailable: built without the `odbc` feature".to_string(),
            )
        }
    }
}

impl Default for SystemClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseClient for SystemClient {
    fn drivers(&self) -> Result<Vec<String>, ClientError> {
        match self {
            #[cfg(feature = "odbc")]
            Self::Odbc(client) => client.drivers(),
            Self::Unavailable(reason) => Err(ClientError::new(reason.clone())),
        }
    }

    #[cfg_attr(not(feature = "odbc"), allow(unused_variables))]
    async fn connect(&self, request: &ConnectRequest) -> Result<ServerInfo, ClientError> {
        match self {
            #[cfg(feature = "odbc")]
            Self::Odbc(client) => client.connect(request).await,
            Self::Unavailable(reason) => Err(ClientError::new(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_classify_authentication() {
        let err = ClientError::diagnostic(
            "28000",
            18456,
            "[Microsoft][ODBC Driver 17 for SQL Server][SQL Server]Login failed for user 'sa'.",
        );
        assert_eq!(err.classify(), FailureKind::AuthenticationFailed);

        let err = ClientError::diagnostic("42000", 18452, "untrusted domain");
        assert_eq!(err.classify(), FailureKind::AuthenticationFailed);
    }

    #[test]
    fn test_classify_timeout() {
        let err = ClientError::diagnostic(
            "HYT00",
            0,
            "[Microsoft][ODBC Driver 17 for SQL Server]Login timeout expired",
        );
        assert_eq!(err.classify(), FailureKind::ConnectionTimedOut);

        let err = ClientError::diagnostic(
            "08001",
            258,
            "[Microsoft][ODBC Driver 17 for SQL Server]TCP Provider: Timeout error [258].",
        );
        assert_eq!(err.classify(), FailureKind::ConnectionTimedOut);
    }

    #[test]
    fn test_classify_unknown() {
        let err = ClientError::diagnostic(
            "01000",
            0,
            "[unixODBC][Driver Manager]Can't open lib 'ODBC Driver 17 for SQL Server' : file not found",
        );
        assert_eq!(err.classify(), FailureKind::UnknownClientError);
        assert_eq!(
            ClientError::new("something else").classify(),
            FailureKind::UnknownClientError
        );
    }

    #[test]
    fn test_display_is_verbatim() {
        let err = ClientError::diagnostic("28000", 18456, "Login failed for user 'sa'.");
        assert_eq!(err.to_string(), "[28000] (18456) Login failed for user 'sa'.");
        assert_eq!(ClientError::new("boom").to_string(), "boom");
    }

    #[tokio::test]
    async fn test_unavailable_client() {
        let client = SystemClient::Unavailable("no driver manager".into());
        assert_eq!(
            client.drivers().unwrap_err().message,
            "no driver manager".to_string()
        );
        let request = ConnectRequest {
            connection_string: ConnectionString::build(
                &crate::config::TargetConfig::default(),
                crate::config::AuthMethod::SqlLogin,
                &crate::config::Variant::Standard,
            ),
            timeout: Duration::from_secs(1),
        };
        assert!(client.connect(&request).await.is_err());
    }
}
