use super::{ClientError, ConnectRequest, ServerInfo};
use odbc_api::{ConnectionOptions, Cursor, Environment, Error};
use std::{fmt, sync::Arc};
use tokio::task;

const VERSION_QUERY: &str = "SELECT @@VERSION";

/// `odbc-api` backed client; one environment handle for the whole run
#[derive(Clone)]
pub struct OdbcClient {
    env: Arc<Environment>,
}

impl fmt::Debug for OdbcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdbcClient").finish_non_exhaustive()
    }
}

impl OdbcClient {
    /// Load the driver manager and allocate the environment handle
    ///
    /// # Errors
    ///
    /// Returns an error if no ODBC driver manager can be loaded
    pub fn new() -> Result<Self, ClientError> {
        let env = Environment::new().map_err(to_client_error)?;
        Ok(Self { env: Arc::new(env) })
    }

    /// # Errors
    ///
    /// Returns an error if the driver manager cannot enumerate its drivers
    pub fn drivers(&self) -> Result<Vec<String>, ClientError> {
        let drivers = self.env.drivers().map_err(to_client_error)?;
        Ok(drivers.into_iter().map(|d| d.description).collect())
    }

    /// Connect on the blocking pool; the caller awaits it right away
    ///
    /// # Errors
    ///
    /// Returns the driver's diagnostic record if the login or the version query fails
    pub async fn connect(&self, request: &ConnectRequest) -> Result<ServerInfo, ClientError> {
        let env = Arc::clone(&self.env);
        let connection_string = request.connection_string.clone();
        let login_timeout_sec = u32::try_from(request.timeout.as_secs()).unwrap_or(u32::MAX);

        task::spawn_blocking(move || {
            let options = ConnectionOptions {
                login_timeout_sec: Some(login_timeout_sec),
                ..ConnectionOptions::default()
            };
            let conn = env
                .connect_with_connection_string(connection_string.as_str(), options)
                .map_err(to_client_error)?;

            let mut version = None;
            if let Some(mut cursor) = conn
                .execute(VERSION_QUERY, ())
                .map_err(to_client_error)?
                && let Some(mut row) = cursor.next_row().map_err(to_client_error)?
            {
                let mut buf = Vec::new();
                if row.get_text(1, &mut buf).map_err(to_client_error)? {
                    version = String::from_utf8_lossy(&buf)
                        .lines()
                        .next()
                        .map(|line| line.trim().to_string());
                }
            }
            Ok(ServerInfo { version })
        })
        .await
        .map_err(|e| ClientError::new(format!("connection task failed: {e}")))?
    }
}

fn to_client_error(err: Error) -> ClientError {
    match &err {
        Error::Diagnostics { record, .. } => {
            ClientError::diagnostic(record.state.as_str(), record.native_error, err.to_string())
        }
        _ => ClientError::new(err.to_string()),
    }
}
