use crate::{
    client::{ClientError, DatabaseClient},
    report::{Check, CheckResult, FailureKind},
};

/// Is `driver` registered with the local driver manager
pub fn probe<C: DatabaseClient>(client: &C, driver: &str) -> CheckResult {
    evaluate(driver, client.drivers())
}

#[must_use]
pub fn evaluate(driver: &str, available: Result<Vec<String>, ClientError>) -> CheckResult {
    let available = match available {
        Ok(available) => available,
        Err(e) => {
            return CheckResult::fail(
                Check::Driver {
                    driver: driver.to_string(),
                    available: Vec::new(),
                },
                FailureKind::UnknownClientError,
                format!("could not list ODBC drivers: {e}"),
            );
        }
    };

    let present = available.iter().any(|d| d == driver);
    let detail = if present {
        format!("driver '{driver}' is installed")
    } else if available.is_empty() {
        format!("driver '{driver}' is NOT installed, no ODBC drivers are registered")
    } else {
        format!(
            "driver '{driver}' is NOT installed, available drivers: {}",
            available.join(", ")
        )
    };

    let check = Check::Driver {
        driver: driver.to_string(),
        available,
    };
    if present {
        CheckResult::pass(check, detail)
    } else {
        CheckResult::fail(check, FailureKind::DriverMissing, detail)
    }
}

/// Installed drivers that look like SQL Server drivers
#[must_use]
pub fn sql_server_alternatives(available: &[String]) -> Vec<&str> {
    available
        .iter()
        .filter(|d| d.to_lowercase().contains("sql server"))
        .map(String::as_str)
        .collect()
}
