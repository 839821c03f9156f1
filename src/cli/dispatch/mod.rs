use crate::{
    cli::actions::Action,
    config::{AuthMethod, DEFAULT_LOG_FILE, Plan, TargetConfig},
};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::{path::PathBuf, time::Duration};

fn string_arg(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

fn seconds_arg(matches: &ArgMatches, id: &str, default: u64) -> Duration {
    Duration::from_secs(matches.get_one::<u64>(id).copied().unwrap_or(default))
}

/// Build the target from the individual arguments, then overlay the DSN parts
fn extract_target(matches: &ArgMatches) -> Result<TargetConfig> {
    let defaults = TargetConfig::default();
    let mut target = TargetConfig {
        host: string_arg(matches, "host").unwrap_or(defaults.host),
        port: matches
            .get_one::<u16>("port")
            .copied()
            .unwrap_or(defaults.port),
        database: string_arg(matches, "database").unwrap_or(defaults.database),
        username: string_arg(matches, "username").unwrap_or(defaults.username),
        password: string_arg(matches, "password").unwrap_or(defaults.password),
        driver: string_arg(matches, "driver").unwrap_or(defaults.driver),
        instance: string_arg(matches, "instance").filter(|i| !i.is_empty()),
    };

    if let Some(dsn_str) = matches.get_one::<String>("dsn") {
        let dsn = dsn::parse(dsn_str).context("Failed to parse DSN")?;
        if let Some(host) = dsn.host {
            target.host = host;
        }
        if let Some(port) = dsn.port {
            target.port = port;
        }
        if let Some(username) = dsn.username {
            target.username = username;
        }
        if let Some(password) = dsn.password {
            target.password = password;
        }
        if let Some(database) = dsn.database.filter(|d| !d.is_empty()) {
            target.database = database;
        }
    }

    if target.host.trim().is_empty() {
        anyhow::bail!("host must not be empty");
    }

    Ok(target)
}

fn extract_plan(matches: &ArgMatches) -> Result<Plan> {
    let defaults = Plan::default();

    let auth_methods = match matches.get_many::<String>("auth") {
        Some(values) => values
            .map(|v| {
                v.parse::<AuthMethod>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("Invalid auth method: {v}"))
            })
            .collect::<Result<Vec<_>>>()?,
        None => defaults.auth_methods,
    };

    let timeouts = match matches.get_many::<u64>("timeouts") {
        Some(values) => values.copied().map(Duration::from_secs).collect(),
        None => defaults.timeouts,
    };

    if auth_methods.is_empty() {
        anyhow::bail!("at least one auth method is required");
    }
    if timeouts.is_empty() {
        anyhow::bail!("at least one timeout is required");
    }

    Ok(Plan {
        auth_methods,
        timeouts,
        ping_timeout: seconds_arg(matches, "ping-timeout", defaults.ping_timeout.as_secs()),
        port_timeout: seconds_arg(matches, "port-timeout", defaults.port_timeout.as_secs()),
        variant_timeout: seconds_arg(
            matches,
            "variant-timeout",
            defaults.variant_timeout.as_secs(),
        ),
    })
}

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if the DSN is invalid or a value fails validation
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let target = extract_target(matches)?;
    let plan = extract_plan(matches)?;

    let log_file = matches
        .get_one::<PathBuf>("log-file")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    Ok(Action::Diagnose {
        target,
        plan,
        log_file,
        json: matches.get_flag("json"),
    })
}
