//! Diagnose why a client cannot connect to a SQL Server through ODBC.
//!
//! A fixed pipeline of one-shot probes (reachability, TCP port, ODBC driver,
//! connection matrix) is run against a single target and turned into a report
//! with recommendations.

pub mod cli;
pub mod client;
pub mod config;
pub mod diagnose;
pub mod probes;
pub mod recommend;
pub mod report;
pub mod runner;
pub mod telemetry;
