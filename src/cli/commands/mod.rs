use crate::config::{
    AuthMethod, DEFAULT_DATABASE, DEFAULT_DRIVER, DEFAULT_HOST, DEFAULT_LOG_FILE,
    DEFAULT_USERNAME, MAX_TIMEOUT_SECS,
};
use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

/// Pure clap command definitions with zero business logic
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("dsn")
                .env("ODBCPROBE_DSN")
                .help("mssql://<username>:<password>@tcp(<host>:<port>)/<database>")
                .long("dsn")
                .long_help(
                    "Connection parameters in DSN form:\n\
                    mssql://<username>:<password>@tcp(<host>:<port>)/<database>\n\n\
                    Every part present in the DSN takes precedence over \
                    --host, --port, --username, --password and --database.",
                )
                .short('d')
                .hide_env_values(true),
        )
        .arg(
            Arg::new("host")
                .default_value(DEFAULT_HOST)
                .env("ODBCPROBE_HOST")
                .help("server hostname or IP address")
                .long("host")
                .short('H'),
        )
        .arg(
            Arg::new("port")
                .default_value("1433")
                .env("ODBCPROBE_PORT")
                .help("server TCP port")
                .long("port")
                .short('p')
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("database")
                .default_value(DEFAULT_DATABASE)
                .env("ODBCPROBE_DATABASE")
                .help("database to connect to")
                .long("database")
                .short('D'),
        )
        .arg(
            Arg::new("username")
                .default_value(DEFAULT_USERNAME)
                .env("ODBCPROBE_USERNAME")
                .help("SQL login name")
                .long("username")
                .short('u'),
        )
        .arg(
            Arg::new("password")
                .default_value("")
                .env("ODBCPROBE_PASSWORD")
                .help("SQL login password")
                .long("password")
                .hide_default_value(true)
                .hide_env_values(true),
        )
        .arg(
            Arg::new("driver")
                .default_value(DEFAULT_DRIVER)
                .env("ODBCPROBE_DRIVER")
                .help("ODBC driver name as registered with the driver manager")
                .long("driver"),
        )
        .arg(
            Arg::new("instance")
                .env("ODBCPROBE_INSTANCE")
                .help("named instance, also probed as <host>\\<instance>")
                .long("instance")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("auth")
                .default_values(["sql", "trusted"])
                .env("ODBCPROBE_AUTH")
                .help("authentication methods to test, in order")
                .long("auth")
                .ignore_case(true)
                .value_delimiter(',')
                .value_parser(AuthMethod::NAMES.map(|(name, _)| name)),
        )
        .arg(
            Arg::new("timeouts")
                .default_values(["5", "15", "30", "60", "120"])
                .env("ODBCPROBE_TIMEOUTS")
                .help("login timeouts in seconds to test, in order")
                .long("timeouts")
                .short('t')
                .value_delimiter(',')
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS)),
        )
        .arg(
            Arg::new("ping-timeout")
                .default_value("5")
                .env("ODBCPROBE_PING_TIMEOUT")
                .help("seconds to wait for a ping reply")
                .long("ping-timeout")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS)),
        )
        .arg(
            Arg::new("port-timeout")
                .default_value("3")
                .env("ODBCPROBE_PORT_TIMEOUT")
                .help("seconds to wait for the TCP port to accept a connection")
                .long("port-timeout")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS)),
        )
        .arg(
            Arg::new("variant-timeout")
                .default_value("30")
                .env("ODBCPROBE_VARIANT_TIMEOUT")
                .help("login timeout in seconds for the no-port, master and instance variants")
                .long("variant-timeout")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS)),
        )
        .arg(
            Arg::new("log-file")
                .default_value(DEFAULT_LOG_FILE)
                .env("ODBCPROBE_LOG_FILE")
                .help("file the diagnostic transcript is appended to")
                .long("log-file")
                .short('l')
                .value_name("PATH")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new("json")
                .help("print the final report as JSON on stdout")
                .long("json")
                .action(ArgAction::SetTrue),
        )
}
