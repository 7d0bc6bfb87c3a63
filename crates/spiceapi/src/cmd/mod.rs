use std::time::Duration;

use clap::{Args, Subcommand};
use spiceapi_client::control::Signal;
use spiceapi_client::{Connection, ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod call;
pub mod control;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Call any module function and print the response data.
    Call(CallArgs),
    /// Ask the server process to raise a signal.
    Raise(RaiseArgs),
    /// Ask the server process to exit.
    Exit(ExitArgs),
    /// Ask the server process to restart.
    Restart,
    /// Ask the server host to shut down.
    Shutdown,
    /// Ask the server host to reboot.
    Reboot,
    /// Run a session refresh and report whether the server accepted it.
    Refresh,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Call(args) => call::run(args, connect, format),
        Command::Raise(args) => control::raise(args, connect, format),
        Command::Exit(args) => control::exit(args, connect, format),
        Command::Restart => control::restart(connect, format),
        Command::Shutdown => control::shutdown(connect, format),
        Command::Reboot => control::reboot(connect, format),
        Command::Refresh => control::refresh(connect, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where and how to connect. Shared by every networked subcommand.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Server host name or address.
    #[arg(long, env = "SPICEAPI_HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,
    /// Server TCP port.
    #[arg(long, env = "SPICEAPI_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,
    /// Connection password. Empty disables encryption.
    #[arg(
        long,
        env = "SPICEAPI_PASSWORD",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true,
        global = true
    )]
    pub password: String,
    /// Skip the session refresh after connecting.
    #[arg(long, global = true)]
    pub no_refresh: bool,
    /// Connect and per-exchange timeout (e.g. 3s, 500ms).
    #[arg(long, default_value = "3s", global = true)]
    pub timeout: String,
}

impl ConnectArgs {
    pub fn config(&self) -> CliResult<ConnectionConfig> {
        Ok(ConnectionConfig::new(self.host.clone(), self.port)
            .with_password(self.password.clone())
            .with_refresh_session(!self.no_refresh)
            .with_timeout(parse_duration(&self.timeout)?))
    }

    pub fn open(&self) -> CliResult<Connection> {
        let config = self.config()?;
        Connection::connect(config).map_err(|err| client_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Server module, e.g. `coin` or `buttons`.
    pub module: String,
    /// Function within the module.
    pub function: String,
    /// Positional parameter as JSON; repeat for more.
    #[arg(long = "param", short = 'p', value_name = "JSON")]
    pub params: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RaiseArgs {
    /// Signal name, with or without the `SIG` prefix.
    pub signal: Signal,
}

#[derive(Args, Debug)]
pub struct ExitArgs {
    /// Process exit code passed to the server.
    #[arg(long, allow_negative_numbers = true)]
    pub code: Option<i32>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}
