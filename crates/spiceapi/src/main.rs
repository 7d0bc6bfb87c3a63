mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, ConnectArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "spiceapi", version, about = "SpiceAPI remote-control client")]
struct Cli {
    #[command(flatten)]
    connect: ConnectArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.connect, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_call_with_params() {
        let cli = Cli::try_parse_from([
            "spiceapi",
            "--host",
            "10.0.0.2",
            "call",
            "buttons",
            "write",
            "--param",
            "[\"P1 Start\", 1]",
        ])
        .expect("call args should parse");

        assert_eq!(cli.connect.host, "10.0.0.2");
        match cli.command {
            Command::Call(args) => {
                assert_eq!(args.module, "buttons");
                assert_eq!(args.params.len(), 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from(["spiceapi", "restart", "--port", "4000", "--no-refresh"])
            .expect("global args should parse after subcommand");
        assert_eq!(cli.connect.port, 4000);
        assert!(cli.connect.no_refresh);
    }

    #[test]
    fn rejects_unknown_signal() {
        let err = Cli::try_parse_from(["spiceapi", "raise", "SIGKILL"])
            .expect_err("unknown signal should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_exit_code() {
        let cli = Cli::try_parse_from(["spiceapi", "exit", "--code", "2"]).unwrap();
        assert!(matches!(cli.command, Command::Exit(args) if args.code == Some(2)));
    }

    #[test]
    fn exit_code_must_fit_i32() {
        let cli = Cli::try_parse_from(["spiceapi", "exit", "--code", "-2147483648"]).unwrap();
        assert!(matches!(cli.command, Command::Exit(args) if args.code == Some(i32::MIN)));

        let err = Cli::try_parse_from(["spiceapi", "exit", "--code", "4294967296"])
            .expect_err("code beyond i32 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
