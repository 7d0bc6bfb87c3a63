use spiceapi_client::control;

use crate::cmd::{ConnectArgs, ExitArgs, RaiseArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn raise(args: RaiseArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut conn = connect.open()?;
    control::raise(&mut conn, args.signal).map_err(|err| client_error("raise failed", err))?;
    print_status("raise", args.signal.as_str(), format);
    Ok(SUCCESS)
}

pub fn exit(args: ExitArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut conn = connect.open()?;
    control::exit(&mut conn, args.code).map_err(|err| client_error("exit failed", err))?;
    let detail = match args.code {
        Some(code) => format!("exit requested with code {code}"),
        None => "exit requested".to_string(),
    };
    print_status("exit", &detail, format);
    Ok(SUCCESS)
}

pub fn restart(connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut conn = connect.open()?;
    control::restart(&mut conn).map_err(|err| client_error("restart failed", err))?;
    print_status("restart", "restart requested", format);
    Ok(SUCCESS)
}

pub fn shutdown(connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut conn = connect.open()?;
    control::shutdown(&mut conn).map_err(|err| client_error("shutdown failed", err))?;
    print_status("shutdown", "shutdown requested", format);
    Ok(SUCCESS)
}

pub fn reboot(connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut conn = connect.open()?;
    control::reboot(&mut conn).map_err(|err| client_error("reboot failed", err))?;
    print_status("reboot", "reboot requested", format);
    Ok(SUCCESS)
}

/// Connects without the automatic handshake and runs it explicitly, so the
/// outcome is reported even when `--no-refresh` is not given.
pub fn refresh(connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let config = connect.config()?.with_refresh_session(false);
    let mut conn = spiceapi_client::Connection::connect(config)
        .map_err(|err| client_error("connect failed", err))?;
    control::session_refresh(&mut conn).map_err(|err| client_error("refresh failed", err))?;
    print_status("refresh", "session password refreshed", format);
    Ok(SUCCESS)
}
