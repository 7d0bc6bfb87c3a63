use spiceapi_client::Value;
use tracing::debug;

use crate::cmd::{CallArgs, ConnectArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_response, OutputFormat};

pub fn run(args: CallArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let params = parse_params(&args.params)?;
    let mut conn = connect.open()?;

    let mut request = conn.new_request(args.module, args.function);
    for param in params {
        request.add_param(param);
    }
    debug!(id = request.id(), params = request.params().len(), "calling");

    let response = conn
        .send_request(&request)
        .map_err(|err| client_error("call failed", err))?;
    print_response(&response, format);

    Ok(SUCCESS)
}

fn parse_params(raw: &[String]) -> CliResult<Vec<Value>> {
    raw.iter()
        .map(|text| {
            serde_json::from_str::<Value>(text).map_err(|err| {
                CliError::new(USAGE, format!("--param '{text}' is not valid JSON: {err}"))
            })
        })
        .collect()
}
