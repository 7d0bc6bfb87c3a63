use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use spiceapi_client::{Response, Value};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    command: &'a str,
    ok: bool,
    detail: &'a str,
}

/// Print the data of a successful response.
pub fn print_response(response: &Response, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "TYPE", "VALUE"]);
            for (index, item) in data_rows(response.data()).iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    type_name(item).to_string(),
                    cell_text(item),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{}",
                serde_json::to_string_pretty(response.data())
                    .unwrap_or_else(|_| response.data().to_string())
            );
        }
    }
}

/// Print the outcome of a command that has no data to show.
pub fn print_status(command: &str, detail: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatusOutput {
                command,
                ok: true,
                detail,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "STATUS", "DETAIL"])
                .add_row(vec![command, "ok", detail]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{command}: {detail}");
        }
    }
}

fn data_rows(data: &Value) -> Vec<&Value> {
    match data.as_list() {
        Some(items) => items.iter().collect(),
        None => vec![data],
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::UInt(_) | Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::List(_) => "list",
        Value::Map(_) => "map",
    }
}

fn cell_text(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}
