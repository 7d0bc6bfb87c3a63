//! Connect to a server and print its `info` module answers.
//!
//! Usage: `cargo run -p spiceapi --example ping -- [host] [port] [password]`

use spiceapi::{Connection, ConnectionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port = match args.next() {
        Some(port) => port.parse()?,
        None => 1337,
    };
    let password = args.next().unwrap_or_default();

    let config = ConnectionConfig::new(host, port).with_password(password);
    let mut conn = Connection::connect(config)?;

    for function in ["avs", "launcher", "memory"] {
        let request = conn.new_request("info", function);
        match conn.send_request(&request) {
            Ok(response) => println!("info.{function}: {}", response.data()),
            Err(err) => eprintln!("info.{function} failed: {err}"),
        }
    }

    Ok(())
}
