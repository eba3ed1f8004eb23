//! Decode a history page from a hex dump.
//!
//! Usage:
//!   # Decode a page read from an older pump
//!   cargo run --example decode-page -- page.hex
//!
//!   # Read the dump from stdin, using newer record layouts
//!   cat page.hex | cargo run --example decode-page -- --newer -

use std::io::{ErrorKind, Read};

use clap::Parser;
use pump_history::{decode_page, Generation, LogOutput, Logger};

#[derive(Parser)]
pub struct Command {
    /// The hex dump to decode, or `-` to read it from stdin
    input: String,

    /// Decode with the record layouts of newer (x23 and later) pumps
    #[clap(long)]
    newer: bool,

    /// Print records to stdout instead of logging them
    #[clap(long)]
    stdout: bool,
}

fn read_input(input: &str) -> std::io::Result<Vec<u8>> {
    let text = if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(input)?
    };

    let digits: String = text.split_whitespace().collect();

    hex::decode(digits).map_err(|e| {
        std::io::Error::new(
            ErrorKind::InvalidData,
            format!("Could not parse '{input}' as a hex dump: {e}"),
        )
    })
}

fn main() -> std::io::Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or("info".to_string()))
        .init();

    let command = Command::parse();

    let page = read_input(&command.input)?;
    log::debug!("Read {} bytes of page data", page.len());

    let output = if command.stdout {
        LogOutput::StdOut
    } else {
        log::Level::Info.into()
    };

    let (history, error) = decode_page(&page, Generation::from(command.newer));

    Logger::log(&output, &history);
    for record in &history {
        Logger::log(&output, record);
    }

    if let Some(e) = error {
        log::error!("Page decoded partially: {e}");
    }

    Ok(())
}
