//! inkpress CLI - Markdown to HTML fragment compiler

use std::io::{self, Read, Write};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("inkpress: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    // Simple usage: read from stdin or file
    let input = match args.get(1).map(String::as_str) {
        Some(path) if path != "-" => {
            if !inkpress::is_valid_path(path) {
                return Err(format!("refusing path {path:?}").into());
            }
            std::fs::read_to_string(path)?
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let result = inkpress::parse(&input)?;
    for degraded in &result.degradations {
        tracing::info!(line = degraded.line, kind = ?degraded.kind, "kept as paragraph text");
    }
    io::stdout().write_all(result.html.as_bytes())?;

    Ok(())
}
