use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use ssedit::cli;
use ssedit::commands;
use ssedit::error;
use ssedit::output::json;

fn main() {
    let args = cli::parse();
    init_logging(args.verbose);

    if let Err(err) = commands::dispatch(&args) {
        report_error(&err, args.output.json);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn,tiberius=error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

/// All failures surface as a single status line on stderr, or a JSON
/// envelope when --json was requested.
fn report_error(err: &anyhow::Error, json_output: bool) {
    let kind = error::classify_error(err);
    if json_output {
        let payload = json::error_json(&err.to_string(), kind.as_str());
        if let Ok(body) = json::emit_json_value(&payload, true) {
            let _ = writeln!(io::stderr(), "{}", body);
        }
        return;
    }

    let line = format!("Error: {}", err);
    if color_stderr() {
        let _ = writeln!(io::stderr(), "{}", line.red());
    } else {
        let _ = writeln!(io::stderr(), "{}", line);
    }
}

fn color_stderr() -> bool {
    std::env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal()
}
