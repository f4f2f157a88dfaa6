use std::time::Instant;

use anyhow::Result;
use serde_json::json;
use tiberius::Query;

use crate::cli::{CliArgs, StatusArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::output::{TableOptions, json as json_out, table};

pub fn run(args: &CliArgs, _cmd: &StatusArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let started = Instant::now();
    let result_sets = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        let query = Query::new(
            "SELECT @@SERVERNAME AS serverName, @@VERSION AS serverVersion, DB_NAME() AS currentDatabase",
        );
        executor::run_query(query, &mut client).await
    })?;

    let latency_ms = started.elapsed().as_millis();
    let row = result_sets
        .first()
        .and_then(|rs| rs.first_row_as_strings())
        .unwrap_or_default();
    let cell = |idx: usize| -> String {
        row.get(idx)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    };
    let server_name = cell(0);
    let server_version = cell(1);
    let current_database = cell(2);

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "status": "ok",
            "latencyMs": latency_ms,
            "serverName": server_name,
            "serverVersion": server_version,
            "currentDatabase": current_database,
        });
        let body = json_out::emit_json_value(&payload, common::json_pretty(&resolved))?;
        if !args.quiet {
            println!("{}", body);
        }
        return Ok(());
    }

    if args.quiet {
        return Ok(());
    }

    let rows = vec![
        ("Status".to_string(), "ok".to_string()),
        ("LatencyMs".to_string(), latency_ms.to_string()),
        ("Server".to_string(), server_name),
        ("Version".to_string(), server_version),
        ("CurrentDatabase".to_string(), current_database),
    ];

    let rendered = table::render_key_value_table("Status", &rows, format, &TableOptions::default());
    println!("{}", rendered);

    Ok(())
}
