use std::fs;
use std::time::Instant;

use anyhow::{Result, anyhow};
use serde_json::json;
use tiberius::Query;

use crate::cli::{CliArgs, SqlArgs};
use crate::commands::{common, sql_utils};
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::db::types::ResultSet;
use crate::error::{AppError, ErrorKind};
use crate::output::{TableOptions, json as json_out, table};
use crate::safety;

const MAX_ROWS_DEFAULT: u64 = 200;
const MAX_ROWS_MAX: u64 = 2000;

#[derive(Debug, Clone)]
struct BatchResult {
    index: usize,
    elapsed_ms: u128,
    rows: usize,
}

pub fn run(args: &CliArgs, cmd: &SqlArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    let allow_write = common::allow_write(args, &resolved);

    let sql_text = match (&cmd.sql, &cmd.file) {
        (Some(_), Some(_)) => return Err(anyhow!("Provide SQL text or --file, not both")),
        (None, None) => return Err(anyhow!("Provide SQL text or --file")),
        (Some(text), None) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
    };

    let params = sql_utils::parse_named_values(&cmd.params)
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;

    let mut batches = if cmd.file.is_some() {
        sql_utils::split_batches(&sql_text)
    } else {
        vec![sql_text]
    };
    batches.retain(|batch| !batch.trim().is_empty());

    if batches.is_empty() {
        return Err(anyhow!("No SQL batches found"));
    }

    let batches = batches
        .iter()
        .map(|batch| sql_utils::replace_named_params(batch, &params, 1))
        .collect::<Vec<_>>();

    if !allow_write {
        for batch in &batches {
            safety::validate_read_only(batch)
                .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
        }
    }

    let max_rows = cmd
        .max_rows
        .unwrap_or(MAX_ROWS_DEFAULT)
        .clamp(1, MAX_ROWS_MAX) as usize;

    let (result_sets, batch_results) = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        let mut all_sets: Vec<ResultSet> = Vec::new();
        let mut batch_results = Vec::new();

        for (idx, batch) in batches.iter().enumerate() {
            let started = Instant::now();
            let mut query = Query::new(batch.clone());
            for param in &params {
                query.bind(param.value.as_str());
            }

            let sets = executor::run_query(query, &mut client).await?;
            let rows = sets.iter().map(|rs| rs.rows.len()).sum();
            all_sets.extend(sets);
            batch_results.push(BatchResult {
                index: idx + 1,
                elapsed_ms: started.elapsed().as_millis(),
                rows,
            });
        }

        Ok::<_, anyhow::Error>((all_sets, batch_results))
    })?;

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "success": true,
            "batches": batch_results
                .iter()
                .map(|batch| json!({
                    "index": batch.index,
                    "elapsedMs": batch.elapsed_ms,
                    "rows": batch.rows,
                }))
                .collect::<Vec<_>>(),
            "resultSets": result_sets.iter().map(json_out::result_set_to_json).collect::<Vec<_>>(),
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

    if result_sets.is_empty() {
        // DML and DDL produce no result sets; mirror the driver's silence
        // with an explicit completion message.
        println!("Command completed (no result sets)");
        return Ok(());
    }

    let display_sets = truncate_result_sets(&result_sets, max_rows);
    for (idx, result_set) in display_sets.iter().enumerate() {
        if display_sets.len() > 1 {
            println!("Result set {}", idx + 1);
        }
        let rendered = table::render_result_set_table(result_set, format, &TableOptions::default());
        println!("{}", rendered);
        if idx + 1 < display_sets.len() {
            println!();
        }
    }

    Ok(())
}

fn truncate_result_sets(result_sets: &[ResultSet], max_rows: usize) -> Vec<ResultSet> {
    result_sets
        .iter()
        .map(|rs| {
            if rs.rows.len() <= max_rows {
                rs.clone()
            } else {
                let mut truncated = rs.clone();
                truncated.rows.truncate(max_rows);
                truncated
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::{Column, Value};

    #[test]
    fn truncates_result_sets_to_max_rows() {
        let rs = ResultSet {
            columns: vec![Column {
                name: "n".to_string(),
                data_type: None,
            }],
            rows: (0..10).map(|n| vec![Value::Int(n)]).collect(),
        };
        let truncated = truncate_result_sets(&[rs], 3);
        assert_eq!(truncated[0].rows.len(), 3);
    }
}
