use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use serde_json::json;
use tiberius::Query;
use tracing::info;

use crate::cli::{CliArgs, ExportArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::db::schema;
use crate::output::{csv, json as json_out};

pub fn run(args: &CliArgs, cmd: &ExportArgs) -> Result<()> {
    let table_name = common::require_table(cmd.table.as_deref())?;

    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    let (schema_name, table_name) =
        common::resolve_schema_table(cmd.schema.as_deref(), table_name, &resolved);
    let target_dir = cmd.dir.clone().unwrap_or_else(|| PathBuf::from("."));

    let (descriptor, result_set) = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        let descriptor = schema::fetch_table(&mut client, &schema_name, &table_name).await?;

        let query = Query::new(format!(
            "SELECT {} FROM {};",
            descriptor.quoted_column_list(),
            descriptor.qualified_name(),
        ));
        let result_sets = executor::run_query(query, &mut client).await?;
        let mut result_set = result_sets.into_iter().next().unwrap_or_default();

        // An empty table yields no rows to infer headers from; the CSV
        // still gets its header row from the descriptor.
        if result_set.columns.is_empty() {
            result_set.columns = descriptor
                .columns
                .iter()
                .map(|col| crate::db::types::Column {
                    name: col.name.clone(),
                    data_type: None,
                })
                .collect();
        }

        Ok::<_, anyhow::Error>((descriptor, result_set))
    })?;

    let file_name = csv::export_file_name(&descriptor.name, Local::now());
    let path = csv::write_result_set(&target_dir, &file_name, &result_set)?;
    let row_count = result_set.rows.len();
    info!(table = %descriptor.qualified_name(), rows = row_count, path = %path.display(), "export");

    if args.quiet {
        return Ok(());
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": { "schema": descriptor.schema, "name": descriptor.name },
            "path": path.display().to_string(),
            "rows": row_count,
        });
        let body = json_out::emit_json_value(&payload, common::json_pretty(&resolved))?;
        println!("{}", body);
        return Ok(());
    }

    println!("Exported {} row(s) to {}", row_count, path.display());

    Ok(())
}
