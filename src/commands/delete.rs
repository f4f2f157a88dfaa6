use anyhow::{Result, anyhow};
use serde_json::json;
use tiberius::Query;
use tracing::info;

use crate::cli::{CliArgs, DeleteArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::db::schema::{self, quote_identifier};
use crate::output::json as json_out;

pub fn run(args: &CliArgs, cmd: &DeleteArgs) -> Result<()> {
    let table_name = common::require_table(cmd.table.as_deref())?;
    let key_value = cmd
        .key
        .as_deref()
        .ok_or_else(|| anyhow!("Missing required --key"))?;

    if key_value.trim().is_empty() {
        return Err(anyhow!("--key must not be empty"));
    }

    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    common::ensure_write_allowed(args, &resolved)?;

    let (schema_name, table_name) =
        common::resolve_schema_table(cmd.schema.as_deref(), table_name, &resolved);

    let (descriptor, key_column, affected) = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        let descriptor = schema::fetch_table(&mut client, &schema_name, &table_name).await?;
        let key_column = descriptor.key_column()?.name.clone();

        let sql = format!(
            "DELETE FROM {} WHERE {} = @P1;",
            descriptor.qualified_name(),
            quote_identifier(&key_column),
        );
        let mut query = Query::new(sql);
        query.bind(key_value);
        let affected = executor::run_execute(query, &mut client).await?;
        info!(table = %descriptor.qualified_name(), affected, "delete");

        Ok::<_, anyhow::Error>((descriptor, key_column, affected))
    })?;

    if args.quiet {
        return Ok(());
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": { "schema": descriptor.schema, "name": descriptor.name },
            "keyColumn": key_column,
            "deleted": affected,
        });
        let body = json_out::emit_json_value(&payload, common::json_pretty(&resolved))?;
        println!("{}", body);
        return Ok(());
    }

    if affected == 0 {
        println!(
            "No row in {} with {} = '{}'",
            descriptor.qualified_name(),
            key_column,
            key_value
        );
    } else {
        println!(
            "Deleted {} row(s) from {}",
            affected,
            descriptor.qualified_name()
        );
    }

    Ok(())
}
