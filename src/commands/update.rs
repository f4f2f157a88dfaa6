use anyhow::{Result, anyhow};
use serde_json::json;
use tiberius::Query;
use tracing::info;

use crate::cli::{CliArgs, UpdateArgs};
use crate::commands::{common, insert, sql_utils};
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::db::schema::{self, quote_identifier};
use crate::error::{AppError, ErrorKind};
use crate::form;
use crate::output::json as json_out;

pub fn run(args: &CliArgs, cmd: &UpdateArgs) -> Result<()> {
    let table_name = common::require_table(cmd.table.as_deref())?;
    let key_value = cmd
        .key
        .as_deref()
        .ok_or_else(|| anyhow!("Missing required --key"))?;

    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    common::ensure_write_allowed(args, &resolved)?;

    let (schema_name, table_name) =
        common::resolve_schema_table(cmd.schema.as_deref(), table_name, &resolved);
    let assignments = sql_utils::parse_named_values(&cmd.set)
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;

    let (descriptor, affected) = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        let descriptor = schema::fetch_table(&mut client, &schema_name, &table_name).await?;
        let key_column = descriptor.key_column()?.name.clone();

        if descriptor.columns.len() < 2 {
            return Err(AppError::new(
                ErrorKind::Query,
                format!(
                    "Table {} has only its key column; nothing to update",
                    descriptor.qualified_name()
                ),
            )
            .into());
        }

        for assignment in &assignments {
            if assignment.name.eq_ignore_ascii_case(&key_column) {
                return Err(AppError::new(
                    ErrorKind::Query,
                    format!(
                        "Cannot update key column '{}'; it identifies the row",
                        key_column
                    ),
                )
                .into());
            }
        }

        // Load the current row so unset columns keep their values.
        let select_sql = format!(
            "SELECT {} FROM {} WHERE {} = @P1;",
            descriptor.quoted_column_list(),
            descriptor.qualified_name(),
            quote_identifier(&key_column),
        );
        let mut select_query = Query::new(select_sql);
        select_query.bind(key_value);
        let result_sets = executor::run_query(select_query, &mut client).await?;
        let current = result_sets
            .first()
            .and_then(|rs| rs.first_row_as_strings())
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::Query,
                    format!(
                        "No row in {} with {} = '{}'",
                        descriptor.qualified_name(),
                        key_column,
                        key_value
                    ),
                )
            })?;

        let mut fields = form::build_form(&descriptor.columns);
        form::prefill(&mut fields, &current);
        insert::apply_assignments(&mut fields, &assignments, &descriptor)?;
        form::validate_submission(&fields)?;

        // The key column is never part of the SET list.
        let set_fields = &fields[1..];
        let set_list = set_fields
            .iter()
            .enumerate()
            .map(|(idx, field)| format!("{} = @P{}", quote_identifier(&field.column), idx + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let update_sql = format!(
            "UPDATE {} SET {} WHERE {} = @P{};",
            descriptor.qualified_name(),
            set_list,
            quote_identifier(&key_column),
            set_fields.len() + 1,
        );

        let mut update_query = Query::new(update_sql);
        for field in set_fields {
            update_query.bind(field.value.as_str());
        }
        update_query.bind(key_value);
        let affected = executor::run_execute(update_query, &mut client).await?;
        info!(table = %descriptor.qualified_name(), affected, "update");

        Ok::<_, anyhow::Error>((descriptor, affected))
    })?;

    if args.quiet {
        return Ok(());
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": { "schema": descriptor.schema, "name": descriptor.name },
            "updated": affected,
        });
        let body = json_out::emit_json_value(&payload, common::json_pretty(&resolved))?;
        println!("{}", body);
        return Ok(());
    }

    println!(
        "Updated {} row(s) in {}",
        affected,
        descriptor.qualified_name()
    );

    Ok(())
}
