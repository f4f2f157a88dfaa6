use anyhow::Result;
use serde_json::json;
use tiberius::Query;
use tracing::info;

use crate::cli::{CliArgs, InsertArgs};
use crate::commands::{common, sql_utils};
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::db::schema::{self, TableDescriptor};
use crate::error::{AppError, ErrorKind};
use crate::form::{self, FormField};
use crate::output::json as json_out;

pub fn run(args: &CliArgs, cmd: &InsertArgs) -> Result<()> {
    let table_name = common::require_table(cmd.table.as_deref())?;

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

        let mut fields = form::build_form(&descriptor.columns);
        apply_assignments(&mut fields, &assignments, &descriptor)?;
        form::validate_submission(&fields)?;

        let placeholders = (1..=fields.len())
            .map(|idx| format!("@P{}", idx))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            descriptor.qualified_name(),
            descriptor.quoted_column_list(),
            placeholders,
        );

        let mut query = Query::new(sql);
        for field in &fields {
            query.bind(field.value.as_str());
        }
        let affected = executor::run_execute(query, &mut client).await?;
        info!(table = %descriptor.qualified_name(), affected, "insert");

        Ok::<_, anyhow::Error>((descriptor, affected))
    })?;

    if args.quiet {
        return Ok(());
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": { "schema": descriptor.schema, "name": descriptor.name },
            "inserted": affected,
        });
        let body = json_out::emit_json_value(&payload, common::json_pretty(&resolved))?;
        println!("{}", body);
        return Ok(());
    }

    println!(
        "Inserted {} row(s) into {}",
        affected,
        descriptor.qualified_name()
    );

    Ok(())
}

/// Copy `--set` values onto the form, matching columns case-insensitively.
/// Unknown column names are a hard error.
pub fn apply_assignments(
    fields: &mut [FormField],
    assignments: &[sql_utils::NamedValue],
    descriptor: &TableDescriptor,
) -> Result<()> {
    for assignment in assignments {
        let field = fields
            .iter_mut()
            .find(|field| field.column.eq_ignore_ascii_case(&assignment.name))
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::Schema,
                    format!(
                        "Unknown column '{}' in table {}",
                        assignment.name,
                        descriptor.qualified_name()
                    ),
                )
            })?;
        field.value = assignment.value.clone();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::ColumnDescriptor;

    fn descriptor() -> TableDescriptor {
        TableDescriptor {
            schema: "dbo".to_string(),
            name: "people".to_string(),
            columns: vec![
                ColumnDescriptor {
                    name: "id".to_string(),
                    data_type: "int".to_string(),
                },
                ColumnDescriptor {
                    name: "name".to_string(),
                    data_type: "nvarchar".to_string(),
                },
            ],
        }
    }

    #[test]
    fn applies_values_case_insensitively() {
        let descriptor = descriptor();
        let mut fields = form::build_form(&descriptor.columns);
        let assignments = sql_utils::parse_named_values(&["ID=5".to_string()]).unwrap();
        apply_assignments(&mut fields, &assignments, &descriptor).unwrap();
        assert_eq!(fields[0].value, "5");
    }

    #[test]
    fn rejects_unknown_columns() {
        let descriptor = descriptor();
        let mut fields = form::build_form(&descriptor.columns);
        let assignments = sql_utils::parse_named_values(&["missing=1".to_string()]).unwrap();
        let err = apply_assignments(&mut fields, &assignments, &descriptor).unwrap_err();
        assert!(err.to_string().contains("Unknown column 'missing'"));
    }

    #[test]
    fn unset_columns_fail_submission() {
        let descriptor = descriptor();
        let mut fields = form::build_form(&descriptor.columns);
        let assignments = sql_utils::parse_named_values(&["id=5".to_string()]).unwrap();
        apply_assignments(&mut fields, &assignments, &descriptor).unwrap();
        assert!(form::validate_submission(&fields).is_err());
    }
}
