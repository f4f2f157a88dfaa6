use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, ColumnsArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::schema::{self, TableDescriptor};
use crate::db::types::{Column, ResultSet, Value};
use crate::output::{TableOptions, json as json_out, table};

pub fn run(args: &CliArgs, cmd: &ColumnsArgs) -> Result<()> {
    let table_name = common::require_table(cmd.table.as_deref())?;

    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    let (schema_name, table_name) =
        common::resolve_schema_table(cmd.schema.as_deref(), table_name, &resolved);

    let descriptor = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        schema::fetch_table(&mut client, &schema_name, &table_name).await
    })?;

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": { "schema": descriptor.schema, "name": descriptor.name },
            "columns": descriptor.columns,
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

    let rendered =
        table::render_result_set_table(&descriptor_to_result_set(&descriptor), format, &TableOptions::default());
    println!("{}", rendered);

    Ok(())
}

fn descriptor_to_result_set(descriptor: &TableDescriptor) -> ResultSet {
    ResultSet {
        columns: vec![
            Column {
                name: "column".to_string(),
                data_type: None,
            },
            Column {
                name: "dataType".to_string(),
                data_type: None,
            },
        ],
        rows: descriptor
            .columns
            .iter()
            .map(|col| {
                vec![
                    Value::Text(col.name.clone()),
                    Value::Text(col.data_type.clone()),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::ColumnDescriptor;

    #[test]
    fn descriptor_rows_keep_declaration_order() {
        let descriptor = TableDescriptor {
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
        };
        let rs = descriptor_to_result_set(&descriptor);
        assert_eq!(rs.rows.len(), 2);
        assert_eq!(rs.rows[0][0], Value::Text("id".to_string()));
        assert_eq!(rs.rows[1][1], Value::Text("nvarchar".to_string()));
    }
}
