use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, FormArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::schema;
use crate::db::types::{Column, ResultSet, Value};
use crate::form::{self, FormField};
use crate::output::{TableOptions, json as json_out, table};

pub fn run(args: &CliArgs, cmd: &FormArgs) -> Result<()> {
    let table_name = common::require_table(cmd.table.as_deref())?;

    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    let (schema_name, table_name) =
        common::resolve_schema_table(cmd.schema.as_deref(), table_name, &resolved);

    let descriptor = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        schema::fetch_table(&mut client, &schema_name, &table_name).await
    })?;

    let fields = form::build_form(&descriptor.columns);

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": { "schema": descriptor.schema, "name": descriptor.name },
            "keyColumn": descriptor.key_column()?.name,
            "fields": fields,
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
        table::render_result_set_table(&fields_to_result_set(&fields), format, &TableOptions::default());
    println!("{}", rendered);

    Ok(())
}

fn fields_to_result_set(fields: &[FormField]) -> ResultSet {
    ResultSet {
        columns: ["column", "dataType", "input", "default"]
            .iter()
            .map(|name| Column {
                name: (*name).to_string(),
                data_type: None,
            })
            .collect(),
        rows: fields
            .iter()
            .map(|field| {
                vec![
                    Value::Text(field.column.clone()),
                    Value::Text(field.data_type.clone()),
                    Value::Text(field.kind.as_str().to_string()),
                    Value::Text(field.value.clone()),
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
    fn renders_one_row_per_column() {
        let columns = vec![
            ColumnDescriptor {
                name: "id".to_string(),
                data_type: "int".to_string(),
            },
            ColumnDescriptor {
                name: "born".to_string(),
                data_type: "date".to_string(),
            },
        ];
        let fields = form::build_form(&columns);
        let rs = fields_to_result_set(&fields);
        assert_eq!(rs.rows.len(), 2);
        assert_eq!(rs.rows[0][2], Value::Text("numeric".to_string()));
        assert_eq!(rs.rows[1][2], Value::Text("date".to_string()));
        assert_eq!(rs.rows[0][3], Value::Text(String::new()));
    }
}
