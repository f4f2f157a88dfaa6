//! Table and column metadata from `INFORMATION_SCHEMA`.
//!
//! Descriptors are fetched fresh on every command and never cached across
//! invocations. Only the column name and reported data type are captured.

use anyhow::Result;
use serde::Serialize;
use tiberius::Query;

use crate::db::client::Client;
use crate::db::executor;
use crate::db::types::Value;
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// The key column is assumed to be the first column in declaration
    /// order. Nothing verifies it is actually a primary key; update and
    /// delete paths key on it regardless.
    pub fn key_column(&self) -> Result<&ColumnDescriptor> {
        self.columns.first().ok_or_else(|| {
            AppError::new(
                ErrorKind::Schema,
                format!("Table '{}.{}' has no columns", self.schema, self.name),
            )
            .into()
        })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|col| col.name.as_str()).collect()
    }

    /// `[schema].[name]` for interpolation into statements.
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.name)
        )
    }

    /// Bracket-quoted column list in declaration order.
    pub fn quoted_column_list(&self) -> String {
        self.columns
            .iter()
            .map(|col| quote_identifier(&col.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|col| col.name.eq_ignore_ascii_case(name))
    }
}

/// Fetch the ordered column list for one table. Errors with a Schema kind
/// when the table does not exist in the given schema.
pub async fn fetch_table(client: &mut Client, schema: &str, table: &str) -> Result<TableDescriptor> {
    let sql = r#"
SELECT COLUMN_NAME, DATA_TYPE
FROM INFORMATION_SCHEMA.COLUMNS
WHERE TABLE_NAME = @P1
  AND TABLE_SCHEMA = @P2
ORDER BY ORDINAL_POSITION;
"#;
    let mut query = Query::new(sql);
    query.bind(table);
    query.bind(schema);
    let result_sets = executor::run_query(query, client).await?;
    let result_set = result_sets.into_iter().next().unwrap_or_default();

    if result_set.rows.is_empty() {
        return Err(AppError::new(
            ErrorKind::Schema,
            format!("Table '{}.{}' not found", schema, table),
        )
        .into());
    }

    let columns = result_set
        .rows
        .iter()
        .map(|row| ColumnDescriptor {
            name: string_cell(row.first()),
            data_type: string_cell(row.get(1)),
        })
        .collect();

    Ok(TableDescriptor {
        schema: schema.to_string(),
        name: table.to_string(),
        columns,
    })
}

fn string_cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::Text(s)) => s.clone(),
        Some(other) => other.as_display(),
        None => String::new(),
    }
}

/// Bracket-quote a simple identifier; anything already containing quoting
/// or punctuation is passed through untouched.
pub fn quote_identifier(input: &str) -> String {
    if is_simple_identifier(input) {
        format!("[{}]", input)
    } else {
        input.to_string()
    }
}

fn is_simple_identifier(input: &str) -> bool {
    !input.is_empty() && input.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn key_column_is_first_in_declaration_order() {
        let table = descriptor();
        assert_eq!(table.key_column().unwrap().name, "id");
    }

    #[test]
    fn key_column_errors_on_empty_table() {
        let table = TableDescriptor {
            schema: "dbo".to_string(),
            name: "empty".to_string(),
            columns: Vec::new(),
        };
        assert!(table.key_column().is_err());
    }

    #[test]
    fn quotes_qualified_name() {
        let table = descriptor();
        assert_eq!(table.qualified_name(), "[dbo].[people]");
        assert_eq!(table.quoted_column_list(), "[id], [name]");
    }

    #[test]
    fn find_column_is_case_insensitive() {
        let table = descriptor();
        assert_eq!(table.find_column("NAME").unwrap().name, "name");
        assert!(table.find_column("missing").is_none());
    }

    #[test]
    fn quoting_passes_through_complex_input() {
        assert_eq!(quote_identifier("people"), "[people]");
        assert_eq!(quote_identifier("[already]"), "[already]");
        assert_eq!(quote_identifier(""), "");
    }
}
