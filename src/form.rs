//! Schema-driven entry forms.
//!
//! Given the ordered column list of a table, derive one editable field per
//! column with an input kind inferred from the reported SQL type string.
//! The classification is substring-based and case-sensitive: reported types
//! come from `INFORMATION_SCHEMA` in lowercase (`int`, `decimal(10,2)`,
//! `datetime2`, ...), so `INT` in user-supplied text stays free text.

use serde::Serialize;

use crate::db::schema::ColumnDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Numeric,
    Date,
    Text,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Numeric => "numeric",
            InputKind::Date => "date",
            InputKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub column: String,
    pub data_type: String,
    pub kind: InputKind,
    pub value: String,
}

/// Classify a reported SQL type string. `int`/`decimal` are checked before
/// `date`, so a type string matching both falls to numeric.
pub fn infer_input_kind(data_type: &str) -> InputKind {
    if data_type.contains("int") || data_type.contains("decimal") {
        InputKind::Numeric
    } else if data_type.contains("date") {
        InputKind::Date
    } else {
        InputKind::Text
    }
}

/// One field per column, order preserved, values defaulted to empty.
pub fn build_form(columns: &[ColumnDescriptor]) -> Vec<FormField> {
    columns
        .iter()
        .map(|col| FormField {
            column: col.name.clone(),
            data_type: col.data_type.clone(),
            kind: infer_input_kind(&col.data_type),
            value: String::new(),
        })
        .collect()
}

/// Fill field values positionally, e.g. from an existing row. Extra values
/// are ignored; missing values leave the empty default in place.
pub fn prefill(fields: &mut [FormField], values: &[String]) {
    for (field, value) in fields.iter_mut().zip(values.iter()) {
        field.value = value.clone();
    }
}

/// Submit-time check: every field must carry a non-empty value. This is the
/// only validation the tool performs before handing values to the server.
pub fn validate_submission(fields: &[FormField]) -> anyhow::Result<()> {
    for field in fields {
        if field.value.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "Missing value for column '{}' (all columns are required)",
                field.column
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, data_type: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type: data_type.to_string(),
        }
    }

    #[test]
    fn int_and_decimal_types_are_numeric() {
        for ty in ["int", "bigint", "smallint", "tinyint", "decimal", "decimal(10,2)"] {
            assert_eq!(infer_input_kind(ty), InputKind::Numeric, "type {}", ty);
        }
    }

    #[test]
    fn date_types_are_date() {
        for ty in ["date", "datetime", "datetime2", "smalldatetime", "datetimeoffset"] {
            assert_eq!(infer_input_kind(ty), InputKind::Date, "type {}", ty);
        }
    }

    #[test]
    fn everything_else_is_text() {
        for ty in ["varchar", "nvarchar(50)", "char", "bit", "money", "float", "real", ""] {
            assert_eq!(infer_input_kind(ty), InputKind::Text, "type {}", ty);
        }
    }

    #[test]
    fn classification_is_case_sensitive() {
        assert_eq!(infer_input_kind("INT"), InputKind::Text);
        assert_eq!(infer_input_kind("DATETIME"), InputKind::Text);
    }

    #[test]
    fn build_form_preserves_order() {
        let columns = vec![
            col("id", "int"),
            col("name", "nvarchar(100)"),
            col("created", "datetime"),
        ];
        let fields = build_form(&columns);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].column, "id");
        assert_eq!(fields[0].kind, InputKind::Numeric);
        assert_eq!(fields[1].kind, InputKind::Text);
        assert_eq!(fields[2].kind, InputKind::Date);
        assert!(fields.iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn prefill_pairs_by_position() {
        let columns = vec![col("id", "int"), col("name", "varchar")];
        let mut fields = build_form(&columns);
        prefill(&mut fields, &["7".to_string(), "ada".to_string()]);
        assert_eq!(fields[0].value, "7");
        assert_eq!(fields[1].value, "ada");
    }

    #[test]
    fn submission_requires_every_value() {
        let columns = vec![col("id", "int"), col("name", "varchar")];
        let mut fields = build_form(&columns);
        fields[0].value = "1".to_string();
        let err = validate_submission(&fields).unwrap_err();
        assert!(err.to_string().contains("name"));

        fields[1].value = "ada".to_string();
        assert!(validate_submission(&fields).is_ok());
    }

    #[test]
    fn blank_values_do_not_pass() {
        let columns = vec![col("note", "text")];
        let mut fields = build_form(&columns);
        fields[0].value = "   ".to_string();
        assert!(validate_submission(&fields).is_err());
    }
}
