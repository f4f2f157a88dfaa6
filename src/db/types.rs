use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Plain string form, used for table cells, CSV fields, and form
    /// prefills. NULL maps to the empty string; renderers that want a
    /// visible NULL marker handle `Value::Null` before calling this.
    pub fn as_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => value.to_string(),
            Value::Text(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn first_row_as_strings(&self) -> Option<Vec<String>> {
        self.rows
            .first()
            .map(|row| row.iter().map(|value| value.as_display()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_displays_empty() {
        assert_eq!(Value::Null.as_display(), "");
        assert_eq!(Value::Int(42).as_display(), "42");
        assert_eq!(Value::Text("x".to_string()).as_display(), "x");
    }

    #[test]
    fn first_row_as_strings_handles_empty_set() {
        assert!(ResultSet::default().first_row_as_strings().is_none());
    }
}
