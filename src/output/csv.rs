use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::db::types::ResultSet;

/// Export file name: `<table>_<YYYYMMDD_HHMMSS>.csv`.
pub fn export_file_name(table: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.csv", table, now.format("%Y%m%d_%H%M%S"))
}

/// Write one result set as CSV: a header row of column names followed by
/// the data rows. NULL becomes an empty field.
pub fn write_result_set(dir: &Path, file_name: &str, result_set: &ResultSet) -> Result<PathBuf> {
    let target = dir.join(file_name);
    let mut writer = csv::Writer::from_path(&target)?;

    let headers = result_set
        .columns
        .iter()
        .map(|col| col.name.as_str())
        .collect::<Vec<_>>();
    writer.write_record(headers)?;

    for row in &result_set.rows {
        let record = row.iter().map(|value| value.as_display()).collect::<Vec<_>>();
        writer.write_record(record)?;
    }
    writer.flush()?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::{Column, Value};
    use chrono::TimeZone;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let mut dir = env::temp_dir();
        dir.push(format!("ssedit-csv-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn names_export_after_table_and_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 33).unwrap();
        assert_eq!(export_file_name("people", now), "people_20240309_140533.csv");
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = temp_dir("rows");
        let result_set = ResultSet {
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: None,
                },
                Column {
                    name: "name".to_string(),
                    data_type: None,
                },
            ],
            rows: vec![
                vec![Value::Int(1), Value::Text("ada".to_string())],
                vec![Value::Int(2), Value::Null],
            ],
        };

        let path = write_result_set(&dir, "out.csv", &result_set).expect("write csv");
        let content = fs::read_to_string(path).expect("read csv");
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("id,name"));
        assert_eq!(lines.next(), Some("1,ada"));
        assert_eq!(lines.next(), Some("2,"));
    }
}
