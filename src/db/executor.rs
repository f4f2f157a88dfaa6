use anyhow::Result;
use chrono::{Duration, NaiveDate};

use crate::db::client::Client;
use crate::db::types::{Column, ResultSet, Value};
use crate::error::{AppError, ErrorKind};

pub async fn run_query(query: tiberius::Query<'_>, client: &mut Client) -> Result<Vec<ResultSet>> {
    let stream = query
        .query(client)
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
    collect_result_sets(stream).await
}

/// Run a statement for its side effect and return the total affected row
/// count across all statements in the batch.
pub async fn run_execute(query: tiberius::Query<'_>, client: &mut Client) -> Result<u64> {
    let result = query
        .execute(client)
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
    Ok(result.rows_affected().iter().sum())
}

pub async fn collect_result_sets(stream: tiberius::QueryStream<'_>) -> Result<Vec<ResultSet>> {
    let result_sets = stream
        .into_results()
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
    let mut output = Vec::new();

    for rows in result_sets {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| Column {
                        name: col.name().to_string(),
                        data_type: None,
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut converted_rows = Vec::new();
        for row in rows {
            let values = row.cells().map(|(_, data)| map_column_data(data)).collect();
            converted_rows.push(values);
        }

        output.push(ResultSet {
            columns,
            rows: converted_rows,
        });
    }

    Ok(output)
}

fn map_column_data(data: &tiberius::ColumnData<'_>) -> Value {
    use tiberius::ColumnData::*;
    match data {
        U8(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I16(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I32(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I64(value) => value.map(Value::Int).unwrap_or(Value::Null),
        F32(value) => value.map(|v| Value::Float(v as f64)).unwrap_or(Value::Null),
        F64(value) => value.map(Value::Float).unwrap_or(Value::Null),
        Bit(value) => value.map(Value::Bool).unwrap_or(Value::Null),
        String(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Guid(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Binary(value) => value
            .as_ref()
            .map(|v| Value::Text(format!("{:?}", v)))
            .unwrap_or(Value::Null),
        Numeric(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Xml(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        // Legacy datetime: days since 1900-01-01, fragments in 1/300 s.
        DateTime(value) => value
            .as_ref()
            .and_then(|v| {
                let date = date_from_days(1900, v.days() as i64)?;
                let secs = (v.seconds_fragments() / 300) as u64;
                Some(text(format!("{} {}", date.format("%Y-%m-%d"), format_hms(secs))))
            })
            .unwrap_or(Value::Null),
        // Smalldatetime: days since 1900-01-01, fragments in minutes.
        SmallDateTime(value) => value
            .as_ref()
            .and_then(|v| {
                let date = date_from_days(1900, v.days() as i64)?;
                let mins = v.seconds_fragments() as u64;
                Some(text(format!("{} {}", date.format("%Y-%m-%d"), format_hms(mins * 60))))
            })
            .unwrap_or(Value::Null),
        #[cfg(feature = "tds73")]
        Time(value) => value
            .map(|v| text(format_tds_time(v)))
            .unwrap_or(Value::Null),
        // TDS 7.3 date types count days from 0001-01-01.
        #[cfg(feature = "tds73")]
        Date(value) => value
            .and_then(|v| date_from_days(1, v.days() as i64))
            .map(|d| text(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        #[cfg(feature = "tds73")]
        DateTime2(value) => value
            .and_then(|v| {
                let date = date_from_days(1, v.date().days() as i64)?;
                Some(text(format!(
                    "{} {}",
                    date.format("%Y-%m-%d"),
                    format_tds_time(v.time())
                )))
            })
            .unwrap_or(Value::Null),
        #[cfg(feature = "tds73")]
        DateTimeOffset(value) => value
            .and_then(|v| {
                let date = date_from_days(1, v.datetime2().date().days() as i64)?;
                let offset_mins = v.offset();
                let sign = if offset_mins >= 0 { '+' } else { '-' };
                let abs_mins = offset_mins.unsigned_abs();
                Some(text(format!(
                    "{} {} {}{:02}:{:02}",
                    date.format("%Y-%m-%d"),
                    format_tds_time(v.datetime2().time()),
                    sign,
                    abs_mins / 60,
                    abs_mins % 60
                )))
            })
            .unwrap_or(Value::Null),
    }
}

fn text(value: String) -> Value {
    Value::Text(value)
}

fn date_from_days(epoch_year: i32, days: i64) -> Option<NaiveDate> {
    let delta = Duration::try_days(days)?;
    NaiveDate::from_ymd_opt(epoch_year, 1, 1)?.checked_add_signed(delta)
}

fn format_hms(total_secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

#[cfg(feature = "tds73")]
fn format_tds_time(time: tiberius::time::Time) -> String {
    let nanos = time.increments() * 10u64.pow(9 - time.scale() as u32);
    let base = format_hms(nanos / 1_000_000_000);
    let frac_nanos = nanos % 1_000_000_000;
    if frac_nanos == 0 {
        return base;
    }
    let frac = format!("{:09}", frac_nanos);
    format!("{}.{}", base, frac.trim_end_matches('0'))
}
