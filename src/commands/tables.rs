use anyhow::Result;
use serde_json::json;
use tiberius::Query;

use crate::cli::{CliArgs, TablesArgs};
use crate::commands::{common, paging};
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::output::{TableOptions, json as json_out, table};

const LIMIT_DEFAULT: u64 = 200;
const LIMIT_MAX: u64 = 500;

pub fn run(args: &CliArgs, cmd: &TablesArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let limit = common::parse_limit(cmd.limit, LIMIT_DEFAULT, LIMIT_MAX);
    let offset = common::parse_offset(cmd.offset);
    let like = cmd.like.clone();

    let (rows, total) = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;

        let list_sql = r#"
WITH base AS (
    SELECT
        TABLE_SCHEMA AS schemaName,
        TABLE_NAME AS tableName,
        ROW_NUMBER() OVER (ORDER BY TABLE_SCHEMA, TABLE_NAME) AS rownum
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_TYPE = 'BASE TABLE'
      AND (@P1 IS NULL OR TABLE_NAME LIKE @P1)
)
SELECT schemaName AS [schema],
       tableName AS [name]
FROM base
WHERE rownum BETWEEN (@P2 + 1) AND (@P2 + @P3)
ORDER BY schemaName, tableName;
"#;
        let mut list_query = Query::new(list_sql);
        list_query.bind(like.as_deref());
        list_query.bind(offset as i64);
        list_query.bind(limit as i64);

        let list_sets = executor::run_query(list_query, &mut client).await?;
        let list_set = list_sets.into_iter().next().unwrap_or_default();

        let count_sql = r#"
SELECT COUNT(*) AS total
FROM INFORMATION_SCHEMA.TABLES
WHERE TABLE_TYPE = 'BASE TABLE'
  AND (@P1 IS NULL OR TABLE_NAME LIKE @P1);
"#;
        let mut count_query = Query::new(count_sql);
        count_query.bind(like.as_deref());
        let count_sets = executor::run_query(count_query, &mut client).await?;
        let total = count_sets
            .first()
            .and_then(|rs| rs.rows.first())
            .and_then(|row| row.first())
            .and_then(common::value_as_u64)
            .unwrap_or(0);

        Ok::<_, anyhow::Error>((list_set, total))
    })?;

    let count = rows.rows.len() as u64;
    let paging = paging::build_paging(total, count, offset, limit);

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "total": paging.total,
            "count": paging.count,
            "offset": paging.offset,
            "limit": paging.limit,
            "hasMore": paging.has_more,
            "nextOffset": paging.next_offset,
            "tables": json_out::result_set_rows_to_objects(&rows),
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

    let mut options = TableOptions::default();
    if paging.total > 0 {
        let page_limit = if count == 0 { limit } else { count };
        options.pagination = Some(table::Pagination {
            total: Some(paging.total),
            offset: paging.offset,
            limit: page_limit,
        });
    }
    let rendered = table::render_result_set_table(&rows, format, &options);
    println!("{}", rendered);

    Ok(())
}
