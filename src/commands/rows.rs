use anyhow::Result;
use serde_json::json;
use tiberius::Query;

use crate::cli::{CliArgs, RowsArgs};
use crate::commands::{common, paging};
use crate::config::OutputFormat;
use crate::db::client;
use crate::db::executor;
use crate::db::schema;
use crate::output::{TableOptions, json as json_out, table};

const LIMIT_DEFAULT: u64 = 50;
const LIMIT_MAX: u64 = 500;

pub fn run(args: &CliArgs, cmd: &RowsArgs) -> Result<()> {
    let table_name = common::require_table(cmd.table.as_deref())?;

    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);
    let (schema_name, table_name) =
        common::resolve_schema_table(cmd.schema.as_deref(), table_name, &resolved);

    let limit = common::parse_limit(cmd.limit, LIMIT_DEFAULT, LIMIT_MAX);
    let offset = common::parse_offset(cmd.offset);

    let (result_set, total, descriptor) = tokio::runtime::Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        let descriptor = schema::fetch_table(&mut client, &schema_name, &table_name).await?;

        let qualified = descriptor.qualified_name();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY (SELECT 0) OFFSET @P1 ROWS FETCH NEXT @P2 ROWS ONLY;",
            descriptor.quoted_column_list(),
            qualified,
        );
        let mut query = Query::new(sql);
        query.bind(offset as i64);
        query.bind(limit as i64);
        let result_sets = executor::run_query(query, &mut client).await?;
        let result_set = result_sets.into_iter().next().unwrap_or_default();

        let count_query = Query::new(format!("SELECT COUNT(*) AS total FROM {};", qualified));
        let count_sets = executor::run_query(count_query, &mut client).await?;
        let total = count_sets
            .first()
            .and_then(|rs| rs.rows.first())
            .and_then(|row| row.first())
            .and_then(common::value_as_u64)
            .unwrap_or(result_set.rows.len() as u64);

        Ok::<_, anyhow::Error>((result_set, total, descriptor))
    })?;

    let count = result_set.rows.len() as u64;
    let paging = paging::build_paging(total, count, offset, limit);

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "table": { "schema": descriptor.schema, "name": descriptor.name },
            "columns": descriptor.column_names(),
            "rows": result_set.rows,
            "total": paging.total,
            "offset": paging.offset,
            "limit": paging.limit,
            "hasMore": paging.has_more,
            "nextOffset": paging.next_offset,
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

    let rendered = table::render_result_set_table(&result_set, format, &options);
    println!("{}", rendered);

    Ok(())
}
