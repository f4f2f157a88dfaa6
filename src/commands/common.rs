use anyhow::{Result, anyhow};

use crate::cli::CliArgs;
use crate::config::OutputFormat;
use crate::config::{self, CliOverrides, ResolvedConfig};
use crate::error::{AppError, ErrorKind};
use crate::output;

pub fn overrides_from_args(args: &CliArgs) -> CliOverrides {
    CliOverrides {
        config_path: args.config_path.clone(),
        env_file: args.env_file.clone(),
        profile: args.profile.clone(),
        server: args.server.clone(),
        port: args.port,
        database: args.database.clone(),
        user: args.user.clone(),
        password: args.password.clone(),
        timeout_ms: args.timeout_ms,
        encrypt: args.encrypt,
        trust_cert: args.trust_cert,
    }
}

pub fn load_config(args: &CliArgs) -> Result<ResolvedConfig> {
    let overrides = overrides_from_args(args);
    config::load_from_system(&overrides)
        .map_err(|err| AppError::new(ErrorKind::Config, err.to_string()).into())
}

pub fn output_format(args: &CliArgs, resolved: &ResolvedConfig) -> OutputFormat {
    output::select_format(&args.output, &resolved.settings)
}

pub fn json_pretty(resolved: &ResolvedConfig) -> bool {
    resolved.settings.output.json_pretty
}

pub fn allow_write(args: &CliArgs, resolved: &ResolvedConfig) -> bool {
    args.allow_write || resolved.settings.allow_write_default
}

/// Gate for the structured DML commands.
pub fn ensure_write_allowed(args: &CliArgs, resolved: &ResolvedConfig) -> Result<()> {
    if allow_write(args, resolved) {
        return Ok(());
    }
    Err(AppError::new(
        ErrorKind::Query,
        "Write operations require --allow-write (or allowWriteDefault in config)",
    )
    .into())
}

pub fn require_table(table: Option<&str>) -> Result<&str> {
    table.ok_or_else(|| anyhow!("Missing required TABLE argument"))
}

/// Split `schema.table` when no explicit schema was given; otherwise fall
/// back to the configured default schema.
pub fn resolve_schema_table(
    schema: Option<&str>,
    table: &str,
    resolved: &ResolvedConfig,
) -> (String, String) {
    if schema.is_none() {
        if let Some((left, right)) = table.split_once('.') {
            return (left.to_string(), right.to_string());
        }
    }

    let schema = schema
        .map(|s| s.to_string())
        .unwrap_or_else(|| resolved.connection.schema.clone());

    (schema, table.to_string())
}

/// Loose conversion for COUNT(*) cells, which surface as different value
/// shapes depending on the server's type choice.
pub fn value_as_u64(value: &crate::db::types::Value) -> Option<u64> {
    use crate::db::types::Value;
    match value {
        Value::Int(v) => (*v).try_into().ok(),
        Value::Float(v) => Some(*v as u64),
        Value::Text(s) => s.parse::<u64>().ok(),
        _ => None,
    }
}

pub fn parse_limit(value: Option<u64>, default: u64, max: u64) -> u64 {
    match value {
        Some(v) if v < 1 => default,
        Some(v) if v > max => max,
        Some(v) => v,
        None => default,
    }
}

pub fn parse_offset(value: Option<u64>) -> u64 {
    value.unwrap_or(0)
}
