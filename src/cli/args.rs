use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};

#[derive(Debug, Clone)]
pub struct OutputFlags {
    pub json: bool,
    pub markdown: bool,
    pub pretty: bool,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub profile: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
    pub allow_write: bool,
    pub encrypt: Option<bool>,
    pub trust_cert: Option<bool>,
    pub output: OutputFlags,
    pub verbose: u8,
    pub quiet: bool,
    pub command: CommandKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Help { command: Option<String> },
    Status(StatusArgs),
    Tables(TablesArgs),
    Columns(ColumnsArgs),
    Rows(RowsArgs),
    Form(FormArgs),
    Insert(InsertArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
    Sql(SqlArgs),
    Export(ExportArgs),
    Init(InitArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusArgs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablesArgs {
    pub like: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnsArgs {
    pub table: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsArgs {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormArgs {
    pub table: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertArgs {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub set: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateArgs {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub key: Option<String>,
    pub set: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteArgs {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlArgs {
    pub sql: Option<String>,
    pub file: Option<PathBuf>,
    pub params: Vec<String>,
    pub max_rows: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArgs {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
    pub force: bool,
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigArgs;

pub fn build_cli() -> Command {
    let mut cmd = Command::new("ssedit")
        .about("SQL Server administration CLI for browsing schemas and editing rows")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .subcommand_value_name("COMMAND");

    cmd = add_global_args(cmd);

    cmd = cmd.subcommand(command_help());
    cmd = cmd.subcommand(command_status());
    cmd = cmd.subcommand(command_tables());
    cmd = cmd.subcommand(command_columns());
    cmd = cmd.subcommand(command_rows());
    cmd = cmd.subcommand(command_form());
    cmd = cmd.subcommand(command_insert());
    cmd = cmd.subcommand(command_update());
    cmd = cmd.subcommand(command_delete());
    cmd = cmd.subcommand(command_sql());
    cmd = cmd.subcommand(command_export());
    cmd = cmd.subcommand(command_init());
    cmd = cmd.subcommand(command_config());

    cmd
}

pub fn parse_args() -> CliArgs {
    let matches = build_cli().get_matches();
    parse_matches(&matches)
}

fn add_global_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("config")
            .long("config")
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .global(true)
            .help("Override config file location"),
    )
    .arg(
        Arg::new("env-file")
            .long("env-file")
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .global(true)
            .help("Load environment variables from file (default: .env)"),
    )
    .arg(
        Arg::new("profile")
            .long("profile")
            .value_name("NAME")
            .global(true)
            .help("Select connection profile"),
    )
    .arg(
        Arg::new("server")
            .long("server")
            .value_name("HOST")
            .global(true)
            .help("SQL Server hostname"),
    )
    .arg(
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .value_parser(clap::value_parser!(u16))
            .global(true)
            .help("SQL Server port (default: 1433)"),
    )
    .arg(
        Arg::new("database")
            .long("database")
            .value_name("NAME")
            .global(true)
            .help("Database name (default: master)"),
    )
    .arg(
        Arg::new("user")
            .long("user")
            .value_name("USER")
            .global(true)
            .help("SQL Server username"),
    )
    .arg(
        Arg::new("password")
            .long("password")
            .value_name("PASS")
            .global(true)
            .help("SQL Server password"),
    )
    .arg(
        Arg::new("timeout")
            .long("timeout")
            .value_name("MS")
            .value_parser(clap::value_parser!(u64))
            .global(true)
            .help("Connection timeout in milliseconds"),
    )
    .arg(
        Arg::new("allow-write")
            .long("allow-write")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Allow write operations (insert/update/delete and free-form DML)"),
    )
    .arg(
        Arg::new("encrypt")
            .long("encrypt")
            .value_parser(clap::value_parser!(bool))
            .global(true)
            .help("Enable connection encryption"),
    )
    .arg(
        Arg::new("trust-cert")
            .long("trust-cert")
            .value_parser(clap::value_parser!(bool))
            .global(true)
            .help("Trust server certificate"),
    )
    .arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Output as JSON"),
    )
    .arg(
        Arg::new("markdown")
            .long("markdown")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Force markdown table output"),
    )
    .arg(
        Arg::new("pretty")
            .long("pretty")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Force pretty-printed table output"),
    )
    .arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .global(true)
            .help("Enable debug logging"),
    )
    .arg(
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Suppress non-error output"),
    )
}

fn table_arg() -> Arg {
    Arg::new("table")
        .index(1)
        .value_name("TABLE")
        .help("Table name, optionally schema-qualified (schema.table)")
}

fn schema_arg() -> Arg {
    Arg::new("schema")
        .long("schema")
        .value_name("name")
        .help("Schema name (default from config, usually dbo)")
}

fn set_arg() -> Arg {
    Arg::new("set")
        .long("set")
        .value_name("col=value")
        .action(ArgAction::Append)
        .help("Column value, repeatable")
}

fn key_arg() -> Arg {
    Arg::new("key")
        .long("key")
        .value_name("value")
        .help("Value of the key column (the table's first column)")
}

fn command_help() -> Command {
    Command::new("help")
        .about("Show help for commands")
        .arg(Arg::new("command").value_name("COMMAND"))
}

fn command_status() -> Command {
    Command::new("status")
        .about("Connectivity smoke test")
        .visible_alias("check")
}

fn command_tables() -> Command {
    Command::new("tables")
        .about("List base tables")
        .arg(Arg::new("like").long("like").value_name("pattern"))
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("n")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .value_name("n")
                .value_parser(clap::value_parser!(u64)),
        )
}

fn command_columns() -> Command {
    Command::new("columns")
        .about("Show the column names and types of a table")
        .arg(table_arg())
        .arg(schema_arg())
}

fn command_rows() -> Command {
    Command::new("rows")
        .about("View rows of a table (up to 50 by default)")
        .visible_alias("view")
        .arg(table_arg())
        .arg(schema_arg())
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("n")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .value_name("n")
                .value_parser(clap::value_parser!(u64)),
        )
}

fn command_form() -> Command {
    Command::new("form")
        .about("Show the entry form derived from a table's columns")
        .arg(table_arg())
        .arg(schema_arg())
}

fn command_insert() -> Command {
    Command::new("insert")
        .about("Insert a row; every column needs a --set value")
        .visible_alias("add")
        .arg(table_arg())
        .arg(schema_arg())
        .arg(set_arg())
}

fn command_update() -> Command {
    Command::new("update")
        .about("Update the row matching --key; unset columns keep their current values")
        .visible_alias("modify")
        .arg(table_arg())
        .arg(schema_arg())
        .arg(key_arg())
        .arg(set_arg())
}

fn command_delete() -> Command {
    Command::new("delete")
        .about("Delete the row matching --key")
        .visible_alias("remove")
        .arg(table_arg())
        .arg(schema_arg())
        .arg(key_arg())
}

fn command_sql() -> Command {
    Command::new("sql")
        .about("Run free-form SQL (read-only unless --allow-write)")
        .visible_alias("query")
        .arg(Arg::new("sql").index(1).value_name("SQL"))
        .arg(
            Arg::new("file")
                .long("file")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .help("Read SQL from a script file (GO batch separators supported)"),
        )
        .arg(
            Arg::new("param")
                .long("param")
                .value_name("name=value")
                .action(ArgAction::Append)
                .help("Named parameter, repeatable"),
        )
        .arg(
            Arg::new("max-rows")
                .long("max-rows")
                .value_name("n")
                .value_parser(clap::value_parser!(u64))
                .help("Limit displayed rows per result set"),
        )
}

fn command_export() -> Command {
    Command::new("export")
        .about("Export all rows of a table to a timestamped CSV file")
        .arg(table_arg())
        .arg(schema_arg())
        .arg(
            Arg::new("dir")
                .long("dir")
                .value_name("PATH")
                .value_hint(ValueHint::DirPath)
                .help("Target directory (default: working directory)"),
        )
}

fn command_init() -> Command {
    Command::new("init")
        .about("Create config file")
        .arg(
            Arg::new("path")
                .long("path")
                .value_name("path")
                .value_hint(ValueHint::FilePath),
        )
        .arg(Arg::new("force").long("force").action(ArgAction::SetTrue))
        .arg(Arg::new("profile").long("profile").value_name("name"))
}

fn command_config() -> Command {
    Command::new("config").about("Display resolved config")
}

fn parse_matches(matches: &ArgMatches) -> CliArgs {
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let env_file = matches.get_one::<String>("env-file").map(PathBuf::from);
    let profile = matches.get_one::<String>("profile").cloned();
    let server = matches.get_one::<String>("server").cloned();
    let port = matches.get_one::<u16>("port").copied();
    let database = matches.get_one::<String>("database").cloned();
    let user = matches.get_one::<String>("user").cloned();
    let password = matches.get_one::<String>("password").cloned();
    let timeout_ms = matches.get_one::<u64>("timeout").copied();
    let allow_write = matches.get_flag("allow-write");
    let encrypt = matches.get_one::<bool>("encrypt").copied();
    let trust_cert = matches.get_one::<bool>("trust-cert").copied();
    let output = OutputFlags {
        json: matches.get_flag("json"),
        markdown: matches.get_flag("markdown"),
        pretty: matches.get_flag("pretty"),
    };
    let verbose = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");

    let command = match matches.subcommand() {
        Some(("help", sub_m)) => CommandKind::Help {
            command: sub_m.get_one::<String>("command").cloned(),
        },
        Some(("status", _)) => CommandKind::Status(StatusArgs),
        Some(("tables", sub_m)) => CommandKind::Tables(TablesArgs {
            like: sub_m.get_one::<String>("like").cloned(),
            limit: sub_m.get_one::<u64>("limit").copied(),
            offset: sub_m.get_one::<u64>("offset").copied(),
        }),
        Some(("columns", sub_m)) => CommandKind::Columns(ColumnsArgs {
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
        }),
        Some(("rows", sub_m)) => CommandKind::Rows(RowsArgs {
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
            limit: sub_m.get_one::<u64>("limit").copied(),
            offset: sub_m.get_one::<u64>("offset").copied(),
        }),
        Some(("form", sub_m)) => CommandKind::Form(FormArgs {
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
        }),
        Some(("insert", sub_m)) => CommandKind::Insert(InsertArgs {
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
            set: collected(sub_m, "set"),
        }),
        Some(("update", sub_m)) => CommandKind::Update(UpdateArgs {
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
            key: sub_m.get_one::<String>("key").cloned(),
            set: collected(sub_m, "set"),
        }),
        Some(("delete", sub_m)) => CommandKind::Delete(DeleteArgs {
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
            key: sub_m.get_one::<String>("key").cloned(),
        }),
        Some(("sql", sub_m)) => CommandKind::Sql(SqlArgs {
            sql: sub_m.get_one::<String>("sql").cloned(),
            file: sub_m.get_one::<String>("file").map(PathBuf::from),
            params: collected(sub_m, "param"),
            max_rows: sub_m.get_one::<u64>("max-rows").copied(),
        }),
        Some(("export", sub_m)) => CommandKind::Export(ExportArgs {
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
            dir: sub_m.get_one::<String>("dir").map(PathBuf::from),
        }),
        Some(("init", sub_m)) => CommandKind::Init(InitArgs {
            path: sub_m.get_one::<String>("path").map(PathBuf::from),
            force: sub_m.get_flag("force"),
            profile: sub_m.get_one::<String>("profile").cloned(),
        }),
        Some(("config", _)) => CommandKind::Config(ConfigArgs),
        _ => CommandKind::Help { command: None },
    };

    CliArgs {
        config_path,
        env_file,
        profile,
        server,
        port,
        database,
        user,
        password,
        timeout_ms,
        allow_write,
        encrypt,
        trust_cert,
        output,
        verbose,
        quiet,
        command,
    }
}

fn collected(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
