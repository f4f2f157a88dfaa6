mod args;

pub use args::{
    CliArgs, ColumnsArgs, CommandKind, ConfigArgs, DeleteArgs, ExportArgs, FormArgs, InitArgs,
    InsertArgs, OutputFlags, RowsArgs, SqlArgs, StatusArgs, TablesArgs, UpdateArgs, build_cli,
};

pub fn parse() -> CliArgs {
    args::parse_args()
}
