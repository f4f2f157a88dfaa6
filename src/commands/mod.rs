mod columns;
mod common;
mod config;
mod delete;
mod export;
mod form;
mod help;
mod init;
mod insert;
mod paging;
mod rows;
mod sql;
mod sql_utils;
mod status;
mod tables;
mod update;

use anyhow::Result;

use crate::cli::{CliArgs, CommandKind};

pub fn dispatch(args: &CliArgs) -> Result<()> {
    match &args.command {
        CommandKind::Help { command } => help::run(command.as_deref()),
        CommandKind::Status(cmd) => status::run(args, cmd),
        CommandKind::Tables(cmd) => tables::run(args, cmd),
        CommandKind::Columns(cmd) => columns::run(args, cmd),
        CommandKind::Rows(cmd) => rows::run(args, cmd),
        CommandKind::Form(cmd) => form::run(args, cmd),
        CommandKind::Insert(cmd) => insert::run(args, cmd),
        CommandKind::Update(cmd) => update::run(args, cmd),
        CommandKind::Delete(cmd) => delete::run(args, cmd),
        CommandKind::Sql(cmd) => sql::run(args, cmd),
        CommandKind::Export(cmd) => export::run(args, cmd),
        CommandKind::Init(cmd) => init::run(args, cmd),
        CommandKind::Config(_) => config::run(args),
    }
}
