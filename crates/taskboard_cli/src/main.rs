//! Command-line front-end over `taskboard_core`.
//!
//! Prints JSON read models on success. Failures print
//! `error: <code>: <message>` and exit with status 1.

mod cli;

use clap::Parser;
use cli::{BoardCommand, CardCommand, Cli, Command, ListCommand, UserCommand};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use taskboard_core::config::CoreConfig;
use taskboard_core::logging::LoggingError;
use taskboard_core::model::board::NewBoard;
use taskboard_core::model::card::NewCard;
use taskboard_core::model::list::NewList;
use taskboard_core::model::user::{NewUser, UserId};
use taskboard_core::{
    init_from_config, open_db, parse_id, BoardError, BoardService, CardService, ConfigError,
    DbError, EntityKind, ListService, RepoError, SqliteBoardStore, UserService, ValidationError,
};
use uuid::Uuid;

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Store(RepoError),
    Board(BoardError),
    Output(serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Logging(_) => "logging",
            Self::Db(_) | Self::Store(_) => "storage",
            Self::Board(err) => err.code(),
            Self::Output(_) => "output",
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Board(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "cannot encode output: {err}"),
        }
    }
}

impl Error for CliError {}

impl From<BoardError> for CliError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

impl From<ValidationError> for CliError {
    fn from(value: ValidationError) -> Self {
        Self::Board(BoardError::Validation(value))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}: {err}", err.code());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    if let Command::Ping = cli.command {
        return ping();
    }

    let mut config = CoreConfig::load(cli.config.as_deref()).map_err(CliError::Config)?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_from_config(&config).map_err(CliError::Logging)?;

    let conn = open_db(&config.db_path).map_err(CliError::Db)?;
    let store = SqliteBoardStore::try_new(&conn).map_err(CliError::Store)?;
    info!("event=cli_command module=cli status=start");

    let principal = cli.principal.as_deref();
    match cli.command {
        Command::Ping => ping(),
        Command::User { command } => run_user(store, command),
        Command::Board { command } => run_board(store, acting_user(principal)?, command),
        Command::List { command } => run_list(store, acting_user(principal)?, command),
        Command::Card { command } => run_card(store, acting_user(principal)?, command),
        Command::Tasks => to_json(&CardService::new(store).list_my_cards(acting_user(principal)?)?),
    }
}

fn ping() -> Result<String, CliError> {
    to_json(&serde_json::json!({
        "ping": taskboard_core::ping(),
        "version": taskboard_core::core_version(),
    }))
}

fn run_user(store: SqliteBoardStore<'_>, command: UserCommand) -> Result<String, CliError> {
    let users = UserService::new(store);
    match command {
        UserCommand::Add {
            name,
            email,
            password_hash,
        } => to_json(&users.register_user(&NewUser {
            name,
            email,
            password_hash,
        })?),
    }
}

fn run_board(
    store: SqliteBoardStore<'_>,
    principal: UserId,
    command: BoardCommand,
) -> Result<String, CliError> {
    let boards = BoardService::new(store);
    match command {
        BoardCommand::Add(args) => to_json(&boards.create_board(
            principal,
            &NewBoard {
                title: args.title,
                description: args.description,
                background_color: args.color,
            },
        )?),
        BoardCommand::Ls => to_json(&boards.list_my_boards(principal)?),
        BoardCommand::Rm { board_id } => {
            let board_id = parse_id(EntityKind::Board, &board_id)?;
            to_json(&boards.delete_board(principal, board_id)?)
        }
    }
}

fn run_list(
    store: SqliteBoardStore<'_>,
    principal: UserId,
    command: ListCommand,
) -> Result<String, CliError> {
    let lists = ListService::new(store);
    match command {
        ListCommand::Add {
            board_id,
            title,
            position,
        } => {
            let board_id = parse_id(EntityKind::Board, &board_id)?;
            to_json(&lists.create_list(principal, board_id, &NewList { title, position })?)
        }
        ListCommand::Ls { board_id } => {
            let board_id = parse_id(EntityKind::Board, &board_id)?;
            to_json(&lists.list_lists(principal, board_id)?)
        }
        ListCommand::Rm { list_id } => {
            let list_id = parse_id(EntityKind::List, &list_id)?;
            to_json(&lists.delete_list(principal, list_id)?)
        }
        ListCommand::Reorder { board_id, list_ids } => {
            let board_id = parse_id(EntityKind::Board, &board_id)?;
            let ordered = parse_ids(EntityKind::List, &list_ids)?;
            to_json(&lists.reorder_lists(principal, board_id, &ordered)?)
        }
    }
}

fn run_card(
    store: SqliteBoardStore<'_>,
    principal: UserId,
    command: CardCommand,
) -> Result<String, CliError> {
    let cards = CardService::new(store);
    match command {
        CardCommand::Add(args) => {
            let list_id = parse_id(EntityKind::List, &args.list_id)?;
            let input = NewCard {
                title: args.title,
                description: args.description,
                position: args.position,
                labels: args.labels,
                due_date: args.due,
            };
            to_json(&cards.create_card(principal, list_id, &input)?)
        }
        CardCommand::Ls { list_id } => {
            let list_id = parse_id(EntityKind::List, &list_id)?;
            to_json(&cards.list_cards(principal, list_id)?)
        }
        CardCommand::Rm { card_id } => {
            let card_id = parse_id(EntityKind::Card, &card_id)?;
            to_json(&cards.delete_card(principal, card_id)?)
        }
        CardCommand::Reorder { list_id, card_ids } => {
            let list_id = parse_id(EntityKind::List, &list_id)?;
            let ordered = parse_ids(EntityKind::Card, &card_ids)?;
            to_json(&cards.reorder_cards(principal, list_id, &ordered)?)
        }
        CardCommand::Comment { card_id, text } => {
            let card_id = parse_id(EntityKind::Card, &card_id)?;
            to_json(&cards.add_comment(principal, card_id, &text)?)
        }
    }
}

fn acting_user(principal: Option<&str>) -> Result<UserId, CliError> {
    let value = principal.ok_or(ValidationError::Required("as"))?;
    Ok(parse_id(EntityKind::User, value)?)
}

fn parse_ids(kind: EntityKind, values: &[String]) -> Result<Vec<Uuid>, CliError> {
    values
        .iter()
        .map(|value| parse_id(kind, value).map_err(CliError::from))
        .collect()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(CliError::Output)
}
