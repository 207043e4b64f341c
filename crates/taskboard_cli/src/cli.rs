use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Task board command-line front-end
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides the configuration
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Acting user id
    #[arg(long = "as", global = true, value_name = "USER_ID")]
    pub principal: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the core library is linked
    Ping,

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Manage boards
    Board {
        #[command(subcommand)]
        command: BoardCommand,
    },

    /// Manage lists of a board
    List {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Manage cards of a list
    Card {
        #[command(subcommand)]
        command: CardCommand,
    },

    /// Every card on my boards, by due date
    Tasks,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Already-hashed credential
        #[arg(long)]
        password_hash: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Create a board
    Add(BoardArgs),
    /// List my boards
    Ls,
    /// Delete a board with everything on it
    Rm { board_id: String },
}

#[derive(Args, Debug)]
pub struct BoardArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// Create a list on a board
    Add {
        board_id: String,
        #[arg(long)]
        title: String,
        /// Stored as given; siblings are not shifted
        #[arg(long)]
        position: Option<i64>,
    },
    /// Lists of a board
    Ls { board_id: String },
    /// Delete a list and its cards
    Rm { list_id: String },
    /// Replace the list order of a board
    Reorder {
        board_id: String,
        #[arg(required = true)]
        list_ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CardCommand {
    /// Create a card in a list
    Add(CardArgs),
    /// Cards of a list
    Ls { list_id: String },
    /// Delete a card
    Rm { card_id: String },
    /// Replace the card order of a list
    Reorder {
        list_id: String,
        #[arg(required = true)]
        card_ids: Vec<String>,
    },
    /// Comment on a card
    Comment { card_id: String, text: String },
}

#[derive(Args, Debug)]
pub struct CardArgs {
    pub list_id: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Repeatable
    #[arg(long = "label")]
    pub labels: Vec<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub position: Option<i64>,
}
