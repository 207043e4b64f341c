#![allow(dead_code)]

use taskboard_core::model::board::{Board, NewBoard};
use taskboard_core::model::card::{Card, NewCard};
use taskboard_core::model::list::{List, ListId, NewList};
use taskboard_core::model::user::{NewUser, UserId};
use taskboard_core::{BoardService, CardService, ListService, SqliteBoardStore, UserService};
use uuid::Uuid;

pub fn register(store: SqliteBoardStore<'_>, name: &str) -> UserId {
    UserService::new(store)
        .register_user(&NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".to_string(),
        })
        .unwrap()
        .id
}

pub fn board(store: SqliteBoardStore<'_>, owner: UserId, title: &str) -> Board {
    BoardService::new(store)
        .create_board(
            owner,
            &NewBoard {
                title: title.to_string(),
                ..NewBoard::default()
            },
        )
        .unwrap()
}

pub fn list(store: SqliteBoardStore<'_>, owner: UserId, board_id: Uuid, title: &str) -> List {
    ListService::new(store)
        .create_list(
            owner,
            board_id,
            &NewList {
                title: title.to_string(),
                position: None,
            },
        )
        .unwrap()
}

pub fn card(store: SqliteBoardStore<'_>, owner: UserId, list_id: ListId, title: &str) -> Card {
    CardService::new(store)
        .create_card(
            owner,
            list_id,
            &NewCard {
                title: title.to_string(),
                ..NewCard::default()
            },
        )
        .unwrap()
}

pub fn ids_of<T>(items: &[T], id: impl Fn(&T) -> Uuid) -> Vec<Uuid> {
    items.iter().map(id).collect()
}
