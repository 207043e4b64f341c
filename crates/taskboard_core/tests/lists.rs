mod common;

use common::{board, card, ids_of, list, register};
use taskboard_core::model::list::{ListPatch, NewList};
use taskboard_core::{
    open_db_in_memory, BoardError, BoardService, CardService, EntityKind, ListService,
    SqliteBoardStore, ValidationError,
};

#[test]
fn create_appends_to_board_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");

    let todo = list(store, owner, target.id, "Todo");
    let doing = list(store, owner, target.id, "Doing");
    let done = list(store, owner, target.id, "Done");
    assert_eq!(
        [todo.position, doing.position, done.position],
        [0, 1, 2]
    );

    let reloaded = BoardService::new(store).get_board(owner, target.id).unwrap();
    assert_eq!(reloaded.list_ids, vec![todo.id, doing.id, done.id]);

    let lists = ListService::new(store).list_lists(owner, target.id).unwrap();
    assert_eq!(ids_of(&lists, |list| list.id), reloaded.list_ids);
}

#[test]
fn create_without_title_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let lists = ListService::new(store);

    let err = lists
        .create_list(owner, target.id, &NewList::default())
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::Validation(ValidationError::Required("title"))
    ));

    assert!(lists.list_lists(owner, target.id).unwrap().is_empty());
    let reloaded = BoardService::new(store).get_board(owner, target.id).unwrap();
    assert!(reloaded.list_ids.is_empty());
}

#[test]
fn create_under_missing_board_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let missing = uuid::Uuid::new_v4();

    let err = ListService::new(store)
        .create_list(
            owner,
            missing,
            &NewList {
                title: "Todo".to_string(),
                position: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::NotFound {
            kind: EntityKind::Board,
            id
        } if id == missing
    ));
}

#[test]
fn explicit_position_does_not_shift_siblings() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let lists = ListService::new(store);

    let first = list(store, owner, target.id, "First");
    let second = list(store, owner, target.id, "Second");
    let inserted = lists
        .create_list(
            owner,
            target.id,
            &NewList {
                title: "Inserted".to_string(),
                position: Some(0),
            },
        )
        .unwrap();
    assert_eq!(inserted.position, 0);
    assert_eq!(lists.get_list(owner, first.id).unwrap().position, 0);
    assert_eq!(lists.get_list(owner, second.id).unwrap().position, 1);

    let committed = lists
        .reorder_lists(owner, target.id, &[inserted.id, first.id, second.id])
        .unwrap();
    let positions: Vec<i64> = committed.iter().map(|entry| entry.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(lists.get_list(owner, second.id).unwrap().position, 2);
}

#[test]
fn update_uses_allow_list() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let lists = ListService::new(store);

    let unknown_only: ListPatch = serde_json::from_str(r#"{"board_id":"x","color":"red"}"#).unwrap();
    let err = lists.update_list(owner, todo.id, &unknown_only).unwrap_err();
    assert!(matches!(err, BoardError::NoFieldsToUpdate(EntityKind::List)));

    let patch: ListPatch = serde_json::from_str(r#"{"title":"  Backlog ","color":"red"}"#).unwrap();
    let updated = lists.update_list(owner, todo.id, &patch).unwrap();
    assert_eq!(updated.title, "Backlog");
    assert_eq!(updated.board_id, target.id);
    assert_eq!(updated.position, 0);

    let negative = ListPatch {
        position: Some(-1),
        ..ListPatch::default()
    };
    assert!(matches!(
        lists.update_list(owner, todo.id, &negative).unwrap_err(),
        BoardError::Validation(ValidationError::NegativePosition(-1))
    ));
}

#[test]
fn delete_cascades_cards_and_recomputes_positions() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let doing = list(store, owner, target.id, "Doing");
    let done = list(store, owner, target.id, "Done");
    let first = card(store, owner, doing.id, "Write tests");
    card(store, owner, doing.id, "Ship");

    let deletion = ListService::new(store).delete_list(owner, doing.id).unwrap();
    assert_eq!(deletion.board_id, target.id);
    assert_eq!(deletion.cards_removed, 2);
    let positions: Vec<(uuid::Uuid, i64)> = deletion
        .positions
        .iter()
        .map(|entry| (entry.id, entry.position))
        .collect();
    assert_eq!(positions, vec![(todo.id, 0), (done.id, 1)]);

    let reloaded = BoardService::new(store).get_board(owner, target.id).unwrap();
    assert_eq!(reloaded.list_ids, vec![todo.id, done.id]);
    let stored = ListService::new(store).get_list(owner, done.id).unwrap();
    assert_eq!(stored.position, 1);

    let gone = CardService::new(store).get_card(owner, first.id).unwrap_err();
    assert!(matches!(
        gone,
        BoardError::NotFound {
            kind: EntityKind::Card,
            ..
        }
    ));
}
