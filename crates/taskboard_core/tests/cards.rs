mod common;

use common::{board, card, ids_of, list, register};
use taskboard_core::model::card::{CardPatch, NewCard};
use taskboard_core::{
    open_db_in_memory, BoardError, CardService, EntityKind, ListService, SqliteBoardStore,
    ValidationError,
};

const MAY_FIRST_2024_MS: i64 = 1_714_521_600_000;

#[test]
fn create_normalizes_fields_and_appends_to_list() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let cards = CardService::new(store);

    let first = card(store, owner, todo.id, "Draft");
    let second = cards
        .create_card(
            owner,
            todo.id,
            &NewCard {
                title: "  Review  ".to_string(),
                description: Some("   ".to_string()),
                labels: vec![
                    " urgent ".to_string(),
                    String::new(),
                    "urgent".to_string(),
                    "ops".to_string(),
                ],
                due_date: Some("2024-05-01".to_string()),
                position: None,
            },
        )
        .unwrap();

    assert_eq!(second.title, "Review");
    assert_eq!(second.description, None);
    assert_eq!(second.labels, vec!["urgent", "ops"]);
    assert_eq!(second.due_date, Some(MAY_FIRST_2024_MS));
    assert_eq!([first.position, second.position], [0, 1]);

    let reloaded = ListService::new(store).get_list(owner, todo.id).unwrap();
    assert_eq!(reloaded.card_ids, vec![first.id, second.id]);
}

#[test]
fn invalid_due_date_is_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let cards = CardService::new(store);

    let err = cards
        .create_card(
            owner,
            todo.id,
            &NewCard {
                title: "Review".to_string(),
                due_date: Some("someday".to_string()),
                ..NewCard::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::Validation(ValidationError::InvalidFormat {
            field: "due_date",
            ..
        })
    ));
    assert!(cards.list_cards(owner, todo.id).unwrap().is_empty());
}

#[test]
fn update_applies_allow_listed_fields_and_clears_due_date() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let draft = card(store, owner, todo.id, "Draft");
    let cards = CardService::new(store);

    let patch: CardPatch = serde_json::from_str(
        r#"{"description":"Outline","labels":["docs"],"due_date":"2024-05-01T00:00:00Z","list_id":"ignored"}"#,
    )
    .unwrap();
    let updated = cards.update_card(owner, draft.id, &patch).unwrap();
    assert_eq!(updated.title, "Draft");
    assert_eq!(updated.description.as_deref(), Some("Outline"));
    assert_eq!(updated.labels, vec!["docs"]);
    assert_eq!(updated.due_date, Some(MAY_FIRST_2024_MS));
    assert_eq!(updated.list_id, todo.id);

    let clear: CardPatch = serde_json::from_str(r#"{"due_date":null,"description":""}"#).unwrap();
    let cleared = cards.update_card(owner, draft.id, &clear).unwrap();
    assert_eq!(cleared.due_date, None);
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.labels, vec!["docs"]);

    let nothing: CardPatch = serde_json::from_str(r#"{"list_id":"elsewhere"}"#).unwrap();
    assert!(matches!(
        cards.update_card(owner, draft.id, &nothing).unwrap_err(),
        BoardError::NoFieldsToUpdate(EntityKind::Card)
    ));
}

#[test]
fn deleting_middle_card_closes_the_gap() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let first = card(store, owner, todo.id, "First");
    let middle = card(store, owner, todo.id, "Middle");
    let last = card(store, owner, todo.id, "Last");
    let cards = CardService::new(store);

    let deletion = cards.delete_card(owner, middle.id).unwrap();
    assert_eq!(deletion.list_id, todo.id);

    let remaining = cards.list_cards(owner, todo.id).unwrap();
    assert_eq!(ids_of(&remaining, |card| card.id), vec![first.id, last.id]);
    let positions: Vec<i64> = remaining.iter().map(|card| card.position).collect();
    assert_eq!(positions, vec![0, 1]);

    let reloaded = ListService::new(store).get_list(owner, todo.id).unwrap();
    assert_eq!(reloaded.card_ids, vec![first.id, last.id]);
}

#[test]
fn comments_are_append_only_with_delete_by_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let draft = card(store, owner, todo.id, "Draft");
    let cards = CardService::new(store);

    let first = cards.add_comment(owner, draft.id, "  looks good ").unwrap();
    let second = cards.add_comment(owner, draft.id, "ship it").unwrap();
    assert_eq!(first.text, "looks good");
    assert_eq!(first.author_id, owner);

    let blank = cards.add_comment(owner, draft.id, " \n\t ").unwrap_err();
    assert!(matches!(
        blank,
        BoardError::Validation(ValidationError::Required("text"))
    ));

    let loaded = cards.get_card(owner, draft.id).unwrap();
    assert_eq!(ids_of(&loaded.comments, |comment| comment.id), vec![first.id, second.id]);

    let unknown = uuid::Uuid::new_v4();
    assert!(matches!(
        cards.delete_comment(owner, draft.id, unknown).unwrap_err(),
        BoardError::NotFound {
            kind: EntityKind::Comment,
            id
        } if id == unknown
    ));

    cards.delete_comment(owner, draft.id, first.id).unwrap();
    let loaded = cards.get_card(owner, draft.id).unwrap();
    assert_eq!(ids_of(&loaded.comments, |comment| comment.id), vec![second.id]);
    assert_eq!(cards.get_comment(owner, second.id).unwrap(), second);
}

#[test]
fn comment_must_belong_to_the_named_card() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let first = card(store, owner, todo.id, "First");
    let second = card(store, owner, todo.id, "Second");
    let cards = CardService::new(store);

    let comment = cards.add_comment(owner, first.id, "note").unwrap();
    let err = cards
        .delete_comment(owner, second.id, comment.id)
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert_eq!(cards.get_card(owner, first.id).unwrap().comments.len(), 1);
}

#[test]
fn my_cards_sorts_by_due_date_with_undated_last() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let other = register(store, "Bob");
    let roadmap = board(store, owner, "Roadmap");
    let todo = list(store, owner, roadmap.id, "Todo");
    let foreign_board = board(store, other, "Private");
    let foreign_list = list(store, other, foreign_board.id, "Secret");
    card(store, other, foreign_list.id, "Hidden");
    let cards = CardService::new(store);

    let with_due = |title: &str, due: Option<&str>| {
        cards
            .create_card(
                owner,
                todo.id,
                &NewCard {
                    title: title.to_string(),
                    due_date: due.map(str::to_string),
                    ..NewCard::default()
                },
            )
            .unwrap()
    };
    let undated = with_due("Someday", None);
    let later = with_due("Later", Some("2024-06-01"));
    let sooner = with_due("Sooner", Some("2024-05-01"));

    let tasks = cards.list_my_cards(owner).unwrap();
    assert_eq!(
        ids_of(&tasks, |task| task.card.id),
        vec![sooner.id, later.id, undated.id]
    );
    assert!(tasks.iter().all(|task| task.board_title == "Roadmap"));
    assert!(tasks.iter().all(|task| task.list_title == "Todo"));
    assert_eq!(tasks[0].board_id, roadmap.id);
}

#[test]
fn my_cards_without_due_date_are_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let roadmap = board(store, owner, "Roadmap");
    let todo = list(store, owner, roadmap.id, "Todo");
    let doing = list(store, owner, roadmap.id, "Doing");

    let mut created = Vec::new();
    for index in 0..8 {
        let target = if index % 2 == 0 { todo.id } else { doing.id };
        created.push(card(store, owner, target, &format!("Card {index}")).id);
    }
    created.reverse();

    let tasks = CardService::new(store).list_my_cards(owner).unwrap();
    assert_eq!(ids_of(&tasks, |task| task.card.id), created);
}

#[test]
fn duplicate_position_keeps_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let a = card(store, owner, todo.id, "A");
    let b = card(store, owner, todo.id, "B");
    let c = card(store, owner, todo.id, "C");
    let cards = CardService::new(store);

    let wedged = cards
        .create_card(
            owner,
            todo.id,
            &NewCard {
                title: "Wedged".to_string(),
                position: Some(1),
                ..NewCard::default()
            },
        )
        .unwrap();

    let stored = cards.list_cards(owner, todo.id).unwrap();
    let pairs: Vec<_> = stored.iter().map(|card| (card.id, card.position)).collect();
    assert_eq!(
        pairs,
        vec![(a.id, 0), (b.id, 1), (wedged.id, 1), (c.id, 2)]
    );
}

#[test]
fn failed_recompute_rolls_back_the_delete() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let owner = register(store, "Ada");
    let target = board(store, owner, "Roadmap");
    let todo = list(store, owner, target.id, "Todo");
    let a = card(store, owner, todo.id, "A");
    let b = card(store, owner, todo.id, "B");
    let c = card(store, owner, todo.id, "C");
    let cards = CardService::new(store);
    cards.add_comment(owner, a.id, "keep me").unwrap();
    conn.execute_batch(&format!(
        "CREATE TRIGGER block_position BEFORE UPDATE OF position ON cards
         WHEN OLD.id = '{}'
         BEGIN SELECT RAISE(ABORT, 'position write blocked'); END;",
        c.id
    ))
    .unwrap();

    let err = cards.delete_card(owner, a.id).unwrap_err();
    assert!(matches!(err, BoardError::Internal(_)), "{err}");

    let stored = cards.list_cards(owner, todo.id).unwrap();
    let pairs: Vec<_> = stored.iter().map(|card| (card.id, card.position)).collect();
    assert_eq!(pairs, vec![(a.id, 0), (b.id, 1), (c.id, 2)]);
    assert_eq!(stored[0].comments.len(), 1);
    let reloaded = ListService::new(store).get_list(owner, todo.id).unwrap();
    assert_eq!(reloaded.card_ids, vec![a.id, b.id, c.id]);
}
