mod common;

use common::{board, card, list, register};
use proptest::prelude::*;
use std::collections::HashSet;
use taskboard_core::model::card::NewCard;
use taskboard_core::model::user::UserId;
use taskboard_core::position::{is_dense, pending_updates, recompute_positions};
use taskboard_core::{
    open_db_in_memory, BoardError, BoardService, CardService, ListService, SiblingGroup,
    SqliteBoardStore,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    CreateList,
    DeleteList(usize),
    ReorderLists { rotate: usize, reverse: bool },
    CreateCard { list: usize, position: Option<i64> },
    DeleteCard { list: usize, card: usize },
    ReorderCards { list: usize, rotate: usize, reverse: bool },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::CreateList),
        1 => any::<usize>().prop_map(Op::DeleteList),
        1 => (any::<usize>(), any::<bool>())
            .prop_map(|(rotate, reverse)| Op::ReorderLists { rotate, reverse }),
        3 => (any::<usize>(), proptest::option::of(0i64..4))
            .prop_map(|(list, position)| Op::CreateCard { list, position }),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(list, card)| Op::DeleteCard { list, card }),
        1 => (any::<usize>(), any::<usize>(), any::<bool>())
            .prop_map(|(list, rotate, reverse)| Op::ReorderCards { list, rotate, reverse }),
    ]
}

fn shuffled(mut ids: Vec<Uuid>, rotate: usize, reverse: bool) -> Vec<Uuid> {
    if !ids.is_empty() {
        let len = ids.len();
        ids.rotate_left(rotate % len);
    }
    if reverse {
        ids.reverse();
    }
    ids
}

/// Applies one operation and returns the sibling group it recomputed.
fn apply(
    store: SqliteBoardStore<'_>,
    owner: UserId,
    board_id: Uuid,
    op: &Op,
) -> Option<SiblingGroup> {
    let lists = ListService::new(store);
    let cards = CardService::new(store);
    let current = lists.list_lists(owner, board_id).unwrap();
    let pick = |index: usize| (!current.is_empty()).then(|| &current[index % current.len()]);

    match op {
        Op::CreateList => {
            list(store, owner, board_id, "List");
            None
        }
        Op::DeleteList(index) => {
            let target = pick(*index)?;
            lists.delete_list(owner, target.id).unwrap();
            Some(SiblingGroup::ListsOfBoard(board_id))
        }
        Op::ReorderLists { rotate, reverse } => {
            let ids = current.iter().map(|list| list.id).collect();
            lists
                .reorder_lists(owner, board_id, &shuffled(ids, *rotate, *reverse))
                .unwrap();
            Some(SiblingGroup::ListsOfBoard(board_id))
        }
        Op::CreateCard { list, position } => {
            let target = pick(*list)?;
            cards
                .create_card(
                    owner,
                    target.id,
                    &NewCard {
                        title: "Card".to_string(),
                        position: *position,
                        ..NewCard::default()
                    },
                )
                .unwrap();
            None
        }
        Op::DeleteCard { list, card } => {
            let target = pick(*list)?;
            let siblings = cards.list_cards(owner, target.id).unwrap();
            if siblings.is_empty() {
                return None;
            }
            cards
                .delete_card(owner, siblings[card % siblings.len()].id)
                .unwrap();
            Some(SiblingGroup::CardsOfList(target.id))
        }
        Op::ReorderCards {
            list,
            rotate,
            reverse,
        } => {
            let target = pick(*list)?;
            let ids = cards
                .list_cards(owner, target.id)
                .unwrap()
                .iter()
                .map(|card| card.id)
                .collect();
            cards
                .reorder_cards(owner, target.id, &shuffled(ids, *rotate, *reverse))
                .unwrap();
            Some(SiblingGroup::CardsOfList(target.id))
        }
    }
}

fn assert_membership_agrees(store: SqliteBoardStore<'_>, owner: UserId, board_id: Uuid) {
    let stored_board = BoardService::new(store).get_board(owner, board_id).unwrap();
    let lists = ListService::new(store).list_lists(owner, board_id).unwrap();
    assert_eq!(stored_board.list_ids.len(), lists.len());
    let from_array: HashSet<Uuid> = stored_board.list_ids.iter().copied().collect();
    let from_rows: HashSet<Uuid> = lists.iter().map(|list| list.id).collect();
    assert_eq!(from_array, from_rows);

    let cards = CardService::new(store);
    for list in &lists {
        let children = cards.list_cards(owner, list.id).unwrap();
        assert_eq!(list.card_ids.len(), children.len());
        let from_array: HashSet<Uuid> = list.card_ids.iter().copied().collect();
        let from_rows: HashSet<Uuid> = children.iter().map(|card| card.id).collect();
        assert_eq!(from_array, from_rows);
    }
}

fn assert_dense(store: SqliteBoardStore<'_>, owner: UserId, group: SiblingGroup) {
    let positions: Vec<i64> = match group {
        SiblingGroup::ListsOfBoard(board_id) => ListService::new(store)
            .list_lists(owner, board_id)
            .unwrap()
            .iter()
            .map(|list| list.position)
            .collect(),
        SiblingGroup::CardsOfList(list_id) => CardService::new(store)
            .list_cards(owner, list_id)
            .unwrap()
            .iter()
            .map(|card| card.position)
            .collect(),
    };
    assert!(is_dense(positions.iter().copied()), "{group:?}: {positions:?}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn recompute_is_idempotent(raw in prop::collection::vec(any::<u128>(), 0..32)) {
        let ids: Vec<Uuid> = raw.into_iter().map(Uuid::from_u128).collect();
        let once = recompute_positions(&ids);
        let reordered: Vec<Uuid> = once.iter().map(|entry| entry.id).collect();
        let twice = recompute_positions(&reordered);
        prop_assert_eq!(&once, &twice);
        prop_assert!(pending_updates(&once).is_empty());
        prop_assert!(is_dense(once.iter().map(|entry| entry.position)));
    }

    #[test]
    fn random_mutations_keep_order_consistent(ops in prop::collection::vec(op(), 1..40)) {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteBoardStore::try_new(&conn).unwrap();
        let owner = register(store, "Ada");
        let target = board(store, owner, "Roadmap");

        for op in &ops {
            if let Some(group) = apply(store, owner, target.id, op) {
                assert_dense(store, owner, group);
            }
            assert_membership_agrees(store, owner, target.id);
        }
    }

    #[test]
    fn reorder_missing_one_child_changes_nothing(count in 1usize..8, dropped in any::<usize>()) {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteBoardStore::try_new(&conn).unwrap();
        let owner = register(store, "Ada");
        let target = board(store, owner, "Roadmap");
        let todo = list(store, owner, target.id, "Todo");
        let ids: Vec<Uuid> = (0..count).map(|_| card(store, owner, todo.id, "Card").id).collect();
        let cards = CardService::new(store);

        let mut proposed = ids.clone();
        proposed.remove(dropped % count);
        proposed.reverse();
        let err = cards.reorder_cards(owner, todo.id, &proposed).unwrap_err();
        prop_assert!(matches!(err, BoardError::InvalidMembership(_)));

        let stored: Vec<(Uuid, i64)> = cards
            .list_cards(owner, todo.id)
            .unwrap()
            .iter()
            .map(|card| (card.id, card.position))
            .collect();
        let expected: Vec<(Uuid, i64)> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index as i64))
            .collect();
        prop_assert_eq!(stored, expected);
    }
}
