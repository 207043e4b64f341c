//! Card and comment repository contract and SQLite implementation.
//!
//! # Invariants
//! - Create appends the new id to `lists.card_order` in the same transaction
//!   as the row insert.
//! - Delete removes the id from the list array, deletes the card's comments
//!   and densifies the remaining card positions, all in one transaction.
//! - Comments are returned in insertion order.

use super::ordering::{load_order_array, recompute_in_tx, store_order_array};
use super::{parse_uuid, RepoError, RepoResult, SqliteBoardStore};
use crate::model::card::{Card, CardChanges, CardFields, CardId, Comment, CommentId, TaskCard};
use crate::model::list::ListId;
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::position::{assign_position, PositionUpdate, SiblingGroup};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

const CARD_SELECT_SQL: &str = "SELECT
    id,
    list_id,
    title,
    description,
    position,
    labels,
    due_date,
    created_at,
    updated_at
FROM cards";

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    card_id,
    author_id,
    text,
    created_at
FROM card_comments";

/// Outcome of a card delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardDeletion {
    pub list_id: ListId,
    /// Dense positions of the remaining cards of the list.
    pub positions: Vec<PositionUpdate>,
}

/// Repository interface for cards and their comments.
pub trait CardRepository {
    /// Inserts validated card fields under an existing list.
    fn insert_card(&self, list_id: ListId, card: &CardFields) -> RepoResult<Card>;
    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>>;
    /// Cards of a list in stored order.
    fn list_cards(&self, list_id: ListId) -> RepoResult<Vec<Card>>;
    /// Applies validated changes. Does not shift siblings.
    fn update_card(&self, id: CardId, changes: &CardChanges) -> RepoResult<Card>;
    fn delete_card(&self, id: CardId) -> RepoResult<CardDeletion>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    fn insert_comment(&self, card_id: CardId, author_id: UserId, text: &str)
        -> RepoResult<Comment>;
    /// Fails with `NotFound` when the comment is not on this card.
    fn delete_comment(&self, card_id: CardId, comment_id: CommentId) -> RepoResult<()>;
    /// Every card on boards owned by `owner_id`, due date first.
    fn list_cards_for_owner(&self, owner_id: UserId) -> RepoResult<Vec<TaskCard>>;
}

impl CardRepository for SqliteBoardStore<'_> {
    fn insert_card(&self, list_id: ListId, card: &CardFields) -> RepoResult<Card> {
        let group = SiblingGroup::CardsOfList(list_id);
        let tx = self.begin_write()?;
        let mut order = load_order_array(&tx, group)?;
        let position = assign_position(&order, card.position);

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO cards (id, list_id, title, description, position, labels, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                list_id.to_string(),
                card.title.as_str(),
                card.description.as_deref(),
                position,
                encode_labels(&card.labels)?,
                card.due_date,
            ],
        )?;
        order.push(id);
        store_order_array(&tx, group, &order)?;

        let created = load_required_card(&tx, id)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>> {
        load_card(self.conn(), id)
    }

    fn list_cards(&self, list_id: ListId) -> RepoResult<Vec<Card>> {
        let mut stmt = self.conn().prepare(&format!(
            "{CARD_SELECT_SQL}
             WHERE list_id = ?1
             ORDER BY position ASC, created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([list_id.to_string()])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(self.conn(), row)?);
        }
        Ok(cards)
    }

    fn update_card(&self, id: CardId, changes: &CardChanges) -> RepoResult<Card> {
        let labels = changes.labels.as_deref().map(encode_labels).transpose()?;
        let changed = self.conn().execute(
            "UPDATE cards
             SET title = COALESCE(?2, title),
                 description = CASE WHEN ?3 = 1 THEN ?4 ELSE description END,
                 position = COALESCE(?5, position),
                 labels = COALESCE(?6, labels),
                 due_date = CASE WHEN ?7 = 1 THEN ?8 ELSE due_date END,
                 updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            params![
                id.to_string(),
                changes.title.as_deref(),
                changes.description.is_some(),
                changes.description.clone().flatten(),
                changes.position,
                labels,
                changes.due_date.is_some(),
                changes.due_date.flatten(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Card, id));
        }
        load_required_card(self.conn(), id)
    }

    fn delete_card(&self, id: CardId) -> RepoResult<CardDeletion> {
        let tx = self.begin_write()?;
        let card_id = id.to_string();
        let list_text: Option<String> = tx
            .query_row(
                "SELECT list_id FROM cards WHERE id = ?1;",
                [card_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(list_text) = list_text else {
            return Err(RepoError::not_found(EntityKind::Card, id));
        };
        let list_id = parse_uuid(&list_text, "cards.list_id")?;
        let group = SiblingGroup::CardsOfList(list_id);

        let mut order = load_order_array(&tx, group)?;
        order.retain(|sibling| *sibling != id);
        store_order_array(&tx, group, &order)?;

        tx.execute(
            "DELETE FROM card_comments WHERE card_id = ?1;",
            [card_id.as_str()],
        )?;
        tx.execute("DELETE FROM cards WHERE id = ?1;", [card_id.as_str()])?;

        let positions = recompute_in_tx(&tx, group)?;
        tx.commit()?;
        Ok(CardDeletion { list_id, positions })
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_row(row)?));
        }
        Ok(None)
    }

    fn insert_comment(
        &self,
        card_id: CardId,
        author_id: UserId,
        text: &str,
    ) -> RepoResult<Comment> {
        let tx = self.begin_write()?;
        touch_card(&tx, card_id)?;

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO card_comments (id, card_id, author_id, text)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                card_id.to_string(),
                author_id.to_string(),
                text
            ],
        )?;
        let created = tx.query_row(
            &format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
            |row| Ok(parse_comment_row(row)),
        )??;
        tx.commit()?;
        Ok(created)
    }

    fn delete_comment(&self, card_id: CardId, comment_id: CommentId) -> RepoResult<()> {
        let tx = self.begin_write()?;
        let removed = tx.execute(
            "DELETE FROM card_comments WHERE id = ?1 AND card_id = ?2;",
            params![comment_id.to_string(), card_id.to_string()],
        )?;
        if removed == 0 {
            return Err(RepoError::not_found(EntityKind::Comment, comment_id));
        }
        touch_card(&tx, card_id)?;
        tx.commit()?;
        Ok(())
    }

    fn list_cards_for_owner(&self, owner_id: UserId) -> RepoResult<Vec<TaskCard>> {
        let mut stmt = self.conn().prepare(
            "SELECT
                c.id AS id,
                c.list_id AS list_id,
                c.title AS title,
                c.description AS description,
                c.position AS position,
                c.labels AS labels,
                c.due_date AS due_date,
                c.created_at AS created_at,
                c.updated_at AS updated_at,
                l.title AS list_title,
                b.id AS board_id,
                b.title AS board_title
             FROM cards c
             INNER JOIN lists l ON l.id = c.list_id
             INNER JOIN boards b ON b.id = l.board_id
             WHERE b.owner_id = ?1
             ORDER BY c.due_date IS NULL ASC, c.due_date ASC, c.created_at DESC, c.rowid DESC;",
        )?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            let board_text: String = row.get("board_id")?;
            tasks.push(TaskCard {
                card: parse_card_row(self.conn(), row)?,
                list_title: row.get("list_title")?,
                board_id: parse_uuid(&board_text, "boards.id")?,
                board_title: row.get("board_title")?,
            });
        }
        Ok(tasks)
    }
}

fn touch_card(conn: &Connection, card_id: CardId) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE cards
         SET updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
         WHERE id = ?1;",
        [card_id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::not_found(EntityKind::Card, card_id));
    }
    Ok(())
}

fn load_card(conn: &Connection, id: CardId) -> RepoResult<Option<Card>> {
    let mut stmt = conn.prepare(&format!("{CARD_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_card_row(conn, row)?));
    }
    Ok(None)
}

fn load_required_card(conn: &Connection, id: CardId) -> RepoResult<Card> {
    load_card(conn, id)?.ok_or(RepoError::not_found(EntityKind::Card, id))
}

fn load_comments(conn: &Connection, card_id: CardId) -> RepoResult<Vec<Comment>> {
    let mut stmt = conn.prepare(&format!(
        "{COMMENT_SELECT_SQL}
         WHERE card_id = ?1
         ORDER BY created_at ASC, rowid ASC;"
    ))?;
    let mut rows = stmt.query([card_id.to_string()])?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next()? {
        comments.push(parse_comment_row(row)?);
    }
    Ok(comments)
}

fn parse_card_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Card> {
    let id_text: String = row.get("id")?;
    let list_text: String = row.get("list_id")?;
    let labels_text: String = row.get("labels")?;
    let id = parse_uuid(&id_text, "cards.id")?;
    let labels: Vec<String> = serde_json::from_str(&labels_text)
        .map_err(|err| RepoError::InvalidData(format!("invalid labels in cards.labels: {err}")))?;

    Ok(Card {
        id,
        list_id: parse_uuid(&list_text, "cards.list_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        position: row.get("position")?,
        labels,
        due_date: row.get("due_date")?,
        comments: load_comments(conn, id)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let id_text: String = row.get("id")?;
    let card_text: String = row.get("card_id")?;
    let author_text: String = row.get("author_id")?;
    Ok(Comment {
        id: parse_uuid(&id_text, "card_comments.id")?,
        card_id: parse_uuid(&card_text, "card_comments.card_id")?,
        author_id: parse_uuid(&author_text, "card_comments.author_id")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
    })
}

fn encode_labels(labels: &[String]) -> RepoResult<String> {
    serde_json::to_string(labels)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode labels: {err}")))
}
