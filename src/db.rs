//! SQLite storage backend.
//!
//! Schema: an `item` table keyed by integer id, and a `tag` table keyed by
//! `(item_id, position)` so tag insertion order survives a round trip.
//! `due` and `start` are nullable unix-second columns; NULL means unset.

use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::fields::{Priority, TaskLength};
use crate::store::{Store, StoreResult};
use crate::task::Item;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS item (
    id       INTEGER PRIMARY KEY,
    name     TEXT NOT NULL,
    due      INTEGER,
    start    INTEGER,
    length   INTEGER NOT NULL,
    priority INTEGER NOT NULL,
    finished INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS tag (
    item_id  INTEGER NOT NULL REFERENCES item(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    name     TEXT NOT NULL,
    PRIMARY KEY (item_id, position)
);
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    fn tags_for(&self, id: u64) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM tag WHERE item_id = ?1 ORDER BY position")?;
        let tags = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

}

fn write_tags(conn: &Connection, id: u64, tags: &[String]) -> StoreResult<()> {
    conn.execute("DELETE FROM tag WHERE item_id = ?1", params![id])?;
    let mut stmt = conn.prepare("INSERT INTO tag (item_id, position, name) VALUES (?1, ?2, ?3)")?;
    for (position, tag) in tags.iter().enumerate() {
        stmt.execute(params![id, position as i64, tag])?;
    }
    Ok(())
}

fn decode_stamp(secs: Option<i64>) -> rusqlite::Result<Option<DateTime<Local>>> {
    match secs {
        None => Ok(None),
        Some(s) => Local
            .timestamp_opt(s, 0)
            .single()
            .map(Some)
            .ok_or_else(|| rusqlite::Error::IntegralValueOutOfRange(0, s)),
    }
}

fn row_to_item(row: &Row) -> rusqlite::Result<Item> {
    let length_code: u8 = row.get("length")?;
    let priority_rank: u8 = row.get("priority")?;
    Ok(Item {
        id: row.get("id")?,
        name: row.get("name")?,
        due: decode_stamp(row.get("due")?)?,
        start: decode_stamp(row.get("start")?)?,
        length: TaskLength::from_code(length_code)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, length_code as i64))?,
        priority: Priority::from_rank(priority_rank)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, priority_rank as i64))?,
        finished: row.get("finished")?,
        tags: Vec::new(), // filled in by the caller
    })
}

impl Store for SqliteStore {
    fn read_all(&mut self) -> StoreResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, due, start, length, priority, finished FROM item ORDER BY id",
        )?;
        let mut items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        for item in &mut items {
            item.tags = self.tags_for(item.id)?;
        }
        Ok(items)
    }

    fn next_id(&mut self) -> StoreResult<u64> {
        let max: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(id), 0) FROM item", [], |row| row.get(0))?;
        Ok(max as u64 + 1)
    }

    fn get(&mut self, id: u64) -> StoreResult<Option<Item>> {
        let item = self
            .conn
            .query_row(
                "SELECT id, name, due, start, length, priority, finished FROM item WHERE id = ?1",
                params![id],
                row_to_item,
            )
            .optional()?;
        match item {
            Some(mut item) => {
                item.tags = self.tags_for(item.id)?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    // The item row and its tag rows are written atomically; a failed tag
    // write rolls the pair back on drop.
    fn insert(&mut self, item: Item) -> StoreResult<u64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO item (name, due, start, length, priority, finished)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.name,
                item.due.map(|d| d.timestamp()),
                item.start.map(|s| s.timestamp()),
                item.length.code(),
                item.priority.rank(),
                item.finished,
            ],
        )?;
        let id = tx.last_insert_rowid() as u64;
        write_tags(&tx, id, &item.tags)?;
        tx.commit()?;
        Ok(id)
    }

    fn update(&mut self, item: &Item) -> StoreResult<bool> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE item SET name = ?1, due = ?2, start = ?3, length = ?4, priority = ?5, finished = ?6
             WHERE id = ?7",
            params![
                item.name,
                item.due.map(|d| d.timestamp()),
                item.start.map(|s| s.timestamp()),
                item.length.code(),
                item.priority.rank(),
                item.finished,
                item.id,
            ],
        )?;
        if changed == 0 {
            return Ok(false);
        }
        write_tags(&tx, item.id, &item.tags)?;
        tx.commit()?;
        Ok(true)
    }

    fn set_finished(&mut self, id: u64, finished: bool) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE item SET finished = ?1 WHERE id = ?2",
            params![finished, id],
        )?;
        Ok(changed > 0)
    }

    fn remove(&mut self, id: u64) -> StoreResult<bool> {
        // Tag rows go with the item via ON DELETE CASCADE.
        let changed = self.conn.execute("DELETE FROM item WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
