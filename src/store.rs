//! Task store trait and the flat-file backend.
//!
//! The data file is line-oriented text: a version line (ignored on read),
//! then `<count> <nextId>`, then three lines per item:
//!
//! ```text
//! <id> <length> <priority> <dueUnixSeconds> <startUnixSeconds> <finishedFlag>
//! <name>
//! <comma,joined,tags or NULL>
//! ```
//!
//! A due/start value of zero seconds means "unset" and is decoded to `None`;
//! the sentinel never leaves this module.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone};

use crate::fields::{Priority, TaskLength};
use crate::task::Item;

pub type StoreResult<T> = Result<T, Box<dyn Error>>;

/// Storage backend seam. One invocation reads the snapshot once and performs
/// at most one mutation; implementations persist on each mutating call.
pub trait Store {
    /// Full current snapshot, unfinished and finished together.
    fn read_all(&mut self) -> StoreResult<Vec<Item>>;
    /// The id the next inserted item will receive.
    fn next_id(&mut self) -> StoreResult<u64>;
    fn get(&mut self, id: u64) -> StoreResult<Option<Item>>;
    /// Insert, assigning a fresh id. Returns the assigned id.
    fn insert(&mut self, item: Item) -> StoreResult<u64>;
    /// Replace the item with the same id. Returns false if no such item.
    fn update(&mut self, item: &Item) -> StoreResult<bool>;
    fn set_finished(&mut self, id: u64, finished: bool) -> StoreResult<bool>;
    fn remove(&mut self, id: u64) -> StoreResult<bool>;
}

// Written to the top of the data file for forward compatibility; readers
// currently ignore it.
const FORMAT_VERSION: &str = "1";

/// One parsed data file: every item plus the persisted id counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub next_id: u64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot { items: Vec::new(), next_id: 1 }
    }
}

fn decode_stamp(secs: i64) -> Result<Option<DateTime<Local>>, String> {
    if secs == 0 {
        return Ok(None);
    }
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(Some)
        .ok_or_else(|| format!("timestamp out of range: {secs}"))
}

fn encode_stamp(stamp: Option<DateTime<Local>>) -> i64 {
    stamp.map(|t| t.timestamp()).unwrap_or(0)
}

/// Parse the full data file. An empty file is a valid empty snapshot.
pub fn parse_snapshot(text: &str) -> Result<Snapshot, String> {
    let mut lines = text.lines();
    if lines.next().map(str::trim).unwrap_or("").is_empty() {
        return Ok(Snapshot::default());
    }

    let header = lines.next().ok_or("missing count/nextId header")?;
    let mut parts = header.split_whitespace();
    let count: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format!("bad item count in header: {header}"))?;
    let next_id: u64 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format!("bad next id in header: {header}"))?;

    let mut items = Vec::with_capacity(count);
    for n in 0..count {
        let fields_line = lines.next().ok_or_else(|| format!("item {n}: missing fields line"))?;
        let name_line = lines.next().ok_or_else(|| format!("item {n}: missing name line"))?;
        let tags_line = lines.next().ok_or_else(|| format!("item {n}: missing tags line"))?;

        let fields: Vec<&str> = fields_line.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(format!("item {n}: expected 6 fields, got {}", fields.len()));
        }
        let id: u64 = fields[0].parse().map_err(|_| format!("item {n}: bad id: {}", fields[0]))?;
        let length = fields[1]
            .parse()
            .ok()
            .and_then(TaskLength::from_code)
            .ok_or_else(|| format!("item {n}: bad length: {}", fields[1]))?;
        let priority = fields[2]
            .parse()
            .ok()
            .and_then(Priority::from_rank)
            .ok_or_else(|| format!("item {n}: bad priority: {}", fields[2]))?;
        let due_secs: i64 = fields[3].parse().map_err(|_| format!("item {n}: bad due: {}", fields[3]))?;
        let start_secs: i64 = fields[4].parse().map_err(|_| format!("item {n}: bad start: {}", fields[4]))?;
        let finished = match fields[5] {
            "0" => false,
            "1" => true,
            other => return Err(format!("item {n}: bad finished flag: {other}")),
        };

        let tags = if tags_line == "NULL" || tags_line.is_empty() {
            Vec::new()
        } else {
            tags_line.split(',').map(str::to_string).collect()
        };

        items.push(Item {
            id,
            name: name_line.to_string(),
            due: decode_stamp(due_secs)?,
            start: decode_stamp(start_secs)?,
            length,
            priority,
            finished,
            tags,
        });
    }

    Ok(Snapshot { items, next_id })
}

/// Serialize a snapshot back to the data file text.
pub fn encode_snapshot(snap: &Snapshot) -> String {
    let mut out = String::new();
    out.push_str(FORMAT_VERSION);
    out.push('\n');
    out.push_str(&format!("{} {}\n", snap.items.len(), snap.next_id));
    for item in &snap.items {
        out.push_str(&format!(
            "{} {} {} {} {} {}\n",
            item.id,
            item.length.code(),
            item.priority.rank(),
            encode_stamp(item.due),
            encode_stamp(item.start),
            u8::from(item.finished)
        ));
        out.push_str(&item.name);
        out.push('\n');
        if item.tags.is_empty() {
            out.push_str("NULL");
        } else {
            out.push_str(&item.tags.join(","));
        }
        out.push('\n');
    }
    out
}

/// Names and tags occupy whole lines in the data file, and tags are joined
/// with commas, so embedded line breaks (or commas in a tag) would corrupt
/// neighbouring records on reload. Checked before every write.
fn check_single_line(item: &Item) -> Result<(), String> {
    if item.name.chars().any(|c| c == '\n' || c == '\r') {
        return Err(format!("item name must not contain line breaks: {:?}", item.name));
    }
    for tag in &item.tags {
        if tag.chars().any(|c| c == '\n' || c == '\r' || c == ',') {
            return Err(format!("tag must not contain line breaks or commas: {tag:?}"));
        }
    }
    Ok(())
}

/// `~/.wtodo`, created on first use.
pub fn data_dir() -> StoreResult<PathBuf> {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let dir = PathBuf::from(home).join(".wtodo");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Flat-file backend. The whole snapshot lives in memory; every mutation
/// rewrites the file atomically (temp file + rename).
pub struct FileStore {
    path: PathBuf,
    snapshot: Snapshot,
}

impl FileStore {
    pub fn open(path: PathBuf) -> StoreResult<Self> {
        let snapshot = if path.exists() {
            parse_snapshot(&fs::read_to_string(&path)?)?
        } else {
            Snapshot::default()
        };
        Ok(FileStore { path, snapshot })
    }

    fn flush(&self) -> StoreResult<()> {
        let tmp = self.path.with_extension("dat.tmp");
        fs::write(&tmp, encode_snapshot(&self.snapshot))?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn read_all(&mut self) -> StoreResult<Vec<Item>> {
        Ok(self.snapshot.items.clone())
    }

    fn next_id(&mut self) -> StoreResult<u64> {
        Ok(self.snapshot.next_id)
    }

    fn get(&mut self, id: u64) -> StoreResult<Option<Item>> {
        Ok(self.snapshot.items.iter().find(|t| t.id == id).cloned())
    }

    fn insert(&mut self, mut item: Item) -> StoreResult<u64> {
        check_single_line(&item)?;
        let id = self.snapshot.next_id;
        item.id = id;
        self.snapshot.items.push(item);
        self.snapshot.next_id += 1;
        self.flush()?;
        Ok(id)
    }

    fn update(&mut self, item: &Item) -> StoreResult<bool> {
        check_single_line(item)?;
        match self.snapshot.items.iter_mut().find(|t| t.id == item.id) {
            Some(slot) => {
                *slot = item.clone();
                self.flush()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_finished(&mut self, id: u64, finished: bool) -> StoreResult<bool> {
        match self.snapshot.items.iter_mut().find(|t| t.id == id) {
            Some(item) => {
                item.finished = finished;
                self.flush()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&mut self, id: u64) -> StoreResult<bool> {
        let before = self.snapshot.items.len();
        self.snapshot.items.retain(|t| t.id != id);
        if self.snapshot.items.len() == before {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Item;

    const SAMPLE: &str = "1\n2 4\n\
        1 0 2 1704880800 0 0\nwater the plants\nNULL\n\
        3 2 1 0 1704000000 1\nwrite the report\nwork,urgent\n";

    #[test]
    fn empty_file_is_an_empty_snapshot() {
        let snap = parse_snapshot("").unwrap();
        assert!(snap.items.is_empty());
        assert_eq!(snap.next_id, 1);
    }

    #[test]
    fn parses_items_and_header() {
        let snap = parse_snapshot(SAMPLE).unwrap();
        assert_eq!(snap.next_id, 4);
        assert_eq!(snap.items.len(), 2);

        let first = &snap.items[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.name, "water the plants");
        assert_eq!(first.length, TaskLength::Short);
        assert_eq!(first.priority, Priority::Normal);
        assert!(!first.finished);
        assert!(first.tags.is_empty());
        assert_eq!(first.due.map(|d| d.timestamp()), Some(1704880800));
        assert_eq!(first.start, None); // zero sentinel decodes to None

        let second = &snap.items[1];
        assert_eq!(second.due, None);
        assert_eq!(second.start.map(|s| s.timestamp()), Some(1704000000));
        assert!(second.finished);
        assert_eq!(second.tags, vec!["work", "urgent"]);
    }

    #[test]
    fn encode_is_the_inverse_of_parse() {
        let snap = parse_snapshot(SAMPLE).unwrap();
        assert_eq!(encode_snapshot(&snap), SAMPLE);
    }

    #[test]
    fn rejects_malformed_records() {
        assert!(parse_snapshot("1\n1 2\n1 0 2 0 0\nshort line\nNULL\n").is_err()); // 5 fields
        assert!(parse_snapshot("1\n1 2\n1 9 2 0 0 0\nbad length\nNULL\n").is_err());
        assert!(parse_snapshot("1\n1 2\n1 0 7 0 0 0\nbad priority\nNULL\n").is_err());
        assert!(parse_snapshot("1\n1 2\n1 0 2 0 0 x\nbad flag\nNULL\n").is_err());
        assert!(parse_snapshot("1\nnot a header\n").is_err());
        assert!(parse_snapshot("1\n2 5\n1 0 2 0 0 0\nonly one item\nNULL\n").is_err());
    }

    #[test]
    fn file_store_assigns_ids_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wtodo.dat");

        let mut store = FileStore::open(path.clone()).unwrap();
        let id = store.insert(Item::draft("first".into())).unwrap();
        assert_eq!(id, 1);
        let id = store.insert(Item::draft("second".into())).unwrap();
        assert_eq!(id, 2);
        assert!(store.set_finished(1, true).unwrap());
        assert!(!store.set_finished(99, true).unwrap());

        // Fresh handle sees the persisted state.
        let mut reloaded = FileStore::open(path).unwrap();
        let items = reloaded.read_all().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].finished);
        assert_eq!(reloaded.next_id().unwrap(), 3);

        assert!(reloaded.remove(1).unwrap());
        assert!(!reloaded.remove(1).unwrap());
        assert_eq!(reloaded.read_all().unwrap().len(), 1);
    }

    #[test]
    fn rejects_names_and_tags_that_would_break_the_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("wtodo.dat")).unwrap();

        // A multi-line name would be cut at the newline on reload, with the
        // remainder consumed as the tags line.
        assert!(store.insert(Item::draft("line one\nline two".into())).is_err());

        let mut tagged = Item::draft("ok".into());
        tagged.tags = vec!["a\nb".into()];
        assert!(store.insert(tagged).is_err());

        let mut comma = Item::draft("ok".into());
        comma.tags = vec!["a,b".into()];
        assert!(store.insert(comma).is_err());

        let id = store.insert(Item::draft("fine".into())).unwrap();
        let mut edited = store.get(id).unwrap().unwrap();
        edited.name = "split\rname".into();
        assert!(store.update(&edited).is_err());

        // Nothing from the rejected writes was persisted, in memory or on disk.
        assert_eq!(store.read_all().unwrap().len(), 1);
        let mut reloaded = FileStore::open(dir.path().join("wtodo.dat")).unwrap();
        let items = reloaded.read_all().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "fine");
    }

    #[test]
    fn update_replaces_matching_item() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("wtodo.dat")).unwrap();
        let id = store.insert(Item::draft("old name".into())).unwrap();

        let mut edited = store.get(id).unwrap().unwrap();
        edited.name = "new name".into();
        edited.priority = Priority::High;
        assert!(store.update(&edited).unwrap());
        assert_eq!(store.get(id).unwrap().unwrap().name, "new name");

        let missing = Item { id: 42, ..Item::draft("ghost".into()) };
        assert!(!store.update(&missing).unwrap());
    }
}
