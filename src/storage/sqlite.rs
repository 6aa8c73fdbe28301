//! SQLite storage implementation

use super::schema;
use crate::record::{RecordKind, RecordRef};
use crate::{Error, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// A record row as stored: identity plus its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub rec: RecordRef,
    /// Human-readable label (headword, gloss, abbreviation)
    pub label: String,
    /// JSON payload with the kind-specific fields
    pub data: String,
}

impl StoredRecord {
    pub fn new(rec: RecordRef, label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            rec,
            label: label.into(),
            data: data.into(),
        }
    }
}

/// SQLite-backed record store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Record Operations ==========

    /// Insert or replace a record
    pub fn insert_record(&self, record: &StoredRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO records (guid, kind, label, data) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.rec.guid.to_string(),
                record.rec.kind.as_str(),
                record.label,
                record.data,
            ],
        )?;
        Ok(())
    }

    /// Get a record by reference
    pub fn get_record(&self, rec: &RecordRef) -> Result<Option<StoredRecord>> {
        self.conn
            .query_row(
                "SELECT guid, kind, label, data FROM records WHERE guid = ?1",
                [rec.guid.to_string()],
                |row| Self::row_to_record(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Whether a record with this identity key exists
    pub fn contains(&self, rec: &RecordRef) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE guid = ?1",
            [rec.guid.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All records of a kind
    pub fn records_of_kind(&self, kind: RecordKind) -> Result<Vec<StoredRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT guid, kind, label, data FROM records WHERE kind = ?1 ORDER BY label")?;
        let records = stmt
            .query_map([kind.as_str()], |row| Self::row_to_record(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    // ========== Edge Operations ==========

    /// Make `parent` the owner of `child` at the given sibling position
    pub fn attach_owner(&self, child: &RecordRef, parent: &RecordRef, position: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO owns (child, parent, position) VALUES (?1, ?2, ?3)",
            params![child.guid.to_string(), parent.guid.to_string(), position],
        )?;
        Ok(())
    }

    /// Add a reference link (duplicates are ignored)
    pub fn add_reference(&self, src: &RecordRef, dst: &RecordRef) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO refs (src, dst) VALUES (?1, ?2)",
            params![src.guid.to_string(), dst.guid.to_string()],
        )?;
        Ok(())
    }

    /// Records owned by `parent`, in sibling order
    pub fn owned_children(&self, parent: &RecordRef) -> Result<Vec<RecordRef>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.kind, r.guid FROM owns o JOIN records r ON r.guid = o.child
             WHERE o.parent = ?1 ORDER BY o.position, o.child",
        )?;
        let refs = stmt
            .query_map([parent.guid.to_string()], |row| Self::row_to_ref(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(refs)
    }

    /// Records that `src` references
    pub fn references_of(&self, src: &RecordRef) -> Result<Vec<RecordRef>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.kind, r.guid FROM refs f JOIN records r ON r.guid = f.dst
             WHERE f.src = ?1 ORDER BY f.id",
        )?;
        let refs = stmt
            .query_map([src.guid.to_string()], |row| Self::row_to_ref(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(refs)
    }

    /// Reverse-reference scan: records of the given kinds referencing `dst`
    pub fn referrers_of(&self, dst: &RecordRef, kinds: &[RecordKind]) -> Result<Vec<RecordRef>> {
        if kinds.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; kinds.len()].join(", ");
        let sql = format!(
            "SELECT r.kind, r.guid FROM refs f JOIN records r ON r.guid = f.src
             WHERE f.dst = ? AND r.kind IN ({}) ORDER BY f.id",
            placeholders
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let mut values: Vec<String> = vec![dst.guid.to_string()];
        values.extend(kinds.iter().map(|k| k.as_str().to_string()));

        let refs = stmt
            .query_map(params_from_iter(values.iter()), |row| Self::row_to_ref(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(refs)
    }

    /// Owner of `child`, if any
    pub fn owner_of(&self, child: &RecordRef) -> Result<Option<RecordRef>> {
        self.conn
            .query_row(
                "SELECT r.kind, r.guid FROM owns o JOIN records r ON r.guid = o.parent
                 WHERE o.child = ?1",
                [child.guid.to_string()],
                |row| Self::row_to_ref(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Sibling position of `child` under its owner
    pub fn owned_position(&self, child: &RecordRef) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT position FROM owns WHERE child = ?1",
                [child.guid.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    // ========== Statistics ==========

    /// Count all records
    pub fn count_records(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Per-kind record counts
    pub fn count_by_kind(&self) -> Result<Vec<(RecordKind, usize)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM records GROUP BY kind ORDER BY kind")?;
        let counts = stmt
            .query_map([], |row| {
                let kind_str: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                let kind = RecordKind::from_str(&kind_str).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok((kind, count as usize))
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(counts)
    }

    /// Get statistics about the store
    pub fn stats(&self) -> Result<StoreStats> {
        let owned_links: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM owns", [], |row| row.get(0))?;
        let reference_links: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM refs", [], |row| row.get(0))?;
        Ok(StoreStats {
            records: self.count_records()?,
            owned_links: owned_links as usize,
            reference_links: reference_links as usize,
        })
    }

    // ========== Row Helpers ==========

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<StoredRecord> {
        let guid_str: String = row.get(0)?;
        let kind_str: String = row.get(1)?;
        let rec = Self::parse_ref(&kind_str, &guid_str)?;
        Ok(StoredRecord {
            rec,
            label: row.get(2)?,
            data: row.get(3)?,
        })
    }

    fn row_to_ref(row: &rusqlite::Row) -> rusqlite::Result<RecordRef> {
        let kind_str: String = row.get(0)?;
        let guid_str: String = row.get(1)?;
        Self::parse_ref(&kind_str, &guid_str)
    }

    fn parse_ref(kind_str: &str, guid_str: &str) -> rusqlite::Result<RecordRef> {
        let kind = RecordKind::from_str(kind_str).map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let guid = Uuid::parse_str(guid_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(RecordRef::new(kind, guid))
    }
}

/// Statistics about a record store
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub records: usize,
    pub owned_links: usize,
    pub reference_links: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store Statistics:")?;
        writeln!(f, "  Records: {}", self.records)?;
        writeln!(f, "  Ownership links: {}", self.owned_links)?;
        writeln!(f, "  Reference links: {}", self.reference_links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_entry() -> (SqliteStore, RecordRef, RecordRef, RecordRef) {
        let store = SqliteStore::open_in_memory().unwrap();
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);
        let pos = RecordRef::random(RecordKind::PartOfSpeech);

        store
            .insert_record(&StoredRecord::new(entry, "run", r#"{"form":"run"}"#))
            .unwrap();
        store
            .insert_record(&StoredRecord::new(sense, "to move fast", "{}"))
            .unwrap();
        store
            .insert_record(&StoredRecord::new(pos, "verb", "{}"))
            .unwrap();
        store.attach_owner(&sense, &entry, 0).unwrap();
        store.add_reference(&sense, &pos).unwrap();

        (store, entry, sense, pos)
    }

    #[test]
    fn test_insert_and_get() {
        let (store, entry, _, _) = store_with_entry();

        let record = store.get_record(&entry).unwrap().unwrap();
        assert_eq!(record.rec, entry);
        assert_eq!(record.label, "run");
        assert!(store.contains(&entry).unwrap());
        assert!(!store.contains(&RecordRef::random(RecordKind::Entry)).unwrap());
    }

    #[test]
    fn test_owned_children_in_sibling_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let entry = RecordRef::random(RecordKind::Entry);
        let s1 = RecordRef::random(RecordKind::Sense);
        let s2 = RecordRef::random(RecordKind::Sense);

        store.insert_record(&StoredRecord::new(entry, "walk", "{}")).unwrap();
        store.insert_record(&StoredRecord::new(s1, "first", "{}")).unwrap();
        store.insert_record(&StoredRecord::new(s2, "second", "{}")).unwrap();
        store.attach_owner(&s2, &entry, 1).unwrap();
        store.attach_owner(&s1, &entry, 0).unwrap();

        assert_eq!(store.owned_children(&entry).unwrap(), vec![s1, s2]);
        assert_eq!(store.owner_of(&s1).unwrap(), Some(entry));
        assert_eq!(store.owned_position(&s2).unwrap(), Some(1));
    }

    #[test]
    fn test_references_and_referrers() {
        let (store, _, sense, pos) = store_with_entry();

        assert_eq!(store.references_of(&sense).unwrap(), vec![pos]);
        assert_eq!(
            store.referrers_of(&pos, &[RecordKind::Sense]).unwrap(),
            vec![sense]
        );
        assert!(store
            .referrers_of(&pos, &[RecordKind::Example])
            .unwrap()
            .is_empty());
        assert!(store.referrers_of(&pos, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_reference_ignored() {
        let (store, _, sense, pos) = store_with_entry();
        store.add_reference(&sense, &pos).unwrap();

        assert_eq!(store.references_of(&sense).unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let entry = RecordRef::random(RecordKind::Entry);

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert_record(&StoredRecord::new(entry, "persisted", "{}"))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let record = store.get_record(&entry).unwrap().unwrap();
        assert_eq!(record.label, "persisted");
    }

    #[test]
    fn test_stats_and_counts() {
        let (store, _, _, _) = store_with_entry();

        let stats = store.stats().unwrap();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.owned_links, 1);
        assert_eq!(stats.reference_links, 1);

        let by_kind = store.count_by_kind().unwrap();
        assert!(by_kind.contains(&(RecordKind::Entry, 1)));
        assert!(by_kind.contains(&(RecordKind::Sense, 1)));
    }
}
