//! Database schema definitions

/// SQL to create the records table
pub const CREATE_RECORDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    guid TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    label TEXT NOT NULL DEFAULT '',
    data TEXT NOT NULL DEFAULT '{}'
)
"#;

/// SQL to create the ownership table
/// A record has at most one owner; position orders siblings.
pub const CREATE_OWNS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS owns (
    child TEXT PRIMARY KEY,
    parent TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
)
"#;

/// SQL to create the references table
pub const CREATE_REFS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS refs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    src TEXT NOT NULL,
    dst TEXT NOT NULL,
    UNIQUE(src, dst)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind)",
    "CREATE INDEX IF NOT EXISTS idx_owns_parent ON owns(parent)",
    "CREATE INDEX IF NOT EXISTS idx_refs_src ON refs(src)",
    "CREATE INDEX IF NOT EXISTS idx_refs_dst ON refs(dst)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_RECORDS_TABLE, CREATE_OWNS_TABLE, CREATE_REFS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
