/// Version written to `PRAGMA user_version` once all migrations are applied.
pub const SCHEMA_VERSION: u32 = 1;

/// Ordered migrations; entry `n` upgrades a database from version `n` to `n + 1`.
pub const MIGRATIONS: &[&str] = &[V1_FEEDS];

const V1_FEEDS: &str = r#"
-- live feeds collection
CREATE TABLE IF NOT EXISTS feeds (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (name <> ''),
    url TEXT NOT NULL CHECK (url <> ''),
    timestamp INTEGER NOT NULL
);
"#;
