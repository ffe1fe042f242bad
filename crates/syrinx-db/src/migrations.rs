use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version = current_version(conn)?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                username    TEXT NOT NULL,
                server      TEXT NOT NULL DEFAULT '',
                kind        TEXT NOT NULL,
                data        TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (username, server)
            );

            CREATE TABLE records (
                kind        TEXT NOT NULL,
                id          TEXT NOT NULL,
                data        TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (kind, id)
            );

            -- position keeps insertion order; an upsert leaves it untouched.
            -- owner_kind is the owner's key space, so every account kind
            -- shares one value.
            CREATE TABLE relations (
                position    INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_kind  TEXT NOT NULL,
                owner       TEXT NOT NULL,
                namespace   TEXT NOT NULL,
                item_key    TEXT NOT NULL,
                kind        TEXT NOT NULL,
                data        TEXT NOT NULL,
                UNIQUE(owner_kind, owner, namespace, item_key)
            );

            CREATE INDEX idx_relations_owner
                ON relations(owner_kind, owner, namespace, position);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        assert_eq!(current_version(&conn).unwrap(), SCHEMA_VERSION);
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
