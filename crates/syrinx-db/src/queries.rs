use crate::models::{EntityRow, RelationRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn upsert_user(&self, username: &str, server: &str, kind: &str, data: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, server, kind, data) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(username, server) DO UPDATE SET kind = excluded.kind, data = excluded.data",
                (username, server, kind, data),
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, username: &str, server: &str) -> Result<Option<EntityRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT kind, data FROM users WHERE username = ?1 AND server = ?2",
                    (username, server),
                    |row| {
                        Ok(EntityRow {
                            kind: row.get(0)?,
                            data: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Removes the account together with every collection it owns.
    /// `owner_kind` is the account key space, `owner` its identity key.
    pub fn delete_user(&self, username: &str, server: &str, owner_kind: &str, owner: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "DELETE FROM users WHERE username = ?1 AND server = ?2",
                (username, server),
            )?;
            let dropped = delete_owned(&tx, owner_kind, owner)?;
            tx.commit()?;
            Ok(dropped)
        })
    }

    // -- Records --

    pub fn upsert_record(&self, kind: &str, id: &str, data: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO records (kind, id, data) VALUES (?1, ?2, ?3)
                 ON CONFLICT(kind, id) DO UPDATE SET data = excluded.data",
                (kind, id, data),
            )?;
            Ok(())
        })
    }

    pub fn get_record(&self, kind: &str, id: &str) -> Result<Option<EntityRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT kind, data FROM records WHERE kind = ?1 AND id = ?2",
                    (kind, id),
                    |row| {
                        Ok(EntityRow {
                            kind: row.get(0)?,
                            data: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Removes the record together with every collection keyed by its id.
    pub fn delete_record(&self, kind: &str, id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM records WHERE kind = ?1 AND id = ?2", (kind, id))?;
            let dropped = delete_owned(&tx, kind, id)?;
            tx.commit()?;
            Ok(dropped)
        })
    }

    /// Users plus records.
    pub fn count_entities(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT (SELECT COUNT(*) FROM users) + (SELECT COUNT(*) FROM records)",
                [],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count)?)
        })
    }

    // -- Relations --
    //
    // A collection is addressed by (owner_kind, owner, namespace).

    /// Inserts or replaces an entry. A replaced entry keeps its position.
    pub fn set_relation_item(
        &self,
        owner_kind: &str,
        owner: &str,
        namespace: &str,
        item_key: &str,
        kind: &str,
        data: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO relations (owner_kind, owner, namespace, item_key, kind, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(owner_kind, owner, namespace, item_key)
                 DO UPDATE SET kind = excluded.kind, data = excluded.data",
                rusqlite::params![owner_kind, owner, namespace, item_key, kind, data],
            )?;
            Ok(())
        })
    }

    pub fn get_relation_item(
        &self,
        owner_kind: &str,
        owner: &str,
        namespace: &str,
        item_key: &str,
    ) -> Result<Option<RelationRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT item_key, kind, data FROM relations
                     WHERE owner_kind = ?1 AND owner = ?2 AND namespace = ?3 AND item_key = ?4",
                    (owner_kind, owner, namespace, item_key),
                    relation_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn relation_contains(
        &self,
        owner_kind: &str,
        owner: &str,
        namespace: &str,
        item_key: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM relations
                 WHERE owner_kind = ?1 AND owner = ?2 AND namespace = ?3 AND item_key = ?4)",
                (owner_kind, owner, namespace, item_key),
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }

    pub fn delete_relation_item(
        &self,
        owner_kind: &str,
        owner: &str,
        namespace: &str,
        item_key: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM relations
                 WHERE owner_kind = ?1 AND owner = ?2 AND namespace = ?3 AND item_key = ?4",
                (owner_kind, owner, namespace, item_key),
            )?;
            Ok(())
        })
    }

    pub fn relation_len(&self, owner_kind: &str, owner: &str, namespace: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM relations
                 WHERE owner_kind = ?1 AND owner = ?2 AND namespace = ?3",
                (owner_kind, owner, namespace),
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count)?)
        })
    }

    /// Entries in insertion order.
    pub fn relation_items(
        &self,
        owner_kind: &str,
        owner: &str,
        namespace: &str,
    ) -> Result<Vec<RelationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT item_key, kind, data FROM relations
                 WHERE owner_kind = ?1 AND owner = ?2 AND namespace = ?3
                 ORDER BY position",
            )?;

            let rows = stmt
                .query_map((owner_kind, owner, namespace), relation_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn relation_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RelationRow> {
    Ok(RelationRow {
        item_key: row.get(0)?,
        kind: row.get(1)?,
        data: row.get(2)?,
    })
}

fn delete_owned(conn: &Connection, owner_kind: &str, owner: &str) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM relations WHERE owner_kind = ?1 AND owner = ?2",
        (owner_kind, owner),
    )?)
}
