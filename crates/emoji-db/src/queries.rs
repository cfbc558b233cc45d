use crate::Database;
use crate::models::{EmojiChanges, EmojiRow, NewEmoji, UserRow};
use crate::repository::{EmojiRepository, UserRepository};
use anyhow::Result;
use rusqlite::{Connection, Row};

const EMOJI_COLUMNS: &str =
    "id, name, char, keywords, category, created_by, date_created, date_modified";

const USER_COLUMNS: &str = "id, username, password, token, expires";

impl EmojiRepository for Database {
    fn all(&self) -> Result<Vec<EmojiRow>> {
        self.with_conn(query_emojis)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<EmojiRow>> {
        self.with_conn(|conn| query_emoji_by_id(conn, id))
    }

    fn insert(&self, emoji: &NewEmoji) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO emojis (name, char, keywords, category, created_by, date_created, date_modified)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                rusqlite::params![
                    emoji.name,
                    emoji.glyph,
                    emoji.keywords,
                    emoji.category,
                    emoji.created_by,
                    emoji.timestamp,
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    fn update(&self, id: i64, changes: &EmojiChanges, date_modified: &str) -> Result<bool> {
        self.with_conn(|conn| {
            // COALESCE keeps the current value for every column left as None
            let updated = conn.execute(
                "UPDATE emojis SET
                    name = COALESCE(?1, name),
                    char = COALESCE(?2, char),
                    keywords = COALESCE(?3, keywords),
                    category = COALESCE(?4, category),
                    created_by = COALESCE(?5, created_by),
                    date_modified = ?6
                 WHERE id = ?7",
                rusqlite::params![
                    changes.name,
                    changes.glyph,
                    changes.keywords,
                    changes.category,
                    changes.created_by,
                    date_modified,
                    id,
                ],
            )?;
            Ok(updated > 0)
        })
    }

    fn delete(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM emojis WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }
}

impl UserRepository for Database {
    fn find_by_username(&self, username: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 ORDER BY id"
            ))?;

            let rows = stmt
                .query_map([username], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    fn find_by_token(&self, token: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE token = ?1 ORDER BY id LIMIT 1"),
                [token],
                user_from_row,
            )
            .optional()
        })
    }

    fn insert(&self, username: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(inserted == 1)
        })
    }

    fn update_token(&self, id: i64, token: &str, expires: Option<i64>) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET token = ?1, expires = ?2 WHERE id = ?3",
                rusqlite::params![token, expires, id],
            )?;
            Ok(updated > 0)
        })
    }
}

fn query_emojis(conn: &Connection) -> Result<Vec<EmojiRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {EMOJI_COLUMNS} FROM emojis ORDER BY id"))?;

    let rows = stmt
        .query_map([], emoji_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_emoji_by_id(conn: &Connection, id: i64) -> Result<Option<EmojiRow>> {
    conn.query_row(
        &format!("SELECT {EMOJI_COLUMNS} FROM emojis WHERE id = ?1"),
        [id],
        emoji_from_row,
    )
    .optional()
}

fn emoji_from_row(row: &Row<'_>) -> rusqlite::Result<EmojiRow> {
    Ok(EmojiRow {
        id: row.get(0)?,
        name: row.get(1)?,
        glyph: row.get(2)?,
        keywords: row.get(3)?,
        category: row.get(4)?,
        created_by: row.get(5)?,
        date_created: row.get(6)?,
        date_modified: row.get(7)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        token: row.get(3)?,
        expires: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> NewEmoji {
        NewEmoji {
            name: name.to_string(),
            glyph: "😀".to_string(),
            keywords: r#"["fun","happy"]"#.to_string(),
            category: "faces".to_string(),
            created_by: None,
            timestamp: "2024-01-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn insert_then_list_in_id_order() {
        let db = Database::open_in_memory().unwrap();
        assert!(EmojiRepository::insert(&db, &sample("grin")).unwrap());
        assert!(EmojiRepository::insert(&db, &sample("wink")).unwrap());

        let rows = db.all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "grin");
        assert_eq!(rows[1].name, "wink");
        assert_eq!(rows[0].date_created, rows[0].date_modified);
    }

    #[test]
    fn update_only_touches_given_columns() {
        let db = Database::open_in_memory().unwrap();
        EmojiRepository::insert(&db, &sample("grin")).unwrap();

        let changes = EmojiChanges {
            category: Some("smileys".to_string()),
            ..Default::default()
        };
        assert!(db.update(1, &changes, "2024-02-02 12:00:00").unwrap());

        let row = db.find_by_id(1).unwrap().unwrap();
        assert_eq!(row.name, "grin");
        assert_eq!(row.category, "smileys");
        assert_eq!(row.date_created, "2024-01-01 10:00:00");
        assert_eq!(row.date_modified, "2024-02-02 12:00:00");
    }

    #[test]
    fn writes_to_missing_rows_report_false() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.update(42, &EmojiChanges::default(), "2024-02-02 12:00:00").unwrap());
        assert!(!db.delete(42).unwrap());
        assert!(db.find_by_id(42).unwrap().is_none());
    }

    #[test]
    fn token_round_trip_on_users() {
        let db = Database::open_in_memory().unwrap();
        assert!(UserRepository::insert(&db, "ada", "hash").unwrap());

        let user = db.find_by_username("ada").unwrap().pop().unwrap();
        assert_eq!(user.token, None);

        assert!(db.update_token(user.id, "tok", Some(1_700_000_000)).unwrap());
        let holder = db.find_by_token("tok").unwrap().unwrap();
        assert_eq!(holder.id, user.id);
        assert_eq!(holder.expires, Some(1_700_000_000));

        assert!(db.update_token(user.id, "", None).unwrap());
        assert!(db.find_by_token("tok").unwrap().is_none());
        assert!(!db.update_token(999, "tok", None).unwrap());
    }

    #[test]
    fn duplicate_usernames_are_allowed() {
        let db = Database::open_in_memory().unwrap();
        UserRepository::insert(&db, "ada", "one").unwrap();
        UserRepository::insert(&db, "ada", "two").unwrap();

        let users = db.find_by_username("ada").unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].password, "one");
    }
}
