use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (emojis + users)");
        conn.execute_batch(
            "
            CREATE TABLE emojis (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                char            TEXT NOT NULL,
                keywords        TEXT NOT NULL DEFAULT '[]',
                category        TEXT NOT NULL,
                created_by      TEXT,
                date_created    TEXT NOT NULL,
                date_modified   TEXT NOT NULL
            );

            -- username is deliberately not UNIQUE: registration only rejects
            -- an exact username + password repeat.
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL,
                password    TEXT NOT NULL,
                token       TEXT,
                expires     INTEGER
            );

            CREATE INDEX idx_users_username ON users(username);
            CREATE INDEX idx_users_token ON users(token);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
