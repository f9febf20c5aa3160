use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE: &str = "classtrack.sqlite3";

/// One table per record kind. Rows keep the hosted backend's field naming
/// inside `row_json`; `student_key` and `day_key` are lifted out so owner
/// lookups and the attendance day constraint live in SQL.
pub const TABLES: [&str; 5] = ["students", "classes", "grades", "attendance", "assignments"];

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;

    for table in TABLES {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table}(
                    Id INTEGER PRIMARY KEY AUTOINCREMENT,
                    student_key INTEGER,
                    day_key TEXT,
                    row_json TEXT NOT NULL
                )"
            ),
            [],
        )?;
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_student ON {table}(student_key)"
            ),
            [],
        )?;
        ensure_modified_on(&conn, table)?;
    }

    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_day
            ON attendance(student_key, day_key)",
        [],
    )?;

    Ok(conn)
}

fn ensure_modified_on(conn: &Connection, table: &str) -> anyhow::Result<()> {
    if table_has_column(conn, table, "modified_on")? {
        return Ok(());
    }
    conn.execute(
        &format!("ALTER TABLE {table} ADD COLUMN modified_on TEXT"),
        [],
    )?;
    Ok(())
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
