use chrono::Utc;
use rusqlite::{params, Connection};

use crate::Error;

const MIGRATIONS: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_courses_owner_id ON courses(owner_id);

CREATE TABLE IF NOT EXISTS lessons (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_lessons_course_id ON lessons(course_id);

CREATE TABLE IF NOT EXISTS enrolments (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_enrolments_course_id ON enrolments(course_id);
CREATE INDEX IF NOT EXISTS idx_enrolments_user_id ON enrolments(user_id);

CREATE TABLE IF NOT EXISTS homework (
    id TEXT PRIMARY KEY,
    learner_id TEXT NOT NULL REFERENCES users(id),
    text TEXT NOT NULL,
    submitted_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_homework_learner_id ON homework(learner_id);
"#];

pub(crate) fn run(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS migrations (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL)")?;

    let current_version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM migrations", [], |row| row.get(0)).unwrap_or(0);

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i64;
        if version > current_version {
            conn.execute_batch(migration)?;
            conn.execute("INSERT INTO migrations (version, applied_at) VALUES (?1, ?2)", params![version, Utc::now().to_rfc3339()])?;
            tracing::info!(version, "applied migration");
        }
    }

    Ok(())
}
