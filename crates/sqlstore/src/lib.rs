//! SQL-backed alternative to `logdb` over the same domain entities. Thin
//! CRUD, ordinary SQL indexes, one forward-only migration — this crate
//! carries none of `logdb`'s custom indexing or compaction design, only
//! enough behavior for `webapi` to point at either backend interchangeably.

mod error;
mod migrations;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use domain::{Course, Enrolment, Homework, Lesson, User};
use rusqlite::{params, Connection, OptionalExtension};

pub use error::Error;

pub struct SqlStore {
    conn: Mutex<Connection>,
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc)).map_err(|e| Error::Database(e.to_string()))
}

impl SqlStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        migrations::run(&conn)?;
        Ok(SqlStore { conn: Mutex::new(conn) })
    }

    pub fn memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::run(&conn)?;
        Ok(SqlStore { conn: Mutex::new(conn) })
    }

    // --- users ---

    pub fn store_user(&self, user: &User) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO users (id, name, email, password_hash, is_admin) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user.id, user.name, user.email, user.password_hash, user.is_admin],
        )?;
        Ok(())
    }

    pub fn load_user(&self, id: &str) -> Result<User, Error> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT id, name, email, password_hash, is_admin FROM users WHERE id = ?1", params![id], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                is_admin: row.get(4)?,
            })
        })
        .map_err(Error::from)
    }

    pub fn load_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT id, name, email, password_hash, is_admin FROM users WHERE email = ?1", params![email], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                is_admin: row.get(4)?,
            })
        })
        .optional()
        .map_err(Error::from)
    }

    // --- courses ---

    pub fn store_course(&self, course: &Course) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO courses (id, owner_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![course.id, course.owner_id, course.name, course.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load_course(&self, id: &str) -> Result<Course, Error> {
        let conn = self.conn.lock().unwrap();
        let (owner_id, name, created_at): (String, String, String) = conn
            .query_row("SELECT owner_id, name, created_at FROM courses WHERE id = ?1", params![id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?;
        Ok(Course { id: id.to_string(), owner_id, name, created_at: parse_rfc3339(&created_at)? })
    }

    pub fn query_courses_by_owner(&self, owner_id: &str) -> Result<Vec<Course>, Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, owner_id, name, created_at FROM courses WHERE owner_id = ?1")?;
        let rows = stmt.query_map(params![owner_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?, row.get::<_, String>(3)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, owner_id, name, created_at) = row?;
            out.push(Course { id, owner_id, name, created_at: parse_rfc3339(&created_at)? });
        }
        Ok(out)
    }

    // --- lessons ---

    pub fn store_lesson(&self, lesson: &Lesson) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO lessons (id, course_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![lesson.id, lesson.course_id, lesson.name, lesson.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn query_lessons_by_course(&self, course_id: &str) -> Result<Vec<Lesson>, Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, course_id, name, created_at FROM lessons WHERE course_id = ?1")?;
        let rows = stmt.query_map(params![course_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?, row.get::<_, String>(3)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, course_id, name, created_at) = row?;
            out.push(Lesson { id, course_id, name, created_at: parse_rfc3339(&created_at)? });
        }
        Ok(out)
    }

    // --- enrolments ---

    pub fn store_enrolment(&self, enrolment: &Enrolment) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO enrolments (id, course_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![enrolment.id, enrolment.course_id, enrolment.user_id, enrolment.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn query_enrolments_by_course(&self, course_id: &str) -> Result<Vec<Enrolment>, Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, course_id, user_id, created_at FROM enrolments WHERE course_id = ?1")?;
        let rows = stmt.query_map(params![course_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?, row.get::<_, String>(3)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, course_id, user_id, created_at) = row?;
            out.push(Enrolment { id, course_id, user_id, created_at: parse_rfc3339(&created_at)? });
        }
        Ok(out)
    }

    pub fn query_enrolments_by_user(&self, user_id: &str) -> Result<Vec<Enrolment>, Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, course_id, user_id, created_at FROM enrolments WHERE user_id = ?1")?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?, row.get::<_, String>(3)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, course_id, user_id, created_at) = row?;
            out.push(Enrolment { id, course_id, user_id, created_at: parse_rfc3339(&created_at)? });
        }
        Ok(out)
    }

    // --- homework ---

    pub fn store_homework(&self, homework: &Homework) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO homework (id, learner_id, text, submitted_at) VALUES (?1, ?2, ?3, ?4)",
            params![homework.id, homework.learner_id, homework.text, homework.submitted_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn query_homework_by_learner(&self, learner_id: &str) -> Result<Vec<Homework>, Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, learner_id, text, submitted_at FROM homework WHERE learner_id = ?1")?;
        let rows = stmt.query_map(params![learner_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?, row.get::<_, String>(3)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, learner_id, text, submitted_at) = row?;
            out.push(Homework { id, learner_id, text, submitted_at: parse_rfc3339(&submitted_at)? });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_loads_a_user() {
        let store = SqlStore::memory().unwrap();
        let user = User::new("Ada", "ada@example.com", "hash");
        store.store_user(&user).unwrap();

        let loaded = store.load_user(&user.id).unwrap();
        assert_eq!(loaded.email, "ada@example.com");
    }

    #[test]
    fn finds_a_user_by_email() {
        let store = SqlStore::memory().unwrap();
        let user = User::new("Ada", "ada@example.com", "hash");
        store.store_user(&user).unwrap();

        assert!(store.load_user_by_email("ada@example.com").unwrap().is_some());
        assert!(store.load_user_by_email("nope@example.com").unwrap().is_none());
    }

    #[test]
    fn courses_round_trip_and_filter_by_owner() {
        let store = SqlStore::memory().unwrap();
        let owner = User::new("Ada", "ada@example.com", "hash");
        store.store_user(&owner).unwrap();

        let course = Course::new(owner.id.clone(), "Algorithms");
        store.store_course(&course).unwrap();

        let found = store.query_courses_by_owner(&owner.id).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Algorithms");
    }

    #[test]
    fn enrolments_are_queryable_by_course_and_user() {
        let store = SqlStore::memory().unwrap();
        let owner = User::new("Ada", "ada@example.com", "hash");
        store.store_user(&owner).unwrap();
        let learner = User::new("Grace", "grace@example.com", "hash");
        store.store_user(&learner).unwrap();
        let course = Course::new(owner.id.clone(), "Algorithms");
        store.store_course(&course).unwrap();

        let enrolment = Enrolment::new(course.id.clone(), learner.id.clone());
        store.store_enrolment(&enrolment).unwrap();

        assert_eq!(store.query_enrolments_by_course(&course.id).unwrap().len(), 1);
        assert_eq!(store.query_enrolments_by_user(&learner.id).unwrap().len(), 1);
    }
}
