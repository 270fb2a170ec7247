//! SQLite character repository implementation.
//!
//! Implements `CharacterRepository` from `questline-core` using sqlx. The
//! shared fetch/save helpers in this module also back the unit of work in
//! [`super::storage`], so a character loads identically inside and outside
//! a transaction.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use questline_core::repository::character::CharacterRepository;
use questline_types::character::{ActiveBooking, Character, GroupName};
use questline_types::error::RepositoryError;
use questline_types::grade::Grade;
use questline_types::interval::BookingInterval;
use questline_types::location::LocationId;
use questline_types::skill::SkillType;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_err, parse_datetime};

/// SQLite-backed implementation of `CharacterRepository`.
pub struct SqliteCharacterRepository {
    pool: DatabasePool,
}

impl SqliteCharacterRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Character.
struct CharacterRow {
    group_name: String,
    username: String,
    started_at: Option<String>,
    finish_at: Option<String>,
    booking_location_id: Option<String>,
    booking_from: Option<String>,
    booking_to: Option<String>,
}

impl CharacterRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            group_name: row.try_get("group_name")?,
            username: row.try_get("username")?,
            started_at: row.try_get("started_at")?,
            finish_at: row.try_get("finish_at")?,
            booking_location_id: row.try_get("booking_location_id")?,
            booking_from: row.try_get("booking_from")?,
            booking_to: row.try_get("booking_to")?,
        })
    }

    fn into_character(self, grades: Vec<Grade>) -> Result<Character, RepositoryError> {
        let group = GroupName::new(self.group_name)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let started_at = self.started_at.as_deref().map(parse_datetime).transpose()?;
        let finish_at = self.finish_at.as_deref().map(parse_datetime).transpose()?;

        let booking = match (
            self.booking_location_id,
            self.booking_from,
            self.booking_to,
        ) {
            (None, None, None) => None,
            (Some(id), Some(from), Some(to)) => {
                let location_id = id
                    .parse::<LocationId>()
                    .map_err(|e| RepositoryError::Query(format!("invalid location id: {e}")))?;
                let interval = BookingInterval::from_parts(
                    parse_datetime(&from)?,
                    parse_datetime(&to)?,
                    group.clone(),
                )
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Some(ActiveBooking {
                    location_id,
                    interval,
                })
            }
            _ => {
                return Err(RepositoryError::Query(
                    "partially stored booking columns".to_string(),
                ));
            }
        };

        Character::from_parts(group, self.username, started_at, finish_at, booking, grades)
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }
}

async fn fetch_grades(
    conn: &mut SqliteConnection,
    group: &str,
) -> Result<Vec<Grade>, RepositoryError> {
    let rows = sqlx::query(
        "SELECT skill, points, location_name, awarded_at FROM grades \
         WHERE group_name = ? ORDER BY id",
    )
    .bind(group)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    rows.iter()
        .map(|row| {
            let skill: String = row.try_get("skill").map_err(map_sqlx_err)?;
            let points: i32 = row.try_get("points").map_err(map_sqlx_err)?;
            let location_name: String = row.try_get("location_name").map_err(map_sqlx_err)?;
            let awarded_at: String = row.try_get("awarded_at").map_err(map_sqlx_err)?;

            let skill = skill
                .parse::<SkillType>()
                .map_err(RepositoryError::Query)?;
            Grade::new(skill, points, location_name, parse_datetime(&awarded_at)?)
                .map_err(|e| RepositoryError::Query(e.to_string()))
        })
        .collect()
}

pub(crate) async fn fetch_character(
    conn: &mut SqliteConnection,
    group: &str,
) -> Result<Option<Character>, RepositoryError> {
    let row = sqlx::query(
        "SELECT group_name, username, started_at, finish_at, \
                booking_location_id, booking_from, booking_to \
         FROM characters WHERE group_name = ?",
    )
    .bind(group)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    let Some(row) = row else { return Ok(None) };
    let row = CharacterRow::from_row(&row).map_err(map_sqlx_err)?;
    let grades = fetch_grades(conn, group).await?;
    Ok(Some(row.into_character(grades)?))
}

async fn replace_grades(
    conn: &mut SqliteConnection,
    character: &Character,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM grades WHERE group_name = ?")
        .bind(character.group().as_str())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_err)?;

    for grade in character.grades() {
        sqlx::query(
            "INSERT INTO grades (group_name, skill, points, location_name, awarded_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(character.group().as_str())
        .bind(grade.skill().to_string())
        .bind(grade.points())
        .bind(grade.location_name())
        .bind(format_datetime(&grade.awarded_at()))
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_err)?;
    }

    Ok(())
}

fn booking_columns(
    character: &Character,
) -> (Option<String>, Option<String>, Option<String>) {
    match character.booking() {
        None => (None, None, None),
        Some(active) => (
            Some(active.location_id.to_string()),
            Some(format_datetime(&active.interval.start())),
            Some(format_datetime(&active.interval.end())),
        ),
    }
}

pub(crate) async fn insert_character(
    conn: &mut SqliteConnection,
    character: &Character,
) -> Result<(), RepositoryError> {
    let (loc, from, to) = booking_columns(character);

    sqlx::query(
        "INSERT INTO characters \
            (group_name, username, started_at, finish_at, \
             booking_location_id, booking_from, booking_to) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(character.group().as_str())
    .bind(character.username())
    .bind(character.started_at().map(|t| format_datetime(&t)))
    .bind(character.finish_at().map(|t| format_datetime(&t)))
    .bind(loc)
    .bind(from)
    .bind(to)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    replace_grades(conn, character).await
}

pub(crate) async fn update_character(
    conn: &mut SqliteConnection,
    character: &Character,
) -> Result<(), RepositoryError> {
    let (loc, from, to) = booking_columns(character);

    let result = sqlx::query(
        "UPDATE characters SET username = ?, started_at = ?, finish_at = ?, \
            booking_location_id = ?, booking_from = ?, booking_to = ? \
         WHERE group_name = ?",
    )
    .bind(character.username())
    .bind(character.started_at().map(|t| format_datetime(&t)))
    .bind(character.finish_at().map(|t| format_datetime(&t)))
    .bind(loc)
    .bind(from)
    .bind(to)
    .bind(character.group().as_str())
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    replace_grades(conn, character).await
}

impl CharacterRepository for SqliteCharacterRepository {
    async fn create(&self, character: &Character) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_err)?;
        insert_character(&mut tx, character).await?;
        tx.commit().await.map_err(map_sqlx_err)
    }

    async fn get(&self, group: &GroupName) -> Result<Option<Character>, RepositoryError> {
        let mut conn = self.pool.reader.acquire().await.map_err(map_sqlx_err)?;
        fetch_character(&mut conn, group.as_str()).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Character>, RepositoryError> {
        let mut conn = self.pool.reader.acquire().await.map_err(map_sqlx_err)?;

        let row = sqlx::query("SELECT group_name FROM characters WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_sqlx_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let group: String = row.try_get("group_name").map_err(map_sqlx_err)?;
                fetch_character(&mut conn, &group).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Character>, RepositoryError> {
        let mut conn = self.pool.reader.acquire().await.map_err(map_sqlx_err)?;

        let rows = sqlx::query("SELECT group_name FROM characters ORDER BY group_name")
            .fetch_all(&mut *conn)
            .await
            .map_err(map_sqlx_err)?;

        let mut characters = Vec::with_capacity(rows.len());
        for row in rows {
            let group: String = row.try_get("group_name").map_err(map_sqlx_err)?;
            if let Some(character) = fetch_character(&mut conn, &group).await? {
                characters.push(character);
            }
        }
        Ok(characters)
    }
}
