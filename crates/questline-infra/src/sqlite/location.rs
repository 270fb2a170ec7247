//! SQLite location repository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use questline_core::repository::location::LocationRepository;
use questline_types::character::GroupName;
use questline_types::error::RepositoryError;
use questline_types::interval::BookingInterval;
use questline_types::location::{Location, LocationId};
use questline_types::skill::SkillType;
use questline_types::user::{Role, User};

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_err, parse_datetime};

/// SQLite-backed implementation of `LocationRepository`.
pub struct SqliteLocationRepository {
    pool: DatabasePool,
}

impl SqliteLocationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Location.
struct LocationRow {
    id: String,
    name: String,
    description: Option<String>,
    place: Option<String>,
    skills: String,
    max_points: i32,
}

impl LocationRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            place: row.try_get("place")?,
            skills: row.try_get("skills")?,
            max_points: row.try_get("max_points")?,
        })
    }

    fn into_location(
        self,
        calendar: Vec<BookingInterval>,
        admins: Vec<User>,
    ) -> Result<Location, RepositoryError> {
        let id = self
            .id
            .parse::<LocationId>()
            .map_err(|e| RepositoryError::Query(format!("invalid location id: {e}")))?;

        let skills: Vec<SkillType> = serde_json::from_str(&self.skills)
            .map_err(|e| RepositoryError::Query(format!("invalid skills JSON: {e}")))?;

        Location::from_parts(
            id,
            self.name,
            self.description,
            self.place,
            admins,
            skills,
            self.max_points,
            calendar,
        )
        .map_err(|e| RepositoryError::Query(e.to_string()))
    }
}

async fn fetch_calendar(
    conn: &mut SqliteConnection,
    location_id: &str,
) -> Result<Vec<BookingInterval>, RepositoryError> {
    let rows = sqlx::query(
        "SELECT booked_from, booked_to, booked_by FROM location_bookings \
         WHERE location_id = ? ORDER BY booked_from",
    )
    .bind(location_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    rows.iter()
        .map(|row| {
            let from: String = row.try_get("booked_from").map_err(map_sqlx_err)?;
            let to: String = row.try_get("booked_to").map_err(map_sqlx_err)?;
            let by: String = row.try_get("booked_by").map_err(map_sqlx_err)?;

            let by = GroupName::new(by).map_err(|e| RepositoryError::Query(e.to_string()))?;
            BookingInterval::from_parts(parse_datetime(&from)?, parse_datetime(&to)?, by)
                .map_err(|e| RepositoryError::Query(e.to_string()))
        })
        .collect()
}

async fn fetch_admins(
    conn: &mut SqliteConnection,
    location_id: &str,
) -> Result<Vec<User>, RepositoryError> {
    let rows = sqlx::query(
        "SELECT chat_id, username FROM location_admins \
         WHERE location_id = ? ORDER BY username",
    )
    .bind(location_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    rows.iter()
        .map(|row| {
            let chat_id: i64 = row.try_get("chat_id").map_err(map_sqlx_err)?;
            let username: String = row.try_get("username").map_err(map_sqlx_err)?;
            User::new(chat_id, username, Role::Administrator)
                .map_err(|e| RepositoryError::Query(e.to_string()))
        })
        .collect()
}

async fn hydrate(
    conn: &mut SqliteConnection,
    row: SqliteRow,
) -> Result<Location, RepositoryError> {
    let row = LocationRow::from_row(&row).map_err(map_sqlx_err)?;
    let calendar = fetch_calendar(conn, &row.id).await?;
    let admins = fetch_admins(conn, &row.id).await?;
    row.into_location(calendar, admins)
}

const LOCATION_COLUMNS: &str = "id, name, description, place, skills, max_points";

pub(crate) async fn fetch_location(
    conn: &mut SqliteConnection,
    id: &LocationId,
) -> Result<Option<Location>, RepositoryError> {
    let row = sqlx::query(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?"
    ))
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    match row {
        None => Ok(None),
        Some(row) => Ok(Some(hydrate(conn, row).await?)),
    }
}

async fn fetch_location_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<Location>, RepositoryError> {
    let row = sqlx::query(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE name = ?"
    ))
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    match row {
        None => Ok(None),
        Some(row) => Ok(Some(hydrate(conn, row).await?)),
    }
}

async fn replace_calendar(
    conn: &mut SqliteConnection,
    location: &Location,
) -> Result<(), RepositoryError> {
    let id = location.id().to_string();

    sqlx::query("DELETE FROM location_bookings WHERE location_id = ?")
        .bind(&id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_err)?;

    for interval in location.calendar() {
        sqlx::query(
            "INSERT INTO location_bookings (location_id, booked_from, booked_to, booked_by) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(format_datetime(&interval.start()))
        .bind(format_datetime(&interval.end()))
        .bind(interval.booked_by().as_str())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_err)?;
    }

    Ok(())
}

async fn replace_admins(
    conn: &mut SqliteConnection,
    location: &Location,
) -> Result<(), RepositoryError> {
    let id = location.id().to_string();

    sqlx::query("DELETE FROM location_admins WHERE location_id = ?")
        .bind(&id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_err)?;

    for admin in location.admins() {
        sqlx::query(
            "INSERT INTO location_admins (location_id, chat_id, username) VALUES (?, ?, ?)",
        )
        .bind(&id)
        .bind(admin.chat_id())
        .bind(admin.username())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_err)?;
    }

    Ok(())
}

fn skills_json(location: &Location) -> Result<String, RepositoryError> {
    serde_json::to_string(location.skills())
        .map_err(|e| RepositoryError::Query(format!("skills serialization: {e}")))
}

pub(crate) async fn insert_location(
    conn: &mut SqliteConnection,
    location: &Location,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO locations (id, name, description, place, skills, max_points) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(location.id().to_string())
    .bind(location.name())
    .bind(location.description())
    .bind(location.place())
    .bind(skills_json(location)?)
    .bind(location.max_points())
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    replace_calendar(conn, location).await?;
    replace_admins(conn, location).await
}

pub(crate) async fn update_location(
    conn: &mut SqliteConnection,
    location: &Location,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE locations SET name = ?, description = ?, place = ?, skills = ?, max_points = ? \
         WHERE id = ?",
    )
    .bind(location.name())
    .bind(location.description())
    .bind(location.place())
    .bind(skills_json(location)?)
    .bind(location.max_points())
    .bind(location.id().to_string())
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    replace_calendar(conn, location).await?;
    replace_admins(conn, location).await
}

impl LocationRepository for SqliteLocationRepository {
    async fn create(&self, location: &Location) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_err)?;
        insert_location(&mut tx, location).await?;
        tx.commit().await.map_err(map_sqlx_err)
    }

    async fn get(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError> {
        let mut conn = self.pool.reader.acquire().await.map_err(map_sqlx_err)?;
        fetch_location(&mut conn, id).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Location>, RepositoryError> {
        let mut conn = self.pool.reader.acquire().await.map_err(map_sqlx_err)?;
        fetch_location_by_name(&mut conn, name).await
    }

    async fn list(&self) -> Result<Vec<Location>, RepositoryError> {
        let mut conn = self.pool.reader.acquire().await.map_err(map_sqlx_err)?;

        let rows = sqlx::query("SELECT id FROM locations ORDER BY name")
            .fetch_all(&mut *conn)
            .await
            .map_err(map_sqlx_err)?;

        let mut locations = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id").map_err(map_sqlx_err)?;
            let id = id
                .parse::<LocationId>()
                .map_err(|e| RepositoryError::Query(format!("invalid location id: {e}")))?;
            if let Some(location) = fetch_location(&mut conn, &id).await? {
                locations.push(location);
            }
        }
        Ok(locations)
    }

    async fn find_by_admin(&self, username: &str) -> Result<Option<Location>, RepositoryError> {
        let mut conn = self.pool.reader.acquire().await.map_err(map_sqlx_err)?;

        let row = sqlx::query("SELECT location_id FROM location_admins WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_sqlx_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let id: String = row.try_get("location_id").map_err(map_sqlx_err)?;
                let id = id
                    .parse::<LocationId>()
                    .map_err(|e| RepositoryError::Query(format!("invalid location id: {e}")))?;
                fetch_location(&mut conn, &id).await
            }
        }
    }
}
