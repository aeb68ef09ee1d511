// Trails
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Database abstraction to manipulate trails.

use crate::model::{
    Condition, Difficulty, ListOptions, SortField, Trail, TrailFields, TrailId, TrailType,
};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
#[cfg(feature = "postgres")]
use trails_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use trails_core::db::sqlite;
use trails_core::db::{DbError, DbResult, Executor};


/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Builds a trail from the raw values of a row, validating the ones stored as free-form types.
#[allow(clippy::too_many_arguments)]
fn build_trail(
    id: i64,
    name: String,
    location: String,
    difficulty: String,
    length: f64,
    duration: i64,
    elevation_gain: f64,
    trail_type: String,
    cover_photo: Option<String>,
) -> DbResult<Trail> {
    let difficulty = difficulty.parse::<Difficulty>()?;
    let trail_type = trail_type.parse::<TrailType>()?;
    let duration = u32::try_from(duration).map_err(|e| {
        DbError::DataIntegrityError(format!("Invalid duration {}: {}", duration, e))
    })?;

    let fields =
        TrailFields::new(name, location, difficulty, length, duration, elevation_gain, trail_type);
    Ok(Trail::new(TrailId::new(id), fields).with_cover_photo(cover_photo))
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Trail {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let location: String = row.try_get("location").map_err(postgres::map_sqlx_error)?;
        let difficulty: String = row.try_get("difficulty").map_err(postgres::map_sqlx_error)?;
        let length: f64 = row.try_get("length").map_err(postgres::map_sqlx_error)?;
        let duration: i64 = row.try_get("duration").map_err(postgres::map_sqlx_error)?;
        let elevation_gain: f64 =
            row.try_get("elevation_gain").map_err(postgres::map_sqlx_error)?;
        let trail_type: String = row.try_get("trail_type").map_err(postgres::map_sqlx_error)?;
        let cover_photo: Option<String> =
            row.try_get("cover_photo").map_err(postgres::map_sqlx_error)?;

        build_trail(
            id,
            name,
            location,
            difficulty,
            length,
            duration,
            elevation_gain,
            trail_type,
            cover_photo,
        )
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Trail {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let location: String = row.try_get("location").map_err(sqlite::map_sqlx_error)?;
        let difficulty: String = row.try_get("difficulty").map_err(sqlite::map_sqlx_error)?;
        let length: f64 = row.try_get("length").map_err(sqlite::map_sqlx_error)?;
        let duration: i64 = row.try_get("duration").map_err(sqlite::map_sqlx_error)?;
        let elevation_gain: f64 = row.try_get("elevation_gain").map_err(sqlite::map_sqlx_error)?;
        let trail_type: String = row.try_get("trail_type").map_err(sqlite::map_sqlx_error)?;
        let cover_photo: Option<String> =
            row.try_get("cover_photo").map_err(sqlite::map_sqlx_error)?;

        build_trail(
            id,
            name,
            location,
            difficulty,
            length,
            duration,
            elevation_gain,
            trail_type,
            cover_photo,
        )
    }
}

/// Returns the name of the column that backs the `field` used for sorting.
fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "id",
        SortField::Name => "name",
        SortField::Location => "location",
        SortField::Difficulty => "difficulty",
        SortField::Length => "length",
        SortField::Duration => "duration",
        SortField::ElevationGain => "elevation_gain",
        SortField::Type => "trail_type",
        SortField::CoverPhoto => "cover_photo",
    }
}

/// Returns the name of the column that the `condition` matches against.
fn condition_column(condition: &Condition) -> &'static str {
    match condition {
        Condition::Id(_) => "id",
        Condition::Name(_) => "name",
        Condition::Location(_) => "location",
        Condition::Difficulty(_) => "difficulty",
        Condition::Length(_) => "length",
        Condition::Duration(_) => "duration",
        Condition::ElevationGain(_) => "elevation_gain",
        Condition::Type(_) => "trail_type",
        Condition::CoverPhoto(_) => "cover_photo",
    }
}

/// Binds the value of a `condition` to a `query` as its next parameter.
macro_rules! bind_condition [
    ( $query:expr, $condition:expr ) => {
        match $condition {
            Condition::Id(id) => $query.bind(id.as_i64()),
            Condition::Name(name) => $query.bind(name.as_str()),
            Condition::Location(location) => $query.bind(location.as_str()),
            Condition::Difficulty(difficulty) => $query.bind(difficulty.as_str()),
            Condition::Length(length) => $query.bind(*length),
            Condition::Duration(duration) => $query.bind(i64::from(*duration)),
            Condition::ElevationGain(gain) => $query.bind(*gain),
            Condition::Type(trail_type) => $query.bind(trail_type.as_str()),
            Condition::CoverPhoto(photo) => $query.bind(photo.as_str()),
        }
    }
];

/// Composes the query to list trails according to `opts`.
///
/// `param` renders the placeholder for the n-th (1-based) query parameter.  Parameters appear in
/// this order, each only if the corresponding option is set: difficulty, count.
fn list_query(opts: &ListOptions, param: fn(usize) -> String) -> String {
    let mut query = "SELECT * FROM trails".to_owned();
    let mut nparams = 0;
    if opts.difficulty().is_some() {
        nparams += 1;
        query.push_str(&format!(" WHERE difficulty = {}", param(nparams)));
    }
    match opts.sort_by() {
        Some(SortField::Id) | None => query.push_str(" ORDER BY id"),
        Some(field) => query.push_str(&format!(" ORDER BY {}, id", sort_column(*field))),
    }
    if opts.count().is_some() {
        nparams += 1;
        query.push_str(&format!(" LIMIT {}", param(nparams)));
    }
    query
}

/// Stores a new trail with the given `fields` and returns it with its assigned identifier.
pub(crate) async fn create_trail(ex: &mut Executor, fields: &TrailFields) -> DbResult<Trail> {
    let id: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO trails
                    (name, location, difficulty, length, duration, elevation_gain, trail_type)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(fields.name().as_str())
                .bind(fields.location().as_str())
                .bind(fields.difficulty().as_str())
                .bind(*fields.length())
                .bind(i64::from(*fields.duration()))
                .bind(*fields.elevation_gain())
                .bind(fields.trail_type().as_str())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO trails
                    (name, location, difficulty, length, duration, elevation_gain, trail_type)
                VALUES (?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(fields.name().as_str())
                .bind(fields.location().as_str())
                .bind(fields.difficulty().as_str())
                .bind(*fields.length())
                .bind(i64::from(*fields.duration()))
                .bind(*fields.elevation_gain())
                .bind(fields.trail_type().as_str())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Trail::new(TrailId::new(id), fields.clone()))
}

/// Gets the trail identified by `id`.
pub(crate) async fn get_trail(ex: &mut Executor, id: TrailId) -> DbResult<Trail> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM trails WHERE id = $1";
            match sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?
            {
                Some(row) => Trail::try_from(row),
                None => Err(DbError::NotFound),
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM trails WHERE id = ?";
            match sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
            {
                Some(row) => Trail::try_from(row),
                None => Err(DbError::NotFound),
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Lists the trails that match `opts`.
pub(crate) async fn list_trails(ex: &mut Executor, opts: &ListOptions) -> DbResult<Vec<Trail>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = list_query(opts, |i| format!("${}", i));
            let mut query = sqlx::query(&query_str);
            if let Some(difficulty) = opts.difficulty() {
                query = query.bind(difficulty.as_str());
            }
            if let Some(count) = opts.count() {
                query = query.bind(i64::from(*count));
            }
            let rows = query.fetch_all(&mut **ex).await.map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Trail::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = list_query(opts, |_| "?".to_owned());
            let mut query = sqlx::query(&query_str);
            if let Some(difficulty) = opts.difficulty() {
                query = query.bind(difficulty.as_str());
            }
            if let Some(count) = opts.count() {
                query = query.bind(i64::from(*count));
            }
            let rows = query.fetch_all(&mut **ex).await.map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Trail::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Overwrites the stored properties of `trail`, which must already exist.
pub(crate) async fn update_trail(ex: &mut Executor, trail: &Trail) -> DbResult<()> {
    let fields = trail.fields();
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE trails
                SET name = $1, location = $2, difficulty = $3, length = $4, duration = $5,
                    elevation_gain = $6, trail_type = $7
                WHERE id = $8";
            let done = sqlx::query(query_str)
                .bind(fields.name().as_str())
                .bind(fields.location().as_str())
                .bind(fields.difficulty().as_str())
                .bind(*fields.length())
                .bind(i64::from(*fields.duration()))
                .bind(*fields.elevation_gain())
                .bind(fields.trail_type().as_str())
                .bind(trail.id().as_i64())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE trails
                SET name = ?, location = ?, difficulty = ?, length = ?, duration = ?,
                    elevation_gain = ?, trail_type = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(fields.name().as_str())
                .bind(fields.location().as_str())
                .bind(fields.difficulty().as_str())
                .bind(*fields.length())
                .bind(i64::from(*fields.duration()))
                .bind(*fields.elevation_gain())
                .bind(fields.trail_type().as_str())
                .bind(trail.id().as_i64())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes the trail identified by `id`.
pub(crate) async fn delete_trail(ex: &mut Executor, id: TrailId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM trails WHERE id = $1")
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM trails WHERE id = ?")
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Deletes all trails that match `condition` and returns how many were deleted.
pub(crate) async fn delete_trails_where(ex: &mut Executor, condition: &Condition) -> DbResult<u64> {
    let column = condition_column(condition);
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!("DELETE FROM trails WHERE {} = $1", column);
            let query = sqlx::query(&query_str);
            let done = bind_condition!(query, condition)
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Ok(done.rows_affected())
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!("DELETE FROM trails WHERE {} = ?", column);
            let query = sqlx::query(&query_str);
            let done = bind_condition!(query, condition)
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Ok(done.rows_affected())
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Counts the number of stored trails.
pub(crate) async fn count_trails(ex: &mut Executor) -> DbResult<u64> {
    let count: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = sqlx::query("SELECT COUNT(*) AS count FROM trails")
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let row = sqlx::query("SELECT COUNT(*) AS count FROM trails")
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    u64::try_from(count).map_err(|e| DbError::DataIntegrityError(e.to_string()))
}
