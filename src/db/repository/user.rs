use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{fmt_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

fn user_from_row(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        is_active: row.get::<_, i32>(3)? != 0,
    })
}

pub fn insert_user(conn: &Connection, email: &str, password_hash: &str) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (email, password_hash) VALUES (?1, ?2)",
        params![email, password_hash],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            "SELECT id, email, password_hash, is_active FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            "SELECT id, email, password_hash, is_active FROM users WHERE email = ?1",
            params![email],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn insert_auth_token(conn: &Connection, token: &AuthToken) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO auth_token (token_hash, user_id, issued_at, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            token.token_hash,
            token.user_id,
            fmt_timestamp(&token.issued_at),
            fmt_timestamp(&token.expires_at),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_auth_token(conn: &Connection, token_hash: &str) -> Result<Option<AuthToken>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT token_hash, user_id, issued_at, expires_at FROM auth_token WHERE token_hash = ?1",
            params![token_hash],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((token_hash, user_id, issued_at, expires_at)) => Ok(Some(AuthToken {
            token_hash,
            user_id,
            issued_at: parse_timestamp("issued_at", &issued_at)?,
            expires_at: parse_timestamp("expires_at", &expires_at)?,
        })),
        None => Ok(None),
    }
}

/// Drop tokens that expired before `now`. Returns how many were removed.
pub fn delete_expired_tokens(conn: &Connection, now: &DateTime<Utc>) -> Result<usize, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM auth_token WHERE expires_at < ?1",
        params![fmt_timestamp(now)],
    )?;
    Ok(removed)
}
