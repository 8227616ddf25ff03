// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscriber reads and the few writes the assistant is allowed to make.

use chrono::{DateTime, Utc};
use meterwise_core::{ChannelIdentity, MeterwiseError, Subscriber};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::models::{SUBSCRIBER_COLUMNS, format_date, format_instant, subscriber_from_row};

fn select_one(
    conn: &Connection,
    filter: &str,
    value: &str,
) -> rusqlite::Result<Option<Subscriber>> {
    conn.query_row(
        &format!("SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE {filter}"),
        params![value],
        subscriber_from_row,
    )
    .optional()
}

fn not_found(id: &str) -> MeterwiseError {
    MeterwiseError::Storage {
        source: format!("subscriber {id} not found").into(),
    }
}

/// Inserts a full subscriber record. Registration is owned by another
/// system; this is used by operator tooling and tests.
pub async fn insert_subscriber(db: &Database, sub: &Subscriber) -> Result<(), MeterwiseError> {
    let sub = sub.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO subscribers ({SUBSCRIBER_COLUMNS}) VALUES \
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
                ),
                params![
                    sub.id,
                    sub.name,
                    sub.email,
                    sub.phone,
                    sub.cutoff_day,
                    sub.parity.to_string(),
                    sub.service_start.map(format_date),
                    sub.tariff_code,
                    sub.initial_reading,
                    sub.prior_closing_reading,
                    sub.channel_identity.map(|c| c.0),
                    sub.prefers_telegram,
                    sub.escalation_until.map(format_instant),
                    sub.link_code,
                    sub.link_code_expires_at.map(format_instant),
                    sub.leak_active,
                    sub.voltage_state.to_string(),
                    sub.next_payment_date.map(format_date),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_subscriber(db: &Database, id: &str) -> Result<Option<Subscriber>, MeterwiseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_one(conn, "id = ?1", &id))
        .await
        .map_err(map_tr_err)
}

pub async fn find_by_channel(
    db: &Database,
    identity: &ChannelIdentity,
) -> Result<Option<Subscriber>, MeterwiseError> {
    let identity = identity.0.clone();
    db.connection()
        .call(move |conn| select_one(conn, "channel_identity = ?1", &identity))
        .await
        .map_err(map_tr_err)
}

/// Case-insensitive through the column's `NOCASE` collation.
pub async fn find_by_email(
    db: &Database,
    email: &str,
) -> Result<Option<Subscriber>, MeterwiseError> {
    let email = email.trim().to_string();
    db.connection()
        .call(move |conn| select_one(conn, "email = ?1", &email))
        .await
        .map_err(map_tr_err)
}

pub async fn set_link_code(
    db: &Database,
    subscriber_id: &str,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), MeterwiseError> {
    let id = subscriber_id.to_string();
    let code = code.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE subscribers SET link_code = ?1, link_code_expires_at = ?2 WHERE id = ?3",
                params![code, format_instant(expires_at), id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(not_found(subscriber_id));
    }
    Ok(())
}

/// Binds `identity` to the holder of a live `code` in one transaction.
///
/// The identity is released from any other subscriber first so that it
/// stays bound to at most one row. An expired code is left in place and
/// reported as no match.
pub async fn consume_link_code(
    db: &Database,
    code: &str,
    identity: &ChannelIdentity,
    now: DateTime<Utc>,
) -> Result<Option<Subscriber>, MeterwiseError> {
    let code = code.to_string();
    let identity = identity.0.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let holder = tx
                .query_row(
                    "SELECT id, link_code_expires_at FROM subscribers \
                     WHERE link_code = ?1 ORDER BY link_code_expires_at DESC LIMIT 1",
                    params![code],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
                )
                .optional()?;

            let Some((id, expires_at)) = holder else {
                return Ok(None);
            };
            let live = expires_at
                .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
                .is_some_and(|expiry| expiry.with_timezone(&Utc) > now);
            if !live {
                debug!(subscriber_id = %id, "link code expired");
                return Ok(None);
            }

            tx.execute(
                "UPDATE subscribers SET channel_identity = NULL \
                 WHERE channel_identity = ?1 AND id <> ?2",
                params![identity, id],
            )?;
            tx.execute(
                "UPDATE subscribers SET channel_identity = ?1, link_code = NULL, \
                 link_code_expires_at = NULL WHERE id = ?2",
                params![identity, id],
            )?;
            let bound = select_one(&tx, "id = ?1", &id)?;
            tx.commit()?;
            Ok(bound)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_escalation(
    db: &Database,
    subscriber_id: &str,
    until: Option<DateTime<Utc>>,
) -> Result<(), MeterwiseError> {
    let id = subscriber_id.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE subscribers SET escalation_until = ?1 WHERE id = ?2",
                params![until.map(format_instant), id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(not_found(subscriber_id));
    }
    Ok(())
}

pub async fn set_channel_preference(
    db: &Database,
    subscriber_id: &str,
    prefers_telegram: bool,
) -> Result<(), MeterwiseError> {
    let id = subscriber_id.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE subscribers SET prefers_telegram = ?1 WHERE id = ?2",
                params![prefers_telegram, id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(not_found(subscriber_id));
    }
    Ok(())
}
