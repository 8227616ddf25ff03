// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device lookups.

use meterwise_core::{Device, MeterwiseError};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::{DEVICE_COLUMNS, device_from_row};

/// Registers a device. Provisioning happens elsewhere; this exists for
/// operator tooling and tests.
pub async fn insert_device(db: &Database, device: &Device) -> Result<(), MeterwiseError> {
    let device = device.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO devices (id, subscriber_id, active) VALUES (?1, ?2, ?3)",
                params![device.id, device.subscriber_id, device.active],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Oldest active device of a subscriber.
pub async fn primary_device(
    db: &Database,
    subscriber_id: &str,
) -> Result<Option<Device>, MeterwiseError> {
    let subscriber_id = subscriber_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {DEVICE_COLUMNS} FROM devices \
                     WHERE subscriber_id = ?1 AND active = 1 \
                     ORDER BY created_at, id LIMIT 1"
                ),
                params![subscriber_id],
                device_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
