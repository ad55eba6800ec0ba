//! Appointment
//!
//! A booked consultation: a patient, the staff member who booked it and a
//! timestamp. Listings are scoped to the booking owner and only the owner
//! may delete one. There is no availability or double-booking check.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    fallible::{ApiResult, Error},
    models::Patient,
};

/// An appointment as listed, joined with the patient's name.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub dietitian_id: i64,
    pub date: NaiveDateTime,
    pub notes: Option<String>,
    pub patient_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentInput {
    pub patient_id: i64,
    pub date: NaiveDateTime,
    pub notes: Option<String>,
}

impl Appointment {
    /// Books an appointment owned by `owner_id`. The referenced patient
    /// must exist.
    pub async fn create(db: &SqlitePool, owner_id: i64, input: &AppointmentInput) -> ApiResult<i64> {
        Patient::find(db, input.patient_id)
            .await?
            .ok_or(Error::NotFound("patient"))?;

        let done = sqlx::query(
            "INSERT INTO appointments (patient_id, dietitian_id, date, notes) VALUES (?, ?, ?, ?)",
        )
        .bind(input.patient_id)
        .bind(owner_id)
        .bind(input.date)
        .bind(&input.notes)
        .execute(db)
        .await?;

        Ok(done.last_insert_rowid())
    }

    /// The owner's own appointments, newest date first.
    pub async fn list_for_owner(db: &SqlitePool, owner_id: i64) -> ApiResult<Vec<Appointment>> {
        Ok(sqlx::query_as::<_, Appointment>(
            "SELECT a.id, a.patient_id, a.dietitian_id, a.date, a.notes, p.name AS patient_name \
             FROM appointments a \
             JOIN patients p ON a.patient_id = p.id \
             WHERE a.dietitian_id = ? \
             ORDER BY a.date DESC, a.id DESC",
        )
        .bind(owner_id)
        .fetch_all(db)
        .await?)
    }

    /// Deletes an appointment. An unknown id is reported as not found; an
    /// appointment owned by someone else as forbidden, the two are not
    /// conflated.
    pub async fn delete(db: &SqlitePool, id: i64, owner_id: i64) -> ApiResult<()> {
        let owner =
            sqlx::query_scalar::<_, i64>("SELECT dietitian_id FROM appointments WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?
                .ok_or(Error::NotFound("appointment"))?;

        if owner != owner_id {
            return Err(Error::Forbidden);
        }

        sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
