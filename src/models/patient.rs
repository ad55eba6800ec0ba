//! Patient
//!
//! Patient records and their archival state machine. A record is either
//! active or archived; archiving hides it from the default listings without
//! losing the data, deletion is terminal. Consultation snapshots live in an
//! append-only history log next to the record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{Done, SqlitePool};

use crate::fallible::{ApiResult, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Sex {
    #[serde(rename = "M")]
    #[sqlx(rename = "M")]
    Male,
    #[serde(rename = "F")]
    #[sqlx(rename = "F")]
    Female,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub sex: Sex,
    pub phone: String,
    pub weight: f64,
    pub height: f64,
    pub archived: bool,
    pub created_at: NaiveDateTime,
}

/// The fields a client supplies on registration and on edit. The archival
/// flag is not part of it; it only changes through archive/restore.
#[derive(Debug, Deserialize)]
pub struct PatientInput {
    pub name: String,
    pub age: i64,
    pub sex: Sex,
    pub phone: String,
    pub weight: f64,
    pub height: f64,
}

impl PatientInput {
    fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("patient name must not be empty".to_string()));
        }
        if self.age < 0 {
            return Err(Error::Validation("age must not be negative".to_string()));
        }
        if self.weight <= 0.0 || self.height <= 0.0 {
            return Err(Error::Validation(
                "weight and height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// One consultation snapshot. Entries are only ever appended.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    pub patient_id: i64,
    pub date: NaiveDateTime,
    pub notes: Option<String>,
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryInput {
    pub notes: Option<String>,
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PatientStatistics {
    pub total: i64,
    pub active: i64,
    pub archived: i64,
    pub appointments: i64,
}

impl Patient {
    /// Registers a new patient. Records always start out active.
    pub async fn create(db: &SqlitePool, input: &PatientInput) -> ApiResult<i64> {
        input.validate()?;

        let done = sqlx::query(
            "INSERT INTO patients (name, age, sex, phone, weight, height) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(input.age)
        .bind(input.sex)
        .bind(&input.phone)
        .bind(input.weight)
        .bind(input.height)
        .execute(db)
        .await?;

        Ok(done.last_insert_rowid())
    }

    pub async fn find(db: &SqlitePool, id: i64) -> ApiResult<Option<Patient>> {
        Ok(
            sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?,
        )
    }

    /// Edits the record's fields. The archival state stays what it was.
    pub async fn update(db: &SqlitePool, id: i64, input: &PatientInput) -> ApiResult<()> {
        input.validate()?;

        let done = sqlx::query(
            "UPDATE patients SET name = ?, age = ?, sex = ?, phone = ?, weight = ?, height = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(input.age)
        .bind(input.sex)
        .bind(&input.phone)
        .bind(input.weight)
        .bind(input.height)
        .bind(id)
        .execute(db)
        .await?;

        if done.rows_affected() == 0 {
            return Err(Error::NotFound("patient"));
        }
        Ok(())
    }

    /// Exactly the patients whose archival flag matches, newest first.
    pub async fn list(db: &SqlitePool, archived: bool) -> ApiResult<Vec<Patient>> {
        Ok(sqlx::query_as::<_, Patient>(
            "SELECT * FROM patients WHERE archived = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(archived)
        .fetch_all(db)
        .await?)
    }

    /// All patients regardless of archival state, newest first.
    pub async fn list_all(db: &SqlitePool) -> ApiResult<Vec<Patient>> {
        Ok(sqlx::query_as::<_, Patient>(
            "SELECT * FROM patients ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(db)
        .await?)
    }

    /// Substring match on the name, optionally narrowed to one archival
    /// state. ``instr`` keeps the match case sensitive; sqlite's ``LIKE``
    /// is not.
    pub async fn search(
        db: &SqlitePool,
        query: &str,
        archived: Option<bool>,
    ) -> ApiResult<Vec<Patient>> {
        let patients = match archived {
            Some(archived) => {
                sqlx::query_as::<_, Patient>(
                    "SELECT * FROM patients WHERE instr(name, ?) > 0 AND archived = ? \
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(query)
                .bind(archived)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Patient>(
                    "SELECT * FROM patients WHERE instr(name, ?) > 0 \
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(query)
                .fetch_all(db)
                .await?
            }
        };
        Ok(patients)
    }

    /// Active -> Archived. sqlite counts a row updated to its current
    /// value, so re-archiving an archived record stays a silent success and
    /// zero rows really means the id is unknown.
    pub async fn archive(db: &SqlitePool, id: i64) -> ApiResult<()> {
        Self::set_archived(db, id, true).await
    }

    /// Archived -> Active
    pub async fn restore(db: &SqlitePool, id: i64) -> ApiResult<()> {
        Self::set_archived(db, id, false).await
    }

    async fn set_archived(db: &SqlitePool, id: i64, archived: bool) -> ApiResult<()> {
        let done = sqlx::query("UPDATE patients SET archived = ? WHERE id = ?")
            .bind(archived)
            .bind(id)
            .execute(db)
            .await?;

        if done.rows_affected() == 0 {
            return Err(Error::NotFound("patient"));
        }
        Ok(())
    }

    /// Terminal: removes the row whatever its archival state. History and
    /// appointments referencing the patient are left in place.
    pub async fn delete(db: &SqlitePool, id: i64) -> ApiResult<()> {
        let done = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        if done.rows_affected() == 0 {
            return Err(Error::NotFound("patient"));
        }
        Ok(())
    }

    /// Appends a consultation snapshot to the patient's history.
    pub async fn history_add(
        db: &SqlitePool,
        patient_id: i64,
        input: &HistoryInput,
    ) -> ApiResult<i64> {
        Self::find(db, patient_id)
            .await?
            .ok_or(Error::NotFound("patient"))?;

        let done =
            sqlx::query("INSERT INTO patient_history (patient_id, notes, weight) VALUES (?, ?, ?)")
                .bind(patient_id)
                .bind(&input.notes)
                .bind(input.weight)
                .execute(db)
                .await?;

        Ok(done.last_insert_rowid())
    }

    pub async fn history_list(db: &SqlitePool, patient_id: i64) -> ApiResult<Vec<HistoryEntry>> {
        Ok(sqlx::query_as::<_, HistoryEntry>(
            "SELECT * FROM patient_history WHERE patient_id = ? ORDER BY date DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(db)
        .await?)
    }

    /// Four independent counting queries; the counts are not taken in one
    /// transaction, so a concurrent write can skew them against each other.
    pub async fn statistics(db: &SqlitePool) -> ApiResult<PatientStatistics> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM patients")
            .fetch_one(db)
            .await?;
        let active = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM patients WHERE archived = 0 OR archived IS NULL",
        )
        .fetch_one(db)
        .await?;
        let archived =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM patients WHERE archived = 1")
                .fetch_one(db)
                .await?;
        let appointments = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments")
            .fetch_one(db)
            .await?;

        Ok(PatientStatistics {
            total,
            active,
            archived,
            appointments,
        })
    }
}
