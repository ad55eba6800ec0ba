use actix_web::{get, post, web, HttpResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    ac::Capabilities,
    fallible::ApiResult,
    guards::AuthenticatedUser,
    models::{Appointment, AppointmentInput},
};

#[post("/api/appointments")]
pub async fn create(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    body: web::Json<AppointmentInput>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::APPOINTMENT_OWN)?;

    let id = Appointment::create(&db, user.id, &body).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": id })))
}

/// Listing is scoped to the requesting staff member's own bookings.
#[get("/api/appointments")]
pub async fn list(db: web::Data<SqlitePool>, user: AuthenticatedUser) -> ApiResult<HttpResponse> {
    user.require(Capabilities::APPOINTMENT_OWN)?;

    let appointments = Appointment::list_for_owner(&db, user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "appointments": appointments })))
}

#[actix_web::delete("/api/appointments/{id}")]
pub async fn delete(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::APPOINTMENT_OWN)?;

    Appointment::delete(&db, *id, user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
