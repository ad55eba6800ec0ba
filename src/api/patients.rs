use actix_web::{get, post, put, web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    ac::Capabilities,
    fallible::ApiResult,
    guards::AuthenticatedUser,
    models::{HistoryInput, Patient, PatientInput},
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    archived: Option<bool>,
}

#[get("/api/patients/statistics")]
pub async fn statistics(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_STATS)?;

    let statistics = Patient::statistics(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "statistics": statistics })))
}

#[get("/api/patients/all")]
pub async fn list_all(db: web::Data<SqlitePool>, user: AuthenticatedUser) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_READ)?;

    let patients = Patient::list_all(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "patients": patients })))
}

#[get("/api/patients/search")]
pub async fn search(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_READ)?;

    let patients = Patient::search(&db, &query.q, query.archived).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "patients": patients })))
}

#[get("/api/patients")]
pub async fn list(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_READ)?;

    let patients = Patient::list(&db, query.archived).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "patients": patients })))
}

#[post("/api/patients")]
pub async fn create(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    body: web::Json<PatientInput>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_WRITE)?;

    let id = Patient::create(&db, &body).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": id })))
}

#[put("/api/patients/{id}")]
pub async fn update(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
    body: web::Json<PatientInput>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_WRITE)?;

    Patient::update(&db, *id, &body).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[put("/api/patients/{id}/archive")]
pub async fn archive(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_WRITE)?;

    Patient::archive(&db, *id).await?;
    info!("`{}` archived patient {}", user.username, id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[put("/api/patients/{id}/restore")]
pub async fn restore(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_WRITE)?;

    Patient::restore(&db, *id).await?;
    info!("`{}` restored patient {}", user.username, id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[actix_web::delete("/api/patients/{id}")]
pub async fn delete(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_WRITE)?;

    Patient::delete(&db, *id).await?;
    info!("`{}` deleted patient {}", user.username, id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[post("/api/patients/{id}/history")]
pub async fn history_add(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
    body: web::Json<HistoryInput>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_WRITE)?;

    let entry_id = Patient::history_add(&db, *id, &body).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": entry_id })))
}

#[get("/api/patients/{id}/history")]
pub async fn history_list(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::PATIENT_READ)?;

    let history = Patient::history_list(&db, *id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "history": history })))
}
