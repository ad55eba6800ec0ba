use actix_web::{get, post, put, web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    ac::{Capabilities, Role},
    fallible::ApiResult,
    guards::AuthenticatedUser,
    models::{User, UserUpdate},
};

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    username: String,
    password: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct SetSuspended {
    suspended: bool,
}

#[post("/api/users")]
pub async fn create(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    body: web::Json<CreateUser>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::USER_MANAGE)?;

    let body = body.into_inner();
    let id = User::create(&db, &body.username, &body.password, body.role).await?;
    info!(
        "`{}` created account `{}` with role {}",
        user.username, body.username, body.role
    );

    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": id })))
}

#[get("/api/users")]
pub async fn list(db: web::Data<SqlitePool>, user: AuthenticatedUser) -> ApiResult<HttpResponse> {
    user.require(Capabilities::USER_MANAGE)?;

    let users = User::list(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "users": users })))
}

#[get("/api/users/search")]
pub async fn search(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::USER_MANAGE)?;

    let users = User::search(&db, &query.q).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "users": users })))
}

#[get("/api/users/statistics")]
pub async fn statistics(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::USER_STATS)?;

    let statistics = User::statistics(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "statistics": statistics })))
}

#[put("/api/users/{id}")]
pub async fn update(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
    body: web::Json<UserUpdate>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::USER_MANAGE)?;

    User::update(&db, *id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[put("/api/users/{id}/suspend")]
pub async fn suspend(
    db: web::Data<SqlitePool>,
    user: AuthenticatedUser,
    id: web::Path<i64>,
    body: web::Json<SetSuspended>,
) -> ApiResult<HttpResponse> {
    user.require(Capabilities::USER_MANAGE)?;

    User::set_suspended(&db, *id, body.suspended).await?;
    info!(
        "`{}` set suspended={} on user {}",
        user.username, body.suspended, id
    );
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
