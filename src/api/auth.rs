use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    auth::{password, token::Claims},
    config::Config,
    fallible::{ApiResult, Error},
    guards::AuthenticatedUser,
    models::User,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

/// Checks the credentials and answers with a signed bearer token. The error
/// is the same whether the username is unknown or the password is wrong.
#[post("/api/auth/login")]
pub async fn login(
    db: web::Data<SqlitePool>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();

    let user = User::find_by_username(&db, &body.username)
        .await?
        .ok_or(Error::InvalidCredentials)?;
    if !password::verify(&body.password, &user.password) {
        return Err(Error::InvalidCredentials);
    }
    if user.suspended {
        return Err(Error::AccountSuspended);
    }

    let token = Claims::new(user.id, user.username.clone(), user.role).sign(&config.jwt_secret.0);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "token": token,
        "user": { "id": user.id, "username": user.username, "role": user.role },
    })))
}

/// Echoes the identity encoded in the presented token; the extractor has
/// already validated it.
#[get("/api/auth/verify")]
pub async fn verify(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "user": { "id": user.id, "username": user.username, "role": user.role },
    }))
}
