use actix_web::{dev::Payload, http::header::Header, web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use futures::future::{ready, Ready};

use crate::{
    ac::{Capabilities, Role},
    auth::token::Claims,
    config::Config,
    fallible::Error,
};

/// AuthenticatedUser
///
/// The result of a successful bearer token check. Handlers take this as an
/// extractor argument, so a request without a valid token never reaches the
/// handler body.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Every protected operation checks its capability first; on failure
    /// the operation must not run.
    pub fn require(&self, needed: Capabilities) -> Result<(), Error> {
        if self.role.can(needed) {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, Error> {
        let header = Authorization::<Bearer>::parse(req).map_err(|_| Error::MissingToken)?;

        let config = req
            .app_data::<web::Data<Config>>()
            .expect("config missing from app data");
        let claims = Claims::parse(header.as_ref().token(), &config.jwt_secret.1)?;

        Ok(Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;
    type Config = ();

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}
