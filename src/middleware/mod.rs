/// Request identity extraction for gallery-service
///
/// Session/token mechanics live in the auth gateway upstream; by the time a
/// request reaches this service the gateway has already authenticated it and
/// forwards the subject as an `X-User-Id` header. These extractors trust
/// that header the same way the handlers trust the visibility scope.
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Authenticated user identity. Rejects the request when absent.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

/// Optional identity for endpoints that serve anonymous traffic too.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUserId(pub Option<Uuid>);

fn user_id_from_headers(req: &HttpRequest) -> Result<Option<Uuid>, Error> {
    match req.headers().get("X-User-Id") {
        None => Ok(None),
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| ErrorUnauthorized("Malformed X-User-Id header"))?;
            let id = Uuid::parse_str(raw)
                .map_err(|_| ErrorUnauthorized("Invalid user ID in X-User-Id header"))?;
            Ok(Some(id))
        }
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(match user_id_from_headers(req) {
            Ok(Some(id)) => Ok(UserId(id)),
            Ok(None) => Err(ErrorUnauthorized("Missing X-User-Id header")),
            Err(e) => Err(e),
        })
    }
}

impl FromRequest for MaybeUserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(user_id_from_headers(req).map(MaybeUserId))
    }
}
