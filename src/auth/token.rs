use crate::domain::caller::{Caller, Role};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub exp: usize,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Caller {
            user_id: claims.sub,
            email: claims.email,
            customer_id: claims.customer_id,
            roles: claims.roles.iter().filter_map(|r| Role::parse(r)).collect(),
            is_staff: claims.is_staff,
            is_superuser: claims.is_superuser,
        }
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    inner: Arc<(EncodingKey, DecodingKey)>,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            inner: Arc::new((
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )),
        }
    }

    /// Issues a token. Login lives in the user service; this is used by
    /// tooling and tests.
    pub fn issue(&self, claims: &Claims) -> anyhow::Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.inner.0)?)
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.inner.1, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .ok()
    }
}

pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "status": "error",
                "error": {"code": "UNAUTHENTICATED", "message": "missing or invalid bearer token"}
            })),
        )
            .into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token.trim()).ok_or_else(|| {
            tracing::debug!("rejected bearer token");
            Unauthenticated
        })?;
        Ok(Caller::from(claims))
    }
}
