//! Registration, login and the bearer-token middleware.
//!
//! Tokens are HS256 JWTs carrying the user id in `sub`. The middleware
//! reloads the user on every request so a deleted account loses access
//! immediately.

use api_types::{
    Envelope,
    auth::{Register, Session, SignIn},
    user::UserView,
};
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use engine::{EngineError, Role, User};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{ServerError, server::ServerState, views};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) email: String,
    pub(crate) role: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

/// Signing material and account policy used by the auth endpoints.
#[derive(Clone)]
pub(crate) struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
    admin_emails: Vec<String>,
}

impl AuthKeys {
    pub(crate) fn new(secret: &str, ttl_secs: u64, admin_emails: &[String]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            admin_emails: admin_emails
                .iter()
                .map(|email| email.trim().to_lowercase())
                .collect(),
        }
    }

    fn role_for(&self, email: &str) -> Role {
        let email = email.trim().to_lowercase();
        if self.admin_emails.contains(&email) {
            Role::Admin
        } else {
            Role::User
        }
    }

    fn issue(&self, user: &User) -> Result<String, ServerError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            iat: now,
            exp: now.saturating_add(i64::try_from(self.ttl_secs).unwrap_or(i64::MAX)),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| ServerError::Internal(format!("failed to sign token: {err}")))
    }

    fn verify(&self, token: &str) -> Result<Claims, ServerError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ServerError::Unauthorized("invalid or expired token".to_string()))
    }
}

/// Resolve the bearer token into an [`engine::User`] request extension.
pub(crate) async fn require_user(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ServerError::Unauthorized(
            "missing bearer token".to_string(),
        ));
    };
    let claims = state.auth.verify(bearer.token())?;

    let user = match state.engine.user(&claims.sub).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => {
            return Err(ServerError::Unauthorized("unknown user".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Handle requests for creating a new account
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Register>,
) -> Result<(StatusCode, Json<Envelope<UserView>>), ServerError> {
    let role = state.auth.role_for(&payload.email);
    let user = state
        .engine
        .register_user(
            &payload.first_name,
            &payload.last_name,
            &payload.email,
            &payload.password,
            payload.image.as_deref(),
            role,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("User registered successfully", views::user(&user))),
    ))
}

/// Handle requests for signing in
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<SignIn>,
) -> Result<Json<Envelope<Session>>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let access_token = state.auth.issue(&user)?;
    tracing::info!(user_id = %user.id, "user signed in");

    Ok(Json(Envelope::ok(
        "Login successful",
        Session {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: state.auth.ttl_secs,
            user: views::user(&user),
        },
    )))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn user() -> User {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User {
            id: "user-1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            image: None,
            role: Role::User,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let keys = AuthKeys::new("secret", 60, &[]);
        let token = keys.issue(&user()).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = AuthKeys::new("one", 60, &[]).issue(&user()).unwrap();
        assert!(AuthKeys::new("two", 60, &[]).verify(&token).is_err());
    }

    #[test]
    fn admin_emails_ignore_case() {
        let keys = AuthKeys::new("secret", 60, &["Root@Example.com".to_string()]);
        assert_eq!(keys.role_for("root@example.COM"), Role::Admin);
        assert_eq!(keys.role_for("ada@example.com"), Role::User);
    }
}
