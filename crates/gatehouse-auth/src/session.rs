//! Session token claims
//!
//! Roles and permissions are embedded when the principal is first established.
//! Refreshing a token reuses them verbatim, so authorization changes take effect
//! on the next full sign in rather than mid-session.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::authenticator::Principal;
use crate::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
	pub sub: UserId,
	pub name: Box<str>,
	pub roles: Vec<Box<str>>,
	pub permissions: Vec<Box<str>>,
	pub iat: i64,
	pub exp: i64,
}

impl SessionClaims {
	pub fn new(principal: &Principal, ttl: i64) -> Self {
		let iat = Timestamp::now().0;
		SessionClaims {
			sub: principal.id,
			name: principal.name.clone(),
			roles: principal.roles.clone(),
			permissions: principal.permissions.clone(),
			iat,
			exp: iat.saturating_add(ttl),
		}
	}

	/// Same identity and authorization with a fresh validity window
	pub fn renewed(self, ttl: i64) -> Self {
		let iat = Timestamp::now().0;
		SessionClaims { iat, exp: iat.saturating_add(ttl), ..self }
	}
}

fn encode_claims(claims: &SessionClaims, secret: &str) -> GhResult<Box<str>> {
	let token = jsonwebtoken::encode(
		&jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
		claims,
		&jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
	)
	.inspect_err(|err| error!("encode err: {}", err))
	.map_err(|_| Error::Internal("cannot encode session token".into()))?
	.into();

	Ok(token)
}

fn decode_claims(token: &str, secret: &str) -> GhResult<SessionClaims> {
	let validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
	let data = jsonwebtoken::decode::<SessionClaims>(
		token,
		&jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
		&validation,
	)
	.inspect_err(|err| debug!("session token rejected: {}", err))
	.map_err(|_| Error::PermissionDenied)?;

	Ok(data.claims)
}

/// Issue a session token for a freshly authenticated principal
pub fn issue_token(app: &App, principal: &Principal) -> GhResult<Box<str>> {
	let claims = SessionClaims::new(principal, app.opts.session_ttl);
	encode_claims(&claims, &app.opts.session_secret)
}

/// Verify a session token and return its claims
pub fn decode_token(app: &App, token: &str) -> GhResult<SessionClaims> {
	decode_claims(token, &app.opts.session_secret)
}

/// Re-issue a valid token with the embedded claims and a new expiry
pub fn refresh_token(app: &App, token: &str) -> GhResult<Box<str>> {
	let claims = decode_claims(token, &app.opts.session_secret)?.renewed(app.opts.session_ttl);
	encode_claims(&claims, &app.opts.session_secret)
}

/// Random session secret, 32 bytes base64 encoded
pub fn generate_session_secret() -> Box<str> {
	use rand::Rng;
	let mut secret_bytes = [0u8; 32];
	let mut rng = rand::rng();
	rng.fill_bytes(&mut secret_bytes);
	base64::engine::general_purpose::STANDARD.encode(secret_bytes).into()
}


// vim: ts=4
