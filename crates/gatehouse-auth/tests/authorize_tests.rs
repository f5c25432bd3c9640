//! Credential authenticator and session tests

mod common;

use std::time::{Duration, Instant};
use zeroize::Zeroizing;

use gatehouse_auth::app::App;
use gatehouse_auth::authenticator::{Credentials, authorize};
use gatehouse_auth::bootstrap;
use gatehouse_auth::crypto;
use gatehouse_auth::defaults::SYSTEM_USER_EMAIL;
use gatehouse_auth::session;
use gatehouse_types::prelude::*;
use gatehouse_types::store_adapter::{CreateUserData, StoreAdapter};

use common::*;

fn creds(email: &str, password: &str) -> Credentials {
	Credentials { email: email.into(), password: password.into() }
}

/// Seeded store with one user `a@b.com` / `right` holding the given roles
async fn create_user(app: &App, roles: &[&str]) -> UserId {
	let hash = crypto::generate_password_hash(Zeroizing::new("right".into()), app.opts.bcrypt_cost)
		.await
		.unwrap();
	let id = app
		.store
		.create_user(CreateUserData { name: "Alice", email: "a@b.com", password_hash: &hash })
		.await
		.unwrap();
	for role in roles {
		app.store.attach_role(id, role).await.unwrap();
	}
	id
}

async fn log_len(app: &App) -> usize {
	app.mutation_log.list(1000).await.unwrap().len()
}

#[tokio::test]
async fn test_authorize_success() {
	let (app, _tmp) = create_test_app().await;
	bootstrap::seed_default_data(&app).await.unwrap();
	let id = create_user(&app, &["user", "admin"]).await;
	let before = log_len(&app).await;

	let principal = authorize(&app, &creds("a@b.com", "right")).await.unwrap().unwrap();
	assert_eq!(principal.id, id);
	assert_eq!(principal.name.as_ref(), "Alice");
	let roles: Vec<&str> = principal.roles.iter().map(AsRef::as_ref).collect();
	assert_eq!(roles, vec!["user", "admin"]);
	let perms: Vec<&str> = principal.permissions.iter().map(AsRef::as_ref).collect();
	assert_eq!(perms, vec!["users:read", "users:write"]);

	let entries = app.mutation_log.list(1).await.unwrap();
	assert_eq!(log_len(&app).await, before + 1);
	assert_eq!(entries[0].actor, id);
	assert_eq!(entries[0].entity.as_ref(), "Auth Module");
	assert_eq!(entries[0].mutation.as_ref(), "Signed in: a@b.com");
}

#[tokio::test]
async fn test_authorize_failures_are_silent() {
	let (app, _tmp) = create_test_app().await;
	bootstrap::seed_default_data(&app).await.unwrap();
	create_user(&app, &["user"]).await;
	let before = log_len(&app).await;

	for (email, password) in [
		("a@b.com", "wrong"),
		("nobody@b.com", "right"),
		("not-an-email", "right"),
		("a@b.com", ""),
		("", ""),
	] {
		let res = authorize(&app, &creds(email, password)).await.unwrap();
		assert!(res.is_none(), "{} / {} should fail", email, password);
	}

	assert_eq!(log_len(&app).await, before);
}

async fn time_authorize(app: &App, email: &str) -> Duration {
	let mut total = Duration::ZERO;
	for _ in 0..3 {
		let start = Instant::now();
		assert!(authorize(app, &creds(email, "wrong")).await.unwrap().is_none());
		total += start.elapsed();
	}
	total
}

#[tokio::test]
async fn test_unknown_email_costs_a_hash() {
	// Cost high enough that bcrypt dominates the store lookup
	let (app, _tmp) = create_test_app_with(|b| {
		b.bcrypt_cost(8);
	})
	.await;
	create_user(&app, &[]).await;

	let known = time_authorize(&app, "a@b.com").await;
	let unknown = time_authorize(&app, "nobody@b.com").await;
	assert!(unknown * 3 > known, "unknown {:?} vs known {:?}", unknown, known);
}

#[tokio::test]
async fn test_system_account_cannot_sign_in() {
	let (app, _tmp) = create_test_app().await;
	bootstrap::seed_default_data(&app).await.unwrap();
	assert!(app.store.find_user_by_email(SYSTEM_USER_EMAIL).await.unwrap().is_some());

	assert!(authorize(&app, &creds(SYSTEM_USER_EMAIL, "anything")).await.unwrap().is_none());
	assert!(authorize(&app, &creds(SYSTEM_USER_EMAIL, "")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_system_role_holder_is_refused() {
	let (app, _tmp) = create_test_app().await;
	bootstrap::seed_default_data(&app).await.unwrap();
	create_user(&app, &["system"]).await;

	// Correct password, but the account acts as the system actor
	assert!(authorize(&app, &creds("a@b.com", "right")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_without_roles() {
	let (app, _tmp) = create_test_app().await;
	create_user(&app, &[]).await;

	let principal = authorize(&app, &creds("a@b.com", "right")).await.unwrap().unwrap();
	assert!(principal.roles.is_empty());
	assert!(principal.permissions.is_empty());
}

#[tokio::test]
async fn test_refresh_reuses_embedded_claims() {
	let (app, _tmp) = create_test_app().await;
	bootstrap::seed_default_data(&app).await.unwrap();
	let id = create_user(&app, &["user"]).await;

	let principal = authorize(&app, &creds("a@b.com", "right")).await.unwrap().unwrap();
	let token = session::issue_token(&app, &principal).unwrap();

	// Role change mid-session
	app.store.attach_role(id, "admin").await.unwrap();

	let refreshed = session::refresh_token(&app, &token).unwrap();
	let claims = session::decode_token(&app, &refreshed).unwrap();
	assert_eq!(claims.sub, id);
	let roles: Vec<&str> = claims.roles.iter().map(AsRef::as_ref).collect();
	assert_eq!(roles, vec!["user"]);
	let perms: Vec<&str> = claims.permissions.iter().map(AsRef::as_ref).collect();
	assert_eq!(perms, vec!["users:read"]);

	// A full sign in picks the change up
	let principal = authorize(&app, &creds("a@b.com", "right")).await.unwrap().unwrap();
	let claims = session::decode_token(&app, &session::issue_token(&app, &principal).unwrap()).unwrap();
	assert_eq!(claims.roles.len(), 2);
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
	let (app, _tmp) = create_test_app().await;
	let (other, _tmp2) = create_test_app_with(|b| {
		b.session_secret("another-secret");
	})
	.await;
	create_user(&app, &[]).await;

	let principal = authorize(&app, &creds("a@b.com", "right")).await.unwrap().unwrap();
	let token = session::issue_token(&app, &principal).unwrap();
	assert!(matches!(session::decode_token(&other, &token), Err(Error::PermissionDenied)));
	assert!(matches!(session::refresh_token(&other, &token), Err(Error::PermissionDenied)));
}

// vim: ts=4
