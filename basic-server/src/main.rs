use std::{env, path, process::ExitCode, sync::Arc};

use gatehouse_auth::app::{AppBuilder, DEFAULT_BCRYPT_COST, DEFAULT_SESSION_TTL};
use gatehouse_auth::setup_admin::{SetupAdminReq, setup_admin};
use gatehouse_auth::{bootstrap, session};
use gatehouse_store_adapter_sqlite::StoreAdapterSqlite;
use gatehouse_types::prelude::*;

pub struct Config {
	pub db_dir: path::PathBuf,
	pub bcrypt_cost: u32,
	pub session_secret: Option<Box<str>>,
	pub session_ttl: i64,
	pub admin: Option<SetupAdminReq>,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> GhResult<T> {
	match env::var(name) {
		Ok(value) => value
			.parse()
			.map_err(|_| Error::ConfigError(format!("{} has an invalid value: {}", name, value))),
		Err(_) => Ok(default),
	}
}

impl Config {
	fn from_env() -> GhResult<Self> {
		let admin = match (env::var("ADMIN_NAME"), env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD"))
		{
			(Ok(name), Ok(email), Ok(password)) => Some(SetupAdminReq {
				name,
				email,
				confirm_password: password.clone(),
				password,
			}),
			_ => None,
		};

		Ok(Config {
			db_dir: path::PathBuf::from(env::var("DB_DIR").unwrap_or("./data".to_string())),
			bcrypt_cost: parse_var("BCRYPT_COST", DEFAULT_BCRYPT_COST)?,
			session_secret: env::var("SESSION_SECRET").ok().map(Into::into),
			session_ttl: parse_var("SESSION_TTL", DEFAULT_SESSION_TTL)?,
			admin,
		})
	}
}

async fn run(config: Config) -> GhResult<()> {
	let store = StoreAdapterSqlite::new(&config.db_dir).await?;

	let session_secret = config.session_secret.unwrap_or_else(|| {
		warn!("SESSION_SECRET is not set, sessions will not survive a restart");
		session::generate_session_secret()
	});

	let app = AppBuilder::new()
		.bcrypt_cost(config.bcrypt_cost)
		.session_secret(session_secret)
		.session_ttl(config.session_ttl)
		.store(Arc::new(store))
		.build()?;

	bootstrap::run(&app).await;

	if let Some(req) = config.admin {
		match setup_admin(&app, &req).await {
			Ok(admin) => info!("Admin user ready: {}", admin.email),
			Err(Error::AlreadyExists(msg)) => info!("{}", msg),
			Err(err) => return Err(err),
		}
	}

	Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();

	let res = match Config::from_env() {
		Ok(config) => run(config).await,
		Err(err) => Err(err),
	};

	match res {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{}", err);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
