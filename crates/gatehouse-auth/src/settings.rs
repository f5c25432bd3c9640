//! Typed access to the string-valued settings table
//!
//! Values are stored as opaque strings. Reading infers a type from the text,
//! which is a best-effort heuristic over an untyped store: the first matching
//! rule in the order boolean, number, date, `null`, JSON wins, otherwise the
//! raw string is returned.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

use crate::prelude::*;
use gatehouse_types::store_adapter::StoreAdapter;

static NUMBER_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^-?(0|[1-9]\d*)(\.\d+)?([eE][+-]?\d+)?$").ok());
static DATE_TIME_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$").ok());
static DATE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

fn is_match(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
	re.as_ref().is_some_and(|re| re.is_match(text))
}

// SettingName //
//*************//
/// The closed set of known settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingName {
	SeedingComplete,
	SignInTries,
	PasswordHistory,
}

impl SettingName {
	pub const ALL: [SettingName; 3] =
		[SettingName::SeedingComplete, SettingName::SignInTries, SettingName::PasswordHistory];

	pub fn as_str(self) -> &'static str {
		match self {
			SettingName::SeedingComplete => "system:seedingComplete",
			SettingName::SignInTries => "user:signInTries",
			SettingName::PasswordHistory => "user:passwordHistory",
		}
	}
}

impl std::fmt::Display for SettingName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

// SettingValue //
//**************//
#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
	Bool(bool),
	Number(f64),
	Date(DateTime<Utc>),
	Null,
	Json(Value),
	String(String),
}

impl SettingValue {
	/// Infer a typed value from the stored text
	pub fn infer(raw: &str) -> SettingValue {
		let trimmed = raw.trim();

		if trimmed.eq_ignore_ascii_case("true") {
			return SettingValue::Bool(true);
		}
		if trimmed.eq_ignore_ascii_case("false") {
			return SettingValue::Bool(false);
		}

		// Out of range literals parse to infinity, those stay text
		if is_match(&NUMBER_RE, trimmed)
			&& let Ok(num) = trimmed.parse::<f64>()
			&& num.is_finite()
		{
			return SettingValue::Number(num);
		}

		if let Some(date) = parse_date(trimmed) {
			return SettingValue::Date(date);
		}

		if trimmed == "null" {
			return SettingValue::Null;
		}

		match serde_json::from_str::<Value>(raw) {
			Ok(Value::String(s)) => SettingValue::String(s),
			Ok(value) => SettingValue::Json(value),
			Err(_) => SettingValue::String(raw.to_string()),
		}
	}

	fn type_name(&self) -> &'static str {
		match self {
			SettingValue::Bool(_) => "boolean",
			SettingValue::Number(_) => "number",
			SettingValue::Date(_) => "date",
			SettingValue::Null => "null",
			SettingValue::Json(_) => "json",
			SettingValue::String(_) => "string",
		}
	}

	fn mismatch(&self, expected: &str) -> Error {
		Error::ValidationError(format!("expected {} setting, found {}", expected, self.type_name()))
	}
}

/// Date shapes accepted: `YYYY-MM-DD` (midnight UTC) and `YYYY-MM-DDTHH:MM:SS.sssZ`.
/// Text that has the shape but is not a valid calendar date is not a date.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
	if is_match(&DATE_TIME_RE, text) {
		return NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.3fZ")
			.ok()
			.map(|dt| dt.and_utc());
	}
	if is_match(&DATE_RE, text) {
		return NaiveDate::parse_from_str(text, "%Y-%m-%d")
			.ok()
			.and_then(|d| d.and_hms_opt(0, 0, 0))
			.map(|dt| dt.and_utc());
	}
	None
}

impl TryFrom<SettingValue> for bool {
	type Error = Error;

	fn try_from(value: SettingValue) -> GhResult<Self> {
		match value {
			SettingValue::Bool(b) => Ok(b),
			other => Err(other.mismatch("boolean")),
		}
	}
}

impl TryFrom<SettingValue> for f64 {
	type Error = Error;

	fn try_from(value: SettingValue) -> GhResult<Self> {
		match value {
			SettingValue::Number(n) => Ok(n),
			other => Err(other.mismatch("number")),
		}
	}
}

impl TryFrom<SettingValue> for i64 {
	type Error = Error;

	#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
	fn try_from(value: SettingValue) -> GhResult<Self> {
		match value {
			SettingValue::Number(n)
				if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 =>
			{
				Ok(n as i64)
			}
			other => Err(other.mismatch("integer")),
		}
	}
}

impl TryFrom<SettingValue> for String {
	type Error = Error;

	fn try_from(value: SettingValue) -> GhResult<Self> {
		match value {
			SettingValue::String(s) => Ok(s),
			other => Err(other.mismatch("string")),
		}
	}
}

impl TryFrom<SettingValue> for DateTime<Utc> {
	type Error = Error;

	fn try_from(value: SettingValue) -> GhResult<Self> {
		match value {
			SettingValue::Date(d) => Ok(d),
			other => Err(other.mismatch("date")),
		}
	}
}

impl TryFrom<SettingValue> for Value {
	type Error = Error;

	fn try_from(value: SettingValue) -> GhResult<Self> {
		Ok(match value {
			SettingValue::Bool(b) => Value::Bool(b),
			SettingValue::Number(n) => {
				serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
			}
			SettingValue::Date(d) => {
				Value::String(d.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
			}
			SettingValue::Null => Value::Null,
			SettingValue::Json(v) => v,
			SettingValue::String(s) => Value::String(s),
		})
	}
}

// SettingsAccessor //
//******************//
#[derive(Debug, Clone)]
pub struct SettingsAccessor {
	store: Arc<dyn StoreAdapter>,
}

impl SettingsAccessor {
	pub fn new(store: Arc<dyn StoreAdapter>) -> Self {
		Self { store }
	}

	/// Read and infer the value of a setting
	pub async fn get_value(&self, name: SettingName) -> GhResult<SettingValue> {
		let raw = self
			.store
			.read_setting(name.as_str())
			.await?
			.ok_or(Error::SettingNotFound(name.as_str()))?;
		Ok(SettingValue::infer(&raw))
	}

	/// Read a setting converted to `T`
	pub async fn get<T>(&self, name: SettingName) -> GhResult<T>
	where
		T: TryFrom<SettingValue, Error = Error>,
	{
		T::try_from(self.get_value(name).await?)
	}

	/// JSON-encode `value` and overwrite an existing setting
	pub async fn set<T: Serialize + ?Sized>(&self, name: SettingName, value: &T) -> GhResult<()> {
		let encoded = serde_json::to_string(value)
			.map_err(|err| Error::Internal(format!("cannot encode setting {}: {}", name, err)))?;
		match self.store.update_setting(name.as_str(), &encoded).await {
			Err(Error::NotFound) => Err(Error::SettingNotFound(name.as_str())),
			res => res,
		}
	}

	/// Create the setting with a raw initial value unless it exists.
	/// Returns the value stored afterwards.
	pub async fn create_if_missing(&self, name: SettingName, raw: &str) -> GhResult<Box<str>> {
		self.store.create_setting(name.as_str(), raw).await
	}
}


// vim: ts=4
