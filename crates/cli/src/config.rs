//! Portal credentials from a JSON file or the environment.

use std::fmt;
use std::path::Path;

use paideia::Credentials;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;

pub const DEFAULT_PORTAL_URL: &str = "https://www.paideiaschool.org/pythons/parent-portal/";

pub const USER_ENV: &str = "PAIDEIA_USER";
pub const PASSWORD_ENV: &str = "PAIDEIA_PASSWORD";
pub const PORTAL_URL_ENV: &str = "PAIDEIA_PORTAL_URL";

/// On-disk shape of the config file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
	paideia_user: Option<String>,
	paideia_password: Option<String>,
	paideia_portal_url: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
	pub user: String,
	pub password: String,
	pub portal_url: String,
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Config")
			.field("user", &self.user)
			.field("password", &"<redacted>")
			.field("portal_url", &self.portal_url)
			.finish()
	}
}

impl Config {
	/// Loads from `path`, or from the process environment.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		Self::load_with(path, |key| std::env::var(key).ok())
	}

	/// Loads from `path` when it holds both credentials, otherwise from `env`.
	///
	/// Each source is taken whole: a file lacking either credential is
	/// ignored, portal URL included. A file that is missing, unreadable or
	/// not valid JSON falls through to `env`; the latter two are logged.
	pub fn load_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		if let Some(file) = read_file(path) {
			match Self::from_source(file.paideia_user, file.paideia_password, file.paideia_portal_url) {
				Some(config) => {
					debug!(target = "paideia.config", path = %path.display(), "loaded config file");
					return Ok(config);
				}
				None => {
					warn!(target = "paideia.config", path = %path.display(), "config file lacks credentials; trying environment");
				}
			}
		}

		Self::from_source(env(USER_ENV), env(PASSWORD_ENV), env(PORTAL_URL_ENV))
			.inspect(|_| debug!(target = "paideia.config", "loaded config from environment"))
			.ok_or_else(|| ConfigError::Missing { path: path.to_path_buf() })
	}

	fn from_source(user: Option<String>, password: Option<String>, portal_url: Option<String>) -> Option<Self> {
		let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
		Some(Self {
			user: non_empty(user)?,
			password: non_empty(password)?,
			portal_url: non_empty(portal_url).unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string()),
		})
	}

	pub fn credentials(&self) -> Credentials {
		Credentials::new(&self.user, &self.password)
	}
}

fn read_file(path: &Path) -> Option<ConfigFile> {
	let raw = match std::fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
			debug!(target = "paideia.config", path = %path.display(), "no config file");
			return None;
		}
		Err(err) => {
			warn!(target = "paideia.config", path = %path.display(), error = %err, "could not read config file; trying environment");
			return None;
		}
	};

	match serde_json::from_str(&raw) {
		Ok(file) => Some(file),
		Err(err) => {
			warn!(target = "paideia.config", path = %path.display(), error = %err, "invalid config file; trying environment");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
		move |key| map.get(key).cloned()
	}

	fn write(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
		let path = dir.path().join("config.json");
		std::fs::write(&path, contents).unwrap();
		path
	}

	#[test]
	fn file_wins_over_env() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, r#"{"paideia_user": "file-user", "paideia_password": "file-pass"}"#);
		let config = Config::load_with(&path, env(&[(USER_ENV, "env-user"), (PASSWORD_ENV, "env-pass")])).unwrap();
		assert_eq!(config.user, "file-user");
		assert_eq!(config.password, "file-pass");
		assert_eq!(config.portal_url, DEFAULT_PORTAL_URL);
	}

	#[test]
	fn file_without_both_credentials_is_ignored_whole() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, r#"{"paideia_user": "file-user", "paideia_portal_url": "https://portal.test/"}"#);
		let config = Config::load_with(&path, env(&[(USER_ENV, "env-user"), (PASSWORD_ENV, "env-pass")])).unwrap();
		assert_eq!(config.user, "env-user");
		assert_eq!(config.password, "env-pass");
		assert_eq!(config.portal_url, DEFAULT_PORTAL_URL);
	}

	#[test]
	fn partial_file_does_not_complete_partial_env() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, r#"{"paideia_user": "file-user"}"#);
		let err = Config::load_with(&path, env(&[(PASSWORD_ENV, "env-pass")])).unwrap_err();
		assert!(matches!(err, ConfigError::Missing { .. }));
	}

	#[test]
	fn invalid_file_uses_env() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, "{ not json");
		let config = Config::load_with(
			&path,
			env(&[(USER_ENV, "env-user"), (PASSWORD_ENV, "env-pass"), (PORTAL_URL_ENV, "https://other.test/")]),
		)
		.unwrap();
		assert_eq!(config.user, "env-user");
		assert_eq!(config.portal_url, "https://other.test/");
	}

	#[test]
	fn nothing_configured_is_missing() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("absent.json");
		let err = Config::load_with(&path, env(&[(USER_ENV, "only-user")])).unwrap_err();
		assert!(matches!(err, ConfigError::Missing { .. }));
		assert!(err.to_string().contains("PAIDEIA_PASSWORD"));
	}

	#[test]
	fn debug_hides_password() {
		let config = Config {
			user: "u".into(),
			password: "hunter2".into(),
			portal_url: DEFAULT_PORTAL_URL.into(),
		};
		assert!(!format!("{config:?}").contains("hunter2"));
	}
}
