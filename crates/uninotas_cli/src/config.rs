//! Environment-driven configuration for the CLI.
//!
//! Every key is optional; unset keys fall back to defaults. Loading happens
//! before logging starts, so fallbacks are recorded and emitted later through
//! `log_notices`.

use log::{log, Level};
use std::path::PathBuf;
use uninotas_core::default_log_level;

pub const DB_PATH_KEY: &str = "UNINOTAS_DB";
pub const LOG_DIR_KEY: &str = "UNINOTAS_LOG_DIR";
pub const LOG_LEVEL_KEY: &str = "UNINOTAS_LOG_LEVEL";
pub const EMAIL_KEY: &str = "UNINOTAS_EMAIL";
pub const PASSWORD_KEY: &str = "UNINOTAS_PASSWORD";

const DEFAULT_DB_PATH: &str = "uninotas.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    /// File logging stays off when unset.
    pub log_dir: Option<String>,
    pub log_level: String,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Keys that fell back to a default value.
    pub defaulted_keys: Vec<&'static str>,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut defaulted_keys = Vec::new();
        let db_path = var(DB_PATH_KEY).unwrap_or_else(|| {
            defaulted_keys.push(DB_PATH_KEY);
            DEFAULT_DB_PATH.to_string()
        });
        let log_level = var(LOG_LEVEL_KEY).unwrap_or_else(|| {
            defaulted_keys.push(LOG_LEVEL_KEY);
            default_log_level().to_string()
        });

        Self {
            db_path: PathBuf::from(db_path),
            log_dir: var(LOG_DIR_KEY),
            log_level,
            email: var(EMAIL_KEY),
            password: lookup(PASSWORD_KEY).filter(|value| !value.is_empty()),
            defaulted_keys,
        }
    }

    /// Messages describing fallbacks and missing credentials.
    pub fn notices(&self) -> Vec<(Level, String)> {
        let mut notices = self
            .defaulted_keys
            .iter()
            .map(|key| {
                let value = match *key {
                    DB_PATH_KEY => self.db_path.display().to_string(),
                    _ => self.log_level.clone(),
                };
                (Level::Info, format!("{key} not set, using default: {value}"))
            })
            .collect::<Vec<_>>();
        if self.email.is_none() || self.password.is_none() {
            notices.push((
                Level::Warn,
                format!("{EMAIL_KEY}/{PASSWORD_KEY} not set; only public commands will work"),
            ));
        }
        notices
    }

    /// Emits `notices`; call once the logger is running.
    pub fn log_notices(&self) {
        for (level, message) in self.notices() {
            log!(level, "event=config_load module=cli status=default {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.db_path, PathBuf::from("uninotas.sqlite3"));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.email, None);
    }

    #[test]
    fn blank_values_are_treated_as_unset_but_passwords_keep_spaces() {
        let config = Config::from_lookup(lookup_from(&[
            (DB_PATH_KEY, "  "),
            (LOG_DIR_KEY, "/var/log/uninotas"),
            (EMAIL_KEY, " ana@uni.cl "),
            (PASSWORD_KEY, " pass word "),
        ]));
        assert_eq!(config.db_path, PathBuf::from("uninotas.sqlite3"));
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/uninotas"));
        assert_eq!(config.email.as_deref(), Some("ana@uni.cl"));
        assert_eq!(config.password.as_deref(), Some(" pass word "));
    }

    #[test]
    fn fallbacks_are_reported_as_notices() {
        let config = Config::from_lookup(lookup_from(&[(LOG_LEVEL_KEY, "warn")]));
        assert_eq!(config.defaulted_keys, vec![DB_PATH_KEY]);

        let notices = config.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].0, Level::Info);
        assert_eq!(
            notices[0].1,
            "UNINOTAS_DB not set, using default: uninotas.sqlite3"
        );
        assert_eq!(notices[1].0, Level::Warn);
    }

    #[test]
    fn fully_configured_environment_has_no_notices() {
        let config = Config::from_lookup(lookup_from(&[
            (DB_PATH_KEY, "/tmp/grades.sqlite3"),
            (LOG_LEVEL_KEY, "info"),
            (EMAIL_KEY, "ana@uni.cl"),
            (PASSWORD_KEY, "secret123"),
        ]));
        assert!(config.defaulted_keys.is_empty());
        assert!(config.notices().is_empty());
    }
}
