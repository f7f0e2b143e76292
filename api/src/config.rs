use std::env;
use std::time::Duration;

use crate::app::ListingSync;
use crate::error::ConfigError;

#[derive(Clone)]
pub struct Config {
    pub firebase_api_key: String,
    pub firebase_project_id: String,
    /// Base URL of the Identity Toolkit REST API
    pub auth_url: String,
    /// Base URL of the Firestore REST API
    pub firestore_url: String,
    pub bots_collection: String,
    /// The single account allowed to moderate listings
    pub owner_email: String,
    pub listing_sync: ListingSync,
    /// Client sessions idle for longer than this are dropped
    pub session_idle: Duration,
    /// Mark the session cookie `Secure` (enable behind HTTPS)
    pub cookie_secure: bool,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            firebase_api_key: required("FIREBASE_API_KEY")?,
            firebase_project_id: required("FIREBASE_PROJECT_ID")?,
            auth_url: env::var("FIREBASE_AUTH_URL")
                .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com".to_string()),
            firestore_url: env::var("FIRESTORE_URL")
                .unwrap_or_else(|_| "https://firestore.googleapis.com".to_string()),
            bots_collection: env::var("BOTS_COLLECTION").unwrap_or_else(|_| "bots".to_string()),
            owner_email: env::var("OWNER_EMAIL")
                .unwrap_or_else(|_| "owner@example.com".to_string()),
            listing_sync: parsed("LISTING_SYNC", ListingSync::Merge)?,
            session_idle: Duration::from_secs(parsed("SESSION_IDLE_SECS", 3600)?),
            cookie_secure: parsed("COOKIE_SECURE", false)?,
            port: parsed("PORT", 8080)?,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_falls_back_to_default_when_unset() {
        let port: u16 = parsed("BOTHUB_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn parsed_reads_listing_sync() {
        env::set_var("BOTHUB_TEST_LISTING_SYNC", "reload");
        let sync: ListingSync = parsed("BOTHUB_TEST_LISTING_SYNC", ListingSync::Merge).unwrap();
        assert_eq!(sync, ListingSync::Reload);
    }

    #[test]
    fn parsed_rejects_garbage() {
        env::set_var("BOTHUB_TEST_BAD_SECS", "soon");
        let result: Result<u64, _> = parsed("BOTHUB_TEST_BAD_SECS", 3600);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "BOTHUB_TEST_BAD_SECS", .. })
        ));
    }

    #[test]
    fn required_rejects_blank_values() {
        env::set_var("BOTHUB_TEST_BLANK_KEY", "  ");
        assert!(matches!(
            required("BOTHUB_TEST_BLANK_KEY"),
            Err(ConfigError::Missing("BOTHUB_TEST_BLANK_KEY"))
        ));
    }
}
