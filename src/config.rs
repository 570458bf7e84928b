use crate::domain::{Decimal, Username};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_GUILD_ID: &str = "9780675dc7e05224af937c37b30c3812d4e2ca30";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub splinterlands_api_url: String,
    pub prices_api_url: String,
    pub store: StoreBackend,
    pub cache_ttl_secs: u64,
    pub default_scholar_pct: Decimal,
    pub default_usernames: Vec<Username>,
    pub guild_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite { database_path: String },
    Supabase { url: String, key: String },
    None,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn non_empty<'a>(env_map: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env_map
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    non_empty(env_map, key)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = non_empty(&env_map, "PORT")
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let splinterlands_api_url = non_empty(&env_map, "SPLINTERLANDS_API_URL")
            .unwrap_or("https://api.splinterlands.com")
            .to_string();

        let prices_api_url = non_empty(&env_map, "PRICES_API_URL")
            .unwrap_or("https://prices.splinterlands.com")
            .to_string();

        let store = match non_empty(&env_map, "STORE_BACKEND").unwrap_or("sqlite") {
            "sqlite" => StoreBackend::Sqlite {
                database_path: required(&env_map, "DATABASE_PATH")?,
            },
            "supabase" => {
                let url = required(&env_map, "SUPABASE_URL")?;
                let key = [
                    "SUPABASE_SERVICE_ROLE_KEY",
                    "SUPABASE_SERVICE_KEY",
                    "SUPABASE_ANON_KEY",
                ]
                .iter()
                .find_map(|k| non_empty(&env_map, k))
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingEnv("SUPABASE_SERVICE_ROLE_KEY".to_string()))?;
                StoreBackend::Supabase { url, key }
            }
            "none" => StoreBackend::None,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORE_BACKEND".to_string(),
                    format!("must be sqlite, supabase, or none, got {}", other),
                ))
            }
        };

        let cache_ttl_secs = non_empty(&env_map, "CACHE_TTL_SECS")
            .unwrap_or("300")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "CACHE_TTL_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let default_scholar_pct = Decimal::from_str(
            non_empty(&env_map, "DEFAULT_SCHOLAR_PCT").unwrap_or("50"),
        )
        .ok()
        .filter(|pct| !pct.is_negative() && *pct <= Decimal::hundred())
        .ok_or_else(|| {
            ConfigError::InvalidValue(
                "DEFAULT_SCHOLAR_PCT".to_string(),
                "must be a number between 0 and 100".to_string(),
            )
        })?;

        let default_usernames = non_empty(&env_map, "DEFAULT_USERNAMES")
            .map(Username::parse_list)
            .unwrap_or_default();

        let guild_id = non_empty(&env_map, "GUILD_ID")
            .unwrap_or(DEFAULT_GUILD_ID)
            .to_string();

        Ok(Config {
            port,
            splinterlands_api_url,
            prices_api_url,
            store,
            cache_ttl_secs,
            default_scholar_pct,
            default_usernames,
            guild_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.splinterlands_api_url, "https://api.splinterlands.com");
        assert_eq!(config.prices_api_url, "https://prices.splinterlands.com");
        assert_eq!(
            config.store,
            StoreBackend::Sqlite {
                database_path: "/tmp/test.db".to_string()
            }
        );
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.default_scholar_pct, Decimal::from(50));
        assert!(config.default_usernames.is_empty());
        assert_eq!(config.guild_id, DEFAULT_GUILD_ID);
    }

    #[test]
    fn test_missing_database_path() {
        let result = Config::from_env_map(HashMap::new());
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_supabase_key_precedence() {
        let mut env_map = HashMap::new();
        env_map.insert("STORE_BACKEND".to_string(), "supabase".to_string());
        env_map.insert("SUPABASE_URL".to_string(), "https://x.supabase.co".to_string());
        env_map.insert("SUPABASE_ANON_KEY".to_string(), "anon".to_string());
        env_map.insert("SUPABASE_SERVICE_KEY".to_string(), "service".to_string());

        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Supabase {
                url: "https://x.supabase.co".to_string(),
                key: "service".to_string()
            }
        );
    }

    #[test]
    fn test_supabase_missing_key() {
        let mut env_map = HashMap::new();
        env_map.insert("STORE_BACKEND".to_string(), "supabase".to_string());
        env_map.insert("SUPABASE_URL".to_string(), "https://x.supabase.co".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "SUPABASE_SERVICE_ROLE_KEY"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_store_none_needs_nothing() {
        let mut env_map = HashMap::new();
        env_map.insert("STORE_BACKEND".to_string(), "none".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.store, StoreBackend::None);
    }

    #[test]
    fn test_invalid_store_backend() {
        let mut env_map = setup_required_env();
        env_map.insert("STORE_BACKEND".to_string(), "postgres".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "STORE_BACKEND"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_scholar_pct() {
        for bad in ["150", "-5", "half"] {
            let mut env_map = setup_required_env();
            env_map.insert("DEFAULT_SCHOLAR_PCT".to_string(), bad.to_string());
            match Config::from_env_map(env_map) {
                Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "DEFAULT_SCHOLAR_PCT"),
                _ => panic!("Expected InvalidValue error for {}", bad),
            }
        }
    }

    #[test]
    fn test_default_usernames_parsed() {
        let mut env_map = setup_required_env();
        env_map.insert("DEFAULT_USERNAMES".to_string(), " lorkus, vorkus ,,".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        let names: Vec<&str> = config.default_usernames.iter().map(|u| u.as_str()).collect();
        assert_eq!(names, vec!["lorkus", "vorkus"]);
    }
}
