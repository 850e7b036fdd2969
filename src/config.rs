//! Runtime configuration from the environment (and `.env`, if present).

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::value_objects::Money;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid { name: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub seed_db: bool,
    pub nats_url: Option<String>,
    pub shipping_cost: Money,
    pub cart_cookie: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
            database_url: None,
            db_max_connections: 10,
            seed_db: true,
            nats_url: None,
            shipping_cost: Money::from_cents(1000),
            cart_cookie: "cart_id".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; unset or blank variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse(&get, "PORT")?.unwrap_or(defaults.port),
            database_url: get("DATABASE_URL"),
            db_max_connections: parse(&get, "DB_MAX_CONNECTIONS")?.unwrap_or(defaults.db_max_connections),
            seed_db: parse(&get, "SEED_DB")?.unwrap_or(defaults.seed_db),
            nats_url: get("NATS_URL"),
            shipping_cost: parse::<Decimal>(&get, "SHIPPING_COST")?.map(Money::new).unwrap_or(defaults.shipping_cost),
            cart_cookie: get("CART_COOKIE").unwrap_or(defaults.cart_cookie),
        })
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(name)
        .map(|value| value.parse::<T>().map_err(|e| ConfigError::Invalid { name, reason: e.to_string(), value }))
        .transpose()
}
