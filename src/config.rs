//! Runtime configuration, read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | HOST | 0.0.0.0 | bind address |
//! | PORT | 8080 | bind port |
//! | ORDER_STORE | postgres | `postgres` or `local` |
//! | DATABASE_URL | - | required for the postgres store |
//! | LOCAL_STORE_DIR | - | JSON files for the local store; memory-only when unset |
//! | ORDER_ID_PREFIX | FRY | tracking id prefix |
//! | ADMIN_USERNAME / ADMIN_PASSWORD | - | admin endpoints are closed unless both are set |
//! | DELIVERY_CONFIG_FILE | - | JSON file with any subset of the delivery fields |
//! | DELIVERY_LOCAL_PREFIXES, DELIVERY_LOCAL_PINCODES, DELIVERY_REGIONAL_PREFIXES | see defaults | comma-separated |
//! | DELIVERY_FREE_THRESHOLD, DELIVERY_LOCAL_CHARGE, DELIVERY_REGIONAL_CHARGE, DELIVERY_NATIONAL_CHARGE | 500, 30, 50, 80 | integers |

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::delivery::{DeliveryCalculator, DeliveryRates};
use crate::domain::pincode::ServiceArea;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
    #[error("cannot read {path}: {reason}")]
    File { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Local { dir: Option<PathBuf> },
}

impl StoreBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreBackend::Postgres { .. } => "postgres",
            StoreBackend::Local { .. } => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryConfig {
    pub area: ServiceArea,
    pub rates: DeliveryRates,
}

/// Shape of `DELIVERY_CONFIG_FILE`. Every field is optional; unknown keys
/// are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DeliveryFile {
    local_prefixes: Option<Vec<String>>,
    local_pincodes: Option<Vec<String>>,
    regional_prefixes: Option<Vec<String>>,
    free_shipping_threshold: Option<i64>,
    local_charge: Option<i64>,
    regional_charge: Option<i64>,
    national_charge: Option<i64>,
}

impl DeliveryFile {
    fn apply(self, config: &mut DeliveryConfig) {
        if let Some(v) = self.local_prefixes {
            config.area.local_prefixes = v;
        }
        if let Some(v) = self.local_pincodes {
            config.area.local_pincodes = v.into_iter().collect();
        }
        if let Some(v) = self.regional_prefixes {
            config.area.regional_prefixes = v;
        }
        if let Some(v) = self.free_shipping_threshold {
            config.rates.free_shipping_threshold = v;
        }
        if let Some(v) = self.local_charge {
            config.rates.local_charge = v;
        }
        if let Some(v) = self.regional_charge {
            config.rates.regional_charge = v;
        }
        if let Some(v) = self.national_charge {
            config.rates.national_charge = v;
        }
    }
}

/// Prefixes are 1 to 6 digits; full pincodes are exactly 6.
fn check_codes<'a>(
    var: &'static str,
    codes: impl IntoIterator<Item = &'a String>,
    exact: bool,
) -> Result<(), ConfigError> {
    let bad = codes.into_iter().find(|code| {
        let len_ok = if exact {
            code.len() == 6
        } else {
            (1..=6).contains(&code.len())
        };
        !len_ok || !code.bytes().all(|b| b.is_ascii_digit())
    });
    match bad {
        Some(code) => Err(ConfigError::Invalid {
            var,
            value: code.clone(),
        }),
        None => Ok(()),
    }
}

impl DeliveryConfig {
    pub fn calculator(&self) -> DeliveryCalculator {
        DeliveryCalculator::new(self.area.clone(), self.rates.clone())
    }
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub order_id_prefix: String,
    pub admin: Option<AdminCredentials>,
    pub delivery: DeliveryConfig,
}

/// Environment lookup, injectable so tests need not touch process state.
pub trait Env {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

fn parse_var<T: std::str::FromStr>(
    env: &dyn Env,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = env.get(var) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::Invalid { var, value }),
    }
}

fn list_var(env: &dyn Env, var: &'static str) -> Option<Vec<String>> {
    env.get(var).map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

impl ShopConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&ProcessEnv)
    }

    pub fn load(env: &dyn Env) -> Result<Self, ConfigError> {
        let store = match env.get("ORDER_STORE").as_deref().map(str::trim) {
            None | Some("postgres") => StoreBackend::Postgres {
                database_url: env
                    .get("DATABASE_URL")
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            Some("local") => StoreBackend::Local {
                dir: env.get("LOCAL_STORE_DIR").map(PathBuf::from),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "ORDER_STORE",
                    value: other.to_string(),
                })
            }
        };

        let admin = match (env.get("ADMIN_USERNAME"), env.get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            _ => None,
        };

        Ok(Self {
            host: env.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(env, "PORT")?.unwrap_or(8080),
            store,
            order_id_prefix: env
                .get("ORDER_ID_PREFIX")
                .unwrap_or_else(|| "FRY".to_string()),
            admin,
            delivery: DeliveryConfig::load(env)?,
        })
    }
}

impl DeliveryConfig {
    /// Defaults, then `DELIVERY_CONFIG_FILE`, then individual variables.
    pub fn load(env: &dyn Env) -> Result<Self, ConfigError> {
        let mut config = DeliveryConfig::default();
        if let Some(path) = env.get("DELIVERY_CONFIG_FILE") {
            let file_error = |reason: String| ConfigError::File {
                path: path.clone(),
                reason,
            };
            let bytes = std::fs::read(&path).map_err(|e| file_error(e.to_string()))?;
            let file: DeliveryFile =
                serde_json::from_slice(&bytes).map_err(|e| file_error(e.to_string()))?;
            file.apply(&mut config);
        }

        if let Some(prefixes) = list_var(env, "DELIVERY_LOCAL_PREFIXES") {
            config.area.local_prefixes = prefixes;
        }
        if let Some(pincodes) = list_var(env, "DELIVERY_LOCAL_PINCODES") {
            config.area.local_pincodes = pincodes.into_iter().collect();
        }
        if let Some(prefixes) = list_var(env, "DELIVERY_REGIONAL_PREFIXES") {
            config.area.regional_prefixes = prefixes;
        }
        if let Some(v) = parse_var(env, "DELIVERY_FREE_THRESHOLD")? {
            config.rates.free_shipping_threshold = v;
        }
        if let Some(v) = parse_var(env, "DELIVERY_LOCAL_CHARGE")? {
            config.rates.local_charge = v;
        }
        if let Some(v) = parse_var(env, "DELIVERY_REGIONAL_CHARGE")? {
            config.rates.regional_charge = v;
        }
        if let Some(v) = parse_var(env, "DELIVERY_NATIONAL_CHARGE")? {
            config.rates.national_charge = v;
        }

        check_codes("DELIVERY_LOCAL_PREFIXES", &config.area.local_prefixes, false)?;
        check_codes("DELIVERY_LOCAL_PINCODES", &config.area.local_pincodes, true)?;
        check_codes("DELIVERY_REGIONAL_PREFIXES", &config.area.regional_prefixes, false)?;

        let rates = &config.rates;
        for (var, value) in [
            ("DELIVERY_FREE_THRESHOLD", rates.free_shipping_threshold),
            ("DELIVERY_LOCAL_CHARGE", rates.local_charge),
            ("DELIVERY_REGIONAL_CHARGE", rates.regional_charge),
            ("DELIVERY_NATIONAL_CHARGE", rates.national_charge),
        ] {
            if value < 0 {
                return Err(ConfigError::Invalid {
                    var,
                    value: value.to_string(),
                });
            }
        }
        Ok(config)
    }
}
