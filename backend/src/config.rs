//! Job configuration.
//!
//! Values come from the environment (a `.env` file is loaded first if
//! present) and are overridden field by field by command-line flags.
//!
//! | Variable                       | Meaning                          |
//! |--------------------------------|----------------------------------|
//! | `FXENRICH_APP_NAME`            | Execution-context name           |
//! | `FXENRICH_TRANSACTIONS`        | Transaction dataset location     |
//! | `FXENRICH_RATES`               | Rate dataset location            |
//! | `FXENRICH_OUTPUT`              | Output dataset location          |
//! | `FXENRICH_ON_DUPLICATE_RATES`  | `reject` (default) or `fan-out`  |

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_APP_NAME: &str = "FXENRICH_APP_NAME";
pub const ENV_TRANSACTIONS: &str = "FXENRICH_TRANSACTIONS";
pub const ENV_RATES: &str = "FXENRICH_RATES";
pub const ENV_OUTPUT: &str = "FXENRICH_OUTPUT";
pub const ENV_ON_DUPLICATE_RATES: &str = "FXENRICH_ON_DUPLICATE_RATES";

pub const DEFAULT_APP_NAME: &str = "Currency Batch Job";

/// What to do when the rate dataset repeats a (date, currency) key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Abort the run before anything is written.
    #[default]
    Reject,
    /// Keep every match; affected transactions appear once per rate.
    FanOut,
}

impl FromStr for DuplicatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "fan-out" | "fanout" | "fan_out" => Ok(DuplicatePolicy::FanOut),
            other => Err(ConfigError::InvalidDuplicatePolicy(other.to_string())),
        }
    }
}

/// Partially specified configuration, as read from one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub app_name: Option<String>,
    pub transactions: Option<String>,
    pub rates: Option<String>,
    pub output: Option<String>,
    pub duplicate_policy: Option<DuplicatePolicy>,
}

impl ConfigOverrides {
    /// Read the `FXENRICH_*` variables, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read values through `lookup`, ignoring blank ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            app_name: get(ENV_APP_NAME),
            transactions: get(ENV_TRANSACTIONS),
            rates: get(ENV_RATES),
            output: get(ENV_OUTPUT),
            duplicate_policy: get(ENV_ON_DUPLICATE_RATES)
                .map(|v| v.parse::<DuplicatePolicy>())
                .transpose()?,
        })
    }

    /// Values from `other` win where present.
    pub fn merge(self, other: ConfigOverrides) -> Self {
        Self {
            app_name: other.app_name.or(self.app_name),
            transactions: other.transactions.or(self.transactions),
            rates: other.rates.or(self.rates),
            output: other.output.or(self.output),
            duplicate_policy: other.duplicate_policy.or(self.duplicate_policy),
        }
    }
}

/// Complete configuration of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobConfig {
    /// Execution-context name, used in logs and the run report
    pub app_name: String,
    pub transactions: String,
    pub rates: String,
    pub output: String,
    pub duplicate_policy: DuplicatePolicy,
}

impl JobConfig {
    pub fn new(transactions: impl Into<String>, rates: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            transactions: transactions.into(),
            rates: rates.into(),
            output: output.into(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Environment values overridden by `flags`.
    pub fn from_env_with(flags: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(ConfigOverrides::from_env()?.merge(flags))
    }

    /// Fill defaults and require the three locations.
    pub fn resolve(values: ConfigOverrides) -> Result<Self, ConfigError> {
        let transactions = values.transactions.ok_or(ConfigError::MissingLocation {
            what: "transactions location",
            flag: "transactions",
            env: ENV_TRANSACTIONS,
        })?;
        let rates = values.rates.ok_or(ConfigError::MissingLocation {
            what: "rates location",
            flag: "rates",
            env: ENV_RATES,
        })?;
        let output = values.output.ok_or(ConfigError::MissingLocation {
            what: "output location",
            flag: "output",
            env: ENV_OUTPUT,
        })?;

        Ok(Self {
            app_name: values.app_name.unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            transactions,
            rates,
            output,
            duplicate_policy: values.duplicate_policy.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_duplicate_policy_parse() {
        assert_eq!("reject".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Reject);
        assert_eq!("Fan-Out".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::FanOut);
        assert!("first".parse::<DuplicatePolicy>().is_err());
    }

    #[test]
    fn test_resolve_from_lookup() {
        let values = ConfigOverrides::from_lookup(lookup(&[
            (ENV_TRANSACTIONS, "data/banktxn"),
            (ENV_RATES, "data/rates"),
            (ENV_OUTPUT, "out/processed.csv"),
            (ENV_APP_NAME, "   "),
        ]))
        .unwrap();
        let config = JobConfig::resolve(values).unwrap();

        assert_eq!(config.transactions, "data/banktxn");
        assert_eq!(config.app_name, DEFAULT_APP_NAME);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_flags_override_env() {
        let env_values = ConfigOverrides::from_lookup(lookup(&[
            (ENV_TRANSACTIONS, "env/txns"),
            (ENV_RATES, "env/rates"),
            (ENV_OUTPUT, "env/out.csv"),
            (ENV_ON_DUPLICATE_RATES, "fan-out"),
        ]))
        .unwrap();
        let flags = ConfigOverrides {
            output: Some("flag/out.json".to_string()),
            ..Default::default()
        };

        let config = JobConfig::resolve(env_values.merge(flags)).unwrap();

        assert_eq!(config.transactions, "env/txns");
        assert_eq!(config.output, "flag/out.json");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::FanOut);
    }

    #[test]
    fn test_missing_location() {
        let values = ConfigOverrides {
            transactions: Some("t".to_string()),
            output: Some("o".to_string()),
            ..Default::default()
        };
        let err = JobConfig::resolve(values).unwrap_err();
        assert!(err.to_string().contains(ENV_RATES));
    }

    #[test]
    fn test_invalid_policy_in_env() {
        let err = ConfigOverrides::from_lookup(lookup(&[(ENV_ON_DUPLICATE_RATES, "first")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuplicatePolicy(_)));
    }
}
