//! CLI configuration and order files.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! api_url = "https://api.mercadopago.com"
//! timeout_secs = 30
//! reference_prefix = "mpqr"
//!
//! [credentials]
//! access_token = "$MP_ACCESS_TOKEN"
//! user_id = "12345678"
//! external_pos_id = "default"
//! sandbox_mode = false
//! ```
//!
//! # Environment Variables
//!
//! - `MPQR_CONFIG` - Path to configuration file (default: `mpqr.toml`)
//! - `MPQR_API_URL` - Override the API base URL
//! - Any variable referenced by `$VAR` in the config file

use std::path::{Path, PathBuf};

use mpqr::reference::DEFAULT_REFERENCE_PREFIX;
use mpqr::{Credentials, OrderConfig};
use mpqr_http::constants::{API_BASE_URL, DEFAULT_TIMEOUT};
use serde::Deserialize;

/// Errors raised while loading the configuration or an order file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for the expected shape.
    #[error("invalid TOML in {}: {source}", path.display())]
    Toml {
        /// Path of the file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// The file is not valid JSON for the expected shape.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// Path of the file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// API base URL (default: `https://api.mercadopago.com`).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds (default: `30`).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Prefix of generated external references (default: `mpqr`).
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,

    /// MercadoPago account credentials.
    pub credentials: Credentials,
}

fn default_api_url() -> String {
    API_BASE_URL.to_owned()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_reference_prefix() -> String {
    DEFAULT_REFERENCE_PREFIX.to_owned()
}

impl CliConfig {
    /// Loads configuration from a file, expanding `$VAR` references from
    /// the process environment. `MPQR_API_URL` overrides the file value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or invalid.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = read_file(path)?;
        Self::parse(&content, |name| std::env::var(name).ok()).map_err(|source| {
            ConfigError::Toml {
                path: path.to_owned(),
                source,
            }
        })
    }

    /// Parses configuration from TOML, resolving variables through `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expanded document is not a valid configuration.
    pub fn parse<F>(content: &str, env: F) -> Result<Self, toml::de::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, &env);
        let mut config: Self = toml::from_str(&expanded)?;
        if let Some(api_url) = env("MPQR_API_URL").filter(|url| !url.trim().is_empty()) {
            config.api_url = api_url;
        }
        Ok(config)
    }
}

/// Loads an order from a JSON (`.json`) or TOML (any other extension) file.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable or invalid.
pub fn load_order(path: &Path) -> Result<OrderConfig, ConfigError> {
    let content = read_file(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_owned(),
            source,
        })
    } else {
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_owned(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })
}

/// Expands `$VAR` and `${VAR}` patterns in a string using `env`.
///
/// Unresolved variables are left as-is.
fn expand_env_vars<F>(input: &str, env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    closed = true;
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        match env(&var_name) {
            Some(value) if !var_name.is_empty() => result.push_str(&value),
            _ => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpqr::UnitMeasure;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn env(name: &str) -> Option<String> {
        match name {
            "MP_ACCESS_TOKEN" => Some("APP_USR-123".to_owned()),
            "MP_USER_ID" => Some("998877".to_owned()),
            _ => None,
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn expands_plain_and_braced_variables() {
        assert_eq!(
            expand_env_vars("a=$MP_ACCESS_TOKEN b=${MP_USER_ID}!", env),
            "a=APP_USR-123 b=998877!"
        );
    }

    #[test]
    fn leaves_unresolved_variables_untouched() {
        assert_eq!(expand_env_vars("x=$MISSING y=${ALSO}", env), "x=$MISSING y=${ALSO}");
        assert_eq!(expand_env_vars("cost: 5$", env), "cost: 5$");
    }

    #[test]
    fn parses_config_with_defaults() {
        let config = CliConfig::parse(
            r#"
            [credentials]
            access_token = "$MP_ACCESS_TOKEN"
            user_id = "${MP_USER_ID}"
            "#,
            env,
        )
        .unwrap();

        assert_eq!(config.api_url, "https://api.mercadopago.com");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.reference_prefix, "mpqr");
        assert_eq!(config.credentials.access_token, "APP_USR-123");
        assert_eq!(config.credentials.user_id, "998877");
        assert_eq!(config.credentials.external_pos_id, "default");
        assert!(!config.credentials.sandbox_mode);
    }

    #[test]
    fn api_url_can_be_overridden_from_env() {
        let config = CliConfig::parse(
            r#"
            api_url = "https://api.mercadopago.com"
            [credentials]
            access_token = "t"
            user_id = "1"
            "#,
            |name| (name == "MPQR_API_URL").then(|| "http://localhost:9000".to_owned()),
        )
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:9000");
    }

    #[test]
    fn missing_credentials_are_an_error() {
        assert!(CliConfig::parse("timeout_secs = 5", no_env).is_err());
    }

    #[test]
    fn order_toml_uses_node_field_names() {
        let order: OrderConfig = toml::from_str(
            r#"
            title = "Orden de compra"
            description = "Pago"

            [[items]]
            title = "Item A"
            unitPrice = 10
            quantity = 3

            [[items]]
            title = "Queso"
            unitPrice = 12.5
            quantity = 2
            unitMeasure = "kg"
            "#,
        )
        .unwrap();

        assert_eq!(order.external_reference, None);
        assert_eq!(order.items.len(), 2);
        assert!((order.items[0].unit_price - 10.0).abs() < f64::EPSILON);
        assert_eq!(order.items[0].unit_measure, UnitMeasure::Unit);
        assert_eq!(order.items[1].unit_measure, UnitMeasure::Kilogram);
    }

    #[test]
    fn missing_order_file_is_reported() {
        let err = load_order(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn loads_json_order_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "order.JSON",
            r#"{
                "title": "Orden de compra",
                "externalReference": "pedido-7",
                "items": [{ "title": "Item A", "unitPrice": 10, "quantity": 3 }]
            }"#,
        );

        let order = load_order(&path).unwrap();

        assert_eq!(order.title, "Orden de compra");
        assert_eq!(order.external_reference.as_deref(), Some("pedido-7"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 3);
    }

    #[test]
    fn loads_toml_order_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "order.toml",
            r#"
            description = "Pago"

            [[items]]
            title = "Queso"
            unitPrice = 12.5
            unitMeasure = "kg"
            "#,
        );

        let order = load_order(&path).unwrap();

        assert_eq!(order.description, "Pago");
        assert_eq!(order.items[0].quantity, 1);
        assert_eq!(order.items[0].unit_measure, UnitMeasure::Kilogram);
    }

    #[test]
    fn malformed_order_files_report_their_format() {
        let dir = TempDir::new().unwrap();

        let json = write(&dir, "order.json", "title = \"not json\"");
        let err = load_order(&json).unwrap_err();
        assert!(matches!(err, ConfigError::Json { ref path, .. } if *path == json));

        let toml = write(&dir, "order.toml", "{\"title\": \"not toml\"}");
        let err = load_order(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { ref path, .. } if *path == toml));
    }

    #[test]
    fn loads_config_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "mpqr.toml",
            r#"
            timeout_secs = 5
            reference_prefix = "caja"

            [credentials]
            access_token = "APP_USR-file"
            user_id = "42"
            "#,
        );

        let config = CliConfig::load_from(&path).unwrap();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.reference_prefix, "caja");
        assert_eq!(config.credentials.access_token, "APP_USR-file");
    }

    #[test]
    fn malformed_config_file_is_a_toml_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mpqr.toml", "timeout_secs = \"soon\"\n[credentials\n");

        let err = CliConfig::load_from(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Toml { ref path, .. } if path.ends_with("mpqr.toml")));
        assert!(err.to_string().starts_with("invalid TOML in "));
    }
}
