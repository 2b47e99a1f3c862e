use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "saletrack/0.1 (+sale-listing-report)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional_u64 = |var: &str| -> Result<Option<u64>, ConfigError> {
        match lookup(var) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            _ => Ok(None),
        }
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{raw}\""),
            }),
            Err(_) => Ok(default),
        }
    };

    let sites_path = PathBuf::from(or_default("SALETRACK_SITES_PATH", "./config/sites.yaml"));
    let log_level = or_default("SALETRACK_LOG_LEVEL", "info");
    let user_agent = or_default("SALETRACK_USER_AGENT", DEFAULT_USER_AGENT);
    let run_deadline_secs = optional_u64("SALETRACK_RUN_DEADLINE_SECS")?;
    let product_lookups = parse_bool("SALETRACK_PRODUCT_LOOKUPS", true)?;
    let include_undiscounted = parse_bool("SALETRACK_INCLUDE_UNDISCOUNTED", false)?;
    let history_path = lookup("SALETRACK_HISTORY_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        sites_path,
        log_level,
        user_agent,
        run_deadline_secs,
        product_lookups,
        include_undiscounted,
        history_path,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
