use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_START_URL: &str = "https://app.anousith.express/branches";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default; only malformed values are errors.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got '{raw}'"))
            }),
        }
    };

    let start_url = or_default("BRANCHSCOUT_START_URL", DEFAULT_START_URL);
    if !(start_url.starts_with("http://") || start_url.starts_with("https://")) {
        return Err(invalid(
            "BRANCHSCOUT_START_URL",
            format!("'{start_url}' is not an http(s) URL"),
        ));
    }

    let webdriver_url = or_default("BRANCHSCOUT_WEBDRIVER_URL", "http://localhost:9515");
    let headless = parse_bool("BRANCHSCOUT_HEADLESS", false)?;
    let user_agent = lookup("BRANCHSCOUT_USER_AGENT")
        .ok()
        .filter(|ua| !ua.trim().is_empty());
    let regions_path = PathBuf::from(or_default(
        "BRANCHSCOUT_REGIONS_PATH",
        "./config/regions.yaml",
    ));
    let output_dir = PathBuf::from(or_default("BRANCHSCOUT_OUTPUT_DIR", "./branches_output"));
    let write_csv = parse_bool("BRANCHSCOUT_WRITE_CSV", false)?;
    let log_level = or_default("BRANCHSCOUT_LOG_LEVEL", "info");

    let wait_timeout_secs = parse_u64("BRANCHSCOUT_WAIT_TIMEOUT_SECS", "30")?;
    if wait_timeout_secs == 0 {
        return Err(invalid(
            "BRANCHSCOUT_WAIT_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let option_timeout_ms = parse_u64("BRANCHSCOUT_OPTION_TIMEOUT_MS", "3000")?;
    let poll_interval_ms = parse_u64("BRANCHSCOUT_POLL_INTERVAL_MS", "250")?;
    let scroll_pause_ms = parse_u64("BRANCHSCOUT_SCROLL_PAUSE_MS", "800")?;
    let max_scroll_rounds = parse_u32("BRANCHSCOUT_MAX_SCROLL_ROUNDS", "25")?;
    if max_scroll_rounds == 0 {
        return Err(invalid(
            "BRANCHSCOUT_MAX_SCROLL_ROUNDS",
            "must be greater than zero".to_string(),
        ));
    }
    let page_scroll_rounds = parse_u32("BRANCHSCOUT_PAGE_SCROLL_ROUNDS", "3")?;
    let page_settle_ms = parse_u64("BRANCHSCOUT_PAGE_SETTLE_MS", "800")?;
    let max_pages = parse_usize("BRANCHSCOUT_MAX_PAGES", "50")?;

    Ok(AppConfig {
        start_url,
        webdriver_url,
        headless,
        user_agent,
        regions_path,
        output_dir,
        write_csv,
        log_level,
        wait_timeout_secs,
        option_timeout_ms,
        poll_interval_ms,
        scroll_pause_ms,
        max_scroll_rounds,
        page_scroll_rounds,
        page_settle_ms,
        max_pages,
    })
}

/// Accepts the usual spellings of a boolean env flag.
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
