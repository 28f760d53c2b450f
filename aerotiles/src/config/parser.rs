//! INI parsing: the single place where INI keys map to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use ini::Ini;

use crate::provider::UrlTemplate;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Applies every recognised key over the defaults.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [source] section
    if let Some(section) = ini.section(Some("source")) {
        if let Some(v) = section.get("url_template") {
            config.source.url_template =
                UrlTemplate::parse(v).map_err(|e| invalid("source", "url_template", v, &e.to_string()))?;
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("source", "user_agent", v, "must not be empty"));
            }
            config.source.user_agent = v.to_string();
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout =
                parse_positive(v, "download", "timeout", "must be a positive integer (seconds)")?;
        }
        if let Some(v) = section.get("max_retries") {
            config.download.max_retries =
                parse_value(v, "download", "max_retries", "must be a non-negative integer")?;
        }
        if let Some(v) = section.get("parallel_downloads") {
            config.download.parallel_downloads =
                parse_positive(v, "download", "parallel_downloads", "must be a positive integer")?;
        }
        if let Some(v) = section.get("initial_backoff_ms") {
            config.download.initial_backoff_ms = parse_value(
                v,
                "download",
                "initial_backoff_ms",
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("max_backoff_ms") {
            config.download.max_backoff_ms = parse_value(
                v,
                "download",
                "max_backoff_ms",
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("jitter") {
            config.download.jitter = parse_fraction(v, "download", "jitter")?;
        }
    }

    // [pipeline] section
    if let Some(section) = ini.section(Some("pipeline")) {
        if let Some(v) = section.get("queue_depth") {
            config.pipeline.queue_depth =
                parse_positive(v, "pipeline", "queue_depth", "must be a positive integer")?;
        }
        if let Some(v) = section.get("batch_size") {
            config.pipeline.batch_size =
                parse_positive(v, "pipeline", "batch_size", "must be a positive integer")?;
        }
        if let Some(v) = section.get("failure_threshold") {
            config.pipeline.failure_threshold = parse_fraction(v, "pipeline", "failure_threshold")?;
        }
        if let Some(v) = section.get("abort_on_failure") {
            config.pipeline.abort_on_failure = parse_bool(v)
                .ok_or_else(|| invalid("pipeline", "abort_on_failure", v, "must be true or false"))?;
        }
        if let Some(v) = section.get("max_tiles") {
            config.pipeline.max_tiles =
                parse_positive(v, "pipeline", "max_tiles", "must be a positive integer")?;
        }
        if let Some(v) = section.get("output_dir") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("pipeline", "output_dir", v, "must not be empty"));
            }
            config.pipeline.output_dir = expand_tilde(v);
        }
    }

    // [airac] section
    if let Some(section) = ini.section(Some("airac")) {
        if let Some(v) = section.get("reference_date") {
            config.airac.reference_date = NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .map_err(|_| invalid("airac", "reference_date", v, "must be a date (YYYY-MM-DD)"))?;
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(v: &str, section: &str, key: &str, reason: &str) -> Result<T, ConfigFileError> {
    v.trim().parse().map_err(|_| invalid(section, key, v, reason))
}

fn parse_positive<T>(v: &str, section: &str, key: &str, reason: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    let parsed: T = parse_value(v, section, key, reason)?;
    if parsed <= T::default() {
        return Err(invalid(section, key, v, reason));
    }
    Ok(parsed)
}

fn parse_fraction(v: &str, section: &str, key: &str) -> Result<f64, ConfigFileError> {
    const REASON: &str = "must be a number between 0.0 and 1.0";
    let parsed: f64 = parse_value(v, section, key, REASON)?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(invalid(section, key, v, REASON));
    }
    Ok(parsed)
}

/// `true`/`yes`/`on`/`1` and their negatives, any case.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        None => PathBuf::from(path),
    }
}
