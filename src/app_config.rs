//! Optional config file holding defaults for CLI flags.
//!
//! The file is a flat `key = value` list with `#` comments. Flags given on
//! the command line win over values from the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// File-backed defaults for the feed binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default language id.
    pub language: Option<String>,
    /// Year queries per fetch (1..=10).
    pub years_per_fetch: Option<u8>,
    /// User fetch cooldown in milliseconds (0..=60000).
    pub fetch_cooldown_ms: Option<u64>,
    /// Read-ahead delay in milliseconds (0..=60000).
    pub read_ahead_delay_ms: Option<u64>,
    /// Whether thumbnails are preloaded.
    pub preload: Option<bool>,
    /// Retry attempts for transient API failures (0..=10).
    pub max_retries: Option<u8>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against the CLI's ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(years) = self.years_per_fetch
            && !(1..=10).contains(&years)
        {
            bail!("Invalid config value for `years_per_fetch`: {years}. Expected range: 1..=10");
        }
        if let Some(retries) = self.max_retries
            && retries > 10
        {
            bail!("Invalid config value for `max_retries`: {retries}. Expected range: 0..=10");
        }
        validate_millis("fetch_cooldown_ms", self.fetch_cooldown_ms)?;
        validate_millis("read_ahead_delay_ms", self.read_ahead_delay_ms)?;
        if let Some(language) = &self.language
            && filmfeed_core::Language::find(language).is_none()
        {
            bail!("Invalid config value for `language`: '{language}'. Run with --list-languages");
        }
        Ok(())
    }
}

fn validate_millis(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if value > 60_000 {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 0..=60000");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Log level used when neither `RUST_LOG` nor a CLI flag decides.
    #[must_use]
    pub fn level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/filmfeed/config.toml`
/// 2. `$HOME/.config/filmfeed/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("filmfeed")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("filmfeed")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config at the default path, or `None` when there is none.
pub fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

/// Reads and parses one config file.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "language" => {
                cfg.language = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "years_per_fetch" => {
                cfg.years_per_fetch = Some(parse_integer_u8(value).with_context(invalid)?);
            }
            "fetch_cooldown_ms" => {
                cfg.fetch_cooldown_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "read_ahead_delay_ms" => {
                cfg.read_ahead_delay_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "preload" => {
                cfg.preload = Some(parse_boolean(value).with_context(invalid)?);
            }
            "max_retries" => {
                cfg.max_retries = Some(parse_integer_u8(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u8(raw_value: &str) -> Result<u8> {
    let value = parse_integer_u64(raw_value)?;
    u8::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
language = "fr"
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.language.as_deref(), Some("fr"));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.years_per_fetch.is_none());
        assert!(cfg.preload.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
language = "zh-hk"
years_per_fetch = 5
fetch_cooldown_ms = 2500
read_ahead_delay_ms = 0
preload = false
max_retries = 0
verbosity = "quiet"
"#,
        )
        .expect("full config should parse");
        assert_eq!(
            cfg,
            FileConfig {
                language: Some("zh-hk".to_string()),
                years_per_fetch: Some(5),
                fetch_cooldown_ms: Some(2500),
                read_ahead_delay_ms: Some(0),
                preload: Some(false),
                max_retries: Some(0),
                verbosity: Some(VerbositySetting::Quiet),
            }
        );
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r##"
years_per_fetch = 4 # wider net
language = "de" # German "#" edition
"##,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.years_per_fetch, Some(4));
        assert_eq!(cfg.language.as_deref(), Some("de"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_language() {
        let err = parse_config_str(r#"language = "xx""#).expect_err("unknown language expected");
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_language() {
        let err = parse_config_str("language = en").expect_err("quoted string expected");
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_years() {
        let err = parse_config_str("years_per_fetch = 0").expect_err("0 is below range");
        assert!(err.to_string().contains("years_per_fetch"));

        let err = parse_config_str("years_per_fetch = 300").expect_err("does not fit in u8");
        assert!(err.to_string().contains("years_per_fetch"));
    }

    #[test]
    fn test_parse_config_rejects_cooldown_over_limit() {
        let err = parse_config_str("fetch_cooldown_ms = 60001").expect_err("above range");
        assert!(err.to_string().contains("fetch_cooldown_ms"));
    }

    #[test]
    fn test_parse_config_rejects_negative_values() {
        let err = parse_config_str("read_ahead_delay_ms = -5").expect_err("negative value");
        assert!(err.to_string().contains("read_ahead_delay_ms"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        let err = parse_config_str("preload = yes").expect_err("invalid boolean expected");
        assert!(err.to_string().contains("preload"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("preload true").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("concurrency = 4").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(VerbositySetting::Default.level(), "info");
        assert_eq!(VerbositySetting::Verbose.level(), "debug");
        assert_eq!(VerbositySetting::Quiet.level(), "error");
        assert_eq!(VerbositySetting::Debug.level(), "trace");
    }

    // ==================== File Loading Tests ====================

    #[test]
    fn test_load_file_config_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_retries = 2\npreload = true\n").expect("write config");

        let cfg = load_file_config(&path).expect("config should load");
        assert_eq!(cfg.max_retries, Some(2));
        assert_eq!(cfg.preload, Some(true));
    }

    #[test]
    fn test_load_file_config_error_names_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_retries = 99\n").expect("write config");

        let err = load_file_config(&path).expect_err("out of range value");
        let message = format!("{err:#}");
        assert!(message.contains("config.toml"));
        assert!(message.contains("max_retries"));
    }

    #[test]
    fn test_load_file_config_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_file_config(&dir.path().join("absent.toml")).is_err());
    }
}
