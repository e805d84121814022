use crate::debugger::{Breakpoint, ListOptions, ListStyle};
use crate::error::ConfigError;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Debugger settings, loaded from a JSON file and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebuggerConfig {
    pub breakpoints: Vec<Breakpoint>,
    pub stop_on_entry: bool,
    pub list_style: ListStyle,
    pub list_radius: usize,
    pub color: bool,
    pub history_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        let list = ListOptions::default();
        Self {
            breakpoints: Vec::new(),
            stop_on_entry: true,
            list_style: list.style,
            list_radius: list.radius,
            color: list.color,
            history_file: None,
            log_level: None,
        }
    }
}

impl DebuggerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&path.display().to_string(), &text)
    }

    pub fn from_json(label: &str, text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: label.to_string(),
            source,
        })
    }

    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            style: self.list_style,
            radius: self.list_radius,
            color: self.color,
        }
    }

    /// Configured level, `warn` when unset.
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        match &self.log_level {
            None => Ok(LevelFilter::Warn),
            Some(level) => level
                .parse()
                .map_err(|_| ConfigError::LogLevel(level.clone())),
        }
    }
}

/// Parse a `FILE:LINE` breakpoint spec. The split is on the last colon so
/// Windows drive letters survive.
pub fn parse_breakpoint(spec: &str) -> Result<Breakpoint, ConfigError> {
    let (file, line) = spec
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::Breakpoint(spec.to_string()))?;
    let line: usize = line
        .trim()
        .parse()
        .map_err(|_| ConfigError::Breakpoint(spec.to_string()))?;
    if file.is_empty() || line == 0 {
        return Err(ConfigError::Breakpoint(spec.to_string()));
    }
    Ok(Breakpoint::new(file, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let cfg = DebuggerConfig::from_json("inline", r#"{ "list_radius": 2 }"#).expect("parse");
        assert_eq!(cfg.list_radius, 2);
        assert!(cfg.stop_on_entry);
        assert_eq!(cfg.list_style, ListStyle::Window);
    }

    #[test]
    fn test_breakpoints_and_style() {
        let cfg = DebuggerConfig::from_json(
            "inline",
            r#"{
                "breakpoints": [{ "filename": "main.js", "line": 4 }],
                "list_style": "plain",
                "color": false
            }"#,
        )
        .expect("parse");
        assert_eq!(cfg.breakpoints, vec![Breakpoint::new("main.js", 4)]);
        assert_eq!(cfg.list_options().style, ListStyle::Plain);
        assert!(!cfg.list_options().color);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = DebuggerConfig::from_json("inline", r#"{ "colour": true }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_log_level() {
        let mut cfg = DebuggerConfig::default();
        assert_eq!(cfg.level_filter().expect("default"), LevelFilter::Warn);
        cfg.log_level = Some("debug".to_string());
        assert_eq!(cfg.level_filter().expect("debug"), LevelFilter::Debug);
        cfg.log_level = Some("chatty".to_string());
        assert!(matches!(cfg.level_filter(), Err(ConfigError::LogLevel(_))));
    }

    #[test]
    fn test_parse_breakpoint_spec() {
        assert_eq!(
            parse_breakpoint("C:\\js\\main.js:12").expect("parse"),
            Breakpoint::new("C:\\js\\main.js", 12)
        );
        assert!(parse_breakpoint("main.js").is_err());
        assert!(parse_breakpoint("main.js:zero").is_err());
        assert!(parse_breakpoint(":3").is_err());
    }
}
