/// Assembly of the atomic logging reconfiguration sent to a sandbox
use crate::config::types::ValidationError;
use log::info;
use serde::{Deserialize, Serialize};

/// Sandbox log verbosity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Warning,
    #[default]
    Info,
    Debug,
}

/// Case-insensitive aliases accepted for each level
const LOG_LEVEL_ALIASES: &[(&str, LogLevel)] = &[
    ("warning", LogLevel::Warning),
    ("0", LogLevel::Warning),
    ("info", LogLevel::Info),
    ("1", LogLevel::Info),
    ("debug", LogLevel::Debug),
    ("2", LogLevel::Debug),
];

/// Literal spellings accepted for packet logging
const BOOL_LITERALS: &[(&str, bool)] = &[
    ("1", true),
    ("t", true),
    ("T", true),
    ("TRUE", true),
    ("true", true),
    ("True", true),
    ("0", false),
    ("f", false),
    ("F", false),
    ("FALSE", false),
    ("false", false),
    ("False", false),
];

impl LogLevel {
    pub fn parse(spec: &str) -> Result<Self, ValidationError> {
        let lowered = spec.to_ascii_lowercase();
        LOG_LEVEL_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, level)| *level)
            .ok_or_else(|| ValidationError::InvalidLogLevel(spec.to_string()))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Warning => write!(f, "Warning"),
            LogLevel::Info => write!(f, "Info"),
            LogLevel::Debug => write!(f, "Debug"),
        }
    }
}

/// Syscall tracing request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StraceMode {
    Off,
    All,
    Only(Vec<String>),
}

impl StraceMode {
    pub fn parse(spec: &str) -> Self {
        match spec.to_ascii_lowercase().as_str() {
            "off" => StraceMode::Off,
            "all" => StraceMode::All,
            _ => StraceMode::Only(spec.split(',').map(str::to_string).collect()),
        }
    }
}

fn parse_bool(spec: &str) -> Result<bool, ValidationError> {
    BOOL_LITERALS
        .iter()
        .find(|(literal, _)| *literal == spec)
        .map(|(_, value)| *value)
        .ok_or_else(|| ValidationError::InvalidBoolean(spec.to_string()))
}

/// Wire payload for a logging change. A value is only meaningful when its
/// `set_*` flag is true.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingChangeSet {
    pub set_strace: bool,
    pub enable_strace: bool,
    /// Empty means every syscall
    pub strace_whitelist: Vec<String>,
    pub set_level: bool,
    pub level: LogLevel,
    pub set_log_packets: bool,
    pub log_packets: bool,
}

impl LoggingChangeSet {
    /// Validate all three inputs and merge them. Returns `Ok(None)` when none was given.
    ///
    /// Empty strings count as absent.
    pub fn build(
        strace: Option<&str>,
        log_level: Option<&str>,
        log_packets: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        let strace = strace.filter(|s| !s.is_empty());
        let log_level = log_level.filter(|s| !s.is_empty());
        let log_packets = log_packets.filter(|s| !s.is_empty());

        if strace.is_none() && log_level.is_none() && log_packets.is_none() {
            return Ok(None);
        }

        // Validate everything before logging or building anything.
        let level = log_level.map(LogLevel::parse).transpose()?;
        let packets = log_packets.map(parse_bool).transpose()?;

        let mut change = LoggingChangeSet::default();

        if let Some(spec) = strace {
            change.set_strace = true;
            match StraceMode::parse(spec) {
                StraceMode::Off => info!("Disabling strace"),
                StraceMode::All => {
                    change.enable_strace = true;
                    info!("Enabling all straces");
                }
                StraceMode::Only(syscalls) => {
                    change.enable_strace = true;
                    change.strace_whitelist = syscalls;
                    info!("Enabling strace for syscalls: {}", spec);
                }
            }
        }

        if let Some(level) = level {
            change.set_level = true;
            change.level = level;
            info!("Setting log level {}", level);
        }

        if let Some(packets) = packets {
            change.set_log_packets = true;
            change.log_packets = packets;
            if packets {
                info!("Enabling packet logging");
            } else {
                info!("Disabling packet logging");
            }
        }

        Ok(Some(change))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_requested() {
        assert_eq!(LoggingChangeSet::build(None, None, None).unwrap(), None);
        assert_eq!(
            LoggingChangeSet::build(Some(""), Some(""), None).unwrap(),
            None
        );
    }

    #[test]
    fn test_strace_off() {
        let change = LoggingChangeSet::build(Some("OFF"), None, None)
            .unwrap()
            .unwrap();
        assert!(change.set_strace);
        assert!(!change.enable_strace);
        assert!(!change.set_level);
        assert!(!change.set_log_packets);
        assert!(change.strace_whitelist.is_empty());
    }

    #[test]
    fn test_strace_all() {
        let change = LoggingChangeSet::build(Some("All"), None, None)
            .unwrap()
            .unwrap();
        assert!(change.set_strace);
        assert!(change.enable_strace);
        assert!(change.strace_whitelist.is_empty());
    }

    #[test]
    fn test_strace_whitelist() {
        let change = LoggingChangeSet::build(Some("read,write"), None, None)
            .unwrap()
            .unwrap();
        assert!(change.enable_strace);
        assert_eq!(change.strace_whitelist, vec!["read", "write"]);
    }

    #[test]
    fn test_log_level_aliases() {
        let cases = [
            ("warning", LogLevel::Warning),
            ("WARNING", LogLevel::Warning),
            ("0", LogLevel::Warning),
            ("info", LogLevel::Info),
            ("Info", LogLevel::Info),
            ("1", LogLevel::Info),
            ("debug", LogLevel::Debug),
            ("DeBuG", LogLevel::Debug),
            ("2", LogLevel::Debug),
        ];
        for (spec, expected) in cases {
            assert_eq!(LogLevel::parse(spec).unwrap(), expected, "spec {spec}");
        }

        for bad in ["bogus", "3", "-1", "warn", " info"] {
            assert_eq!(
                LogLevel::parse(bad),
                Err(ValidationError::InvalidLogLevel(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_invalid_log_level_rejects_whole_change() {
        let err = LoggingChangeSet::build(Some("all"), Some("verbose"), Some("true")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidLogLevel("verbose".to_string()));
    }

    #[test]
    fn test_log_packets_literals() {
        for spec in ["1", "t", "T", "TRUE", "true", "True"] {
            let change = LoggingChangeSet::build(None, None, Some(spec))
                .unwrap()
                .unwrap();
            assert!(change.set_log_packets && change.log_packets, "spec {spec}");
        }
        for spec in ["0", "f", "F", "FALSE", "false", "False"] {
            let change = LoggingChangeSet::build(None, None, Some(spec))
                .unwrap()
                .unwrap();
            assert!(change.set_log_packets && !change.log_packets, "spec {spec}");
        }

        let err = LoggingChangeSet::build(None, None, Some("yes")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidBoolean("yes".to_string()));
    }

    #[test]
    fn test_merged_flags_are_exact() {
        let change = LoggingChangeSet::build(None, Some("debug"), Some("false"))
            .unwrap()
            .unwrap();
        assert!(!change.set_strace);
        assert!(change.set_level);
        assert!(change.set_log_packets);
        assert_eq!(change.level, LogLevel::Debug);
        assert!(!change.log_packets);
    }

    #[test]
    fn test_wire_field_names() {
        let change = LoggingChangeSet::build(Some("open"), Some("0"), None)
            .unwrap()
            .unwrap();
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["setStrace"], true);
        assert_eq!(json["enableStrace"], true);
        assert_eq!(json["straceWhitelist"], serde_json::json!(["open"]));
        assert_eq!(json["setLevel"], true);
        assert_eq!(json["level"], "warning");
        assert_eq!(json["setLogPackets"], false);
    }
}
