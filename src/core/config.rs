//! Runtime settings consumed by the formatter and the session pump.
//!
//! Settings are assembled once at startup from an optional TOML file merged
//! under command-line flags, then shared read-only across all sessions.

use serde::Deserialize;

use crate::core::args::CommandlineArgs;
use crate::{Error, Result};

/// Anchor mapping a server TIMESTAMP tick to a wall-clock instant, used when
/// rendering timestamps as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimestampAnchor {
    /// Server tick (milliseconds) observed at the reference instant
    pub ref_timestamp: u32,
    /// Unix seconds at the reference instant
    pub ref_unix_time: i64,
}

impl Default for TimestampAnchor {
    fn default() -> Self {
        Self {
            ref_timestamp: 0,
            ref_unix_time: chrono::Utc::now().timestamp(),
        }
    }
}

/// Read-only knobs consumed by the trace formatter.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Emit hidden protocol counters (field widths, opcodes, length fields)
    pub verbose: bool,
    /// Pretty-print with per-member indentation instead of one line
    pub multiline: bool,
    /// Render TIMESTAMP values as wall-clock UTC using `anchor`
    pub relative_timestamps: bool,
    /// Reference point for `relative_timestamps`
    pub anchor: TimestampAnchor,
    /// Overwrite `present` in QueryExtension replies with 0
    pub deny_all_extensions: bool,
    /// Trace destination; `None` means standard output
    pub outfile: Option<String>,
    /// Hex-dump raw bytes of messages that fail to decode
    pub dump_malformed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbose: false,
            multiline: false,
            relative_timestamps: false,
            anchor: TimestampAnchor::default(),
            deny_all_extensions: false,
            outfile: None,
            dump_malformed: false,
        }
    }
}

/// On-disk configuration layer; every field optional so the file can set
/// only what it cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub verbose: Option<bool>,
    pub multiline: Option<bool>,
    pub relative_timestamps: Option<bool>,
    pub anchor: Option<TimestampAnchor>,
    pub deny_all_extensions: Option<bool>,
    pub outfile: Option<String>,
    pub dump_malformed: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path, e)))?;
        toml::from_str(&text).map_err(|e| Error::Config(format!("cannot parse {}: {}", path, e)))
    }
}

impl Settings {
    /// Merge the optional config file under the command-line flags.
    /// Boolean flags are or-combined; the file only supplies what the
    /// command line left unset.
    pub fn from_args(args: &CommandlineArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let anchor = match &args.timestamp_anchor {
            Some(spec) => parse_anchor(spec)?,
            None => file.anchor.unwrap_or_default(),
        };

        Ok(Self {
            verbose: args.verbose || file.verbose.unwrap_or(false),
            multiline: args.multiline || file.multiline.unwrap_or(false),
            relative_timestamps: args.relative_timestamps
                || file.relative_timestamps.unwrap_or(false),
            anchor,
            deny_all_extensions: args.deny_all_extensions
                || file.deny_all_extensions.unwrap_or(false),
            outfile: args.outfile.clone().or(file.outfile),
            dump_malformed: args.dump_malformed || file.dump_malformed.unwrap_or(false),
        })
    }
}

fn parse_anchor(spec: &str) -> Result<TimestampAnchor> {
    let (tick, unix) = spec
        .split_once(',')
        .ok_or_else(|| Error::Config(format!("bad timestamp anchor {:?}", spec)))?;
    Ok(TimestampAnchor {
        ref_timestamp: tick
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("bad anchor tick {:?}: {}", tick, e)))?,
        ref_unix_time: unix
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("bad anchor unix time {:?}: {}", unix, e)))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_parsing() {
        let anchor = parse_anchor("123456,1700000000").unwrap();
        assert_eq!(anchor.ref_timestamp, 123456);
        assert_eq!(anchor.ref_unix_time, 1700000000);

        assert!(parse_anchor("123456").is_err());
        assert!(parse_anchor("abc,def").is_err());
    }

    #[test]
    fn test_file_config_merge() {
        let file: FileConfig = toml::from_str(
            r#"
            verbose = true
            outfile = "trace.log"
            "#,
        )
        .unwrap();
        assert_eq!(file.verbose, Some(true));
        assert_eq!(file.multiline, None);
        assert_eq!(file.outfile.as_deref(), Some("trace.log"));
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(!settings.verbose);
        assert!(!settings.multiline);
        assert!(settings.outfile.is_none());
    }
}
