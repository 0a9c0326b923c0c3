//! Session info parsing with version caching
//!
//! iRacing emits YAML that standard parsers reject: driver and team names are
//! written unquoted and may contain apostrophes, `&`, or leading punctuation,
//! and the shared-memory buffer can carry stray control characters. The
//! parser cleans both before handing the text to `serde_yaml_ng`.

use std::sync::Arc;

use tracing::{debug, warn};

use super::SessionInfo;
use crate::{Result, StandingsError};

/// Keys whose values iRacing writes without quoting.
const UNQUOTED_KEYS: &[&str] = &["AbbrevName:", "TeamName:", "UserName:", "Initials:"];

/// Session info cache entry with version tracking
#[derive(Debug, Clone)]
pub struct SessionInfoCache {
    /// Cached session info
    pub session_info: Arc<SessionInfo>,
    /// Session info update counter this entry was parsed from
    pub version: u32,
}

impl SessionInfoCache {
    pub fn new(session_info: Arc<SessionInfo>, version: u32) -> Self {
        Self { session_info, version }
    }

    pub fn is_valid(&self, current_version: u32) -> bool {
        self.version == current_version
    }
}

/// Session info parser with YAML preprocessing for iRacing compatibility
#[derive(Debug, Clone, Default)]
pub struct SessionInfoParser {
    cache: Option<SessionInfoCache>,
}

impl SessionInfoParser {
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// Parse raw session YAML, reusing the cached result when `version` is unchanged.
    pub fn parse_versioned(&mut self, yaml: &str, version: u32) -> Result<Arc<SessionInfo>> {
        if let Some(cached) = self.get_cached(version) {
            debug!(version, "Using cached session info");
            return Ok(cached);
        }

        debug!(version, bytes = yaml.len(), "Parsing fresh session info");
        let session_info = match self.parse(yaml) {
            Ok(info) => Arc::new(info),
            Err(e) => {
                warn!(version, "Failed to parse session YAML: {}", e);
                return Err(e);
            }
        };

        self.cache = Some(SessionInfoCache::new(Arc::clone(&session_info), version));
        Ok(session_info)
    }

    /// Clean iRacing YAML: drop control characters and quote unescaped name values.
    pub fn preprocess_iracing_yaml(&self, yaml: &str) -> String {
        let cleaned: String = yaml
            .chars()
            .filter(|&ch| !ch.is_control() || matches!(ch, '\n' | '\r' | '\t'))
            .collect();

        cleaned.lines().map(quote_unescaped_value).collect::<Vec<_>>().join("\n")
    }

    /// Parse raw YAML into [`SessionInfo`] (preprocessing included).
    pub fn parse(&self, yaml: &str) -> Result<SessionInfo> {
        if yaml.trim().is_empty() {
            return Err(StandingsError::parse_error(
                "Session YAML extraction",
                "Session YAML string is empty",
            ));
        }

        let preprocessed = self.preprocess_iracing_yaml(yaml);
        serde_yaml_ng::from_str::<SessionInfo>(&preprocessed).map_err(|e| {
            StandingsError::parse_error("Session YAML deserialization", format!("YAML parsing failed: {}", e))
        })
    }

    /// Get cached session info if valid for version
    pub fn get_cached(&self, version: u32) -> Option<Arc<SessionInfo>> {
        self.cache
            .as_ref()
            .filter(|cache| cache.is_valid(version))
            .map(|cache| Arc::clone(&cache.session_info))
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }
}

fn quote_unescaped_value(line: &str) -> String {
    for &key in UNQUOTED_KEYS {
        let Some(key_pos) = line.find(key) else {
            continue;
        };
        let after_key = key_pos + key.len();
        let Some(offset) = line[after_key..].find(|c: char| !c.is_whitespace()) else {
            return line.to_string();
        };

        let value_start = after_key + offset;
        let value = line[value_start..].trim();
        if value.starts_with('\'') || value.starts_with('"') {
            return line.to_string();
        }

        return format!("{}{} '{}'", &line[..after_key], &line[after_key..value_start], value.replace('\'', "''"));
    }

    line.to_string()
}
