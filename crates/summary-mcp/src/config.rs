use std::path::PathBuf;

pub const STORAGE_PATH_ENV: &str = "SUMMARY_STORAGE_PATH";
pub const LOG_LEVEL_ENV: &str = "SUMMARY_LOG";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Default directory for saved summaries; `None` falls back to the home directory.
    pub storage_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            storage_dir: non_blank(STORAGE_PATH_ENV).map(PathBuf::from),
            log_level: non_blank(LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_and_trims_env_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            (STORAGE_PATH_ENV, " /data/summaries "),
            (LOG_LEVEL_ENV, "debug"),
        ]));
        assert_eq!(config.storage_dir, Some(PathBuf::from("/data/summaries")));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn blank_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[(STORAGE_PATH_ENV, "   "), (LOG_LEVEL_ENV, "")]));
        assert!(config.storage_dir.is_none());
        assert_eq!(config.log_level, "info");
    }
}
