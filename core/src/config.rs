use serde::Deserialize;
use tracing::warn;

/// Environment variable overriding [`LoadOptions::max_memory_mb`].
pub const ENV_MAX_MEMORY_MB: &str = "NEURONET_MAX_MEMORY_MB";
/// Environment variable overriding [`LoadOptions::comment_prefixes`].
/// Each character of the value is a prefix; an empty value disables comments.
pub const ENV_COMMENT_PREFIXES: &str = "NEURONET_COMMENT_PREFIXES";

const DEFAULT_MAX_MEMORY_MB: u64 = 4096;

/// Settings applied by the edge-list loader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Upper bound on the CSR arrays, checked before they are allocated.
    pub max_memory_mb: u64,
    /// Lines whose first non-whitespace character is one of these are skipped.
    pub comment_prefixes: Vec<char>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_memory_mb: DEFAULT_MAX_MEMORY_MB,
            comment_prefixes: vec!['#', '%'],
        }
    }
}

impl LoadOptions {
    /// Defaults overridden by `NEURONET_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(val) = lookup(ENV_MAX_MEMORY_MB) {
            match val.trim().parse::<u64>() {
                Ok(mb) if mb > 0 => options.max_memory_mb = mb,
                _ => warn!(
                    value = %val,
                    default = options.max_memory_mb,
                    "config.max_memory_mb.invalid"
                ),
            }
        }

        if let Some(val) = lookup(ENV_COMMENT_PREFIXES) {
            options.comment_prefixes = parse_prefixes(&val);
        }

        options
    }

    pub fn with_max_memory_mb(mut self, mb: u64) -> Self {
        self.max_memory_mb = mb;
        self
    }

    pub fn with_comment_prefixes(mut self, prefixes: &[char]) -> Self {
        self.comment_prefixes = prefixes.to_vec();
        self
    }

    pub(crate) fn is_comment(&self, first: char) -> bool {
        self.comment_prefixes.contains(&first)
    }
}

fn parse_prefixes(val: &str) -> Vec<char> {
    val.chars().filter(|c| !c.is_whitespace()).collect()
}
