// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Graph build configuration.

/// What a decode failure on a known type code does to the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Replace the failing entity with a malformed placeholder and keep going
    #[default]
    Lenient,
    /// Abort the whole build on the first decode failure
    Strict,
}

/// Graph build configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Per-entity decode failure handling.
    pub error_policy: ErrorPolicy,
    /// Decode records on the rayon thread pool.
    pub parallel: bool,
    /// Record count below which decoding stays on the calling thread.
    pub parallel_threshold: usize,
}

impl GraphConfig {
    /// Strict policy, otherwise defaults
    pub fn strict() -> Self {
        Self::default().with_error_policy(ErrorPolicy::Strict)
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// `IGES_STRICT`, `IGES_PARALLEL` and `IGES_PARALLEL_THRESHOLD`; unset or
    /// unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`GraphConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |name: &str| lookup(name).as_deref().and_then(parse_flag);
        Self {
            error_policy: if flag("IGES_STRICT").unwrap_or(false) {
                ErrorPolicy::Strict
            } else {
                ErrorPolicy::Lenient
            },
            parallel: flag("IGES_PARALLEL").unwrap_or(defaults.parallel),
            parallel_threshold: lookup("IGES_PARALLEL_THRESHOLD")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.parallel_threshold),
        }
    }

    /// Whether a batch of `records` should be decoded in parallel
    pub(crate) fn use_parallel(&self, records: usize) -> bool {
        self.parallel && records >= self.parallel_threshold
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Lenient,
            parallel: true,
            parallel_threshold: 512,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.error_policy, ErrorPolicy::Lenient);
        assert!(config.parallel);
        assert!(!config.use_parallel(10));
        assert!(config.use_parallel(512));
    }

    #[test]
    fn test_builders() {
        let config = GraphConfig::strict()
            .with_parallel(false)
            .with_parallel_threshold(1);
        assert_eq!(config.error_policy, ErrorPolicy::Strict);
        assert!(!config.use_parallel(1000));
    }

    #[test]
    fn test_from_lookup() {
        let vars = [
            ("IGES_STRICT", "yes"),
            ("IGES_PARALLEL", "0"),
            ("IGES_PARALLEL_THRESHOLD", " 64 "),
        ];
        let config = GraphConfig::from_lookup(|name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        });
        assert_eq!(config.error_policy, ErrorPolicy::Strict);
        assert!(!config.parallel);
        assert_eq!(config.parallel_threshold, 64);
    }

    #[test]
    fn test_from_lookup_falls_back_to_defaults() {
        assert_eq!(GraphConfig::from_lookup(|_| None), GraphConfig::default());

        let garbage = GraphConfig::from_lookup(|_| Some("maybe".to_string()));
        assert_eq!(garbage, GraphConfig::default());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
