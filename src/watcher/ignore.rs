// ABOUTME: Compiled exclusion predicate over project-relative paths
// One anchored glob per pattern, OR-combined; matching any pattern excludes the path

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::ConfigError;

/// Exclusion matcher compiled once at startup from the configured glob patterns.
///
/// A relative path is excluded iff it, or any of its ancestors, matches at
/// least one pattern. The ancestor check makes directory exclusion recursive:
/// excluding `build` also excludes `build/out/app.o`.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    set: GlobSet,
}

impl IgnoreSet {
    /// Compile the configured patterns. A malformed pattern is a fatal
    /// configuration error; the predicate cannot be trusted otherwise.
    pub fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }

        let set = builder
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: patterns.join(", "),
                source,
            })?;

        Ok(Self { set })
    }

    /// Test a root-relative path against the exclusion set.
    ///
    /// An empty pattern list excludes nothing.
    pub fn is_excluded<P: AsRef<Path>>(&self, relative: P) -> bool {
        if self.set.is_empty() {
            return false;
        }

        relative
            .as_ref()
            .ancestors()
            .filter(|ancestor| !ancestor.as_os_str().is_empty())
            .any(|ancestor| self.set.is_match(ancestor))
    }
}
