use glob::Pattern;
use std::path::Path;

use crate::error::Error;

/// Skip-list and blacklist matching for folders.
///
/// Skip entries are path prefixes compared case-insensitively with a
/// trailing separator, so listing a folder excludes its whole subtree but
/// `/music/Various` does not swallow `/music/Various Artists`. Blacklist
/// entries are glob patterns; a folder is excluded when it or any of its
/// ancestors matches.
#[derive(Debug, Clone, Default)]
pub struct SkipFilter {
    prefixes: Vec<String>,
    patterns: Vec<Pattern>,
}

impl SkipFilter {
    pub fn new(skip_paths: &[String], blacklist_patterns: &[String]) -> Result<Self, Error> {
        let prefixes = skip_paths
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| normalize(p))
            .collect();

        let patterns = blacklist_patterns
            .iter()
            .map(|glob| {
                Pattern::new(glob).map_err(|source| Error::Glob {
                    pattern: glob.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { prefixes, patterns })
    }

    /// Why `path` is excluded, or `None` if it is not.
    pub fn excluded(&self, path: &Path) -> Option<String> {
        let normalized = normalize(&path.to_string_lossy());

        if let Some(prefix) = self.prefixes.iter().find(|p| normalized.starts_with(p.as_str())) {
            return Some(format!("Path is in skip list ({})", prefix.trim_end_matches('/')));
        }

        self.patterns
            .iter()
            .find(|pattern| path.ancestors().any(|dir| pattern.matches_path(dir)))
            .map(|pattern| format!("Path matches blacklist pattern '{}'", pattern.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.patterns.is_empty()
    }
}

fn normalize(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/").to_lowercase();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}
