use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{KernelBumpError, Result};
use crate::version::KernelVersion;

/// The two naming conventions a version-tagged file can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// File name contains `-<version>` (patches, tarballs, series files)
    Generic,
    /// File name begins with `config-<version>` (per-arch kernel configs)
    Config,
}

/// Matcher for a version token embedded in file names.
///
/// The token must be delimiter-bounded: preceded by `-` and followed by
/// `-`, `_`, the end of the name, or a `.` that does not start another
/// numeric component. This keeps a short version like "6.1" from
/// matching inside "6.1.21" while still matching "generic-6.1.patch".
pub struct VersionToken {
    token: String,
    re: Regex,
}

impl VersionToken {
    pub fn new(version: &KernelVersion) -> Result<Self> {
        let token = version.to_string();
        let pattern = format!(r"-{}(?:$|[-_]|\.(?:$|[^0-9]))", regex::escape(&token));
        let re = Regex::new(&pattern)
            .map_err(|e| KernelBumpError::version(format!("Invalid version token: {}", e)))?;
        Ok(VersionToken { token, re })
    }

    /// Classify a tracked path against this version's naming conventions.
    ///
    /// Returns `None` when the file name does not carry the version token.
    pub fn classify(&self, path: &Path) -> Option<PathKind> {
        let name = path.file_name()?.to_str()?;
        let m = self.re.find(name)?;

        // "config-6.1.21-x86_64": the bounded token sits right after the
        // "config" prefix, so the match starts at the prefix's trailing dash.
        if name.starts_with("config-") && m.start() == "config".len() {
            Some(PathKind::Config)
        } else {
            Some(PathKind::Generic)
        }
    }

    /// Compute the target path by substituting the first bounded
    /// occurrence of this token with the target version.
    ///
    /// Returns `None` when the file name does not carry the token.
    pub fn rewrite(&self, path: &Path, target: &KernelVersion) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        let m = self.re.find(name)?;

        // The match covers "-<token><delim>"; splice the target token in
        // between the dash and the trailing delimiter.
        let token_start = m.start() + 1;
        let token_end = token_start + self.token.len();
        let new_name = format!(
            "{}{}{}",
            &name[..token_start],
            target,
            &name[token_end..]
        );

        Some(path.with_file_name(new_name))
    }
}

/// Enumerate the tracked paths subject to a bump, respecting the
/// config-only restriction.
///
/// Config-kind paths are always included; the restriction only
/// suppresses the generic pass.
pub fn resolve(
    tracked: &[PathBuf],
    token: &VersionToken,
    config_only: bool,
) -> Vec<(PathBuf, PathKind)> {
    tracked
        .iter()
        .filter_map(|path| token.classify(path).map(|kind| (path.clone(), kind)))
        .filter(|(_, kind)| !config_only || *kind == PathKind::Config)
        .collect()
}
