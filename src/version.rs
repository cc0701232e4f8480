use std::cmp::Ordering;
use std::fmt;

use crate::error::{KernelBumpError, Result};

/// Kernel version representation: one or more dotted numeric components.
///
/// Unlike semver, kernel trees use a variable number of components
/// ("6.1", "6.1.21", "4.14.290"), so the parts are kept as a vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelVersion {
    parts: Vec<u32>,
}

impl KernelVersion {
    /// Parse a version from user input or a tag name (e.g. "v6.1.21" -> 6.1.21)
    ///
    /// A leading 'v' or 'V' tag prefix is stripped before parsing.
    pub fn parse(input: &str) -> Result<Self> {
        let clean = input
            .trim()
            .trim_start_matches('v')
            .trim_start_matches('V');

        if clean.is_empty() {
            return Err(KernelBumpError::version("empty version string"));
        }

        let parts = clean
            .split('.')
            .map(|p| {
                p.parse::<u32>().map_err(|_| {
                    KernelBumpError::version(format!(
                        "Invalid version component '{}' in '{}'",
                        p, input
                    ))
                })
            })
            .collect::<Result<Vec<u32>>>()?;

        Ok(KernelVersion { parts })
    }

    /// The tag name carrying the 'v' prefix (e.g. "v6.1.21")
    pub fn tag_name(&self) -> String {
        format!("v{}", self)
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", rendered.join("."))
    }
}

impl PartialOrd for KernelVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KernelVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Missing components compare as zero, so 6.1 == 6.1.0 < 6.1.21
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

/// Outcome of validating a source/target pair before orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOrder {
    /// Target sorts after source, the normal upgrade direction
    Upgrade,
    /// Target sorts before source; permitted, but worth a warning
    Downgrade,
}

/// Validate a source/target version pair.
///
/// Equal versions are rejected: a same-version "bump" would still
/// rewrite history without changing any file names.
pub fn validate_pair(source: &KernelVersion, target: &KernelVersion) -> Result<PairOrder> {
    if source == target {
        return Err(KernelBumpError::version(format!(
            "source and target versions are both '{}'",
            source
        )));
    }

    if target < source {
        Ok(PairOrder::Downgrade)
    } else {
        Ok(PairOrder::Upgrade)
    }
}

/// Sort a list of tag names by version order, dropping tags that do not
/// parse as kernel versions.
///
/// Used for the interactive version listing.
pub fn sort_version_tags(tags: &[String]) -> Vec<String> {
    let mut parsed: Vec<(KernelVersion, String)> = tags
        .iter()
        .filter_map(|t| KernelVersion::parse(t).ok().map(|v| (v, t.clone())))
        .collect();

    parsed.sort_by(|a, b| a.0.cmp(&b.0));
    parsed.into_iter().map(|(_, t)| t).collect()
}
