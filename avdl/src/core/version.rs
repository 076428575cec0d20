//! Host build-system versions and dependency group selection.

use std::cmp::Ordering;
use std::fmt;

use anyhow::{Result, anyhow};

/// Dependency group holding the runtime classpath on current hosts.
pub const RUNTIME_CLASSPATH_CONFIGURATION_NAME: &str = "runtimeClasspath";
/// Legacy dependency group name used by hosts older than [`RUNTIME_CLASSPATH_SINCE`].
pub const RUNTIME_CONFIGURATION_NAME: &str = "runtime";
/// First host version (`3.5`) exposing [`RUNTIME_CLASSPATH_CONFIGURATION_NAME`].
pub const RUNTIME_CLASSPATH_SINCE: &[u64] = &[3, 5];

/// A host version such as `3.5`, `4.10.2` or `3.5-rc-1`.
///
/// Numeric components compare left to right with missing components treated
/// as zero. A version carrying a pre-release suffix sorts below the release
/// with the same numbers.
#[derive(Debug, Clone)]
pub struct HostVersion {
    numbers: Vec<u64>,
    pre_release: Option<String>,
}

impl HostVersion {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (base, pre_release) = match raw.split_once('-') {
            Some((base, suffix)) => (base, Some(suffix.to_string())),
            None => (raw, None),
        };
        if base.is_empty() {
            return Err(anyhow!("invalid host version '{raw}'"));
        }
        let numbers = base
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| anyhow!("invalid host version '{raw}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        if pre_release.as_deref().is_some_and(str::is_empty) {
            return Err(anyhow!("invalid host version '{raw}'"));
        }
        Ok(Self {
            numbers,
            pre_release,
        })
    }

    fn component(&self, index: usize) -> u64 {
        self.numbers.get(index).copied().unwrap_or(0)
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.numbers.iter().map(u64::to_string).collect();
        write!(f, "{}", numbers.join("."))?;
        if let Some(suffix) = &self.pre_release {
            write!(f, "-{suffix}")?;
        }
        Ok(())
    }
}

impl Ord for HostVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.numbers.len().max(other.numbers.len());
        for index in 0..width {
            match self.component(index).cmp(&other.component(index)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        match (&self.pre_release, &other.pre_release) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for HostVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HostVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HostVersion {}

/// Name of the dependency group that carries the runtime classpath for `host`.
pub fn select_dependency_group_name(host: &HostVersion) -> &'static str {
    let since = HostVersion {
        numbers: RUNTIME_CLASSPATH_SINCE.to_vec(),
        pre_release: None,
    };
    if *host >= since {
        RUNTIME_CLASSPATH_CONFIGURATION_NAME
    } else {
        RUNTIME_CONFIGURATION_NAME
    }
}
