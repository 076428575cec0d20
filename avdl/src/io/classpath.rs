//! Search context resolution from the runtime dependency group.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::version::{HostVersion, select_dependency_group_name};
use crate::io::config::AvdlConfig;
use crate::io::sources::resolve_against;

/// Where the compiler looks up types referenced by imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchContext {
    /// Only the resolved dependency locations, in declaration order.
    Isolated(Vec<PathBuf>),
    /// The process-wide default lookup of the compiler.
    Ambient,
}

impl SearchContext {
    /// Locations contributed by the dependency group (empty for `Ambient`).
    pub fn locations(&self) -> &[PathBuf] {
        match self {
            SearchContext::Isolated(locations) => locations,
            SearchContext::Ambient => &[],
        }
    }
}

/// A dependency location that cannot be placed on a search path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("empty dependency location")]
    Empty,
    #[error("dependency location {} is not absolute", .0.display())]
    NotAbsolute(PathBuf),
    #[error("dependency location {} contains a path list separator", .0.display())]
    ContainsSeparator(PathBuf),
}

/// Turn one configured location into a usable search path entry.
pub fn to_search_location(base_dir: &Path, location: &Path) -> Result<PathBuf, LocationError> {
    if location.as_os_str().is_empty() {
        return Err(LocationError::Empty);
    }
    let resolved = resolve_against(base_dir, location);
    if !resolved.is_absolute() {
        return Err(LocationError::NotAbsolute(resolved));
    }
    if std::env::join_paths([resolved.as_os_str()]).is_err() {
        return Err(LocationError::ContainsSeparator(resolved));
    }
    Ok(resolved)
}

/// Build a search context from already-resolved group entries.
///
/// Unusable entries are skipped with a debug diagnostic. When nothing usable
/// remains the ambient context is returned instead of an empty isolated one.
pub fn build_search_context(base_dir: &Path, entries: &[PathBuf]) -> SearchContext {
    let mut locations = Vec::with_capacity(entries.len());
    for entry in entries {
        match to_search_location(base_dir, entry) {
            Ok(location) => locations.push(location),
            Err(err) => debug!(location = %entry.display(), "{err}"),
        }
    }
    if locations.is_empty() {
        SearchContext::Ambient
    } else {
        SearchContext::Isolated(locations)
    }
}

/// Resolve the runtime dependency group chosen for `host` into a search context.
///
/// A group absent from the configuration resolves like an empty one.
pub fn resolve_search_context(
    config: &AvdlConfig,
    host: &HostVersion,
    base_dir: &Path,
) -> SearchContext {
    let group = select_dependency_group_name(host);
    let entries: &[PathBuf] = match config.dependencies.get(group) {
        Some(entries) => entries.as_slice(),
        None => {
            debug!(group, "dependency group not configured");
            &[]
        }
    };
    let context = build_search_context(base_dir, entries);
    info!(
        group,
        host_version = %host,
        locations = context.locations().len(),
        ambient = matches!(context, SearchContext::Ambient),
        "resolved search context"
    );
    context
}

/// Join locations into a single platform search path value.
pub fn join_search_path<'a>(
    locations: impl IntoIterator<Item = &'a PathBuf>,
) -> Option<OsString> {
    std::env::join_paths(locations).ok()
}
