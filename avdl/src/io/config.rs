//! Generator configuration stored in `avdl.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::version::HostVersion;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "avdl.toml";

/// Generator configuration (TOML).
///
/// Missing fields take defaults so an empty file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AvdlConfig {
    /// Version reported by the host build system. Picks the dependency group
    /// that carries the runtime classpath.
    pub host_version: String,

    /// Directory receiving generated `.avpr` files.
    pub output_dir: PathBuf,

    /// Files or directories holding candidate sources.
    pub sources: Vec<PathBuf>,

    /// Named dependency groups, each an ordered list of locations.
    pub dependencies: BTreeMap<String, Vec<PathBuf>>,

    pub compiler: CompilerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Java launcher used to run the IDL tool, with any leading arguments
    /// (e.g. `["java", "-Xmx512m"]`).
    pub launcher: Vec<String>,

    /// Jars or directories providing the IDL tool itself.
    pub tool_classpath: Vec<PathBuf>,

    /// Entry point of the IDL tool.
    pub main_class: String,

    /// Optional wall-clock limit for one file's compilation, in seconds.
    /// Unset means the tool runs until it exits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Truncate captured tool stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            launcher: vec!["java".to_string()],
            tool_classpath: Vec::new(),
            main_class: "org.apache.avro.tool.Main".to_string(),
            timeout_secs: None,
            output_limit_bytes: 100_000,
        }
    }
}

impl Default for AvdlConfig {
    fn default() -> Self {
        Self {
            host_version: "8.0".to_string(),
            output_dir: PathBuf::from("build/generated-avro-main-avpr"),
            sources: vec![PathBuf::from("src/main/avro")],
            dependencies: BTreeMap::new(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl AvdlConfig {
    pub fn validate(&self) -> Result<()> {
        HostVersion::parse(&self.host_version).context("host_version")?;
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("output_dir must not be empty"));
        }
        if self.compiler.launcher.is_empty() || self.compiler.launcher[0].trim().is_empty() {
            return Err(anyhow!("compiler.launcher must be a non-empty array"));
        }
        if self.compiler.main_class.trim().is_empty() {
            return Err(anyhow!("compiler.main_class must not be empty"));
        }
        if self.compiler.timeout_secs == Some(0) {
            return Err(anyhow!("compiler.timeout_secs must be > 0 when set"));
        }
        if self.compiler.output_limit_bytes == 0 {
            return Err(anyhow!("compiler.output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn host_version(&self) -> Result<HostVersion> {
        HostVersion::parse(&self.host_version)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AvdlConfig::default()`.
pub fn load_config(path: &Path) -> Result<AvdlConfig> {
    if !path.exists() {
        let cfg = AvdlConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AvdlConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate().with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AvdlConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

/// Write a default config to `path` unless one already exists.
///
/// Returns whether the file was written.
pub fn init_config(path: &Path, force: bool) -> Result<bool> {
    if !force && path.exists() {
        return Ok(false);
    }
    write_config(path, &AvdlConfig::default())?;
    Ok(true)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, AvdlConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("avdl.toml");
        let mut cfg = AvdlConfig::default();
        cfg.dependencies.insert(
            "runtimeClasspath".to_string(),
            vec![PathBuf::from("lib/schemas.jar")],
        );
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("avdl.toml");
        fs::write(
            &path,
            "host_version = \"3.4\"\n\n[dependencies]\nruntime = [\"deps/a.jar\"]\n\n[compiler]\ntimeout_secs = 5\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.host_version, "3.4");
        assert_eq!(cfg.dependencies["runtime"], vec![PathBuf::from("deps/a.jar")]);
        assert_eq!(cfg.compiler.timeout_secs, Some(5));
        assert_eq!(cfg.compiler.launcher, vec!["java"]);
        assert_eq!(cfg.output_dir, AvdlConfig::default().output_dir);
    }

    #[test]
    fn rejects_invalid_host_version() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("avdl.toml");
        fs::write(&path, "host_version = \"latest\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid host version"));
    }

    #[test]
    fn init_keeps_existing_file_unless_forced() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("avdl.toml");
        fs::write(&path, "host_version = \"3.4\"\n").expect("write");

        assert!(!init_config(&path, false).expect("init"));
        assert_eq!(load_config(&path).expect("load").host_version, "3.4");

        assert!(init_config(&path, true).expect("init --force"));
        assert_eq!(load_config(&path).expect("load"), AvdlConfig::default());
    }

    #[test]
    fn timeout_is_unset_by_default() {
        let mut cfg = AvdlConfig::default();
        assert_eq!(cfg.compiler.timeout_secs, None);
        cfg.validate().expect("unset timeout is valid");

        let rendered = toml::to_string_pretty(&cfg).expect("toml");
        assert!(!rendered.contains("timeout_secs"), "{rendered}");

        cfg.compiler.timeout_secs = Some(0);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
