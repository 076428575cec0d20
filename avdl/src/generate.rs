//! Protocol generation for `avdl generate`.
//!
//! Validates the whole candidate set up front, resolves the search context
//! once, then compiles and writes each source in order. The first failure
//! aborts the run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, instrument};

use crate::core::sources::{SourceFile, partition_sources, unsupported_files_message};
use crate::core::version::HostVersion;
use crate::io::classpath::{SearchContext, resolve_search_context};
use crate::io::compiler::{AvroToolsCompiler, IdlCompiler, compile_to_text};
use crate::io::config::{AvdlConfig, load_config};
use crate::io::output::write_protocol_file;
use crate::io::sources::{discover_candidates, resolve_against};

/// Inputs for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Candidate files; every one must carry the IDL extension.
    pub candidates: Vec<PathBuf>,
    /// Directory receiving `<base_name>.avpr` files.
    pub output_dir: PathBuf,
    /// Host version selecting the runtime dependency group.
    pub host_version: HostVersion,
    /// Configuration holding the dependency groups.
    pub config: AvdlConfig,
    /// Base for relative dependency locations.
    pub base_dir: PathBuf,
}

/// Result of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOutcome {
    /// Number of protocol files written.
    pub processed: usize,
}

impl GenerateOutcome {
    pub fn did_work(&self) -> bool {
        self.processed > 0
    }
}

/// Accept only IDL sources, failing with every offending path otherwise.
pub fn select_sources(candidates: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let selection = partition_sources(candidates);
    if !selection.rejected.is_empty() {
        bail!("{}", unsupported_files_message(&selection.rejected));
    }
    Ok(selection.accepted)
}

/// Compile each source and write its protocol file.
pub fn process_sources<C: IdlCompiler>(
    compiler: &C,
    sources: &[SourceFile],
    context: &SearchContext,
    output_dir: &Path,
) -> Result<GenerateOutcome> {
    let mut processed = 0;
    for source in sources {
        process_source(compiler, source, context, output_dir)?;
        processed += 1;
    }
    Ok(GenerateOutcome { processed })
}

fn process_source<C: IdlCompiler>(
    compiler: &C,
    source: &SourceFile,
    context: &SearchContext,
    output_dir: &Path,
) -> Result<()> {
    info!("Processing {}", source.path.display());
    let output_path = source.output_path(output_dir);
    let compiled = compile_to_text(compiler, &source.path, context)
        .map_err(anyhow::Error::from)
        .and_then(|text| write_protocol_file(&output_path, &text));
    compiled.with_context(|| format!("Failed to compile IDL file {}", source.path.display()))
}

/// Run the full pipeline: validate, resolve, then compile every source.
#[instrument(skip_all, fields(output_dir = %request.output_dir.display()))]
pub fn generate<C: IdlCompiler>(
    compiler: &C,
    request: &GenerateRequest,
) -> Result<GenerateOutcome> {
    info!("Found {} files", request.candidates.len());
    let sources = select_sources(&request.candidates)?;
    let context =
        resolve_search_context(&request.config, &request.host_version, &request.base_dir);
    process_sources(compiler, &sources, &context, &request.output_dir)
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Config file, relative to the root unless absolute.
    pub config_path: PathBuf,
    /// Replaces `sources` from the config when non-empty.
    pub sources: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub host_version: Option<String>,
}

/// Load config under `root`, apply overrides, and generate with `avro-tools`.
pub fn generate_from_root(root: &Path, options: &GenerateOptions) -> Result<GenerateOutcome> {
    let config_path = resolve_against(root, &options.config_path);
    let mut config = load_config(&config_path).context("load config")?;
    if let Some(host_version) = &options.host_version {
        config.host_version = host_version.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if !options.sources.is_empty() {
        config.sources = options.sources.clone();
    }
    config.validate()?;

    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let roots: Vec<PathBuf> = config
        .sources
        .iter()
        .map(|source| resolve_against(root, source))
        .collect();
    let candidates = discover_candidates(&roots)?;
    let compiler = AvroToolsCompiler::from_config(&config.compiler, &base_dir);
    let request = GenerateRequest {
        candidates,
        output_dir: resolve_against(root, &config.output_dir),
        host_version: config.host_version()?,
        config,
        base_dir,
    };
    generate(&compiler, &request)
}
