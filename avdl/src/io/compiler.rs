//! IDL compiler abstraction.
//!
//! The [`IdlCompiler`] trait decouples generation from the grammar engine
//! (currently `avro-tools idl`, run as a child process). Tests use scripted
//! compilers that return predetermined protocols without spawning anything.
//!
//! A compiler hands out one [`CompilerSession`] per source file. The session
//! owns whatever the engine holds for that file and is released through
//! [`compile_to_text`] on every exit path.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::core::sources::PROTOCOL_EXTENSION;
use crate::io::classpath::{SearchContext, join_search_path};
use crate::io::config::CompilerConfig;
use crate::io::process::run_tool;
use crate::io::sources::resolve_against;

/// Failures reported by a compiler session.
///
/// Parse failures and I/O failures stay distinguishable even though the
/// generator aborts the same way for both.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Reading the source or the engine's scratch output failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The grammar engine rejected the source.
    #[error("{message}")]
    Parse { message: String },

    /// The grammar engine could not be started.
    #[error("launch IDL compiler: {0}")]
    Launch(String),

    /// The grammar engine did not finish in time.
    #[error("IDL compiler timed out after {0:?}")]
    TimedOut(Duration),

    /// The parsed protocol could not be rendered as text.
    #[error("render protocol: {0}")]
    Render(#[from] serde_json::Error),
}

/// A parsed protocol, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    protocol: Value,
}

impl CompilationUnit {
    pub fn new(protocol: Value) -> Self {
        Self { protocol }
    }

    /// JSON text of the protocol, indented when `pretty` is set.
    pub fn render(&self, pretty: bool) -> Result<String, CompileError> {
        let text = if pretty {
            serde_json::to_string_pretty(&self.protocol)?
        } else {
            serde_json::to_string(&self.protocol)?
        };
        Ok(text)
    }
}

/// Per-file handle on the grammar engine.
pub trait CompilerSession {
    /// Parse the source into a compilation unit.
    fn compilation_unit(&mut self) -> Result<CompilationUnit, CompileError>;

    /// Release everything the engine holds for this file.
    fn close(self) -> io::Result<()>;
}

/// Abstraction over IDL grammar engines.
pub trait IdlCompiler {
    type Session: CompilerSession;

    /// Open `source` for compilation, resolving imports through `context`.
    fn open(&self, source: &Path, context: &SearchContext)
    -> Result<Self::Session, CompileError>;
}

/// Compile `source` to pretty-printed protocol text.
///
/// The session is closed whether or not parsing succeeded. A failure to close
/// is logged at debug level and otherwise ignored.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn compile_to_text<C: IdlCompiler>(
    compiler: &C,
    source: &Path,
    context: &SearchContext,
) -> Result<String, CompileError> {
    let mut session = compiler.open(source, context)?;
    let rendered = session
        .compilation_unit()
        .and_then(|unit| unit.render(true));
    if let Err(err) = session.close() {
        debug!(err = %err, "ignoring compiler release failure");
    }
    rendered
}

/// Compiler that runs `<launcher> [-cp <classpath>] <main_class> idl <in> <out>`.
#[derive(Debug, Clone)]
pub struct AvroToolsCompiler {
    launcher: Vec<String>,
    tool_classpath: Vec<PathBuf>,
    main_class: String,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
    inherited_classpath: Option<OsString>,
}

impl AvroToolsCompiler {
    /// Build from config; relative tool classpath entries resolve against `base_dir`.
    ///
    /// The process `CLASSPATH` is captured here and kept behind any explicit
    /// `-cp` the session passes.
    pub fn from_config(config: &CompilerConfig, base_dir: &Path) -> Self {
        Self {
            launcher: config.launcher.clone(),
            tool_classpath: config
                .tool_classpath
                .iter()
                .map(|entry| resolve_against(base_dir, entry))
                .collect(),
            main_class: config.main_class.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            output_limit_bytes: config.output_limit_bytes,
            inherited_classpath: std::env::var_os("CLASSPATH"),
        }
    }

    /// Tool classpath, then the isolated locations, then the inherited
    /// `CLASSPATH` entries. `None` leaves the child on the inherited value.
    fn classpath(&self, context: &SearchContext) -> Result<Option<OsString>, CompileError> {
        let mut entries: Vec<PathBuf> = self
            .tool_classpath
            .iter()
            .chain(context.locations())
            .cloned()
            .collect();
        if entries.is_empty() {
            return Ok(None);
        }
        if let Some(inherited) = &self.inherited_classpath {
            entries.extend(std::env::split_paths(inherited).filter(|p| !p.as_os_str().is_empty()));
        }
        join_search_path(&entries)
            .map(Some)
            .ok_or_else(|| CompileError::Launch("tool classpath is not joinable".to_string()))
    }
}

impl IdlCompiler for AvroToolsCompiler {
    type Session = AvroToolsSession;

    fn open(
        &self,
        source: &Path,
        context: &SearchContext,
    ) -> Result<Self::Session, CompileError> {
        let input = File::open(source)?;
        let scratch = tempfile::Builder::new().prefix("avdl-").tempdir()?;
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "protocol".to_string());
        let output_path = scratch.path().join(format!("{stem}.{PROTOCOL_EXTENSION}"));

        let (program, leading) = self
            .launcher
            .split_first()
            .ok_or_else(|| CompileError::Launch("empty launcher".to_string()))?;
        let mut command = Command::new(program);
        command.args(leading);
        if let Some(classpath) = self.classpath(context)? {
            command.arg("-cp").arg(classpath);
        }
        command
            .arg(&self.main_class)
            .arg("idl")
            .arg(source)
            .arg(&output_path);

        debug!(scratch = %scratch.path().display(), "opened compiler session");
        Ok(AvroToolsSession {
            source: source.to_path_buf(),
            input: Some(input),
            scratch,
            output_path,
            command: Some(command),
            timeout: self.timeout,
            output_limit_bytes: self.output_limit_bytes,
        })
    }
}

/// One `avro-tools idl` run. Owns the open source handle and a scratch
/// directory receiving the tool's output.
pub struct AvroToolsSession {
    source: PathBuf,
    input: Option<File>,
    scratch: TempDir,
    output_path: PathBuf,
    command: Option<Command>,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
}

impl CompilerSession for AvroToolsSession {
    #[instrument(skip_all, fields(source = %self.source.display()))]
    fn compilation_unit(&mut self) -> Result<CompilationUnit, CompileError> {
        let command = self.command.take().ok_or_else(|| {
            CompileError::Launch("compilation unit already requested".to_string())
        })?;
        info!("running IDL compiler");
        let finished = run_tool(command, self.timeout, self.output_limit_bytes);
        self.input = None;
        finished?;

        let contents = fs::read_to_string(&self.output_path)?;
        let protocol: Value =
            serde_json::from_str(&contents).map_err(|err| CompileError::Parse {
                message: format!("IDL compiler produced invalid JSON: {err}"),
            })?;
        Ok(CompilationUnit::new(protocol))
    }

    fn close(self) -> io::Result<()> {
        drop(self.input);
        self.scratch.close()
    }
}
