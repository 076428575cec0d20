//! Test-only helpers: a scripted compiler and request builders.

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::json;

use crate::core::version::HostVersion;
use crate::generate::GenerateRequest;
use crate::io::classpath::SearchContext;
use crate::io::compiler::{CompilationUnit, CompileError, CompilerSession, IdlCompiler};
use crate::io::config::AvdlConfig;

/// Compiler that never touches the filesystem.
///
/// Each session yields `{"protocol": <file stem>, ...}` unless the stem
/// contains the configured failure marker, in which case parsing fails.
#[derive(Default)]
pub struct ScriptedCompiler {
    fail_marker: Option<String>,
    opened: Cell<u32>,
    closed: Rc<Cell<u32>>,
    contexts: RefCell<Vec<SearchContext>>,
}

impl ScriptedCompiler {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::default()
        }
    }

    /// Sessions opened so far.
    pub fn opened(&self) -> u32 {
        self.opened.get()
    }

    /// Sessions closed so far.
    pub fn closed(&self) -> u32 {
        self.closed.get()
    }

    /// Search context passed to each `open`, in order.
    pub fn contexts(&self) -> Vec<SearchContext> {
        self.contexts.borrow().clone()
    }
}

pub struct ScriptedSession {
    stem: String,
    fails: bool,
    closed: Rc<Cell<u32>>,
}

impl CompilerSession for ScriptedSession {
    fn compilation_unit(&mut self) -> Result<CompilationUnit, CompileError> {
        if self.fails {
            return Err(CompileError::Parse {
                message: format!("Encountered \"}}\" at line 3, column 1 in {}", self.stem),
            });
        }
        Ok(CompilationUnit::new(json!({
            "protocol": self.stem,
            "namespace": "org.example",
            "types": [],
            "messages": {}
        })))
    }

    fn close(self) -> io::Result<()> {
        self.closed.set(self.closed.get() + 1);
        Ok(())
    }
}

impl IdlCompiler for ScriptedCompiler {
    type Session = ScriptedSession;

    fn open(
        &self,
        source: &Path,
        context: &SearchContext,
    ) -> Result<ScriptedSession, CompileError> {
        self.opened.set(self.opened.get() + 1);
        self.contexts.borrow_mut().push(context.clone());
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fails = self
            .fail_marker
            .as_deref()
            .is_some_and(|marker| stem.contains(marker));
        Ok(ScriptedSession {
            stem,
            fails,
            closed: self.closed.clone(),
        })
    }
}

/// Request with default config, a current host version, and `/project` as base.
pub fn request_for(candidates: Vec<PathBuf>, output_dir: &Path) -> GenerateRequest {
    GenerateRequest {
        candidates,
        output_dir: output_dir.to_path_buf(),
        host_version: HostVersion::parse("8.0").expect("host version"),
        config: AvdlConfig::default(),
        base_dir: PathBuf::from("/project"),
    }
}

/// Shell script standing in for `java`: copies the input (already protocol
/// JSON) to the output path, failing when the input contains `BROKEN`.
///
/// Every invocation appends its arguments to `args_log`, one per line.
#[cfg(unix)]
pub fn fake_tool_script(args_log: &Path) -> String {
    format!(
        r#"printf '%s\n' "$@" >> '{log}'
src=""; dst=""
for a in "$@"; do src="$dst"; dst="$a"; done
if grep -q BROKEN "$src"; then
  echo "org.apache.avro.compiler.idl.ParseException: Encountered \"BROKEN\" in $src" >&2
  exit 1
fi
cat "$src" > "$dst"
"#,
        log = args_log.display()
    )
}
