//! CLI tests for `avdl generate` and `avdl init`.
//!
//! Spawns the binary inside a temp project and checks exit codes, stdout
//! summaries, and the generated files. A shell script stands in for `java`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use avdl::exit_codes;
use avdl::io::config::{AvdlConfig, load_config, write_config};

fn avdl_command(root: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_avdl"));
    command
        .current_dir(root)
        .env_remove("RUST_LOG")
        .env_remove("CLASSPATH")
        .args(args);
    command
}

fn avdl(root: &Path, args: &[&str]) -> Output {
    avdl_command(root, args).output().expect("run avdl")
}

#[test]
fn empty_source_dir_reports_no_work() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(temp.path().join("src/main/avro")).expect("mkdir");

    let output = avdl(temp.path(), &["generate"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("processed=0 did_work=false"), "{stdout}");
}

#[test]
fn unsupported_sources_fail_without_output() {
    let temp = tempfile::tempdir().expect("tempdir");
    let idl = temp.path().join("idl");
    fs::create_dir_all(&idl).expect("mkdir");
    fs::write(idl.join("Good.avdl"), "protocol Good {}").expect("write");
    fs::write(idl.join("Schema.avsc"), "{}").expect("write");
    fs::write(idl.join("notes.txt"), "").expect("write");

    let output = avdl(temp.path(), &["generate", "idl", "--output-dir", "out"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported file extension"), "{stderr}");
    assert!(stderr.contains("Schema.avsc"), "{stderr}");
    assert!(stderr.contains("notes.txt"), "{stderr}");
    assert!(!temp.path().join("out").exists());
}

#[test]
fn missing_source_path_fails() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = avdl(temp.path(), &["generate", "nowhere"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("source path not found"));
}

#[test]
fn init_writes_default_config() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = avdl(temp.path(), &["init"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let cfg = load_config(&temp.path().join("avdl.toml")).expect("load");
    assert_eq!(cfg, AvdlConfig::default());
}

#[cfg(unix)]
mod with_scripted_tool {
    use super::*;
    use avdl::test_support::fake_tool_script;

    const GREETING: &str = r#"{"protocol":"Greeting","namespace":"org.example","types":[],"messages":{"hello":{"request":[],"response":"string"}}}"#;

    /// Project with `idl/` sources, a scripted tool, and one runtime dependency.
    fn project(root: &Path) {
        fs::create_dir_all(root.join("idl")).expect("mkdir");
        fs::write(
            root.join("tool.sh"),
            fake_tool_script(&root.join("args.log")),
        )
        .expect("script");
        let mut cfg = AvdlConfig {
            sources: vec!["idl".into()],
            output_dir: "out".into(),
            ..AvdlConfig::default()
        };
        cfg.compiler.launcher = vec!["sh".to_string(), "tool.sh".to_string()];
        cfg.dependencies
            .insert("runtimeClasspath".to_string(), vec!["lib/shared.jar".into()]);
        cfg.dependencies
            .insert("runtime".to_string(), vec!["lib/legacy.jar".into()]);
        write_config(&root.join("avdl.toml"), &cfg).expect("config");
    }

    #[test]
    fn generates_pretty_protocol_per_source() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        project(root);
        fs::write(root.join("idl/foo.avdl"), GREETING).expect("write");

        let output = avdl(root, &["generate"]);

        assert_eq!(
            output.status.code(),
            Some(exit_codes::OK),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(String::from_utf8_lossy(&output.stdout).contains("processed=1 did_work=true"));
        let written = fs::read(root.join("out/foo.avpr")).expect("foo.avpr");
        let text = String::from_utf8(written).expect("utf8");
        assert!(text.starts_with("{\n  \"protocol\": \"Greeting\",\n  \"namespace\""));
        let reparsed: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(
            reparsed,
            serde_json::from_str::<serde_json::Value>(GREETING).expect("json")
        );

        let args = fs::read_to_string(root.join("args.log")).expect("args");
        let classpath = root.join("lib/shared.jar").display().to_string();
        assert!(args.lines().any(|line| line == classpath), "{args}");
    }

    #[test]
    fn legacy_host_uses_runtime_group() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        project(root);
        fs::write(root.join("idl/foo.avdl"), GREETING).expect("write");

        let output = avdl(root, &["generate", "--host-version", "3.4"]);

        assert_eq!(output.status.code(), Some(exit_codes::OK));
        let args = fs::read_to_string(root.join("args.log")).expect("args");
        let classpath = root.join("lib/legacy.jar").display().to_string();
        assert!(args.lines().any(|line| line == classpath), "{args}");
    }

    #[test]
    fn dependency_classpath_keeps_inherited_classpath() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        project(root);
        fs::write(root.join("idl/foo.avdl"), GREETING).expect("write");

        let output = avdl_command(root, &["generate"])
            .env("CLASSPATH", "/opt/avro-tools.jar")
            .output()
            .expect("run avdl");

        assert_eq!(output.status.code(), Some(exit_codes::OK));
        let args = fs::read_to_string(root.join("args.log")).expect("args");
        let classpath = format!("{}:/opt/avro-tools.jar", root.join("lib/shared.jar").display());
        assert!(args.lines().any(|line| line == classpath), "{args}");
    }

    #[test]
    fn parse_failure_names_file_and_skips_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        project(root);
        fs::write(root.join("idl/bad.avdl"), "protocol BROKEN {").expect("write");

        let output = avdl(root, &["generate"]);

        assert_eq!(output.status.code(), Some(exit_codes::FAILED));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Failed to compile IDL file"), "{stderr}");
        assert!(stderr.contains("bad.avdl"), "{stderr}");
        assert!(stderr.contains("ParseException"), "{stderr}");
        assert!(!root.join("out/bad.avpr").exists());
    }
}
