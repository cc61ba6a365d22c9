//! Runs the real subprocess path against small shell scripts standing in
//! for `rzk`.
//!
//! Everything lives in one test so that no other test thread forks while a
//! freshly written script is still open for writing.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rzk_diagrams::{
    Availability, CheckError, CheckInput, Checker, DocsPlugin, HostCommand, Page, PluginSettings,
    RzkExecutable, RzkPlugin, SnippetInput,
};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_rzk_subprocess() {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path();

    // Probe: any launchable executable is available, whatever its exit code.
    let failing = write_script(work, "failing", "exit 3");
    assert_eq!(RzkExecutable::new(&failing).probe(), Availability::Available);
    assert_eq!(
        RzkExecutable::new(work.join("missing")).probe(),
        Availability::Unavailable
    );

    // Stdin input: the source arrives on stdin, diagrams come back on stderr.
    let stdin_stub = write_script(
        work,
        "stdin-rzk",
        &format!(
            "cat > '{}'\necho \"$1\" > '{}'\necho '<svg id=\"a\"></svg>' >&2\nexit 0",
            work.join("stdin.txt").display(),
            work.join("args.txt").display()
        ),
    );
    let output = RzkExecutable::new(&stdin_stub)
        .typecheck(CheckInput::Source("#define a : U\n  := U"))
        .unwrap();
    assert!(output.success());
    assert_eq!(output.stderr, "<svg id=\"a\"></svg>\n");
    assert_eq!(
        fs::read_to_string(work.join("stdin.txt")).unwrap(),
        "#define a : U\n  := U"
    );
    assert_eq!(
        fs::read_to_string(work.join("args.txt")).unwrap(),
        "typecheck\n"
    );

    // Temporary file input: the path is passed as an argument and removed
    // after the run, even when the check fails.
    let file_stub = write_script(
        work,
        "file-rzk",
        &format!(
            "cp \"$2\" '{}'\nprintf '%s' \"$2\" > '{}'\nexit 1",
            work.join("copied.rzk").display(),
            work.join("path.txt").display()
        ),
    );
    let output = RzkExecutable::new(&file_stub)
        .input(SnippetInput::TempFile)
        .typecheck(CheckInput::Source("#define b : U\n  := U"))
        .unwrap();
    assert!(!output.success());
    assert_eq!(output.exit_code, Some(1));
    assert_eq!(
        fs::read_to_string(work.join("copied.rzk")).unwrap(),
        "#define b : U\n  := U"
    );
    let temp_path = fs::read_to_string(work.join("path.txt")).unwrap();
    assert!(temp_path.ends_with(".rzk"));
    assert!(!Path::new(&temp_path).exists());

    // Timeout: a hung checker is killed and reported.
    let hung = write_script(work, "hung-rzk", "exec sleep 5");
    let err = RzkExecutable::new(&hung)
        .timeout(Some(Duration::from_millis(200)))
        .typecheck(CheckInput::Source("#define c : U\n  := U"))
        .unwrap_err();
    assert!(matches!(err, CheckError::Timeout(_)));

    // A wrapper that forks the hung process still times out promptly: the
    // grandchild holds stderr open and must be killed along with the wrapper.
    let wrapper = write_script(
        work,
        "wrapper-rzk",
        &format!("sleep 5\ntouch '{}'", work.join("wrapper-done").display()),
    );
    let started = Instant::now();
    let err = RzkExecutable::new(&wrapper)
        .timeout(Some(Duration::from_millis(200)))
        .typecheck(CheckInput::Source("#define c : U\n  := U"))
        .unwrap_err();
    assert!(matches!(err, CheckError::Timeout(_)));
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "timed out after {:?}",
        started.elapsed()
    );
    assert!(!work.join("wrapper-done").exists());

    // Large diagnostics do not deadlock the wait.
    let chatty = write_script(
        work,
        "chatty-rzk",
        "cat > /dev/null\ni=0\nwhile [ $i -lt 5000 ]; do echo 'diagnostic line padding padding padding' >&2; i=$((i+1)); done\nexit 0",
    );
    let output = RzkExecutable::new(&chatty)
        .timeout(Some(Duration::from_secs(30)))
        .typecheck(CheckInput::Source("#define d : U\n  := U"))
        .unwrap();
    assert!(output.success());
    assert_eq!(output.stderr.lines().count(), 5000);

    // End to end through the plugin hooks.
    let render_stub = write_script(
        work,
        "render-rzk",
        "cat > /dev/null\necho 'Loading file stdin' >&2\necho '<svg width=\"8\"></svg>' >&2\nexit 0",
    );
    let plugin = RzkPlugin::on_startup(
        PluginSettings::default(),
        RzkExecutable::new(&render_stub),
        HostCommand::Build,
        false,
    );
    let markdown = "# One\n\n```rzk\n#lang rzk-1\n#define one : U\n  := U\n```\n\n```rzk\n#define two : U\n  := one\n```\n";
    let result = plugin.on_page_markdown(markdown, &Page::new("one.rzk.md"));
    assert_eq!(
        result,
        "# One\n\n<svg width=\"8\"></svg>\n\n```rzk\n#lang rzk-1\n#define one : U\n  := U\n```\n\n```rzk\n#define two : U\n  := one\n```\n"
    );
}
