use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use tempfile::tempdir;

use repack_core::command::{ToolCommand, ToolRunner};
use repack_core::conflict::{Notify, Prompt};
use repack_core::{Error, FormatTag, Result};

use super::*;

/// Recording stand-in for the subprocess runner
struct FakeRunner {
    commands: RefCell<Vec<ToolCommand>>,
    available: bool,
    exit_code: i32,
}

impl FakeRunner {
    fn new() -> Self {
        Self {
            commands: RefCell::new(Vec::new()),
            available: true,
            exit_code: 0,
        }
    }

    fn recorded(&self) -> Vec<ToolCommand> {
        self.commands.borrow().clone()
    }
}

impl ToolRunner for FakeRunner {
    fn is_available(&self, _tool: &str) -> bool {
        self.available
    }

    fn run(&self, command: &ToolCommand) -> io::Result<i32> {
        self.commands.borrow_mut().push(command.clone());
        Ok(self.exit_code)
    }
}

/// Scripted stand-in for the terminal console
struct ScriptedConsole {
    inputs: VecDeque<String>,
    messages: Vec<String>,
}

impl ScriptedConsole {
    fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            messages: Vec::new(),
        }
    }

    fn saw(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

impl Prompt for ScriptedConsole {
    fn read_line(&mut self, _prompt: &str) -> Result<String> {
        self.inputs.pop_front().ok_or(Error::InputClosed)
    }
}

impl Notify for ScriptedConsole {
    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

fn args_of(paths: &[&Path]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

/// Test compressing a directory into a tar.gz archive
#[test]
fn run_compresses_directory_to_tar_gz() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("readme.txt"), "hello").unwrap();
    let target = dir.path().join("docs.tar.gz");

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(
        &args_of(&[&docs, &target]),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    let commands = runner.recorded();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].tool, "tar");
    assert_eq!(commands[0].args[0], "-czf");
    assert_eq!(commands[0].args[2], "docs");
    assert_eq!(
        commands[0].working_dir,
        Some(fs::canonicalize(dir.path()).unwrap())
    );
    assert!(console.saw("Compressing..."));
    assert!(console.saw("Operation complete"));
}

/// Test extracting a RAR archive detected by signature
#[test]
fn run_extracts_rar_by_signature() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("data.rar");
    fs::write(&archive, b"Rar!\x1a\x07\x00rest").unwrap();
    let out = dir.path().join("out");

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(
        &args_of(&[&archive, &out]),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    let commands = runner.recorded();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].tool, "unrar");
    assert_eq!(commands[0].args[0], "x");
    assert!(out.is_dir());
}

/// Test identical source and target paths are rejected
#[test]
fn run_rejects_same_path() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("a.zip");
    fs::write(&archive, [0x50, 0x4B, 0x03, 0x04, 0, 0]).unwrap();

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    let result = run(
        &args_of(&[&archive, &archive]),
        &CliConfig::default(),
        &runner,
        &mut console,
    );
    assert!(matches!(result, Err(Error::SamePath)));
    assert!(runner.recorded().is_empty());
}

/// Test an unrecognizable target extension is reported, not guessed
#[test]
fn run_rejects_unknown_target_format() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    let target = dir.path().join("out.weird");

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    let result = run(
        &args_of(&[&docs, &target]),
        &CliConfig::default(),
        &runner,
        &mut console,
    );
    assert!(matches!(result, Err(Error::UnknownFormat { .. })));
}

/// Test --format overrides an unrecognizable target extension
#[test]
fn run_forced_format_overrides_extension() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    let target = dir.path().join("out.bin");

    let config = CliConfig {
        force_format: Some(FormatTag::SevenZip),
        ..CliConfig::default()
    };
    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(&args_of(&[&docs, &target]), &config, &runner, &mut console).unwrap();

    assert_eq!(runner.recorded()[0].tool, "7z");
}

/// Test multiple sources compress into one archive
#[test]
fn run_multi_source_compression() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "a").unwrap();
    fs::write(&b, "b").unwrap();
    let target = dir.path().join("bundle.zip");

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(
        &args_of(&[&a, &b, &target]),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    let commands = runner.recorded();
    assert_eq!(commands[0].tool, "zip");
    let args = &commands[0].args;
    assert!(args.contains(&"a.txt".to_string()));
    assert!(args.contains(&"b.txt".to_string()));
}

/// Test fewer than two paths is a usage error
#[test]
fn run_requires_source_and_target() {
    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    let result = run(
        &["only.zip".to_string()],
        &CliConfig::default(),
        &runner,
        &mut console,
    );
    assert!(matches!(result, Err(Error::MissingArguments { .. })));
}

/// Test a missing external tool is reported before anything runs
#[test]
fn run_reports_missing_tool() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    let target = dir.path().join("docs.tar");

    let mut runner = FakeRunner::new();
    runner.available = false;
    let mut console = ScriptedConsole::new(&[]);
    let result = run(
        &args_of(&[&docs, &target]),
        &CliConfig::default(),
        &runner,
        &mut console,
    );
    assert!(matches!(result, Err(Error::ToolNotFound { tool }) if tool == "tar"));
    assert!(runner.recorded().is_empty());
}

/// Test a nonzero tool exit surfaces as an operation failure
#[test]
fn run_reports_tool_failure() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    let target = dir.path().join("docs.tar");

    let mut runner = FakeRunner::new();
    runner.exit_code = 2;
    let mut console = ScriptedConsole::new(&[]);
    let result = run(
        &args_of(&[&docs, &target]),
        &CliConfig::default(),
        &runner,
        &mut console,
    );
    assert!(matches!(
        result,
        Err(Error::OperationFailed { exit_code: 2, .. })
    ));
}

/// Test cancelling the conflict dialog stops before any tool runs
#[test]
fn run_conflict_cancel_stops() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    let target = dir.path().join("docs.tar");
    fs::write(&target, "existing").unwrap();

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&["c"]);
    run(
        &args_of(&[&docs, &target]),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    assert!(runner.recorded().is_empty());
    assert!(console.saw("Operation canceled"));
    assert!(target.exists());
}

/// Test a password against a tar target is ignored with a warning
#[test]
fn run_warns_on_tar_password() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    let target = dir.path().join("docs.tar.gz");

    let config = CliConfig {
        password: Some("secret".into()),
        ..CliConfig::default()
    };
    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(&args_of(&[&docs, &target]), &config, &runner, &mut console).unwrap();

    assert!(console.saw("password will be ignored"));
    assert!(!runner.recorded()[0]
        .args
        .iter()
        .any(|a| a.contains("secret")));
}

/// Test split ZIP extraction routes through 7z with its hint message
#[test]
fn run_split_zip_extraction() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("big.zip");
    fs::write(&main, [0x50, 0x4B, 0x03, 0x04, 0, 0]).unwrap();
    fs::write(dir.path().join("big.z01"), [0u8; 8]).unwrap();
    let out = dir.path().join("out");

    let config = CliConfig {
        verbose: true,
        ..CliConfig::default()
    };
    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(&args_of(&[&main, &out]), &config, &runner, &mut console).unwrap();

    assert_eq!(runner.recorded()[0].tool, "7z");
    assert!(console.saw("Split ZIP archive detected"));
}

/// Test exclude filters drop planned items
#[test]
fn run_exclude_filter_applies() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("keep.txt");
    let b = dir.path().join("drop.log");
    fs::write(&a, "a").unwrap();
    fs::write(&b, "b").unwrap();
    let target = dir.path().join("bundle.zip");

    let config = CliConfig {
        exclude: vec![r".*\.log".to_string()],
        verbose: true,
        ..CliConfig::default()
    };
    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(
        &args_of(&[&a, &b, &target]),
        &config,
        &runner,
        &mut console,
    )
    .unwrap();

    let args = &runner.recorded()[0].args;
    assert!(args.contains(&"keep.txt".to_string()));
    assert!(!args.contains(&"drop.log".to_string()));
    assert!(console.saw("included 1, excluded 1"));
}

/// Test the benchmark summary is printed after compression
#[test]
fn run_benchmark_reports_stats() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("data.bin"), [0u8; 64]).unwrap();
    let target = dir.path().join("docs.tar");

    let config = CliConfig {
        benchmark: true,
        ..CliConfig::default()
    };
    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(&args_of(&[&docs, &target]), &config, &runner, &mut console).unwrap();

    assert!(console.saw("Original size: 64 bytes"));
    assert!(console.saw("Compression ratio:"));
    assert!(console.saw("Elapsed time:"));
}

/// Test --verify runs the tool's test mode after compression
#[test]
fn run_verify_after_compression() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    let target = dir.path().join("docs.zip");

    let config = CliConfig {
        verify: true,
        ..CliConfig::default()
    };
    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(&args_of(&[&docs, &target]), &config, &runner, &mut console).unwrap();

    let commands = runner.recorded();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].tool, "zip");
    assert_eq!(commands[1].tool, "unzip");
    assert_eq!(commands[1].args[0], "-t");
    assert!(console.saw("Archive verification successful."));
}

/// Test extraction into an existing directory never proceeds unasked
#[test]
fn run_decompress_existing_target_requires_answer() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("data.rar");
    fs::write(&archive, b"Rar!\x1a\x07\x00rest").unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("precious.txt"), "keep me").unwrap();

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    let result = run(
        &args_of(&[&archive, &out]),
        &CliConfig::default(),
        &runner,
        &mut console,
    );
    assert!(matches!(result, Err(Error::InputClosed)));
    assert!(runner.recorded().is_empty());
}

/// Test overwriting an existing extraction target merges into it
#[test]
fn run_decompress_overwrite_merges_into_directory() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("data.rar");
    fs::write(&archive, b"Rar!\x1a\x07\x00rest").unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("precious.txt"), "keep me").unwrap();

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&["o"]);
    run(
        &args_of(&[&archive, &out]),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    assert_eq!(runner.recorded()[0].tool, "unrar");
    assert!(out.join("precious.txt").exists());
}

/// Test cancelling the extraction conflict dialog runs nothing
#[test]
fn run_decompress_cancel_stops() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("data.rar");
    fs::write(&archive, b"Rar!\x1a\x07\x00rest").unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&["c"]);
    run(
        &args_of(&[&archive, &out]),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    assert!(runner.recorded().is_empty());
    assert!(console.saw("Operation canceled"));
}

/// Test renaming the extraction target extracts into the new directory
#[test]
fn run_decompress_rename_target() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("data.rar");
    fs::write(&archive, b"Rar!\x1a\x07\x00rest").unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&["r", ""]);
    run(
        &args_of(&[&archive, &out]),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    let commands = runner.recorded();
    assert_eq!(commands[0].tool, "unrar");
    assert!(commands[0]
        .args
        .iter()
        .any(|arg| arg.ends_with("out_1")));
    assert!(dir.path().join("out_1").is_dir());
}

/// Test a failed verification is reported without failing the operation
#[test]
fn verify_failure_reports_and_continues() {
    let mut runner = FakeRunner::new();
    runner.exit_code = 2;
    let mut console = ScriptedConsole::new(&[]);
    super::operations::verify_archive(
        Path::new("/a/x.zip"),
        FormatTag::Zip,
        &runner,
        &mut console,
    )
    .unwrap();
    assert!(console.saw("Archive verification failed"));
    assert!(!console.saw("Archive verification successful"));
}

/// Test a missing verify tool skips verification instead of erroring
#[test]
fn verify_missing_tool_skips() {
    let mut runner = FakeRunner::new();
    runner.available = false;
    let mut console = ScriptedConsole::new(&[]);
    super::operations::verify_archive(
        Path::new("/a/x.zip"),
        FormatTag::Zip,
        &runner,
        &mut console,
    )
    .unwrap();
    assert!(runner.recorded().is_empty());
    assert!(console.saw("Verification skipped"));
}

/// Test --verify still completes the run when the test exits nonzero
#[test]
fn run_completes_despite_failed_verification() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    let target = dir.path().join("docs.zip");

    let config = CliConfig {
        verify: true,
        ..CliConfig::default()
    };
    let runner = VerifyFailRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    run(&args_of(&[&docs, &target]), &config, &runner, &mut console).unwrap();

    assert!(console.saw("Archive verification failed"));
    assert!(console.saw("Operation complete"));
}

/// Runner whose verification commands fail while everything else succeeds
struct VerifyFailRunner {
    inner: FakeRunner,
}

impl VerifyFailRunner {
    fn new() -> Self {
        Self {
            inner: FakeRunner::new(),
        }
    }
}

impl ToolRunner for VerifyFailRunner {
    fn is_available(&self, tool: &str) -> bool {
        self.inner.is_available(tool)
    }

    fn run(&self, command: &ToolCommand) -> io::Result<i32> {
        self.inner.run(command)?;
        // unzip only appears here as `unzip -t`
        Ok(i32::from(command.tool == "unzip"))
    }
}

/// Test the guided flow compresses a file into a zip without a password
#[test]
fn interactive_compress_flow() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    fs::write(&source, "hello").unwrap();
    let target = dir.path().join("notes.zip");

    let runner = FakeRunner::new();
    // change op? no / format 2 (zip) / target / set password? no / delete? no
    let mut console = ScriptedConsole::new(&[
        "n",
        "2",
        target.to_str().unwrap(),
        "n",
        "n",
    ]);
    run_interactive(
        Some(source.to_string_lossy().into_owned()),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    let commands = runner.recorded();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].tool, "zip");
    assert!(source.exists());
    assert!(console.saw("Detected source type: regular file"));
}

/// Test the guided flow extracts an archive and deletes the source
#[test]
fn interactive_decompress_flow_deletes_source() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("data.7z");
    fs::write(&archive, [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C, 0, 0]).unwrap();
    let out = dir.path().join("out");

    let runner = FakeRunner::new();
    // change op? no / target dir / password protected? no / delete? yes
    let mut console = ScriptedConsole::new(&["n", out.to_str().unwrap(), "n", "y"]);
    run_interactive(
        Some(archive.to_string_lossy().into_owned()),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    assert_eq!(runner.recorded()[0].tool, "7z");
    assert!(!archive.exists());
    assert!(console.saw("Source deleted."));
}

/// Test the guided flow re-asks for a source until one exists
#[test]
fn interactive_reasks_for_missing_source() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real.txt");
    fs::write(&real, "x").unwrap();
    let target = dir.path().join("real.tar");

    let runner = FakeRunner::new();
    // missing path, then the real one; change op? no; format 4 (tar);
    // target; delete? no
    let mut console = ScriptedConsole::new(&[
        dir.path().join("absent").to_str().unwrap(),
        real.to_str().unwrap(),
        "n",
        "4",
        target.to_str().unwrap(),
        "n",
    ]);
    run_interactive(None, &CliConfig::default(), &runner, &mut console).unwrap();

    assert_eq!(runner.recorded()[0].tool, "tar");
    assert!(console.saw("does not exist"));
}

/// Test mismatched password confirmation is re-asked
#[test]
fn interactive_password_confirmation() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    fs::write(&source, "hello").unwrap();
    let target = dir.path().join("notes.zip");

    let runner = FakeRunner::new();
    // change op? no / format 2 (zip) / target / set password? yes /
    // pw, mismatch / pw, match / delete? no
    let mut console = ScriptedConsole::new(&[
        "n",
        "2",
        target.to_str().unwrap(),
        "y",
        "secret",
        "oops",
        "secret",
        "secret",
        "n",
    ]);
    run_interactive(
        Some(source.to_string_lossy().into_owned()),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    assert!(console.saw("Passwords do not match"));
    let args = &runner.recorded()[0].args;
    assert!(args.contains(&"-P".to_string()));
    assert!(args.contains(&"secret".to_string()));
}

/// Test the guided flow asks before extracting into an existing directory
#[test]
fn interactive_decompress_existing_target_cancel() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("data.7z");
    fs::write(&archive, [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C, 0, 0]).unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let runner = FakeRunner::new();
    // change op? no / target dir / password protected? no / conflict: cancel
    let mut console = ScriptedConsole::new(&["n", out.to_str().unwrap(), "n", "c"]);
    run_interactive(
        Some(archive.to_string_lossy().into_owned()),
        &CliConfig::default(),
        &runner,
        &mut console,
    )
    .unwrap();

    assert!(runner.recorded().is_empty());
    assert!(console.saw("Operation canceled"));
    assert!(archive.exists());
}

/// Test the delete question is asked before dispatch and skipped on failure
#[test]
fn interactive_delete_skipped_when_operation_fails() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    fs::write(&source, "hello").unwrap();
    let target = dir.path().join("notes.zip");

    let mut runner = FakeRunner::new();
    runner.exit_code = 1;
    // change op? no / format 2 (zip) / target / set password? no / delete? yes
    let mut console = ScriptedConsole::new(&[
        "n",
        "2",
        target.to_str().unwrap(),
        "n",
        "y",
    ]);
    let result = run_interactive(
        Some(source.to_string_lossy().into_owned()),
        &CliConfig::default(),
        &runner,
        &mut console,
    );

    assert!(matches!(result, Err(Error::OperationFailed { .. })));
    // The question was consumed before dispatch, but the source survives.
    assert!(console.inputs.is_empty());
    assert!(source.exists());
}

/// Test EOF in the middle of the dialog surfaces as InputClosed
#[test]
fn interactive_input_closed() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    fs::write(&source, "hello").unwrap();

    let runner = FakeRunner::new();
    let mut console = ScriptedConsole::new(&[]);
    let result = run_interactive(
        Some(source.to_string_lossy().into_owned()),
        &CliConfig::default(),
        &runner,
        &mut console,
    );
    assert!(matches!(result, Err(Error::InputClosed)));
}
