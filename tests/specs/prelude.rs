//! Test helpers for black-box `town` CLI specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::Write as _;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Resolve the built `town` binary, preferring the llvm-cov target
/// directory when present (coverage runs build there instead).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn town_binary() -> PathBuf {
    binary_path("town")
}

/// A temporary town root with helpers for laying out rigs, settings, and a
/// fake `bd` binary before invoking the CLI against it.
pub struct Town {
    dir: tempfile::TempDir,
    bd_stub: Option<PathBuf>,
}

impl Town {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            bd_stub: None,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `.town/settings.toml` with the given concurrency knobs.
    pub fn settings(&self, max_polecats: i64, batch_size: u32) -> &Self {
        std::fs::create_dir_all(self.path().join(".town")).unwrap();
        let body = format!(
            "max_polecats = {max_polecats}\nbatch_size = {batch_size}\nspawn_delay_ms = 0\n"
        );
        std::fs::write(self.path().join(".town").join("settings.toml"), body).unwrap();
        self
    }

    /// Create a rig directory carrying the `.beads` marker.
    pub fn rig(&self, name: &str) -> &Self {
        std::fs::create_dir_all(self.path().join(name).join(".beads")).unwrap();
        self
    }

    /// Install a fake `bd` executable that branches on its subcommand.
    /// `queue_list_json` is returned verbatim for `queue list ...`.
    pub fn bd_stub(&mut self, queue_list_json: &str) -> &Self {
        let script = format!(
            "#!/bin/sh\ncase \"$1 $2\" in\n  \"queue list\") printf '%s' '{queue_list_json}' ;;\n  \"queue create\") printf '%s' '{{\"id\":\"stub-1\"}}' ;;\n  \"queue close\") exit 0 ;;\n  \"queue update\") exit 0 ;;\n  *) printf '%s' '[]' ;;\nesac\n"
        );
        let path = self.path().join("bd-stub.sh");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(script.as_bytes()).unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        file.set_permissions(perms).unwrap();
        self.bd_stub = Some(path);
        self
    }

    pub fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(town_binary());
        cmd.args(args);
        cmd.env("TOWN_ROOT", self.path());
        cmd.env_remove("NO_COLOR");
        cmd.env("NO_COLOR", "1");
        if let Some(stub) = &self.bd_stub {
            cmd.env("TOWN_BD_BIN", stub);
        }
        cmd
    }
}

/// A finished process invocation, ready for fluent assertions.
pub struct Ran(Output);

impl Town {
    pub fn run(&self, args: &[&str]) -> Ran {
        Ran(self.cmd(args).output().expect("failed to spawn town binary"))
    }
}

impl Ran {
    pub fn passes(self) -> Self {
        assert!(
            self.0.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            self.0.status,
            String::from_utf8_lossy(&self.0.stdout),
            String::from_utf8_lossy(&self.0.stderr)
        );
        self
    }

    pub fn fails(self) -> Self {
        assert!(
            !self.0.status.success(),
            "expected failure, got success\nstdout: {}",
            String::from_utf8_lossy(&self.0.stdout)
        );
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = String::from_utf8_lossy(&self.0.stdout);
        assert!(stdout.contains(needle), "expected stdout to contain {needle:?}, got: {stdout}");
        self
    }

    /// Assert stdout equals `expected` exactly, with a diff on mismatch.
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = String::from_utf8_lossy(&self.0.stdout).into_owned();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = String::from_utf8_lossy(&self.0.stderr);
        assert!(stderr.contains(needle), "expected stderr to contain {needle:?}, got: {stderr}");
        self
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.0.stdout).into_owned()
    }
}

/// Bare CLI invocation with no town fixture (for `--help`/usage checks).
pub fn cli(args: &[&str]) -> Ran {
    let mut cmd = Command::new(town_binary());
    cmd.args(args);
    Ran(cmd.output().expect("failed to spawn town binary"))
}
