use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::ExitStatus;
use tempfile::TempDir;

/// Captured output of one `issues` invocation.
#[derive(Debug)]
pub struct IssuesRun {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

impl IssuesRun {
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Scratch directory used as cwd and `HOME`, with the default database path.
pub struct IssuesWorkspace {
    _dir: TempDir,
    pub root: PathBuf,
    pub db_path: PathBuf,
}

impl IssuesWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path().to_path_buf();
        let db_path = root.join("issues.db");
        Self {
            _dir: dir,
            root,
            db_path,
        }
    }
}

pub fn run_issues<I, S>(workspace: &IssuesWorkspace, args: I, label: &str) -> IssuesRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_issues_with_env(workspace, args, std::iter::empty::<(&str, &str)>(), label)
}

/// Run the binary against the workspace database. `env_vars` are applied
/// after `ISSUES_DB`, so a test can override or blank it.
pub fn run_issues_with_env<I, S, E, K, V>(
    workspace: &IssuesWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> IssuesRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let output = Command::new(assert_cmd::cargo::cargo_bin!("issues"))
        .current_dir(&workspace.root)
        .env_remove("ISSUES_CONFIG")
        .env("ISSUES_DB", &workspace.db_path)
        .envs(env_vars)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "issue_tracker=debug")
        .env("HOME", &workspace.root)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("{label}: failed to run issues: {e}"));

    let run = IssuesRun {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        status: output.status,
    };
    eprintln!("[{label}] {}\n{}", run.status, run.stderr);
    run
}

/// Pull the pretty-printed JSON document out of output mixed with log lines.
pub fn extract_json_payload(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    lines
        .iter()
        .position(|line| matches!(*line, "{" | "[" | "[]"))
        .map_or_else(|| output.trim().to_string(), |idx| lines[idx..].join("\n"))
}
