//! Default port implementations.

use crate::ports::{Confirm, LabelEditor};
use anyhow::Context;
use camino::Utf8PathBuf;
use fixvis_types::FixRecord;
use std::collections::HashMap;
use std::process::Command;
use std::sync::Mutex;
use tracing::debug;

/// Exit code buildozer uses for "success, nothing changed".
const BUILDOZER_NO_CHANGES: i32 = 3;

/// Runs the `buildozer` binary as a child process.
#[derive(Debug, Clone)]
pub struct BuildozerCli {
    pub program: String,
    /// Directory buildozer resolves labels against (the Bazel workspace root).
    pub workspace_root: Option<Utf8PathBuf>,
}

impl Default for BuildozerCli {
    fn default() -> Self {
        Self {
            program: "buildozer".to_string(),
            workspace_root: None,
        }
    }
}

impl BuildozerCli {
    pub fn new(program: impl Into<String>, workspace_root: Option<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            workspace_root,
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-shorten_labels", "-delete_with_comments", "-numio=200"])
            .args(args);
        if let Some(root) = &self.workspace_root {
            cmd.current_dir(root);
        }
        cmd
    }
}

impl LabelEditor for BuildozerCli {
    fn run(&self, args: &[&str]) -> anyhow::Result<Vec<u8>> {
        debug!(program = self.program.as_str(), ?args, "running buildozer");
        let output = self
            .command(args)
            .output()
            .with_context(|| format!("spawn {}", self.program))?;

        match output.status.code() {
            Some(0) | Some(BUILDOZER_NO_CHANGES) => Ok(output.stdout),
            code => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                anyhow::bail!(
                    "failed to run buildozer: exit code {}: {}",
                    code,
                    String::from_utf8_lossy(&output.stderr).trim()
                )
            }
        }
    }
}

/// In-memory editor for embedding and testing.
///
/// Answers `print visibility` from a canned table, fails any command whose
/// text starts with a registered prefix, and records every call in order.
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    visibility: HashMap<String, String>,
    failures: Vec<(String, String)>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output returned for `print visibility <target>`.
    pub fn with_visibility(mut self, target: impl Into<String>, output: impl Into<String>) -> Self {
        self.visibility.insert(target.into(), output.into());
        self
    }

    /// Fail every command starting with `prefix` with `message`.
    pub fn failing(mut self, prefix: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.push((prefix.into(), message.into()));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl LabelEditor for ScriptedEditor {
    fn run(&self, args: &[&str]) -> anyhow::Result<Vec<u8>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(args.iter().map(|a| a.to_string()).collect());

        let command = args.first().copied().unwrap_or_default();
        if let Some((_, message)) = self
            .failures
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
        {
            anyhow::bail!("{}", message);
        }

        if command == crate::remediation::PRINT_VISIBILITY_COMMAND {
            let target = args.get(1).copied().unwrap_or_default();
            let out = self.visibility.get(target).cloned().unwrap_or_default();
            return Ok(out.into_bytes());
        }
        Ok(Vec::new())
    }
}

/// Answers every confirmation with the same decision.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _record: &FixRecord) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scripted_editor_answers_and_records() {
        let editor = ScriptedEditor::new().with_visibility("//a:a", "[//visibility:private]\n");
        let out = editor.run(&["print visibility", "//a:a"]).unwrap();
        assert_eq!(out, b"[//visibility:private]\n");
        assert!(editor.run(&["print visibility", "//b:b"]).unwrap().is_empty());
        assert_eq!(
            editor.calls(),
            vec![
                vec!["print visibility".to_string(), "//a:a".to_string()],
                vec!["print visibility".to_string(), "//b:b".to_string()],
            ]
        );
    }

    #[test]
    fn scripted_editor_fails_by_prefix() {
        let editor = ScriptedEditor::new().failing("add visibility", "no such target");
        let err = editor
            .run(&["add visibility //y:__pkg__", "//x:x"])
            .unwrap_err();
        assert_eq!(err.to_string(), "no such target");
        assert!(editor.run(&["print visibility", "//x:x"]).is_ok());
    }

    #[test]
    fn buildozer_cli_reports_spawn_failure() {
        let editor = BuildozerCli::new("/nonexistent/fixvis-buildozer", None);
        let err = editor.run(&["print visibility", "//a:a"]).unwrap_err();
        assert!(format!("{err:#}").contains("spawn /nonexistent/fixvis-buildozer"));
    }

    #[cfg(unix)]
    fn fake_buildozer(dir: &std::path::Path, name: &str, script: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("write script");
        let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod");
        path.to_string_lossy().to_string()
    }

    // One test for all child-process cases: writing a script while another
    // test thread forks can make exec fail with ETXTBSY.
    #[cfg(unix)]
    #[test]
    fn buildozer_cli_runs_child_process() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let echo = fake_buildozer(temp.path(), "echo-args", r#"printf '%s\n' "$@""#);
        let unchanged = fake_buildozer(temp.path(), "unchanged", "exit 3");
        let broken = fake_buildozer(
            temp.path(),
            "broken",
            "echo 'rule not found' >&2; exit 2",
        );

        let editor = BuildozerCli::new(echo, Some(root));
        let out = editor.run(&["print visibility", "//a:a"]).expect("run");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-shorten_labels\n-delete_with_comments\n-numio=200\nprint visibility\n//a:a\n"
        );

        let editor = BuildozerCli::new(unchanged, None);
        assert!(editor.run(&["add visibility //b:__pkg__", "//a:a"]).is_ok());

        let editor = BuildozerCli::new(broken, None);
        let err = editor.run(&["print visibility", "//a:a"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to run buildozer: exit code 2: rule not found"
        );
    }
}
