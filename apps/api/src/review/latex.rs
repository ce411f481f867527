//! Compiler bridge — runs `latexmk` for one document and captures its log.

use std::path::Path;

use tokio::process::Command;
use tracing::{error, info};

/// Compiles `tex_file` inside `job_dir`. Returns success plus the tagged
/// combined stdout+stderr; a spawn failure is reported in the log rather
/// than propagated, so one document's failure never blocks the other.
pub async fn compile_tex(latexmk_bin: &str, job_dir: &Path, tex_file: &str) -> (bool, String) {
    let result = Command::new(latexmk_bin)
        .args(["-pdf", "-interaction=nonstopmode", "-auxdir=../../aux", tex_file])
        .current_dir(job_dir)
        .output()
        .await;

    match result {
        Ok(output) => {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            if output.status.success() {
                info!("Compiled {tex_file} successfully");
                (true, format!("[OK]\n{combined}"))
            } else {
                let code = output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                error!("latexmk failed for {tex_file} (code {code})");
                (false, format!("[exit {code}]\n{combined}"))
            }
        }
        Err(e) => (false, format!("[spawn error] {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[cfg(unix)]
    fn write_script(path: &PathBuf, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(path, body).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_compile_is_tagged_ok() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-latexmk");
        write_script(&script, "#!/bin/sh\necho \"Latexmk: All targets up-to-date\"\n");

        let (ok, log) =
            compile_tex(&script.to_string_lossy(), dir.path(), "resume-acme.tex").await;
        assert!(ok);
        assert!(log.starts_with("[OK]\n"));
        assert!(log.contains("up-to-date"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_compile_reports_exit_code_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-latexmk");
        write_script(&script, "#!/bin/sh\necho 'Undefined control sequence' >&2\nexit 12\n");

        let (ok, log) =
            compile_tex(&script.to_string_lossy(), dir.path(), "resume-acme.tex").await;
        assert!(!ok);
        assert!(log.starts_with("[exit 12]\n"));
        assert!(log.contains("Undefined control sequence"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let (ok, log) =
            compile_tex("definitely-not-a-real-binary", dir.path(), "resume.tex").await;
        assert!(!ok);
        assert!(log.starts_with("[spawn error]"));
    }
}
