//! External tool invocation: hugo, netlify, vercel.

use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::config::{Config, VercelConfig};

/// Runs an external tool, streaming its output into the logs.
///
/// Both pipes are forwarded line by line while the process runs, so
/// long-lived children like `hugo server` stay observable. Only the
/// program name is logged: argument lists can carry deployment
/// credentials.
///
/// # Arguments
///
/// * `program`: Binary name, resolved through `PATH`
/// * `args`: Argument list
/// * `cwd`: Working directory for the child process
///
/// # Errors
///
/// Returns error if the process cannot be spawned or exits non-zero.
pub fn run(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    log::info!("running {} in {}", program, cwd.display());

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start {}", program))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let name = program.to_string();
    let out_thread = stdout.map(|pipe| {
        let name = name.clone();
        thread::spawn(move || {
            for line in BufReader::new(pipe).lines().map_while(Result::ok) {
                log::info!("{}: {}", name, line);
            }
        })
    });
    let err_thread = stderr.map(|pipe| {
        let name = name.clone();
        thread::spawn(move || {
            for line in BufReader::new(pipe).lines().map_while(Result::ok) {
                log::warn!("{}: {}", name, line);
            }
        })
    });

    let status = child
        .wait()
        .with_context(|| format!("failed to wait for {}", program))?;

    if let Some(handle) = out_thread {
        let _ = handle.join();
    }
    if let Some(handle) = err_thread {
        let _ = handle.join();
    }

    log::info!("{} exited with {}", program, status);

    if !status.success() {
        bail!("{} exited with {}", program, status);
    }

    Ok(())
}

/// Writes the vercel project scaffolding into the public directory.
///
/// Vercel deploys from the built site, so the `.vercel/project.json`
/// linking file and a `.gitignore` hiding it live there.
///
/// # Errors
///
/// Returns error if the files cannot be written.
pub fn write_vercel_project(config: &Config, vercel: &VercelConfig) -> Result<()> {
    let vercel_dir = config.public.join(".vercel");
    fs::create_dir_all(&vercel_dir).with_context(|| {
        format!("failed to create vercel directory: {}", vercel_dir.display())
    })?;

    fs::write(config.public.join(".gitignore"), ".vercel")
        .context("failed to write .gitignore")?;

    let project = serde_json::json!({
        "projectId": vercel.project_id,
        "orgId": vercel.org_id,
    });
    fs::write(
        vercel_dir.join("project.json"),
        serde_json::to_string_pretty(&project).context("failed to serialize project.json")?,
    )
    .context("failed to write project.json")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;
    use tempfile::TempDir;

    #[test]
    fn test_run_reports_missing_binary() {
        // Arrange
        let dir = TempDir::new().expect("Should create temp dir");

        // Act
        let result = run("obsigo-no-such-binary", &[], dir.path());

        // Assert
        assert!(result.is_err(), "Missing binary should be an error, not a panic");
        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains("failed to start"), "Error should name the failure: {}", msg);
    }

    #[test]
    fn test_run_fails_on_nonzero_exit() {
        // Arrange
        let dir = TempDir::new().expect("Should create temp dir");

        // Act
        let result = run("false", &[], dir.path());

        // Assert
        assert!(result.is_err(), "Non-zero exit must be reported as failure");
    }

    #[test]
    fn test_run_succeeds_on_zero_exit() {
        // Arrange
        let dir = TempDir::new().expect("Should create temp dir");

        // Act
        let result = run("true", &[], dir.path());

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_write_vercel_project_scaffolding() {
        // Arrange
        let dir = TempDir::new().expect("Should create temp dir");
        let mut config = Config::for_tests();
        config.public = dir.path().join("public");
        let vercel = VercelConfig {
            token: Secret::new("tok"),
            project_id: "prj_1".to_string(),
            org_id: "org_1".to_string(),
        };

        // Act
        write_vercel_project(&config, &vercel).expect("Should write scaffolding");

        // Assert
        let project = fs::read_to_string(config.public.join(".vercel/project.json"))
            .expect("Should read project.json");
        assert!(project.contains("prj_1"));
        assert!(project.contains("org_1"));
        assert!(!project.contains("tok"), "Token must not be written to disk");

        let gitignore = fs::read_to_string(config.public.join(".gitignore"))
            .expect("Should read .gitignore");
        assert_eq!(gitignore, ".vercel");
    }
}
