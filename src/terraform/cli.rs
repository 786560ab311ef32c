//! Terraform CLI execution.
//!
//! Runs the tool binary in its working directory and reads the output
//! variables of the applied state.

use super::output_file::parse_output_variables;
use super::Terraformer;
use crate::config::{PolicySettings, MAX_COMMAND_OUTPUT_BYTES};
use crate::error::ToolError;
use colored::Colorize;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Run `program` in `dir` and return its stdout.
///
/// The program path is passed as is; the argument string is split on spaces,
/// with quoted substrings preserved.
///
/// # Arguments
/// * `dir` - Working directory of the command
/// * `program` - Path or name of the binary
/// * `args` - The argument string
///
/// # Returns
/// * `Ok(String)` - The stdout output on success
/// * `Err` - If the command fails or its output exceeds
///   [`MAX_COMMAND_OUTPUT_BYTES`]
pub fn run_in(dir: &Path, program: &str, args: &str) -> Result<String, ToolError> {
    log::debug!(
        "run_in({dir}, {program} {args})",
        dir = dir.display(),
        args = args.on_blue()
    );
    if program.trim().is_empty() {
        return Err("empty command".into());
    }

    let args: Vec<&str> = split_and_strip(args);
    log::trace!("split args={:?}", args);

    let output = Command::new(program)
        .args(&args)
        .current_dir(dir)
        .output()
        .map_err(|e| {
            log::error!("Command execution failed: {}", e);
            format!("Failed to execute command {program}: {e}")
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {program} {args:?}",
            failed = "failed".on_red(),
            program = program.on_blue()
        );
        return Err(format!("ERROR running: {stderr}").into());
    }

    log::debug!("Success output.stdout.len(): {}", output.stdout.len());
    if output.stdout.len() > MAX_COMMAND_OUTPUT_BYTES {
        return Err(format!(
            "Response too large: {} bytes for command: {program} {:?}",
            output.stdout.len(),
            args
        )
        .into());
    }

    let stdout = String::from_utf8(output.stdout).map_err(|e| format!("Invalid UTF-8: {}", e))?;
    Ok(stdout)
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Reads output variables by running `terraform output -json` in the
/// directory holding the applied configuration.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    pub bin: String,
    pub dir: PathBuf,
}

impl TerraformCli {
    pub fn new(bin: &str, dir: impl Into<PathBuf>) -> Self {
        TerraformCli {
            bin: bin.to_string(),
            dir: dir.into(),
        }
    }

    pub fn from_settings(settings: &PolicySettings, dir: impl Into<PathBuf>) -> Self {
        Self::new(&settings.terraform_bin, dir)
    }

    const OUTPUT_ARGS: &'static str = "output -json";
}

impl Terraformer for TerraformCli {
    fn state_output_variables(
        &self,
        keys: &[String],
    ) -> Result<HashMap<String, String>, ToolError> {
        log::info!(
            "reading {} output variables in {}",
            keys.len(),
            self.dir.display()
        );
        let stdout = run_in(&self.dir, &self.bin, Self::OUTPUT_ARGS)?;
        Ok(parse_output_variables(&stdout, keys)?)
    }
}
