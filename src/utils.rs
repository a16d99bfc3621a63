use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Args;

/// Model file looked up next to the executable when --model is not given
pub const DEFAULT_MODEL_FILE: &str = "seeta_fd_frontal_v1.0.bin";

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})",
        )?
        .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Input and output paths after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<ValidatedPaths> {
    let (input, output) = match (&args.input, &args.output) {
        (Some(input), Some(output)) if !input.as_os_str().is_empty() && !output.as_os_str().is_empty() => {
            (input.clone(), output.clone())
        }
        _ => return Err(anyhow::anyhow!("--input and --output must be specified")),
    };

    if !input.exists() {
        return Err(anyhow::anyhow!(
            "Input path does not exist: {}",
            input.display()
        ));
    }
    if !input.is_dir() && !input.is_file() {
        return Err(anyhow::anyhow!(
            "Input path is neither a file nor a directory: {}",
            input.display()
        ));
    }
    if input.is_dir() && output.is_file() {
        return Err(anyhow::anyhow!(
            "Input is a directory, so the output must be a directory too: {}",
            output.display()
        ));
    }

    if !(args.scale_factor > 1.0) {
        return Err(anyhow::anyhow!(
            "Scale factor must be greater than 1.0, got: {}",
            args.scale_factor
        ));
    }

    if !(0.0..1.0).contains(&args.min_ratio) {
        return Err(anyhow::anyhow!(
            "Minimum size ratio must be in [0.0, 1.0), got: {}",
            args.min_ratio
        ));
    }

    // Validate extensions
    let extensions = args.parse_extensions();
    if extensions.is_empty() {
        return Err(anyhow::anyhow!("No valid extensions specified"));
    }

    // Validate job count
    if args.jobs > 64 {
        return Err(anyhow::anyhow!(
            "Job count too high (max 64), got: {}",
            args.jobs
        ));
    }

    Ok(ValidatedPaths { input, output })
}

/// Model path from the command line, or the bundled name next to the executable
pub fn resolve_model_path(model_path: Option<&Path>) -> PathBuf {
    if let Some(path) = model_path {
        return path.to_path_buf();
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_MODEL_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_FILE))
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file has one of the specified extensions
pub fn has_valid_extension(path: &Path, extensions: &[String]) -> bool {
    if let Some(ext) = get_file_extension(path) {
        extensions.contains(&ext)
    } else {
        false
    }
}

/// Print message only in verbose mode
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}
