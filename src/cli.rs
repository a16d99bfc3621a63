use clap::error::ErrorKind;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::image_processing::face_detection::{
    DEFAULT_MIN_RATIO, DEFAULT_NEIGHBORS, DEFAULT_SCALE_FACTOR,
};
use crate::image_processing::DetectionParams;

pub const DEFAULT_EXTENSIONS: &str = "jpg,jpeg,png,webp,bmp,tiff";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "face-trim",
    version,
    about = "Crop images to the square that keeps the most of every detected face",
    long_about = "
face-trim - face-aware square cropping

Detects faces with a SeetaFace model, slides a square window (side = shorter
image side) along the long axis and keeps the position that retains the largest
share of every face. Images without faces are center-cropped.

Example Usage:
  # Crop a single image
  face-trim -i photo.jpg -o avatar.jpg

  # Use a model stored elsewhere and a larger minimum face size
  face-trim -x ~/models/seeta_fd_frontal_v1.0.bin -m 0.1 -i photo.jpg -o avatar.jpg

  # Crop every image in a directory in parallel
  face-trim -i ~/Photos -o ~/avatars -j 8

  # Save the detections and the chosen crop instead of the crop itself
  face-trim -i photo.jpg -o debug.png --debug

  # Machine-readable output
  face-trim -i ~/Photos -o ~/avatars --json"
)]
pub struct Args {
    /// Face detector model file (SeetaFace). Defaults to seeta_fd_frontal_v1.0.bin next to the executable
    #[arg(short = 'x', long = "model", value_name = "FILE")]
    pub model_path: Option<PathBuf>,

    /// Detection scale factor between pyramid levels
    #[arg(short = 's', long = "scale-factor", default_value_t = DEFAULT_SCALE_FACTOR, value_name = "FACTOR")]
    pub scale_factor: f64,

    /// Minimum neighbor agreement before a face is reported
    #[arg(short = 'n', long = "neighbors", default_value_t = DEFAULT_NEIGHBORS, value_name = "N")]
    pub neighbors: u32,

    /// Minimum face size as a fraction of the shorter image side (0 disables)
    #[arg(short = 'm', long = "min-ratio", default_value_t = DEFAULT_MIN_RATIO, value_name = "RATIO")]
    pub min_ratio: f64,

    /// Input image, or a directory of images
    #[arg(short = 'i', long = "input", value_name = "FILE|DIR")]
    pub input: Option<PathBuf>,

    /// Output image, or a directory when the input is a directory
    #[arg(short = 'o', long = "output", value_name = "FILE|DIR")]
    pub output: Option<PathBuf>,

    /// Save the detected faces and the crop outline instead of the cropped image
    #[arg(long = "debug")]
    pub debug: bool,

    /// Comma-separated list of image extensions processed in directory mode
    #[arg(long = "extensions", default_value = DEFAULT_EXTENSIONS)]
    pub extensions_str: String,

    /// Number of parallel jobs in directory mode (0 = auto-detect CPU cores)
    #[arg(short = 'j', long = "jobs", default_value = "0", value_name = "N")]
    pub jobs: usize,

    /// JSON configuration file; command-line values take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Emit JSON lines on stdout instead of styled output
    #[arg(long = "json")]
    pub json: bool,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Parse the process arguments. Help and version exit with 0, every
    /// parsing failure exits with 1.
    ///
    /// The matches are returned alongside so the config merge can tell which
    /// values came from the command line.
    pub fn parse_or_exit() -> (Self, ArgMatches) {
        match Self::try_parse_with_matches(std::env::args_os()) {
            Ok(parsed) => parsed,
            Err(e) => {
                let code = exit_code_for(&e);
                let _ = e.print();
                std::process::exit(code);
            }
        }
    }

    pub fn try_parse_with_matches<I, T>(argv: I) -> Result<(Self, ArgMatches), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(argv)?;
        let args = Self::from_arg_matches(&matches)?;
        Ok((args, matches))
    }

    /// Parse the extensions string into a vector
    pub fn parse_extensions(&self) -> Vec<String> {
        self.extensions_str
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            scale_factor: self.scale_factor,
            min_neighbors: self.neighbors,
            min_size_ratio: self.min_ratio,
        }
    }
}

/// Exit status for a clap parse failure
pub fn exit_code_for(error: &clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["face-trim", "-i", "in.jpg", "-o", "out.jpg"]).unwrap();

        assert_eq!(args.input, Some(PathBuf::from("in.jpg")));
        assert_eq!(args.output, Some(PathBuf::from("out.jpg")));
        assert_eq!(args.model_path, None);
        assert_eq!(args.detection_params(), DetectionParams::default());
        assert!(!args.debug);
        assert_eq!(args.jobs, 0);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "face-trim", "-x", "model.bin", "-s", "1.2", "-n", "5", "-m", "0.1", "-i", "a", "-o", "b",
        ])
        .unwrap();

        assert_eq!(args.model_path, Some(PathBuf::from("model.bin")));
        let params = args.detection_params();
        assert_eq!(params.scale_factor, 1.2);
        assert_eq!(params.min_neighbors, 5);
        assert_eq!(params.min_size_ratio, 0.1);
    }

    #[test]
    fn test_input_output_are_optional_for_clap() {
        // Presence is checked after the config file is merged
        let args = Args::try_parse_from(["face-trim"]).unwrap();
        assert!(args.input.is_none());
        assert!(args.output.is_none());
    }

    #[test]
    fn test_exit_codes() {
        let help = Args::try_parse_from(["face-trim", "--help"]).unwrap_err();
        assert_eq!(exit_code_for(&help), 0);

        let version = Args::try_parse_from(["face-trim", "--version"]).unwrap_err();
        assert_eq!(exit_code_for(&version), 0);

        let bad_number = Args::try_parse_from(["face-trim", "-n", "many"]).unwrap_err();
        assert_eq!(exit_code_for(&bad_number), 1);

        let unknown = Args::try_parse_from(["face-trim", "--frobnicate"]).unwrap_err();
        assert_eq!(exit_code_for(&unknown), 1);
    }

    #[test]
    fn test_matches_record_command_line_values() {
        use clap::parser::ValueSource;

        let (args, matches) = Args::try_parse_with_matches(["face-trim", "-n2"]).unwrap();
        assert_eq!(args.neighbors, 2);
        assert_eq!(matches.value_source("neighbors"), Some(ValueSource::CommandLine));
        assert_eq!(matches.value_source("scale_factor"), Some(ValueSource::DefaultValue));
    }

    #[test]
    fn test_parse_extensions() {
        let args = Args::try_parse_from(["face-trim", "--extensions", "JPG, .png , webp,"]).unwrap();
        assert_eq!(args.parse_extensions(), vec!["jpg", "png", "webp"]);
    }
}
