use crate::cli::Args;
use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Saved face-trim settings
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub config: TrimConfigJson,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimConfigJson {
    pub model_path: Option<String>,
    pub scale_factor: Option<f64>,
    pub neighbors: Option<u32>,
    pub min_ratio: Option<f64>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub debug: Option<bool>,
    pub extensions: Option<String>,
    pub jobs: Option<usize>,
    pub json: Option<bool>,
    pub verbose: Option<bool>,
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let contents = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: ConfigFile = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            self.merge_from_config(config.config, matches);

            if self.verbose && !self.json {
                eprintln!("Loaded configuration from: {:?}", config_path);
            }
        }
        Ok(())
    }

    /// Fill every option not given on the command line from `config`
    pub fn merge_from_config(&mut self, config: TrimConfigJson, matches: &ArgMatches) {
        // Ids are the `Args` field names
        let given = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);

        if !given("model_path") {
            if let Some(model) = config.model_path {
                self.model_path = Some(PathBuf::from(model));
            }
        }

        if !given("scale_factor") {
            if let Some(scale_factor) = config.scale_factor {
                self.scale_factor = scale_factor;
            }
        }

        if !given("neighbors") {
            if let Some(neighbors) = config.neighbors {
                self.neighbors = neighbors;
            }
        }

        if !given("min_ratio") {
            if let Some(min_ratio) = config.min_ratio {
                self.min_ratio = min_ratio;
            }
        }

        if !given("input") {
            if let Some(input) = config.input_path {
                self.input = Some(PathBuf::from(input));
            }
        }

        if !given("output") {
            if let Some(output) = config.output_path {
                self.output = Some(PathBuf::from(output));
            }
        }

        if !given("extensions_str") {
            if let Some(ext) = config.extensions {
                self.extensions_str = ext;
            }
        }

        if !given("jobs") {
            if let Some(jobs) = config.jobs {
                self.jobs = jobs;
            }
        }

        if !given("debug") {
            if let Some(debug) = config.debug {
                self.debug = debug;
            }
        }

        if !given("json") {
            if let Some(json) = config.json {
                self.json = json;
            }
        }

        if !given("verbose") {
            if let Some(verbose) = config.verbose {
                self.verbose = verbose;
            }
        }
    }
}
