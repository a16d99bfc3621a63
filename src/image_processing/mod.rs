pub mod annotate;
pub mod crop;
pub mod face_detection;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::utils::{has_valid_extension, verbose_println};

pub use face_detection::{
    calc_trim_region, DetectionParams, FaceDetector, RustfaceDetector, TrimResult,
};

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub params: DetectionParams,
    pub extensions: Vec<String>,
    pub verbose: bool,
    pub parallel_jobs: usize,
    /// Save the detection rendering instead of the crop
    pub debug: bool,
}

pub struct ProcessingEngine {
    config: ProcessingConfig,
    detector: Arc<dyn FaceDetector>,
    pool: rayon::ThreadPool,
}

impl ProcessingEngine {
    pub fn new(config: ProcessingConfig, detector: Arc<dyn FaceDetector>) -> Result<Self> {
        // Initialize thread pool with specified number of jobs
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_jobs)
            .build()
            .context("Failed to initialize thread pool")?;

        Ok(Self {
            config,
            detector,
            pool,
        })
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Discover all image files under the input directory
    pub fn discover_images(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut image_files = Vec::new();

        verbose_println(self.config.verbose, &format!("Scanning directory: {}", input_dir.display()));

        let walker = WalkDir::new(input_dir)
            .follow_links(false)
            .max_depth(10); // Reasonable depth limit

        for entry in walker {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && has_valid_extension(path, &self.config.extensions) {
                image_files.push(path.to_path_buf());
            }
        }

        // Sort for consistent processing order
        image_files.sort();

        verbose_println(self.config.verbose, &format!("Found {} image files", image_files.len()));
        Ok(image_files)
    }

    /// Output location of `input_path` when processing the directory `input_dir`
    /// into `output_dir`; subdirectories are mirrored
    pub fn batch_output_path(input_dir: &Path, input_path: &Path, output_dir: &Path) -> PathBuf {
        match input_path.strip_prefix(input_dir) {
            Ok(relative) => output_dir.join(relative),
            Err(_) => output_dir.join(input_path.file_name().unwrap_or(input_path.as_os_str())),
        }
    }

    /// Process a batch of images with progress callback
    ///
    /// Results come back in the order of `image_files`.
    pub fn process_batch<F>(
        &self,
        image_files: &[PathBuf],
        input_dir: &Path,
        output_dir: &Path,
        progress_callback: F,
    ) -> Vec<Result<ProcessingResult>>
    where
        F: Fn(usize, &Path) + Send + Sync,
    {
        let processed_count = AtomicUsize::new(0);

        self.pool.install(|| {
            image_files
                .par_iter()
                .map(|image_path| {
                    let output_path = Self::batch_output_path(input_dir, image_path, output_dir);
                    let result = self.process_single_image(image_path, &output_path);

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    progress_callback(count, image_path);

                    result
                })
                .collect()
        })
    }

    /// Process a single image file
    pub fn process_single_image(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<ProcessingResult> {
        let start = Instant::now();
        verbose_println(self.config.verbose, &format!("Processing: {}", input_path.display()));

        // Load and decode the image
        let img = image::open(input_path)
            .with_context(|| format!("Failed to open image: {}", input_path.display()))?;

        // Convert to RGB
        let rgb_img = img.to_rgb8();

        let trim = calc_trim_region(&rgb_img, self.detector.as_ref(), &self.config.params)
            .with_context(|| format!("Failed to find crop region: {}", input_path.display()))?;

        verbose_println(
            self.config.verbose,
            &format!(
                "{}: {} face(s), crop {}x{} at ({}, {})",
                input_path.display(),
                trim.faces.len(),
                trim.region.width,
                trim.region.height,
                trim.region.x,
                trim.region.y
            ),
        );

        let output_img = if self.config.debug {
            annotate::draw_detections(&rgb_img, &trim)
        } else {
            crop::crop_image(&rgb_img, trim.region)?
        };

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }

        output_img
            .save(output_path)
            .with_context(|| format!("Failed to save image: {}", output_path.display()))?;

        Ok(ProcessingResult {
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            trim,
            processing_time: start.elapsed(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub trim: TrimResult,
    pub processing_time: Duration,
}
