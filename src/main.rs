use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use face_trim::cli::Args;
use face_trim::image_processing::{ProcessingConfig, ProcessingEngine, RustfaceDetector};
use face_trim::json_output::JsonMessage;
use face_trim::utils::{
    create_progress_bar, error_println, format_duration, resolve_model_path, validate_inputs,
    verbose_println, warn_println, ValidatedPaths,
};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let (mut args, matches) = Args::parse_or_exit();
    args.load_and_merge_config(&matches)?;

    // Validate inputs before touching the model
    let paths = validate_inputs(&args)?;

    if !args.json {
        println!("{}", style("face-trim - face-aware square cropping").bold().blue());
        println!();
    }

    let model_path = resolve_model_path(args.model_path.as_deref());
    let verbose = args.verbose && !args.json;

    let config = ProcessingConfig {
        params: args.detection_params(),
        extensions: args.parse_extensions(),
        verbose,
        parallel_jobs: if args.jobs == 0 {
            num_cpus::get()
        } else {
            args.jobs
        },
        debug: args.debug,
    };

    if verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Model: {}", model_path.display());
        println!("  Scale factor: {}", config.params.scale_factor);
        println!("  Min neighbors: {}", config.params.min_neighbors);
        println!("  Min size ratio: {}", config.params.min_size_ratio);
        println!("  Parallel jobs: {}", config.parallel_jobs);
        println!("  Extensions: {:?}", config.extensions);
        println!(
            "  Output: {}",
            if config.debug {
                "detection rendering"
            } else {
                "cropped image"
            }
        );
        println!();
    }

    let detector = RustfaceDetector::from_path(&model_path)
        .with_context(|| format!("Could not load face detector model: {}", model_path.display()))?;
    verbose_println(verbose, &format!("Loaded model: {}", model_path.display()));

    let engine = ProcessingEngine::new(config, Arc::new(detector))?;

    if paths.input.is_dir() {
        run_batch(&engine, &paths, args.json, start_time)
    } else {
        run_single(&engine, &paths, args.json)
    }
}

fn run_single(engine: &ProcessingEngine, paths: &ValidatedPaths, json: bool) -> Result<()> {
    match engine.process_single_image(&paths.input, &paths.output) {
        Ok(result) => {
            if json {
                JsonMessage::file_completed(&result).emit();
                return Ok(());
            }

            let trim = &result.trim;
            let faces = match trim.faces.len() {
                0 => style("no faces, center crop".to_string()).dim(),
                1 => style("1 face".to_string()).green(),
                n => style(format!("{} faces", n)).green(),
            };
            println!(
                "{} {} ({}x{}) - {}",
                style("✓").green().bold(),
                style(result.input_path.display()).bold(),
                trim.image_width,
                trim.image_height,
                faces
            );
            println!(
                "  Crop: {}x{} at ({}, {})",
                trim.region.width, trim.region.height, trim.region.x, trim.region.y
            );
            println!(
                "  Saved: {} in {}",
                style(result.output_path.display()).cyan(),
                format_duration(result.processing_time)
            );
            Ok(())
        }
        Err(e) => {
            if json {
                JsonMessage::file_failed(&paths.input, &e).emit();
            }
            Err(e)
        }
    }
}

fn run_batch(
    engine: &ProcessingEngine,
    paths: &ValidatedPaths,
    json: bool,
    start_time: Instant,
) -> Result<()> {
    let image_files = engine.discover_images(&paths.input)?;

    if image_files.is_empty() {
        if json {
            JsonMessage::summary(0, 0, 0, start_time.elapsed().as_secs_f64());
        } else {
            warn_println(&format!(
                "No images with extensions {:?} found in {}",
                engine.config().extensions,
                paths.input.display()
            ));
        }
        return Ok(());
    }

    std::fs::create_dir_all(&paths.output)
        .with_context(|| format!("Failed to create output directory: {}", paths.output.display()))?;

    let total = image_files.len();
    let progress = if json {
        None
    } else {
        let pb = create_progress_bar(total as u64)?;
        pb.set_message("Cropping images");
        Some(pb)
    };

    let results = engine.process_batch(&image_files, &paths.input, &paths.output, |count, path: &Path| {
        let name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("unknown");
        match &progress {
            Some(pb) => {
                pb.inc(1);
                pb.set_message(name.to_string());
            }
            None => JsonMessage::progress(count, total, name),
        }
    });

    if let Some(pb) = &progress {
        pb.finish_with_message("✓ Processing complete!");
        println!();
    }

    let successful = results.iter().filter(|r| r.is_ok()).count();
    let failed = total - successful;
    let total_time = start_time.elapsed();

    if json {
        for (path, result) in image_files.iter().zip(&results) {
            match result {
                Ok(processing_result) => JsonMessage::file_completed(processing_result).emit(),
                Err(e) => JsonMessage::file_failed(path, e).emit(),
            }
        }
        JsonMessage::summary(total, successful, failed, total_time.as_secs_f64());
    } else {
        let with_faces = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .filter(|r| !r.trim.faces.is_empty())
            .count();

        println!("{}", style("Results Summary:").bold().green());
        println!("  Successfully processed: {}", style(successful).bold().green());
        println!("  With faces: {}", style(with_faces).bold().cyan());
        println!(
            "  Center-cropped (no faces): {}",
            style(successful - with_faces).bold().yellow()
        );
        if failed > 0 {
            println!("  Failed: {}", style(failed).bold().red());
            for (path, result) in image_files.iter().zip(&results) {
                if let Err(e) = result {
                    error_println(&format!("{}: {:#}", path.display(), e));
                }
            }
        }
        println!("  Total time: {}", style(format_duration(total_time)).dim());
    }

    if failed > 0 {
        return Err(anyhow::anyhow!("{} of {} images failed", failed, total));
    }
    Ok(())
}
