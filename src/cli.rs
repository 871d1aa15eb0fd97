// ============================================================================
// elevation-shadow CLI — headless batch shadow generation
// ============================================================================
//
// Usage examples:
//   elevation-shadow -i icon.png -o icon_shadow.png
//   elevation-shadow -i icon.png -o out.png --translucent
//   elevation-shadow -i *.png --output-dir shadows/ --elevation 8 --density 2
//   elevation-shadow -i card.png -o card_elevated.png --elevation 12 --composite
//   elevation-shadow -i a.png b.png --output-dir out/ --filter shadow-alpha --gpu

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::gpu::GpuShadowRenderer;
use crate::io::{SaveFormat, encode_and_write, load_image};
use crate::ops::elevation;
use crate::settings::{FilterKind, ShadowSettings};
use crate::{log_err, log_info, log_warn};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Headless shadow generator.
///
/// Turns images into drop-shadow bitmaps (or composites them over one).
#[derive(Parser, Debug)]
#[command(
    name = "elevation-shadow",
    about = "Generate elevation drop shadows for images",
    long_about = "Apply the shadow tint kernels to image files and optionally pad,\n\
                  blur, and composite an elevation shadow.\n\n\
                  Example:\n  \
                  elevation-shadow --input icon.png --output shadow.png --translucent\n  \
                  elevation-shadow -i *.png --output-dir out/ --elevation 8 --composite"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "icons/*.png").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, bmp, tga, tiff, jpeg.
    /// When omitted, inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Settings file to start from (key=value). Flags below override it.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Shadow kernel: translucent, shadow-alpha.
    #[arg(long, value_name = "KERNEL")]
    pub filter: Option<String>,

    /// Dimmed colour shadow instead of a black silhouette.
    #[arg(short, long)]
    pub translucent: bool,

    /// Elevation in dp. 0 applies the tint only (no padding, no blur).
    #[arg(short, long, value_name = "DP")]
    pub elevation: Option<f32>,

    /// Physical pixels per dp.
    #[arg(long, value_name = "SCALE")]
    pub density: Option<f32>,

    /// Write the image over its shadow instead of the shadow alone.
    #[arg(long)]
    pub composite: bool,

    /// Suppress the shadow in composite output.
    #[arg(long)]
    pub no_shadow: bool,

    /// Tint on the GPU when an adapter is available.
    #[arg(long)]
    pub gpu: bool,

    /// Store the effective settings as the new defaults for later runs.
    #[arg(long)]
    pub save_settings: bool,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Build the effective settings: `--settings` file, else the saved
    /// config at `config_path` (or defaults), then flag overrides.
    pub fn resolve_settings(&self, config_path: Option<&Path>) -> Result<ShadowSettings, String> {
        let mut s = match &self.settings {
            Some(path) => ShadowSettings::load_from(path)
                .map_err(|e| format!("could not read settings '{}': {}", path.display(), e))?,
            None => ShadowSettings::load_or_default(config_path),
        };
        if let Some(name) = &self.filter {
            s.filter = FilterKind::parse(name).ok_or_else(|| {
                format!("unknown filter '{}' (expected translucent or shadow-alpha)", name)
            })?;
        }
        if self.translucent {
            s.is_translucent = true;
        }
        if let Some(e) = self.elevation {
            if !e.is_finite() || e < 0.0 {
                return Err(format!("elevation must be a non-negative number, got {}", e));
            }
            s.elevation_dp = e;
        }
        if let Some(d) = self.density {
            if !d.is_finite() || d <= 0.0 {
                return Err(format!("density must be positive, got {}", d));
            }
            s.density = d;
        }
        if self.no_shadow {
            s.clip_shadow = true;
        }
        if self.gpu {
            s.gpu_acceleration = true;
        }
        if self.translucent && s.filter == FilterKind::ShadowAlpha {
            eprintln!("warning: --translucent has no effect with the shadow-alpha filter.");
            log_warn!("--translucent ignored: filter is shadow-alpha");
        }
        Ok(s)
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let config_path = ShadowSettings::settings_path();
    run_with_config(args, config_path.as_deref())
}

/// [`run`] against an explicit saved-settings location.
fn run_with_config(args: CliArgs, config_path: Option<&Path>) -> ExitCode {
    let settings = match args.resolve_settings(config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.save_settings {
        let Some(path) = config_path else {
            eprintln!("error: no settings directory available to save into.");
            return ExitCode::FAILURE;
        };
        if let Err(e) = settings.save_to(path) {
            eprintln!("error: could not save settings '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        log_info!("settings saved to {}", path.display());
    }

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Drop --output and use --output-dir for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let save_format = match parse_format(args.format.as_deref(), args.output.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if !save_format.keeps_alpha() {
        eprintln!("warning: {} output has no alpha channel; the shadow will be flattened.", save_format.extension());
    }

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let gpu = if settings.gpu_acceleration {
        let renderer = GpuShadowRenderer::new(&settings.preferred_gpu);
        match &renderer {
            Some(r) => {
                if args.verbose {
                    println!("GPU: {}", r.adapter_name());
                }
            }
            None => {
                eprintln!("warning: no GPU adapter available, using CPU.");
                log_warn!("GPU requested but unavailable");
            }
        }
        renderer
    } else {
        None
    };

    log_info!(
        "batch: {} file(s), filter={} translucent={} elevation={}dp density={} composite={}",
        inputs.len(),
        settings.filter.as_str(),
        settings.is_translucent,
        settings.elevation_dp,
        settings.density,
        args.composite
    );

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            save_format,
        ) else {
            eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
            any_failure = true;
            continue;
        };

        match run_one(
            input_path,
            &output_path,
            &settings,
            args.composite,
            save_format,
            args.quality,
            gpu.as_ref(),
        ) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                log_err!("{}: {}", input_path.display(), e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(
    input: &Path,
    output: &Path,
    settings: &ShadowSettings,
    composite: bool,
    format: SaveFormat,
    quality: u8,
    gpu: Option<&GpuShadowRenderer>,
) -> Result<(), String> {
    let src = load_image(input).map_err(|e| format!("load failed: {}", e))?;
    let result = elevation::render(&src, settings, composite, gpu)
        .map_err(|e| format!("shadow failed: {}", e))?;
    encode_and_write(&result, output, format, quality).map_err(|e| format!("save failed: {}", e))
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Choose the [`SaveFormat`] from `--format` or the output extension.
/// Defaults to PNG; an explicit unknown `--format` is an error.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> Result<SaveFormat, String> {
    if let Some(f) = format_arg {
        return SaveFormat::from_name(f).ok_or_else(|| format!("unsupported format '{}'", f));
    }
    let from_ext = output
        .and_then(|out| out.extension())
        .and_then(|e| e.to_str())
        .and_then(SaveFormat::from_name);
    Ok(from_ext.unwrap_or(SaveFormat::Png))
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output`
/// 2. `--output-dir` (input stem + format extension)
/// 3. Next to the input as `<stem>_shadow.<ext>`
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    Some(parent.join(format!("{}_shadow.{}", stem, ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["elevation-shadow", "-i", "in.png"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let s = args(&["--translucent", "--elevation", "8", "--density", "2.5", "--gpu", "--no-shadow"])
            .resolve_settings(None)
            .unwrap();
        assert!(s.is_translucent && s.gpu_acceleration && s.clip_shadow);
        assert_eq!(s.elevation_dp, 8.0);
        assert_eq!(s.density, 2.5);
        assert_eq!(s.filter, FilterKind::Translucent);
    }

    #[test]
    fn bad_flag_values_are_rejected() {
        assert!(args(&["--filter", "sepia"]).resolve_settings(None).is_err());
        assert!(args(&["--density", "0"]).resolve_settings(None).is_err());
        assert!(args(&["--elevation=-3"]).resolve_settings(None).is_err());
    }

    #[test]
    fn input_is_required() {
        assert!(CliArgs::try_parse_from(["elevation-shadow"]).is_err());
    }

    #[test]
    fn format_from_flag_extension_or_default() {
        assert_eq!(parse_format(Some("TIFF"), None), Ok(SaveFormat::Tiff));
        assert!(parse_format(Some("gif"), None).is_err());
        assert_eq!(parse_format(None, Some(Path::new("x/out.BMP"))), Ok(SaveFormat::Bmp));
        assert_eq!(parse_format(None, Some(Path::new("x/out.webp"))), Ok(SaveFormat::Png));
        assert_eq!(parse_format(None, None), Ok(SaveFormat::Png));
    }

    #[test]
    fn output_path_priority() {
        let input = Path::new("icons/star.png");
        assert_eq!(
            build_output_path(input, Some(Path::new("o.png")), Some(Path::new("d")), SaveFormat::Png),
            Some(PathBuf::from("o.png"))
        );
        assert_eq!(
            build_output_path(input, None, Some(Path::new("d")), SaveFormat::Tiff),
            Some(PathBuf::from("d/star.tiff"))
        );
        assert_eq!(
            build_output_path(input, None, None, SaveFormat::Png),
            Some(PathBuf::from("icons/star_shadow.png"))
        );
    }

    #[test]
    fn run_writes_tinted_file() {
        let dir = std::env::temp_dir().join(format!("elevation-shadow-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("white.png");
        let output = dir.join("white_out.png");
        encode_and_write(
            &RgbaImage::from_pixel(3, 2, Rgba([255, 255, 255, 255])),
            &input,
            SaveFormat::Png,
            90,
        )
        .unwrap();

        let cli = CliArgs::try_parse_from([
            "elevation-shadow",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--translucent",
        ])
        .unwrap();
        assert_eq!(run_with_config(cli, None), ExitCode::SUCCESS);

        let out = load_image(&output).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert!(out.pixels().all(|p| p.0 == [102, 102, 102, 153]));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_fails_when_nothing_matches() {
        let cli = CliArgs::try_parse_from(["elevation-shadow", "-i", "/nonexistent/dir/*.png"]).unwrap();
        assert_eq!(run_with_config(cli, None), ExitCode::FAILURE);
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("elevation-shadow-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_white(path: &Path) {
        encode_and_write(
            &RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255])),
            path,
            SaveFormat::Png,
            90,
        )
        .unwrap();
    }

    #[test]
    fn single_output_is_rejected_for_several_inputs() {
        let dir = temp_dir("batch-output");
        let (a, b) = (dir.join("a.png"), dir.join("b.png"));
        write_white(&a);
        write_white(&b);
        let single = dir.join("single.png");
        let out_dir = dir.join("outdir");

        let cli = CliArgs::try_parse_from([
            "elevation-shadow",
            "-i",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "-o",
            single.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(run_with_config(cli, None), ExitCode::FAILURE);
        assert!(!single.exists());

        let cli = CliArgs::try_parse_from([
            "elevation-shadow",
            "-i",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(run_with_config(cli, None), ExitCode::SUCCESS);
        assert!(out_dir.join("a.png").exists() && out_dir.join("b.png").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn saved_settings_are_the_next_defaults() {
        let dir = temp_dir("saved-config");
        let config = dir.join("config").join("shadow_settings.cfg");
        let input = dir.join("white.png");
        write_white(&input);

        let cli = CliArgs::try_parse_from([
            "elevation-shadow",
            "-i",
            input.to_str().unwrap(),
            "-o",
            dir.join("first.png").to_str().unwrap(),
            "--translucent",
            "--elevation",
            "5",
            "--save-settings",
        ])
        .unwrap();
        assert_eq!(run_with_config(cli, Some(&config)), ExitCode::SUCCESS);
        assert!(config.exists());

        let s = args(&[]).resolve_settings(Some(&config)).unwrap();
        assert!(s.is_translucent);
        assert_eq!(s.elevation_dp, 5.0);

        // An explicit --settings file still wins over the saved config.
        let empty = dir.join("empty.cfg");
        std::fs::write(&empty, "").unwrap();
        let s = args(&["--settings", empty.to_str().unwrap()])
            .resolve_settings(Some(&config))
            .unwrap();
        assert_eq!(s, ShadowSettings::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_saved_config_means_defaults() {
        let dir = temp_dir("no-config");
        let s = args(&[]).resolve_settings(Some(&dir.join("absent.cfg"))).unwrap();
        assert_eq!(s, ShadowSettings::default());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
