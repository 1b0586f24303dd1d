//! terrapipe CLI - runs the built-in terrain generation pipeline.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

use terrapipe::export::RawFormat;
use terrapipe::logging::init_logging;
use terrapipe::modules::{register_default_pipeline, BasisSettings, EXPORT_PATH};
use terrapipe::pipeline::{format_pipeline, Generator, TracingLogger};

/// Procedural terrain generation pipeline.
#[derive(Parser)]
#[command(name = "terrapipe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter (e.g. "info", "debug"). Overridden by TERRAPIPE_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write a height map.
    Generate {
        /// Settings file (JSON). Missing groups keep their defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file name without extension.
        #[arg(short, long)]
        name: Option<String>,

        /// Map side length in cells.
        #[arg(long)]
        size: Option<usize>,

        /// Seed for the basis and cliff noise.
        #[arg(short, long)]
        seed: Option<i32>,

        /// Basis noise preset. Replaces the basis shape from the config file.
        #[arg(short, long)]
        preset: Option<PresetArg>,

        /// Export format.
        #[arg(short, long)]
        format: Option<ExportFormatArg>,

        /// Turn cliff terraces on.
        #[arg(long, conflicts_with = "no_cliffs")]
        cliffs: bool,

        /// Turn cliff terraces off.
        #[arg(long)]
        no_cliffs: bool,
    },

    /// Write the default settings file.
    Config {
        /// Destination file.
        #[arg(short, long, default_value = "terrapipe.json")]
        output: PathBuf,

        /// Write without indentation.
        #[arg(long)]
        compact: bool,
    },

    /// Show the default pipeline and its settings groups.
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    /// Broad, gently rolling terrain.
    Smooth,
    /// Rugged, detailed terrain.
    Rough,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormatArg {
    /// 16-bit PNG.
    Png,
    /// 16-bit RAW little-endian.
    Raw,
    /// 32-bit float RAW.
    RawFloat,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Generate {
            config,
            output,
            name,
            size,
            seed,
            preset,
            format,
            cliffs,
            no_cliffs,
        } => {
            let cliffs = match (cliffs, no_cliffs) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let overrides = cli_overrides(output, name, size, seed, preset, format, cliffs);
            run_generate(config, overrides);
        }
        Commands::Config { output, compact } => run_config(output, !compact),
        Commands::Info => run_info(),
    }
}

/// Builds a settings document from command line flags. Only flags that
/// were given appear in it.
fn cli_overrides(
    output: Option<PathBuf>,
    name: Option<String>,
    size: Option<usize>,
    seed: Option<i32>,
    preset: Option<PresetArg>,
    format: Option<ExportFormatArg>,
    cliffs: Option<bool>,
) -> Value {
    let mut general = Map::new();
    let mut basis = match preset.map(preset_fields) {
        Some(Ok(fields)) => fields,
        Some(Err(err)) => {
            tracing::warn!(error = %err, "cannot serialize basis preset, ignoring it");
            Map::new()
        }
        None => Map::new(),
    };
    let mut cliff = Map::new();
    let mut export = Map::new();

    if let Some(size) = size {
        general.insert("size".into(), json!(size));
    }
    if let Some(seed) = seed {
        basis.insert("seed".into(), json!(seed));
        cliff.insert("seed".into(), json!(seed));
    }
    if let Some(enabled) = cliffs {
        cliff.insert("enabled".into(), json!(enabled));
    }
    if let Some(output) = output {
        export.insert("directory".into(), json!(output.to_string_lossy()));
    }
    if let Some(name) = name {
        export.insert("name".into(), json!(name));
    }
    if let Some(format) = format {
        let format = match format {
            ExportFormatArg::Png => json!("png16"),
            ExportFormatArg::Raw => json!({ "raw": RawFormat::R16LittleEndian }),
            ExportFormatArg::RawFloat => json!({ "raw": RawFormat::R32Float }),
        };
        export.insert("format".into(), format);
    }

    json!({
        "general": general,
        "basis": basis,
        "cliff": cliff,
        "export": export,
    })
}

/// Basis fields of a preset, without its seed so a configured seed survives.
fn preset_fields(preset: PresetArg) -> Result<Map<String, Value>, serde_json::Error> {
    let settings = match preset {
        PresetArg::Smooth => BasisSettings::smooth(0),
        PresetArg::Rough => BasisSettings::rough(0),
    };
    let mut fields = match serde_json::to_value(settings)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    fields.remove("seed");
    Ok(fields)
}

fn default_generator() -> Generator {
    let mut generator = Generator::new();
    register_default_pipeline(&mut generator);
    generator
}

fn run_generate(config: Option<PathBuf>, overrides: Value) {
    let mut generator = default_generator();
    generator.set_logger(Box::new(TracingLogger));

    if let Some(path) = config {
        match generator.load_settings(&path) {
            Ok(applied) => tracing::info!(path = %path.display(), applied, "loaded settings"),
            Err(err) => {
                eprintln!("Error: cannot read settings file {}: {}", path.display(), err);
                std::process::exit(1);
            }
        }
    }
    generator.load_settings_value(&overrides);

    match generator.run() {
        Ok(summary) => {
            println!(
                "Generated {} modules in {:.2}s",
                summary.modules,
                summary.elapsed.as_secs_f64()
            );
            if let Some(path) = generator.storage().get::<PathBuf>(EXPORT_PATH) {
                println!("Wrote {}", path.display());
            }
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

fn run_config(output: PathBuf, pretty: bool) {
    let generator = default_generator();
    if let Err(err) = generator.save_settings(&output, pretty) {
        eprintln!("Error: cannot write {}: {}", output.display(), err);
        std::process::exit(1);
    }
    println!("Wrote default settings to {}", output.display());
}

fn run_info() {
    let generator = default_generator();

    println!("terrapipe {}", env!("CARGO_PKG_VERSION"));
    println!("=============");
    println!("Pipeline: {}", format_pipeline(&generator.module_names()));
    println!("Settings groups:");
    for name in generator.settings().names() {
        println!("  - {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "terrapipe", "generate", "--size", "65", "--seed", "4", "--format", "raw-float", "--cliffs",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Generate { size: Some(65), seed: Some(4), cliffs: true, .. }
        ));
    }

    #[test]
    fn test_cliff_flags_conflict() {
        assert!(Cli::try_parse_from(["terrapipe", "generate", "--cliffs", "--no-cliffs"]).is_err());
    }

    #[test]
    fn test_overrides_only_contain_given_flags() {
        let overrides = cli_overrides(None, None, Some(65), Some(3), None, Some(ExportFormatArg::RawFloat), None);

        assert_eq!(overrides["general"], json!({ "size": 65 }));
        assert_eq!(overrides["basis"], json!({ "seed": 3 }));
        assert_eq!(overrides["cliff"], json!({ "seed": 3 }));
        assert_eq!(overrides["export"], json!({ "format": { "raw": "r32_float" } }));
    }

    #[test]
    fn test_preset_keeps_configured_seed() {
        let mut generator = default_generator();
        generator.load_settings_value(&json!({ "basis": { "seed": 77 } }));
        let overrides = cli_overrides(None, None, None, None, Some(PresetArg::Rough), None, None);
        generator.load_settings_value(&overrides);

        let basis = generator.settings().get_as::<BasisSettings>("basis").unwrap();
        assert_eq!(*basis, BasisSettings::rough(77));
    }

    #[test]
    fn test_seed_flag_wins_over_preset() {
        let overrides = cli_overrides(None, None, None, Some(5), Some(PresetArg::Smooth), None, None);
        assert_eq!(overrides["basis"]["seed"], json!(5));
        assert_eq!(overrides["basis"]["octaves"], json!(BasisSettings::smooth(5).octaves));
    }

    #[test]
    fn test_overrides_apply_to_default_pipeline() {
        let mut generator = default_generator();
        let overrides = cli_overrides(None, Some("island".into()), Some(17), None, None, None, Some(true));
        assert_eq!(generator.load_settings_value(&overrides), 4);

        let settings = generator.settings();
        let cliff = settings.get_as::<terrapipe::modules::CliffSettings>("cliff").unwrap();
        assert!(cliff.enabled);
        let export = settings.get_as::<terrapipe::modules::ExportSettings>("export").unwrap();
        assert_eq!(export.name, "island");
    }
}
