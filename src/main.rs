use clap::{Parser, Subcommand};
use icon_bundler::color::FillColor;
use icon_bundler::export::Exporter;
use icon_bundler::ico::IconDir;
use icon_bundler::selection::SelectionStore;
use icon_bundler::{config, output};
use log::info;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "icon-bundler")]
#[command(about = "Export one source image as a bundle of platform icons")]
#[command(long_about = "\
Export one source image as a bundle of platform icons

A single square-ish source (PNG, JPEG, WebP, ...) is resized into every icon
the chosen platforms need and packed into one .tar.gz:

  Android   android-chrome-36x36.png ... android-chrome-512x512.png
  iOS       apple-touch-icon-57x57.png ... apple-touch-icon-180x180.png
  Web       favicon-16x16.png, favicon-32x32.png, favicon.ico
  Windows   mstile-70x70.png ... mstile-310x150.png  (artwork on fill colour)

All platforms are selected by default; repeat --platform to pick a subset.

Run 'icon-bundler presets' to list every file, and 'icon-bundler gen-config'
to generate a documented icon-bundler.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./icon-bundler.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Source image
    source: PathBuf,

    /// Platform to include (repeatable; default: all)
    #[arg(short, long = "platform", value_name = "NAME")]
    platforms: Vec<String>,

    /// Background for Windows tiles, e.g. "#2b5797"
    #[arg(long, value_name = "COLOR")]
    fill_color: Option<FillColor>,

    /// Directory the archive is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Render the selected platforms and write the archive
    Export(ExportArgs),
    /// List every platform and the files it produces
    Presets {
        /// Mark which platforms an export with these names would include
        #[arg(short, long = "platform", value_name = "NAME")]
        platforms: Vec<String>,

        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the image directory of an .ico file
    Inspect {
        /// Icon container to read
        file: PathBuf,
    },
    /// Print a stock icon-bundler.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Export(args) => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);

            let mut store = SelectionStore::with_fill_color(config.tiles.fill_color);
            if !args.platforms.is_empty() {
                store.select_only(&args.platforms)?;
            }
            if let Some(color) = args.fill_color {
                store.set_fill_color(color);
            }
            let snapshot = store.snapshot();

            info!("reading {}", args.source.display());
            let source = std::fs::read(&args.source)?;
            let bundle = Exporter::new(&config).export(&snapshot, &source)?;

            std::fs::create_dir_all(&args.out_dir)?;
            let path = args.out_dir.join(&bundle.file_name);
            std::fs::write(&path, &bundle.bytes)?;
            output::print_export_output(&bundle, &path);
        }
        Command::Presets { platforms, json } => {
            let mut store = SelectionStore::new();
            let show_chosen = !platforms.is_empty();
            if show_chosen {
                store.select_only(&platforms)?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(store.presets())?);
            } else {
                output::print_presets(store.presets(), show_chosen);
            }
        }
        Command::Inspect { file } => {
            let bytes = std::fs::read(&file)?;
            let dir = IconDir::parse(&bytes)?;
            output::print_ico_directory(&dir);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--config` when given (must exist), else `./icon-bundler.toml` if present.
fn load_config(explicit: Option<&Path>) -> Result<config::BundlerConfig, config::ConfigError> {
    match explicit {
        Some(path) if !path.exists() => Err(config::ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file {} not found", path.display()),
        ))),
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

/// Route `log` output to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
