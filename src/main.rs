use clap::{Parser, Subcommand};
use nonfree_resize::imaging::{
    RustBackend, ScourOptimizer, calculate_new_size, parse_length,
};
use nonfree_resize::resize::Resizer;
use nonfree_resize::source::{ImageSource, LocalSource, MediaWikiSource};
use nonfree_resize::{config, naming, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nonfree-resize")]
#[command(about = "Downscale non-free wiki images to about 0.1 megapixels")]
#[command(long_about = "\
Downscale non-free wiki images to about 0.1 megapixels

The original is downloaded next to the output, resized so its area is close
to 100,000 pixels, and saved as <stem><ext> with its EXIF metadata carried
over. The temporary download is always removed.

Status line printed by 'resize' (stdout):
  <stem><ext>  resized file, relative to the work directory
  SKIP         GIF, not touched
  PIXEL        less than 5% reduction, nothing written
  BOMB         more than 80 megapixels, refused before decoding
  ERROR        the file could not be decoded

Run 'nonfree-resize gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Directory for the temporary download and the output
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// scour executable used for SVGs
    #[arg(long, env = "NONFREE_RESIZE_OPTIMIZER", global = true)]
    optimizer: Option<String>,

    /// MediaWiki action API endpoint
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download and downscale one file, printing its status
    Resize {
        /// Wiki file name, with or without the File: prefix
        file: String,
        /// Output name without extension (default: random)
        #[arg(long)]
        output_stem: Option<String>,
        /// Read originals from this directory instead of the wiki
        #[arg(long)]
        local_dir: Option<PathBuf>,
    },
    /// Show the target size for a raster image of the given dimensions
    Plan { width: u32, height: u32 },
    /// Convert an SVG length to user units
    Length { text: String },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Command::Resize {
            ref file,
            ref output_stem,
            ref local_dir,
        } => {
            let mut cfg = config::load_config(&cli.config)?;
            if let Some(dir) = &cli.work_dir {
                cfg.work_dir = dir.display().to_string();
            }
            if let Some(optimizer) = &cli.optimizer {
                cfg.svg.optimizer = optimizer.clone();
            }
            if let Some(api_url) = &cli.api_url {
                cfg.wiki.api_url = api_url.clone();
            }
            cfg.validate()?;

            let source: Box<dyn ImageSource> = match local_dir {
                Some(dir) => Box::new(LocalSource::new(dir)),
                None => Box::new(MediaWikiSource::new(&cfg.wiki)?),
            };
            let backend = RustBackend::new();
            let optimizer = ScourOptimizer::new(&cfg.svg.optimizer);
            let resizer = Resizer::new(source.as_ref(), &backend, &optimizer, &cfg.work_dir);

            let stem = output_stem.clone().unwrap_or_else(naming::random_stem);
            let outcome = resizer.resize(file, &stem)?;
            output::print_outcome(&outcome);
        }
        Command::Plan { width, height } => {
            if width == 0 || height == 0 {
                return Err("width and height must be positive".into());
            }
            let size = calculate_new_size(f64::from(width), f64::from(height));
            output::print_plan(width, height, &size);
        }
        Command::Length { ref text } => {
            let value = parse_length(text)?;
            output::print_length(text, value);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
