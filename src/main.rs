use clap::{Parser, Subcommand};
use cropthumb::batch::{self, BatchItem};
use cropthumb::config::{self, Dimension, Overrides};
use cropthumb::files;
use cropthumb::imaging::{RustBackend, SourceSize};
use cropthumb::output;
use std::path::{Path, PathBuf};

/// Thumbnail geometry flags, shared by `run` and `plan`.
#[derive(clap::Args, Clone)]
struct GeometryArgs {
    /// Thumbnail width in pixels, or "auto" to derive it from the source
    #[arg(long, value_name = "PX|auto")]
    width: Option<Dimension>,

    /// Thumbnail height in pixels, or "auto" to derive it from the source
    #[arg(long, value_name = "PX|auto")]
    height: Option<Dimension>,

    /// How far to crop toward the center: 1.0 tight, 0.0 whole frame
    #[arg(long, value_name = "F")]
    crop_amount: Option<f64>,

    /// Allow the crop target to exceed the source size
    #[arg(long, overrides_with = "no_upscale")]
    upscale: bool,

    /// Never size the crop target beyond the source
    #[arg(long, overrides_with = "upscale")]
    no_upscale: bool,
}

#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Source to destination mappings, e.g. photos/cat.jpg=thumbs/cat.jpg
    #[arg(value_name = "SRC=DEST")]
    mappings: Vec<String>,

    /// Thumbnail every image under this directory
    #[arg(long, requires = "dest_dir")]
    src_dir: Option<PathBuf>,

    /// Mirror --src-dir into this directory
    #[arg(long, requires = "src_dir")]
    dest_dir: Option<PathBuf>,

    #[command(flatten)]
    geometry: GeometryArgs,

    /// Replace thumbnails that already exist
    #[arg(long, overrides_with = "no_overwrite")]
    overwrite: bool,

    /// Skip thumbnails that already exist
    #[arg(long, overrides_with = "overwrite")]
    no_overwrite: bool,

    /// Keep the destination name instead of inserting the width
    #[arg(long, overrides_with = "change_name")]
    keep_name: bool,

    /// Insert the width into the destination name
    #[arg(long, overrides_with = "keep_name")]
    change_name: bool,
}

#[derive(Parser)]
#[command(name = "cropthumb")]
#[command(about = "Crop-and-resize thumbnail generator")]
#[command(long_about = "\
Crop-and-resize thumbnail generator

Each thumbnail is cut from a centered region of its source and resized to
exactly WIDTHxHEIGHT. crop_amount picks the region: 1.0 is the tightest
centered crop with the thumbnail's aspect ratio, 0.0 keeps the whole frame.

Files to process come from [[files]] in cropthumb.toml, SRC=DEST arguments,
or --src-dir/--dest-dir. With change_name on (the default) the width is
inserted into the output name: thumbs/cat.jpg -> thumbs/cat.200.jpg.
Existing thumbnails are skipped unless --overwrite is given.

Run 'cropthumb gen-config' to generate a documented cropthumb.toml.
Set RUST_LOG=debug to see computed crop plans.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./cropthumb.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create thumbnails for all configured and given files
    Run(RunArgs),
    /// Print the crop plan for a source size as JSON, without touching files
    Plan {
        /// Source image size
        #[arg(value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
        size: SourceSize,

        #[command(flatten)]
        geometry: GeometryArgs,
    },
    /// Print a stock cropthumb.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config_file = config::config_path(cli.config.as_deref());

    match cli.command {
        Command::Run(args) => {
            let job = config::load_config(config_file.as_deref(), &run_overrides(&args))?;
            let thumbnail = job.thumbnail_config()?;

            let base = config_file
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let mut items: Vec<BatchItem> = job.batch_items(&base);
            for mapping in &args.mappings {
                items.push(files::parse_mapping(mapping)?);
            }
            if let (Some(src_dir), Some(dest_dir)) = (&args.src_dir, &args.dest_dir) {
                items.extend(files::expand_dir(src_dir, dest_dir)?);
            }

            if items.is_empty() {
                println!("No files to process");
                return Ok(());
            }
            log::debug!("{} items, config {:?}", items.len(), thumbnail);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::run_batch(
                &RustBackend::new(),
                &items,
                &thumbnail,
                &job.batch_options(),
                Some(tx),
            );
            printer.join().map_err(|_| "output thread panicked")?;
            output::print_summary(&result?);
        }
        Command::Plan { size, geometry } => {
            let job = config::load_config(config_file.as_deref(), &geometry_overrides(&geometry))?;
            let thumbnail = job.thumbnail_config()?;
            println!("{}", output::format_plan_json(size, &thumbnail)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--x` / `--no-x` pair: `None` when neither is given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn geometry_overrides(args: &GeometryArgs) -> Overrides {
    Overrides {
        width: args.width,
        height: args.height,
        crop_amount: args.crop_amount,
        upscale: switch(args.upscale, args.no_upscale),
        ..Overrides::default()
    }
}

fn run_overrides(args: &RunArgs) -> Overrides {
    Overrides {
        overwrite: switch(args.overwrite, args.no_overwrite),
        change_name: switch(args.change_name, args.keep_name),
        ..geometry_overrides(&args.geometry)
    }
}

/// Parse `WIDTHxHEIGHT`, both sides non-zero.
fn parse_size(s: &str) -> Result<SourceSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("invalid dimension {v:?} in {s:?}"))
    };
    Ok(SourceSize::new(parse(w)?, parse(h)?))
}
