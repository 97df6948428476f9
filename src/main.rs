use clap::{Parser, Subcommand};
use image_editor::edit::{self, EditError};
use image_editor::imaging::{MimeType, codec};
use image_editor::request::RawEditParams;
use image_editor::{config, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Crop and filter parameters, as loose strings so they go through the same
/// validation as any other edit request.
#[derive(clap::Args, Clone, Debug)]
struct EditArgs {
    /// Crop width in pixels (0 or omitted = no crop)
    #[arg(long, allow_hyphen_values = true)]
    width: Option<String>,
    /// Crop height in pixels (0 or omitted = no crop)
    #[arg(long, allow_hyphen_values = true)]
    height: Option<String>,
    /// Crop anchor on the x axis: left, right or center
    #[arg(long)]
    vertical: Option<String>,
    /// Crop anchor on the y axis: top, bottom or center
    #[arg(long)]
    horizontal: Option<String>,
    /// Filter: grayscale, negative or blure
    #[arg(long)]
    filter: Option<String>,
    /// Blur strength (positive; anything else uses the configured default)
    #[arg(long, allow_hyphen_values = true)]
    blur_sigma: Option<String>,
}

impl From<EditArgs> for RawEditParams {
    fn from(args: EditArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            vertical: args.vertical,
            horizontal: args.horizontal,
            filter: args.filter,
            blur_sigma: args.blur_sigma,
        }
    }
}

#[derive(Parser)]
#[command(name = "image-editor")]
#[command(about = "Crop and filter PNG and JPEG images")]
#[command(long_about = "\
Crop and filter PNG and JPEG images

Crop keeps a WIDTHxHEIGHT region anchored by --vertical (left|right|center)
and --horizontal (top|bottom|center). A crop that is not smaller than the
image on both axes is skipped.

Filters:
  grayscale   average of R, G and B
  negative    invert R, G and B
  blure       Gaussian blur, strength set by --blur-sigma

Run 'image-editor gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = defaults)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop and/or filter an image
    Edit {
        /// Input PNG or JPEG
        input: PathBuf,
        /// Where to write the result
        #[arg(short, long)]
        output: PathBuf,
        /// Output type (image/png or image/jpeg); defaults to the output
        /// file extension, then to the input type
        #[arg(long)]
        mime: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        params: EditArgs,
    },
    /// Decode an image and print its format and size
    Check {
        /// Input PNG or JPEG
        input: PathBuf,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Edit {
            input,
            output: output_path,
            mime,
            json,
            params,
        } => {
            let editor_config = config::load_config(&cli.config)?;
            init_thread_pool(&editor_config.processing);
            let target = resolve_target_mime(mime.as_deref(), &output_path)?;
            let report = run_edit(
                &input,
                &output_path,
                params.into(),
                target,
                &editor_config,
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_edit_report(&report, &input, &output_path);
            }
        }
        Command::Check { input } => {
            let bytes = std::fs::read(&input)?;
            let decoded = codec::decode(&bytes)?;
            output::print_check_output(&decoded, &input);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_edit(
    input: &Path,
    output_path: &Path,
    raw: RawEditParams,
    target: Option<MimeType>,
    editor_config: &config::EditorConfig,
) -> Result<edit::EditReport, EditError> {
    let params = raw.resolve(editor_config.filters.default_blur_sigma)?;
    let bytes = std::fs::read(input)?;
    let outcome = edit::edit_image(&bytes, &params, target, editor_config)?;
    std::fs::write(output_path, &outcome.bytes)?;
    Ok(outcome.report)
}

/// Pick the output type: explicit `--mime`, then the output extension.
/// `None` means "same as input".
fn resolve_target_mime(
    mime: Option<&str>,
    output_path: &Path,
) -> Result<Option<MimeType>, codec::CodecError> {
    if let Some(mime) = mime {
        return mime.parse().map(Some);
    }
    Ok(output_path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(MimeType::from_extension))
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "image_editor=debug"
    } else {
        "image_editor=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
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
