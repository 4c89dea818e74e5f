use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use image::ImageReader;
use time::UtcOffset;
use tracing::{info, info_span, warn};

use platescan::logging::init_tracing;
use platescan::recognition::ocr::{OcrsEngine, default_model_dir};
use platescan::server::{self, AppState};
use platescan::{PlateLocator, PlatePipeline, PlateService, ProcessConfig, SharedEngine, TextEngine, TextRecognizer};

#[derive(Parser)]
#[command(name = "platescan")]
#[command(about = "Locate and read license plates in vehicle images")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    engines: EngineArgs,
}

#[derive(Args)]
struct EngineArgs {
    /// Directory holding text-detection.rten and text-recognition.rten
    #[arg(long, env = "OCRS_MODEL_DIR", global = true)]
    model_dir: Option<PathBuf>,

    /// Tesseract tessdata directory (tesseract feature only)
    #[arg(long, env = "TESSDATA_PREFIX", global = true)]
    tessdata: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Read the plate in a single image file
    Detect {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Save the original and cropped plate images
        #[arg(long)]
        save_output: bool,

        /// Root directory for saved images
        #[arg(long, value_name = "DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Skip OCR step (only report the located region)
        #[arg(long)]
        skip_ocr: bool,
    },
    /// Run the HTTP service
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,

        /// Root directory for saved images
        #[arg(long, value_name = "DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Do not save images of processed requests
        #[arg(long)]
        no_save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Must be read before any other thread starts
    let local_offset = UtcOffset::current_local_offset();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let utc_offset = local_offset.unwrap_or_else(|e| {
        warn!("Could not determine local UTC offset, dating artifacts in UTC: {}", e);
        UtcOffset::UTC
    });

    match cli.command {
        Command::Detect {
            image_path,
            save_output,
            output_dir,
            skip_ocr,
        } => {
            info!("Loading image: {:?}", image_path);
            let img = ImageReader::open(&image_path)?
                .decode()
                .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
            info!("Image loaded: {}x{}", img.width(), img.height());

            if skip_ocr {
                let locator = PlateLocator::new().with_span(info_span!("plate_locator"));
                match locator.locate(&img)? {
                    Some(region) => {
                        let b = region.bbox;
                        println!("Plate region at ({}, {}) size {}x{}", b.x, b.y, b.width, b.height);
                    }
                    None => println!("No license plate detected."),
                }
                return Ok(());
            }

            let secondary = secondary_engine(&cli.engines)?;
            let service = build_service(&cli.engines, &secondary)?;
            let config = ProcessConfig {
                save_output,
                output_dir,
                utc_offset,
            };
            let outcome = service.handle(&img, &config);
            secondary.teardown();

            let outcome = outcome?;
            match (outcome.region(), outcome.text()) {
                (Some(region), Some(text)) => {
                    let b = region.bbox;
                    println!("{}", text);
                    info!("Plate region at ({}, {}) size {}x{}", b.x, b.y, b.width, b.height);
                }
                _ => println!("No license plate detected."),
            }
            Ok(())
        }
        Command::Serve {
            host,
            port,
            output_dir,
            no_save,
        } => {
            let secondary = secondary_engine(&cli.engines)?;
            secondary
                .warm_up()
                .context("Failed to initialize the fallback OCR engine")?;

            let state = AppState {
                service: Arc::new(build_service(&cli.engines, &secondary)?),
                config: ProcessConfig {
                    save_output: !no_save,
                    output_dir,
                    utc_offset,
                },
            };

            let runtime = tokio::runtime::Runtime::new()?;
            let served = runtime.block_on(server::start_server(SocketAddr::new(host, port), state));
            secondary.teardown();
            served
        }
    }
}

fn secondary_engine(args: &EngineArgs) -> anyhow::Result<Arc<SharedEngine<OcrsEngine>>> {
    let model_dir = match &args.model_dir {
        Some(dir) => dir.clone(),
        None => default_model_dir()?,
    };
    Ok(Arc::new(SharedEngine::new("ocrs", move || OcrsEngine::load(&model_dir))))
}

fn build_service(
    args: &EngineArgs,
    secondary: &Arc<SharedEngine<OcrsEngine>>,
) -> anyhow::Result<PlateService> {
    let primary = primary_engine(args, secondary)?;
    let recognizer = TextRecognizer::new(primary, secondary.clone())
        .with_span(info_span!("text_recognizer"));
    let locator = PlateLocator::new().with_span(info_span!("plate_locator"));
    Ok(PlateService::new(PlatePipeline::new(locator, recognizer)))
}

#[cfg(feature = "tesseract")]
fn primary_engine(
    args: &EngineArgs,
    _secondary: &Arc<SharedEngine<OcrsEngine>>,
) -> anyhow::Result<Arc<dyn TextEngine>> {
    use platescan::recognition::TesseractEngine;

    let engine = TesseractEngine::new(args.tessdata.as_deref())
        .context("Failed to initialize Tesseract")?;
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "tesseract"))]
fn primary_engine(
    args: &EngineArgs,
    secondary: &Arc<SharedEngine<OcrsEngine>>,
) -> anyhow::Result<Arc<dyn TextEngine>> {
    use platescan::recognition::{PLATE_CHARSET, WhitelistEngine};

    if args.tessdata.is_some() {
        tracing::warn!("--tessdata ignored: built without the tesseract feature");
    }
    Ok(Arc::new(WhitelistEngine::new(secondary.clone(), PLATE_CHARSET)))
}
