//! Extract identity fields from a Driving Licence or Voter ID photograph into JSON.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use idcard_ort::{models::CtpnModel, ocr::TesseractAgent, ort::Session, Pipeline};

/// Reads a card image and writes its fields to a `.json` file next to it.
#[derive(Parser)]
#[command(name = "idcard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Card image (png, jpeg)
    image: PathBuf,

    /// CTPN text line detector in ONNX format
    #[arg(long, default_value = "data/ctpn.onnx", conflicts_with = "hf_repo")]
    model: PathBuf,

    /// Fetch the detector from this Hugging Face repository instead
    #[arg(long, requires = "hf_file")]
    hf_repo: Option<String>,

    /// File name of the detector within --hf-repo
    #[arg(long)]
    hf_file: Option<String>,

    /// Minimum text line score kept from the detector
    #[arg(long, default_value_t = CtpnModel::DEFAULT_LINE_MIN_SCORE)]
    min_score: f32,

    /// Tesseract traineddata directory
    #[arg(long, default_value = "tessdata")]
    tessdata: String,

    /// Tesseract language(s)
    #[arg(long, default_value = "eng")]
    lang: Vec<String>,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let detector = match (&cli.hf_repo, &cli.hf_file) {
        (Some(repo), Some(file)) => {
            CtpnModel::configure_pretrained(repo, file, cli.min_score, Session::builder()?)?
        }
        _ => CtpnModel::new_from_file(&cli.model, "ctpn", cli.min_score, Session::builder()?)?,
    };

    let lang: Vec<&str> = cli.lang.iter().map(String::as_str).collect();
    let ocr = TesseractAgent::new_data_path(&cli.tessdata, &lang)?;

    let mut pipeline = Pipeline::new(detector, ocr);

    tracing::info!("processing {}", cli.image.display());
    let (output, extraction) = pipeline.process_file(&cli.image)?;

    tracing::info!(
        "wrote {} record with {} field(s) to {}",
        extraction.doc_type.tag(),
        extraction.record.len(),
        output.display()
    );

    Ok(())
}
