use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use emoprep::audio::decoder;
use emoprep::cli::{Cli, Command, ExtractArgs, LabelsArgs, NormalizeArgs, PlotArgs, PlotKind};
use emoprep::config::{FeatureConfig, PrepConfig};
use emoprep::normalize::normalize_tree;
use emoprep::plots::{self, FrequencyScale, SpectrogramOptions};
use emoprep::{DatasetAssembler, FeatureExtractor, FilenameLabels};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Normalize(args) => handle_normalize(args),
        Command::Labels(args) => handle_labels(&args),
        Command::Extract(args) => handle_extract(args),
        Command::Plot(args) => handle_plot(&args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_normalize(args: NormalizeArgs) -> Result<()> {
    let prep = PrepConfig::from_overrides(args.samples_dir, args.raw_dir);
    let raw_dir = prep.existing_raw_dir()?;
    let summary = normalize_tree(&raw_dir, &prep.samples_dir)
        .with_context(|| format!("Failed to normalize recordings under {:?}", raw_dir))?;
    println!(
        "Wrote {} mono files to {:?} ({} downmixed)",
        summary.written.len(),
        prep.samples_dir,
        summary.downmixed
    );
    Ok(())
}

fn handle_labels(args: &LabelsArgs) -> Result<()> {
    for path in &args.files {
        let labels = FilenameLabels::from_path(path)
            .with_context(|| format!("Failed to decode labels of {:?}", path))?;
        let line = serde_json::to_string(&labels).context("Failed to serialize labels")?;
        println!("{line}");
    }
    Ok(())
}

fn handle_extract(args: ExtractArgs) -> Result<()> {
    let filter = args.target_filter()?;
    let options = args.assemble_options()?;
    let config = match &args.config {
        Some(path) => FeatureConfig::load(path)?,
        None => FeatureConfig::default(),
    };
    let extractor = FeatureExtractor::new(config).context("Invalid analysis parameters")?;

    let prep = PrepConfig::from_overrides(args.samples_dir.clone(), None);
    let samples_dir = prep.existing_samples_dir()?;
    let assembler = DatasetAssembler::new(extractor, options);
    let dataset = assembler
        .assemble(&samples_dir, &filter)
        .with_context(|| format!("Failed to read recordings from {:?}", samples_dir))?;

    dataset.write_json(&args.output)?;
    info!(output = %args.output.display(), rows = dataset.len(), "dataset written");
    println!(
        "Wrote {} rows ({} skipped) to {:?}",
        dataset.len(),
        dataset.skipped.len(),
        args.output
    );
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<()> {
    args.validate()?;
    let sample_rate = FeatureConfig::default().sample_rate;
    let clip = decoder::load_clip(&args.input, sample_rate, args.resampling())
        .with_context(|| format!("Failed to load {:?}", args.input))?;

    match args.kind {
        PlotKind::Spectrogram => {
            let options = SpectrogramOptions {
                hop_length: args.hop_length,
                scale: if args.log_freq {
                    FrequencyScale::Log
                } else {
                    FrequencyScale::Linear
                },
                width: args.width,
                height: args.height,
                ..SpectrogramOptions::default()
            };
            plots::render_spectrogram(&clip, &options, &args.output)?;
        }
        PlotKind::Waveform => {
            plots::render_waveform(&clip, args.width, args.height, &args.output)?;
        }
    }
    println!("Wrote {:?}", args.output);
    Ok(())
}
