use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::audio::resample::Resampling;
use crate::config::parse_list;
use crate::dataset::{AssembleOptions, TargetFilter};
use crate::features::FeatureSelection;
use crate::labels::{Emotion, VocalChannel};

#[derive(Parser, Debug)]
#[command(name = "emoprep", version)]
#[command(about = "Prepare emotion-labeled speech/song recordings for classification")]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite every raw recording as a mono WAV in the samples directory.
    Normalize(NormalizeArgs),
    /// Print the labels encoded in recording file names.
    Labels(LabelsArgs),
    /// Build a feature dataset from the samples directory.
    Extract(ExtractArgs),
    /// Render a spectrogram or waveform of one recording.
    Plot(PlotArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// Tree of raw recordings (searched recursively)
    #[arg(long = "raw-dir", value_name = "DIR")]
    pub raw_dir: Option<PathBuf>,
    /// Destination for mono copies
    #[arg(long = "samples-dir", value_name = "DIR")]
    pub samples_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct LabelsArgs {
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Per-coefficient mean vectors
    Flat,
    /// Padded, standardized matrices
    Matrix,
    Both,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Directory of normalized recordings
    #[arg(long = "samples-dir", value_name = "DIR")]
    pub samples_dir: Option<PathBuf>,
    /// Comma separated emotions to keep (names or two-digit codes)
    #[arg(long, value_name = "LIST")]
    pub emotions: String,
    /// Comma separated actor ids to keep, e.g. 01,02
    #[arg(long, value_name = "LIST")]
    pub actors: String,
    /// Comma separated vocal channels to keep [default: speech,song]
    #[arg(long, value_name = "LIST")]
    pub channels: Option<String>,
    #[arg(long, value_enum, default_value_t = ExtractMode::Flat)]
    pub mode: ExtractMode,
    /// Skip MFCCs
    #[arg(long = "no-mfcc")]
    pub no_mfcc: bool,
    /// Skip chroma
    #[arg(long = "no-chroma")]
    pub no_chroma: bool,
    /// Skip the mel spectrogram
    #[arg(long = "no-mel")]
    pub no_mel: bool,
    /// Keep decoded waveforms in the output
    #[arg(long = "keep-wave")]
    pub keep_wave: bool,
    /// Process files on all cores
    #[arg(long)]
    pub parallel: bool,
    /// JSON file overriding analysis parameters
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Where to write the dataset JSON
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,
}

impl ExtractArgs {
    pub fn target_filter(&self) -> Result<TargetFilter> {
        let emotions: Vec<Emotion> = parse_list(&self.emotions)?;
        let actors: Vec<String> = self
            .actors
            .split(',')
            .map(str::trim)
            .filter(|actor| !actor.is_empty())
            .map(String::from)
            .collect();
        ensure!(!actors.is_empty(), "--actors contains no entries");

        let filter = TargetFilter::new(emotions, actors);
        match &self.channels {
            Some(raw) => Ok(filter.with_channels(parse_list::<VocalChannel>(raw)?)),
            None => Ok(filter),
        }
    }

    pub fn assemble_options(&self) -> Result<AssembleOptions> {
        let selection = FeatureSelection {
            mfcc: !self.no_mfcc,
            chroma: !self.no_chroma,
            mel: !self.no_mel,
        };
        ensure!(
            !selection.is_empty(),
            "at least one of MFCC, chroma or mel must stay enabled"
        );
        Ok(AssembleOptions {
            selection,
            flat: matches!(self.mode, ExtractMode::Flat | ExtractMode::Both),
            matrix: matches!(self.mode, ExtractMode::Matrix | ExtractMode::Both),
            keep_wave: self.keep_wave,
            parallel: self.parallel,
        })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Spectrogram,
    Waveform,
}

#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    #[arg(value_enum)]
    pub kind: PlotKind,
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    /// PNG file to write
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,
    /// Logarithmic frequency axis for spectrograms
    #[arg(long = "log-freq")]
    pub log_freq: bool,
    #[arg(long = "hop-length", default_value_t = 1024)]
    pub hop_length: usize,
    #[arg(long, default_value_t = 640)]
    pub width: u32,
    #[arg(long, default_value_t = 256)]
    pub height: u32,
    /// Resample by linear interpolation instead of the band-limited filter
    #[arg(long)]
    pub fast: bool,
}

impl PlotArgs {
    pub fn resampling(&self) -> Resampling {
        if self.fast {
            Resampling::Linear
        } else {
            Resampling::BandLimited
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.hop_length > 0, "hop length must be positive");
        ensure!(
            self.width > 0 && self.height > 0,
            "image size must be positive"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(args: &[&str]) -> ExtractArgs {
        let mut argv = vec!["emoprep", "extract", "--output", "out.json"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Extract(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn extract_defaults_to_flat_all_features() {
        let args = extract(&["--emotions", "happy,sad", "--actors", "01"]);
        let options = args.assemble_options().unwrap();
        assert!(options.flat && !options.matrix);
        assert_eq!(options.selection, FeatureSelection::ALL);

        let filter = args.target_filter().unwrap();
        assert_eq!(filter.emotions.len(), 2);
        assert_eq!(filter.channels.len(), 2);
        assert!(filter.actors.contains("01"));
    }

    #[test]
    fn channels_and_mode_are_parsed() {
        let args = extract(&[
            "--emotions",
            "angry",
            "--actors",
            "01, 02",
            "--channels",
            "song",
            "--mode",
            "both",
            "--no-chroma",
        ]);
        let filter = args.target_filter().unwrap();
        assert_eq!(filter.channels.len(), 1);
        assert!(filter.channels.contains(&VocalChannel::Song));
        assert!(filter.actors.contains("02"));

        let options = args.assemble_options().unwrap();
        assert!(options.flat && options.matrix);
        assert!(!options.selection.chroma);
    }

    #[test]
    fn rejects_disabling_everything() {
        let args = extract(&[
            "--emotions",
            "calm",
            "--actors",
            "01",
            "--no-mfcc",
            "--no-chroma",
            "--no-mel",
        ]);
        assert!(args.assemble_options().is_err());
    }

    #[test]
    fn rejects_unknown_emotion() {
        let args = extract(&["--emotions", "bored", "--actors", "01"]);
        assert!(args.target_filter().is_err());
    }

    #[test]
    fn plot_parses_kind() {
        let cli = Cli::try_parse_from([
            "emoprep",
            "plot",
            "spectrogram",
            "a.wav",
            "-o",
            "a.png",
            "--log-freq",
        ])
        .unwrap();
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        assert_eq!(args.kind, PlotKind::Spectrogram);
        assert!(args.log_freq);
        assert_eq!(args.hop_length, 1024);
        assert_eq!(args.resampling(), Resampling::BandLimited);
        args.validate().unwrap();
    }
}
