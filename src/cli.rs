use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::source::{FixtureSource, FixtureTrack};
use crate::types::TrackSelection;

#[derive(Parser, Debug)]
#[command(
    name = "tonecoach",
    version,
    about = "Compare the pitch contour of a reference phrase with your own recording"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the trimmed, onset-aligned trace of a pitch analysis as JSON.
    Trace(TraceArgs),
    /// Compare two pre-recorded analyses with their audio.
    Compare(CompareArgs),
    /// Fetch the reference and analyze a recording through the backend.
    Live(LiveArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TraceArgs {
    /// Pitch analysis JSON ({"time": [...], "pitch": [...]}).
    #[arg(long)]
    pub input: PathBuf,
    /// Track the analysis belongs to.
    #[arg(long, value_enum, default_value_t = TrackSelection::User)]
    pub track: TrackSelection,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[arg(long = "reference-pitch")]
    pub reference_pitch: PathBuf,
    #[arg(long = "reference-audio")]
    pub reference_audio: PathBuf,
    #[arg(long = "learner-pitch")]
    pub learner_pitch: PathBuf,
    #[arg(long = "learner-audio")]
    pub learner_audio: PathBuf,
    /// Optional phrase shown above the chart.
    #[arg(long)]
    pub phrase: Option<String>,
}

impl CompareArgs {
    pub fn fixture_source(&self) -> FixtureSource {
        FixtureSource::new(
            FixtureTrack {
                pitch_path: self.reference_pitch.clone(),
                audio_path: self.reference_audio.clone(),
            },
            FixtureTrack {
                pitch_path: self.learner_pitch.clone(),
                audio_path: self.learner_audio.clone(),
            },
        )
        .with_title(self.phrase.clone())
    }
}

#[derive(Args, Debug, Clone)]
pub struct LiveArgs {
    /// Your recorded attempt.
    #[arg(long = "learner-audio")]
    pub learner_audio: PathBuf,
    /// Index into the backend phrase deck (wraps around).
    #[arg(long = "phrase-index", default_value_t = 0)]
    pub phrase_index: usize,
    /// Backend base URL (defaults to $TONECOACH_BACKEND_URL or localhost:8000).
    #[arg(long = "backend-url")]
    pub backend_url: Option<String>,
    /// Directory for downloaded reference audio.
    #[arg(long = "cache-dir")]
    pub cache_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use crate::source::PitchSource;
    use crate::types::TrackSelection;
    use clap::Parser;

    #[test]
    fn trace_defaults_to_user_track() {
        let cli = Cli::try_parse_from(["tonecoach", "trace", "--input", "pitch.json"]).unwrap();
        let Command::Trace(args) = cli.command else {
            panic!("expected trace command");
        };
        assert_eq!(args.track, TrackSelection::User);
    }

    #[test]
    fn trace_accepts_reference_track() {
        let cli = Cli::try_parse_from([
            "tonecoach",
            "trace",
            "--input",
            "pitch.json",
            "--track",
            "reference",
        ])
        .unwrap();
        let Command::Trace(args) = cli.command else {
            panic!("expected trace command");
        };
        assert_eq!(args.track, TrackSelection::Reference);
    }

    #[test]
    fn compare_requires_all_four_paths() {
        let result = Cli::try_parse_from([
            "tonecoach",
            "compare",
            "--reference-pitch",
            "ref.json",
            "--reference-audio",
            "ref.wav",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn compare_builds_titled_fixture_source() {
        let cli = Cli::try_parse_from([
            "tonecoach",
            "compare",
            "--reference-pitch",
            "ref.json",
            "--reference-audio",
            "ref.wav",
            "--learner-pitch",
            "me.json",
            "--learner-audio",
            "me.webm",
            "--phrase",
            "你在干嘛呢？",
        ])
        .unwrap();
        let Command::Compare(args) = cli.command else {
            panic!("expected compare command");
        };
        assert_eq!(args.fixture_source().title(), "你在干嘛呢？");
    }

    #[test]
    fn live_defaults_to_first_phrase() {
        let cli =
            Cli::try_parse_from(["tonecoach", "live", "--learner-audio", "take.webm"]).unwrap();
        let Command::Live(args) = cli.command else {
            panic!("expected live command");
        };
        assert_eq!(args.phrase_index, 0);
        assert!(args.backend_url.is_none());
        assert!(args.cache_dir.is_none());
    }
}
