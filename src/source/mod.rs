//! Where the two tracks come from: fixture files or the live backend.
//!
//! Both sources hand back the same [`TrackData`], so the chart and the cursor
//! controller never know whether they are showing a demo or a real attempt.

pub mod live;
pub mod phrases;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::types::{PitchAnalysis, TrackPair, TrackSelection};
use phrases::PhraseStep;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse pitch analysis from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend rejected {url}: {message}")]
    Backend { url: String, message: String },
}

/// Pitch analysis and playable audio for one track.
#[derive(Debug, Clone)]
pub struct TrackData {
    pub analysis: PitchAnalysis,
    pub audio_path: PathBuf,
}

pub trait PitchSource {
    fn load(&mut self, track: TrackSelection) -> Result<TrackData, SourceError>;

    /// Heading shown above the chart.
    fn title(&self) -> String {
        "Pitch Comparison".to_string()
    }

    /// `(index, count)` when the source serves a navigable phrase deck.
    fn phrase_position(&self) -> Option<(usize, usize)> {
        None
    }

    /// Move to a neighbouring phrase. Returns false when there is nowhere to go.
    ///
    /// On error the source stays on its current phrase.
    fn step_phrase(&mut self, _step: PhraseStep) -> Result<bool, SourceError> {
        Ok(false)
    }
}

#[derive(Debug, Clone)]
pub struct FixtureTrack {
    pub pitch_path: PathBuf,
    pub audio_path: PathBuf,
}

/// Pre-recorded analysis results stored as JSON next to their audio.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    tracks: TrackPair<FixtureTrack>,
    title: Option<String>,
}

impl FixtureSource {
    pub fn new(reference: FixtureTrack, user: FixtureTrack) -> Self {
        Self {
            tracks: TrackPair::new(reference, user),
            title: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

impl PitchSource for FixtureSource {
    fn load(&mut self, track: TrackSelection) -> Result<TrackData, SourceError> {
        let fixture = self.tracks.get(track);
        let analysis = read_analysis(&fixture.pitch_path)?;
        info!(
            %track,
            path = %fixture.pitch_path.display(),
            frames = analysis.time.len(),
            "loaded pitch fixture"
        );
        Ok(TrackData {
            analysis,
            audio_path: fixture.audio_path.clone(),
        })
    }

    fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| "Pitch Comparison".to_string())
    }
}

pub fn read_analysis(path: &Path) -> Result<PitchAnalysis, SourceError> {
    let raw = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_analysis(&raw, &path.display().to_string())
}

pub fn parse_analysis(raw: &str, origin: &str) -> Result<PitchAnalysis, SourceError> {
    serde_json::from_str(raw).map_err(|source| SourceError::Parse {
        origin: origin.to_string(),
        source,
    })
}
