use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use tracing::{debug, info};

use super::phrases::{PhraseDeck, PhraseStep};
use super::{PitchSource, SourceError, TrackData};
use crate::types::{PitchAnalysis, TrackSelection};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const FALLBACK_TTS_FILE: &str = "tts_reference.mp3";

#[derive(Debug, Clone, Deserialize)]
pub struct TtsResponse {
    pub audio_url: String,
    pub pitch: PitchAnalysis,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct PhraseResponse {
    phrase: Option<String>,
    error: Option<String>,
}

/// Blocking client for the analysis, TTS and phrase routes.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(http_error(&base_url))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a recording and return its pitch analysis.
    pub fn analyze(&self, recording: &Path) -> Result<PitchAnalysis, SourceError> {
        let url = self.route("analyze/");
        let form = multipart::Form::new()
            .file("file", recording)
            .map_err(|source| SourceError::Io {
                path: recording.to_path_buf(),
                source,
            })?;
        info!(url = %url, recording = %recording.display(), "uploading recording for analysis");
        self.http
            .post(&url)
            .multipart(form)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<PitchAnalysis>())
            .map_err(http_error(&url))
    }

    pub fn tts(&self, text: &str) -> Result<TtsResponse, SourceError> {
        let url = self.route("tts/");
        info!(url = %url, text, "requesting synthesized reference");
        self.http
            .get(&url)
            .query(&[("text", text)])
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<TtsResponse>())
            .map_err(http_error(&url))
    }

    pub fn download(&self, url: &str, target: &Path) -> Result<(), SourceError> {
        let bytes = self
            .http
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .map_err(http_error(url))?;
        fs::write(target, &bytes).map_err(|source| SourceError::Io {
            path: target.to_path_buf(),
            source,
        })?;
        debug!(url, target = %target.display(), bytes = bytes.len(), "downloaded audio");
        Ok(())
    }

    pub fn phrase_count(&self) -> Result<usize, SourceError> {
        let url = self.route("phrases/count");
        let response: CountResponse = self.get_json(&url)?;
        Ok(response.count)
    }

    pub fn phrase(&self, index: usize) -> Result<String, SourceError> {
        let url = self.route(&format!("phrases/{}", index));
        let response: PhraseResponse = self.get_json(&url)?;
        match (response.phrase, response.error) {
            (Some(phrase), _) => Ok(phrase),
            (None, message) => Err(SourceError::Backend {
                url,
                message: message.unwrap_or_else(|| "missing phrase".to_string()),
            }),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        self.http
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<T>())
            .map_err(http_error(url))
    }

    fn route(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn http_error(url: &str) -> impl FnOnce(reqwest::Error) -> SourceError + '_ {
    move |source| SourceError::Http {
        url: url.to_string(),
        source,
    }
}

/// Reference from the TTS service, user track from the uploaded recording.
pub struct LiveSource {
    client: BackendClient,
    deck: PhraseDeck,
    phrase: String,
    recording: PathBuf,
    cache_dir: PathBuf,
}

impl LiveSource {
    pub fn new(
        client: BackendClient,
        deck: PhraseDeck,
        recording: PathBuf,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            deck,
            phrase: String::new(),
            recording,
            cache_dir,
        }
    }

    /// Fetch the text of the phrase the deck currently points at.
    pub fn fetch_phrase(&mut self) -> Result<&str, SourceError> {
        self.phrase = self.client.phrase(self.deck.index())?;
        info!(
            index = self.deck.index(),
            count = self.deck.count(),
            phrase = %self.phrase,
            "loaded practice phrase"
        );
        Ok(&self.phrase)
    }

    fn load_reference(&self) -> Result<TrackData, SourceError> {
        let response = self.client.tts(&self.phrase)?;
        let audio_path = self.cache_dir.join(cached_file_name(&response.audio_url));
        if audio_path.is_file() {
            debug!(path = %audio_path.display(), "reusing cached reference audio");
        } else {
            self.client.download(&response.audio_url, &audio_path)?;
        }
        Ok(TrackData {
            analysis: response.pitch,
            audio_path,
        })
    }

    fn load_user(&self) -> Result<TrackData, SourceError> {
        let analysis = self.client.analyze(&self.recording)?;
        Ok(TrackData {
            analysis,
            audio_path: self.recording.clone(),
        })
    }
}

impl PitchSource for LiveSource {
    fn load(&mut self, track: TrackSelection) -> Result<TrackData, SourceError> {
        match track {
            TrackSelection::Reference => self.load_reference(),
            TrackSelection::User => self.load_user(),
        }
    }

    fn title(&self) -> String {
        self.phrase.clone()
    }

    fn phrase_position(&self) -> Option<(usize, usize)> {
        Some((self.deck.index(), self.deck.count()))
    }

    fn step_phrase(&mut self, step: PhraseStep) -> Result<bool, SourceError> {
        let mut deck = self.deck;
        let index = deck.step(step);
        if index == self.deck.index() {
            return Ok(false);
        }
        let phrase = self.client.phrase(index)?;
        info!(index, count = deck.count(), phrase = %phrase, ?step, "switched practice phrase");
        self.deck = deck;
        self.phrase = phrase;
        Ok(true)
    }
}

/// File name for a downloaded TTS clip, taken from the last URL segment.
pub fn cached_file_name(audio_url: &str) -> String {
    let path = audio_url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .next()
        .and_then(|segment| Path::new(segment).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_TTS_FILE.to_string())
}
