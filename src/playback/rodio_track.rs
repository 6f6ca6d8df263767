use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStreamHandle, Sink};
use tracing::debug;

use crate::audio::decoder::{decode_file, DecodedAudio};

use super::{AudioTrack, TrackEvent};

/// Wall-clock playback position anchored at the last seek offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackClock {
    offset: f64,
    started: Option<Instant>,
}

impl PlaybackClock {
    pub fn paused_at(offset: f64) -> Self {
        Self {
            offset,
            started: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub fn pause(&mut self, now: Instant) {
        self.offset = self.position_at(now);
        self.started = None;
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn position_at(&self, now: Instant) -> f64 {
        match self.started {
            Some(started) => self.offset + now.saturating_duration_since(started).as_secs_f64(),
            None => self.offset,
        }
    }
}

/// Decoded clip played through a rodio sink.
///
/// Seeking halts the sink; `play` builds a new one from the requested offset.
pub struct RodioTrack {
    handle: OutputStreamHandle,
    samples: Arc<[f32]>,
    sample_rate: u32,
    duration: f64,
    clock: PlaybackClock,
    sink: Option<Sink>,
}

impl RodioTrack {
    pub fn new(audio: DecodedAudio, handle: OutputStreamHandle) -> Self {
        let duration = audio.duration_secs();
        Self {
            handle,
            samples: Arc::from(audio.samples),
            sample_rate: audio.sample_rate,
            duration,
            clock: PlaybackClock::default(),
            sink: None,
        }
    }

    pub fn from_file(path: &Path, handle: OutputStreamHandle) -> Result<Self> {
        let audio = decode_file(path)
            .with_context(|| format!("failed to load audio track {}", path.display()))?;
        Ok(Self::new(audio, handle))
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.sink.is_some()
    }

    fn start_index(&self, offset: f64) -> usize {
        ((offset * self.sample_rate as f64) as usize).min(self.samples.len())
    }
}

impl AudioTrack for RodioTrack {
    /// Moves the clock only. Output resumes at the new offset on `play`.
    fn seek(&mut self, seconds: f64) -> Result<()> {
        let target = seconds.clamp(0.0, self.duration);
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.clock = PlaybackClock::paused_at(target);
        debug!(seconds = target, "audio track seeked");
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            if self.clock.is_running() {
                self.clock.pause(Instant::now());
            }
        }
        let start = self.start_index(self.clock.position_at(Instant::now()));
        let sink = Sink::try_new(&self.handle).context("failed to create audio sink")?;
        sink.append(SamplesBuffer::new(
            1,
            self.sample_rate,
            self.samples[start..].to_vec(),
        ));
        sink.play();
        self.clock.start(Instant::now());
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.clock.pause(Instant::now());
    }

    fn poll(&mut self) -> Option<TrackEvent> {
        let sink = self.sink.as_ref()?;
        if sink.empty() {
            self.sink = None;
            self.clock = PlaybackClock::paused_at(self.duration);
            return Some(TrackEvent::Ended);
        }
        let position = self.clock.position_at(Instant::now()).min(self.duration);
        Some(TrackEvent::Progress(position))
    }
}
