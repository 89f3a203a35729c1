//! Turns audio content blocks into sample buffers.
//!
//! Linear blocks are converted directly. Compressed blocks go through a
//! persistent decoder handle which is only reused while the stream layout is
//! unchanged and records arrive back to back. Anything else (first use, a
//! layout change, a seek) tears the handle down and builds a new one before
//! decoding.

use std::fmt;

use super::pcm;
use super::samples::AudioData;
use super::stream_decoder::{DecoderFactory, DecoderSpec, StreamDecoder};
use crate::config::PlayerConfig;
use crate::error::{CodecError, PlayerError};
use crate::metadata::AudioDataRecord;
use crate::record::{BlockFormat, CodecId, ContentBlock, SampleFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuity {
    /// Nothing decoded since the handle was built
    Fresh,
    /// Timestamp of the last sample decoded by this handle
    After(i64),
    /// Handle state can no longer be matched to a timestamp
    Broken,
}

struct DecoderState {
    handle: Box<dyn StreamDecoder>,
    spec: DecoderSpec,
    continuity: Continuity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildReason {
    FirstUse,
    SpecChanged { previous: DecoderSpec },
    Discontinuity { expected_ns: i64, actual_ns: i64 },
    LostContinuity,
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuildReason::FirstUse => f.write_str("first compressed record"),
            RebuildReason::SpecChanged { previous } => write!(f, "spec changed from {previous}"),
            RebuildReason::Discontinuity {
                expected_ns,
                actual_ns,
            } => write!(
                f,
                "non-sequential record: expected {expected_ns} ns, got {actual_ns} ns"
            ),
            RebuildReason::LostContinuity => f.write_str("previous record left the decoder unsynced"),
        }
    }
}

pub struct DecodeEngine<F> {
    factory: F,
    state: Option<DecoderState>,
    continuity_tolerance: f64,
    max_opus_frame_ms: u32,
    generation: u64,
    last_rebuild: Option<RebuildReason>,
}

impl<F: DecoderFactory> DecodeEngine<F> {
    pub fn new(factory: F, config: &PlayerConfig) -> Self {
        Self {
            factory,
            state: None,
            continuity_tolerance: config.continuity_tolerance,
            max_opus_frame_ms: config.max_opus_frame_ms,
            generation: 0,
            last_rebuild: None,
        }
    }

    pub fn apply_config(&mut self, config: &PlayerConfig) {
        self.continuity_tolerance = config.continuity_tolerance;
        self.max_opus_frame_ms = config.max_opus_frame_ms;
    }

    /// Spec of the live decoder handle, if any.
    pub fn decoder_spec(&self) -> Option<DecoderSpec> {
        self.state.as_ref().map(|s| s.spec)
    }

    /// Number of decoder handles built so far.
    pub fn decoder_generation(&self) -> u64 {
        self.generation
    }

    pub fn last_rebuild(&self) -> Option<RebuildReason> {
        self.last_rebuild
    }

    pub fn last_decoded_timestamp_ns(&self) -> Option<i64> {
        match self.state.as_ref()?.continuity {
            Continuity::After(ts) => Some(ts),
            _ => None,
        }
    }

    /// Drop the decoder handle. The next compressed record builds a new one.
    pub fn reset(&mut self) {
        if let Some(state) = self.state.take() {
            log::debug!("Destroying decoder for {}", state.spec);
        }
    }

    /// Decode one content block. `record` must be the metadata of the same record.
    pub fn decode(
        &mut self,
        block: &ContentBlock,
        record: &AudioDataRecord,
    ) -> Result<AudioData, PlayerError> {
        let spec = &block.spec;
        if spec.channel_count == 0 {
            return Err(PlayerError::InvalidSpec("zero channels".to_string()));
        }
        if spec.sample_rate == 0 {
            return Err(PlayerError::InvalidSpec("zero sample rate".to_string()));
        }

        match block.format {
            BlockFormat::Linear => {
                let audio = pcm::read_linear(spec, &block.payload)?;
                check_sample_count(&audio, spec.channel_count, record)?;
                Ok(audio)
            }
            BlockFormat::Compressed(CodecId::Opus) => {
                if spec.sample_format != SampleFormat::S16Le {
                    return Err(PlayerError::UnsupportedFormat(format!(
                        "opus audio with {} samples",
                        spec.sample_format
                    )));
                }
                if spec.stereo_pair_count as usize * 2 > spec.channel_count as usize {
                    return Err(PlayerError::InvalidSpec(format!(
                        "{} stereo pairs in {} channels",
                        spec.stereo_pair_count, spec.channel_count
                    )));
                }
                let decoder_spec = DecoderSpec {
                    channel_count: spec.channel_count,
                    sample_rate: spec.sample_rate,
                    stereo_pair_count: spec.stereo_pair_count,
                };
                self.decode_compressed(block, &decoder_spec, record)
            }
        }
    }

    fn decode_compressed(
        &mut self,
        block: &ContentBlock,
        spec: &DecoderSpec,
        record: &AudioDataRecord,
    ) -> Result<AudioData, PlayerError> {
        let timestamps = &record.capture_timestamps_ns;

        // Silence markers carry no packet; the decoder is not involved.
        if block.payload.is_empty() {
            let audio = AudioData::new(Vec::new(), i16::MAX as f64);
            check_sample_count(&audio, spec.channel_count, record)?;
            return Ok(audio);
        }

        let declared = block.spec.sample_count as usize;
        let (first_ts, last_ts) = match (timestamps.first(), timestamps.last()) {
            (Some(first), Some(last)) if declared == 0 || declared == timestamps.len() => {
                (*first, *last)
            }
            _ => {
                return Err(PlayerError::SampleCountMismatch {
                    decoded: declared,
                    timestamps: timestamps.len(),
                });
            }
        };

        // One Opus packet never holds more than max_opus_frame_ms of audio.
        let frame_cap = (spec.sample_rate as u64 * self.max_opus_frame_ms as u64 / 1000) as usize;
        let max_samples = if declared > 0 {
            declared.min(frame_cap)
        } else {
            frame_cap
        };

        let state = self.ensure_decoder(spec, first_ts)?;
        let pcm = state
            .handle
            .decode(&block.payload, max_samples)
            .map_err(PlayerError::Decode)?;

        let audio = AudioData::new(pcm.into_iter().map(i32::from).collect(), i16::MAX as f64);
        if let Err(e) = check_sample_count(&audio, spec.channel_count, record) {
            state.continuity = Continuity::Broken;
            return Err(e);
        }
        state.continuity = Continuity::After(last_ts);
        Ok(audio)
    }

    fn rebuild_reason(
        &self,
        state: &DecoderState,
        spec: &DecoderSpec,
        first_ts: i64,
    ) -> Option<RebuildReason> {
        if state.spec != *spec {
            return Some(RebuildReason::SpecChanged {
                previous: state.spec,
            });
        }
        match state.continuity {
            Continuity::Fresh => None,
            Continuity::Broken => Some(RebuildReason::LostContinuity),
            Continuity::After(last) => {
                let frame_ns = spec.frame_duration_ns();
                let expected = last as f64 + frame_ns;
                if (first_ts as f64 - expected).abs() <= self.continuity_tolerance * frame_ns {
                    None
                } else {
                    Some(RebuildReason::Discontinuity {
                        expected_ns: expected.round() as i64,
                        actual_ns: first_ts,
                    })
                }
            }
        }
    }

    /// Return a handle valid for `spec` and a record starting at `first_ts`,
    /// rebuilding it when the current one cannot continue.
    fn ensure_decoder(
        &mut self,
        spec: &DecoderSpec,
        first_ts: i64,
    ) -> Result<&mut DecoderState, PlayerError> {
        let reason = match self.state.take() {
            None => RebuildReason::FirstUse,
            Some(state) => match self.rebuild_reason(&state, spec, first_ts) {
                None => return Ok(self.state.insert(state)),
                Some(reason) => {
                    log::debug!("Destroying decoder for {}: {}", state.spec, reason);
                    reason
                }
            },
        };

        let handle = self.factory.create(spec).map_err(|source| match source {
            CodecError::Exhausted(_) => {
                log::error!("Decoder allocation exhausted for {}: {}", spec, source);
                PlayerError::ResourceExhausted {
                    spec: *spec,
                    source,
                }
            }
            source => PlayerError::DecoderInit {
                spec: *spec,
                source,
            },
        })?;
        self.generation += 1;
        self.last_rebuild = Some(reason);
        log::debug!(
            "Built decoder #{} for {} ({})",
            self.generation,
            spec,
            reason
        );
        Ok(self.state.insert(DecoderState {
            handle,
            spec: *spec,
            continuity: Continuity::Fresh,
        }))
    }
}

impl<F> Drop for DecodeEngine<F> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            log::debug!("Destroying decoder for {}", state.spec);
        }
    }
}

fn check_sample_count(
    audio: &AudioData,
    channels: u8,
    record: &AudioDataRecord,
) -> Result<(), PlayerError> {
    let channels = channels as usize;
    let decoded = audio.num_samples(channels);
    let timestamps = record.capture_timestamps_ns.len();
    if audio.data.len() % channels != 0 || decoded != timestamps {
        return Err(PlayerError::SampleCountMismatch {
            decoded,
            timestamps,
        });
    }
    Ok(())
}
