//! Codec capability used by the decode engine.

use std::fmt;

use crate::error::CodecError;

/// Parameters a decoder handle is built for. Two specs compare equal only
/// when a handle built for one can keep decoding packets of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoderSpec {
    pub channel_count: u8,
    pub sample_rate: u32,
    pub stereo_pair_count: u8,
}

impl DecoderSpec {
    /// Independent streams in the packet: one per stereo pair plus one per mono channel.
    pub fn stream_count(&self) -> u8 {
        self.channel_count - self.coupled_channel_count() + self.stereo_pair_count
    }

    pub fn coupled_channel_count(&self) -> u8 {
        self.stereo_pair_count.saturating_mul(2).min(self.channel_count)
    }

    /// Time span of one sample in nanoseconds.
    pub fn frame_duration_ns(&self) -> f64 {
        1e9 / self.sample_rate as f64
    }
}

impl fmt::Display for DecoderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}ch@{}Hz/{} pairs",
            self.channel_count, self.sample_rate, self.stereo_pair_count
        )
    }
}

/// A persistent decoder handle for compressed audio.
///
/// Implementations keep inter-packet state, so a handle must only be fed
/// packets that follow each other in the stream.
pub trait StreamDecoder: Send {
    /// Decode one packet into interleaved i16 samples.
    ///
    /// `max_samples_per_channel` bounds the decoded frame size.
    fn decode(
        &mut self,
        data: &[u8],
        max_samples_per_channel: usize,
    ) -> Result<Vec<i16>, CodecError>;
}

/// Builds decoder handles for a given spec.
pub trait DecoderFactory {
    fn create(&mut self, spec: &DecoderSpec) -> Result<Box<dyn StreamDecoder>, CodecError>;
}

impl<F> DecoderFactory for F
where
    F: FnMut(&DecoderSpec) -> Result<Box<dyn StreamDecoder>, CodecError>,
{
    fn create(&mut self, spec: &DecoderSpec) -> Result<Box<dyn StreamDecoder>, CodecError> {
        self(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_layout() {
        let seven_mono = DecoderSpec {
            channel_count: 7,
            sample_rate: 48000,
            stereo_pair_count: 0,
        };
        assert_eq!(seven_mono.stream_count(), 7);
        assert_eq!(seven_mono.coupled_channel_count(), 0);

        let stereo = DecoderSpec {
            channel_count: 2,
            sample_rate: 48000,
            stereo_pair_count: 1,
        };
        assert_eq!(stereo.stream_count(), 1);

        let mixed = DecoderSpec {
            channel_count: 5,
            sample_rate: 48000,
            stereo_pair_count: 2,
        };
        assert_eq!(mixed.stream_count(), 3);
    }

    #[test]
    fn frame_duration() {
        let spec = DecoderSpec {
            channel_count: 1,
            sample_rate: 48000,
            stereo_pair_count: 0,
        };
        assert!((spec.frame_duration_ns() - 20833.333).abs() < 0.001);
    }
}
