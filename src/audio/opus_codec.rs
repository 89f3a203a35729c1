//! Opus decoder handles for recorded microphone streams.
//!
//! - Mono, or one coupled stereo pair: `opus::Decoder`
//! - Any other channel layout: libopus multistream decoder

use super::opus_ms::{self, MsDecoder, OPUS_ALLOC_FAIL};
use super::stream_decoder::{DecoderFactory, DecoderSpec, StreamDecoder};
use crate::error::CodecError;

enum Inner {
    Single(opus::Decoder),
    Multi(MsDecoder),
}

pub struct OpusDecoder {
    inner: Inner,
    channels: usize,
}

impl OpusDecoder {
    /// Create a decoder for the given stream layout.
    pub fn new(spec: &DecoderSpec) -> Result<Self, CodecError> {
        let channels = spec.channel_count as usize;
        let single = match (spec.channel_count, spec.stereo_pair_count) {
            (1, 0) => Some(opus::Channels::Mono),
            (2, 1) => Some(opus::Channels::Stereo),
            _ => None,
        };

        let inner = match single {
            Some(layout) => {
                let decoder = opus::Decoder::new(spec.sample_rate, layout).map_err(|e| {
                    if matches!(e.code(), opus::ErrorCode::AllocFail) {
                        CodecError::Exhausted(e.to_string())
                    } else {
                        CodecError::Init(e.to_string())
                    }
                })?;
                Inner::Single(decoder)
            }
            None => {
                let decoder = MsDecoder::new(
                    spec.sample_rate,
                    spec.channel_count,
                    spec.stream_count(),
                    spec.stereo_pair_count,
                )
                .map_err(|code| {
                    let reason = opus_ms::strerror(code);
                    if code == OPUS_ALLOC_FAIL {
                        CodecError::Exhausted(reason)
                    } else {
                        CodecError::Init(reason)
                    }
                })?;
                Inner::Multi(decoder)
            }
        };

        log::debug!(
            "Opus decoder created: {} ({})",
            spec,
            match inner {
                Inner::Single(_) => "single stream",
                Inner::Multi(_) => "multistream",
            }
        );

        Ok(Self { inner, channels })
    }
}

impl StreamDecoder for OpusDecoder {
    fn decode(
        &mut self,
        data: &[u8],
        max_samples_per_channel: usize,
    ) -> Result<Vec<i16>, CodecError> {
        let mut pcm_buf = vec![0i16; max_samples_per_channel * self.channels];
        let decoded_per_ch = match &mut self.inner {
            Inner::Single(decoder) => decoder
                .decode(data, &mut pcm_buf, false)
                .map_err(|e| CodecError::Decode(e.to_string()))?,
            Inner::Multi(decoder) => decoder
                .decode(data, &mut pcm_buf)
                .map_err(|code| CodecError::Decode(opus_ms::strerror(code)))?,
        };

        if decoded_per_ch == 0 {
            return Err(CodecError::Decode(
                "decoder returned 0 valid samples".to_string(),
            ));
        }

        pcm_buf.truncate(decoded_per_ch * self.channels);
        Ok(pcm_buf)
    }
}

/// Factory building [`OpusDecoder`] handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpusDecoderFactory;

impl DecoderFactory for OpusDecoderFactory {
    fn create(&mut self, spec: &DecoderSpec) -> Result<Box<dyn StreamDecoder>, CodecError> {
        Ok(Box::new(OpusDecoder::new(spec)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(channels: u8, pairs: u8) -> DecoderSpec {
        DecoderSpec {
            channel_count: channels,
            sample_rate: 48000,
            stereo_pair_count: pairs,
        }
    }

    fn encode_mono_sine(frame: usize) -> Vec<u8> {
        let mut encoder =
            opus::Encoder::new(48000, opus::Channels::Mono, opus::Application::Audio).unwrap();
        let pcm: Vec<i16> = (0..frame)
            .map(|i| ((i as f32 * 0.05).sin() * 8000.0) as i16)
            .collect();
        let mut out = vec![0u8; 4000];
        let len = encoder.encode(&pcm, &mut out).unwrap();
        out.truncate(len);
        out
    }

    #[test]
    fn decodes_mono_packet() {
        let packet = encode_mono_sine(960);
        let mut decoder = OpusDecoder::new(&spec(1, 0)).unwrap();
        let pcm = decoder.decode(&packet, 960).unwrap();
        assert_eq!(pcm.len(), 960);
    }

    #[test]
    fn multistream_for_uncoupled_channels() {
        let decoder = OpusDecoder::new(&spec(7, 0)).unwrap();
        assert!(matches!(decoder.inner, Inner::Multi(_)));
        assert_eq!(decoder.channels, 7);
    }

    #[test]
    fn rejects_unsupported_rate() {
        let bad = DecoderSpec {
            channel_count: 1,
            sample_rate: 44100,
            stereo_pair_count: 0,
        };
        assert!(matches!(OpusDecoder::new(&bad), Err(CodecError::Init(_))));
        let bad_multi = DecoderSpec {
            channel_count: 3,
            sample_rate: 44100,
            stereo_pair_count: 0,
        };
        assert!(matches!(OpusDecoder::new(&bad_multi), Err(CodecError::Init(_))));
    }

    #[test]
    fn garbage_packet_is_a_decode_error() {
        let mut decoder = OpusDecoder::new(&spec(2, 1)).unwrap();
        // TOC byte announcing a code-3 packet with an impossible frame count.
        let result = decoder.decode(&[0xff, 0xff], 960);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }
}
