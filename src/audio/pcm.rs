//! Linear PCM payloads → i32 samples.

use super::samples::AudioData;
use crate::error::PlayerError;
use crate::record::{AudioBlockSpec, SampleFormat};

const S24_MAX: i32 = (1 << 23) - 1;

/// Convert a little-endian linear payload into widened samples.
pub fn read_linear(spec: &AudioBlockSpec, payload: &[u8]) -> Result<AudioData, PlayerError> {
    let bytes_per_sample = match spec.sample_format {
        SampleFormat::S16Le | SampleFormat::S24Le | SampleFormat::S32Le => spec
            .sample_format
            .bytes_per_sample()
            .unwrap_or_default(),
        other => {
            return Err(PlayerError::UnsupportedFormat(format!(
                "linear audio with {other} samples"
            )));
        }
    };

    let expected =
        spec.sample_count as usize * spec.channel_count as usize * bytes_per_sample;
    if payload.len() != expected {
        return Err(PlayerError::PayloadSize {
            expected,
            actual: payload.len(),
        });
    }

    let audio = match spec.sample_format {
        SampleFormat::S16Le => AudioData::new(
            payload
                .chunks_exact(2)
                .map(|c| i16::from_le_bytes([c[0], c[1]]) as i32)
                .collect(),
            i16::MAX as f64,
        ),
        SampleFormat::S24Le => AudioData::new(
            payload
                .chunks_exact(3)
                // Place the 3 bytes in the top of an i32, then shift back to sign-extend.
                .map(|c| i32::from_le_bytes([0, c[0], c[1], c[2]]) >> 8)
                .collect(),
            S24_MAX as f64,
        ),
        _ => AudioData::new(
            payload
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
            i32::MAX as f64,
        ),
    };
    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(sample_format: SampleFormat, channels: u8, samples: u32) -> AudioBlockSpec {
        AudioBlockSpec {
            sample_format,
            channel_count: channels,
            sample_rate: 48000,
            sample_count: samples,
            stereo_pair_count: 0,
        }
    }

    #[test]
    fn s32_passthrough() {
        let samples = [7i32, -7, i32::MAX, i32::MIN];
        let payload: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let audio = read_linear(&spec(SampleFormat::S32Le, 2, 2), &payload).unwrap();
        assert_eq!(audio.data, samples);
        assert_eq!(audio.max_amplitude, i32::MAX as f64);
    }

    #[test]
    fn s16_widens() {
        let payload: Vec<u8> = [-2i16, 300].iter().flat_map(|s| s.to_le_bytes()).collect();
        let audio = read_linear(&spec(SampleFormat::S16Le, 1, 2), &payload).unwrap();
        assert_eq!(audio.data, vec![-2, 300]);
        assert_eq!(audio.max_amplitude, i16::MAX as f64);
    }

    #[test]
    fn s24_sign_extends() {
        // -1, +8388607 (max), -8388608 (min)
        let payload = [0xff, 0xff, 0xff, 0xff, 0xff, 0x7f, 0x00, 0x00, 0x80];
        let audio = read_linear(&spec(SampleFormat::S24Le, 1, 3), &payload).unwrap();
        assert_eq!(audio.data, vec![-1, S24_MAX, -(1 << 23)]);
    }

    #[test]
    fn size_mismatch() {
        let err = read_linear(&spec(SampleFormat::S32Le, 2, 2), &[0u8; 15]).unwrap_err();
        assert!(matches!(
            err,
            PlayerError::PayloadSize {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn float_is_unsupported() {
        let err = read_linear(&spec(SampleFormat::F32Le, 1, 1), &[0u8; 4]).unwrap_err();
        assert!(matches!(err, PlayerError::UnsupportedFormat(_)));
    }
}
