//! Interpretation of audio record descriptors.
//!
//! Configuration records carry the stream layout, data records carry the
//! per-sample capture timestamps and the mute flag. Parsing goes into
//! temporaries first so a rejected descriptor never touches held state.

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::record::{Descriptor, SampleFormat};

/// Audio stream configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    /// ID of the recorded stream
    pub stream_id: u32,
    /// Number of microphones used
    pub num_channels: u8,
    /// Number of timestamps per second
    pub sample_rate: u32,
    /// Raw sample format tag, see [`SampleFormat::from_tag`]
    pub sample_format: u8,
}

impl AudioConfig {
    pub fn sample_format(&self) -> SampleFormat {
        SampleFormat::from_tag(self.sample_format)
    }
}

/// Per-record audio metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioDataRecord {
    /// Capture timestamps in the device time domain, one per sample
    pub capture_timestamps_ns: Vec<i64>,
    pub audio_muted: u8,
}

impl AudioDataRecord {
    pub fn is_muted(&self) -> bool {
        self.audio_muted != 0
    }
}

#[derive(Deserialize)]
struct AudioConfigLayout {
    stream_id: u32,
    num_channels: u8,
    sample_rate: u32,
    sample_format: u8,
}

#[derive(Deserialize)]
struct AudioDataLayout {
    capture_timestamps_ns: Vec<i64>,
    audio_muted: u8,
}

fn expect_object(descriptor: &Descriptor) -> Result<(), MetadataError> {
    if descriptor.is_object() {
        Ok(())
    } else {
        Err(MetadataError::NotAnObject)
    }
}

/// Read a configuration descriptor.
pub fn read_config(descriptor: &Descriptor) -> Result<AudioConfig, MetadataError> {
    expect_object(descriptor)?;
    let layout = AudioConfigLayout::deserialize(descriptor)?;
    if layout.num_channels == 0 {
        return Err(MetadataError::ZeroChannels);
    }
    if layout.sample_rate == 0 {
        return Err(MetadataError::ZeroSampleRate);
    }
    Ok(AudioConfig {
        stream_id: layout.stream_id,
        num_channels: layout.num_channels,
        sample_rate: layout.sample_rate,
        sample_format: layout.sample_format,
    })
}

/// Read a data descriptor.
pub fn read_data_record(descriptor: &Descriptor) -> Result<AudioDataRecord, MetadataError> {
    expect_object(descriptor)?;
    let layout = AudioDataLayout::deserialize(descriptor)?;
    Ok(AudioDataRecord {
        capture_timestamps_ns: layout.capture_timestamps_ns,
        audio_muted: layout.audio_muted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_config() {
        let config = read_config(&json!({
            "stream_id": 231,
            "num_channels": 7,
            "sample_rate": 48000,
            "sample_format": 3,
        }))
        .unwrap();
        assert_eq!(config.num_channels, 7);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.sample_format(), SampleFormat::S32Le);
    }

    #[test]
    fn missing_config_field() {
        let err = read_config(&json!({
            "stream_id": 231,
            "num_channels": 2,
            "sample_format": 3,
        }))
        .unwrap_err();
        assert!(matches!(err, MetadataError::Layout(_)));
        assert!(err.to_string().contains("sample_rate"), "{err}");
    }

    #[test]
    fn zero_channels_and_rate() {
        let zero_channels = json!({
            "stream_id": 1, "num_channels": 0, "sample_rate": 48000, "sample_format": 3
        });
        let zero_rate = json!({
            "stream_id": 1, "num_channels": 2, "sample_rate": 0, "sample_format": 3
        });
        assert!(matches!(read_config(&zero_channels), Err(MetadataError::ZeroChannels)));
        assert!(matches!(read_config(&zero_rate), Err(MetadataError::ZeroSampleRate)));
    }

    #[test]
    fn out_of_range_channel_count() {
        let err = read_config(&json!({
            "stream_id": 1, "num_channels": 300, "sample_rate": 48000, "sample_format": 3
        }));
        assert!(matches!(err, Err(MetadataError::Layout(_))));
    }

    #[test]
    fn reads_data_record() {
        let record = read_data_record(&json!({
            "capture_timestamps_ns": [100, 200, 300],
            "audio_muted": 1,
        }))
        .unwrap();
        assert_eq!(record.capture_timestamps_ns, vec![100, 200, 300]);
        assert!(record.is_muted());
    }

    #[test]
    fn rejects_non_object_and_bad_types() {
        assert!(matches!(
            read_data_record(&json!([1, 2, 3])),
            Err(MetadataError::NotAnObject)
        ));
        assert!(read_data_record(&json!({
            "capture_timestamps_ns": "soon",
            "audio_muted": 0,
        }))
        .is_err());
    }
}
