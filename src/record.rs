//! Record model shared with the container layer.
//!
//! The container delivers records in file order. Each record has a header
//! (`CurrentRecord`), a key/value descriptor and, for data records, one audio
//! content block.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Recordable type id of audio streams.
pub const AUDIO_RECORDABLE_TYPE_ID: u16 = 231;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId {
    pub type_id: u16,
    pub instance_id: u16,
}

impl StreamId {
    pub fn new(type_id: u16, instance_id: u16) -> Self {
        Self {
            type_id,
            instance_id,
        }
    }

    /// Numeric name such as `231-1`.
    pub fn numeric_name(&self) -> String {
        format!("{}-{}", self.type_id, self.instance_id)
    }

    pub fn name(&self) -> &'static str {
        if self.type_id == AUDIO_RECORDABLE_TYPE_ID {
            "Audio"
        } else {
            "Stream"
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.name(), self.instance_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Configuration,
    State,
    Data,
}

/// Header of the record currently being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentRecord {
    pub stream_id: StreamId,
    pub record_type: RecordType,
    /// Record timestamp in seconds
    pub timestamp: f64,
}

/// Structured key/value descriptor attached to a record.
pub type Descriptor = serde_json::Value;

/// Per-sample encoding of audio data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    S16Le,
    S24Le,
    S32Le,
    F32Le,
    Unknown(u8),
}

impl SampleFormat {
    /// Map the numeric tag stored in configuration descriptors.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            1 => SampleFormat::S16Le,
            2 => SampleFormat::S24Le,
            3 => SampleFormat::S32Le,
            4 => SampleFormat::F32Le,
            other => SampleFormat::Unknown(other),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            SampleFormat::S16Le => 1,
            SampleFormat::S24Le => 2,
            SampleFormat::S32Le => 3,
            SampleFormat::F32Le => 4,
            SampleFormat::Unknown(tag) => *tag,
        }
    }

    pub fn bytes_per_sample(&self) -> Option<usize> {
        match self {
            SampleFormat::S16Le => Some(2),
            SampleFormat::S24Le => Some(3),
            SampleFormat::S32Le | SampleFormat::F32Le => Some(4),
            SampleFormat::Unknown(_) => None,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFormat::S16Le => f.write_str("int16le"),
            SampleFormat::S24Le => f.write_str("int24le"),
            SampleFormat::S32Le => f.write_str("int32le"),
            SampleFormat::F32Le => f.write_str("float32le"),
            SampleFormat::Unknown(tag) => write!(f, "unknown({tag})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecId {
    Opus,
}

/// Declared encoding of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockFormat {
    Linear,
    Compressed(CodecId),
}

/// Channel/sample-rate/format spec attached to an audio content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioBlockSpec {
    pub sample_format: SampleFormat,
    pub channel_count: u8,
    pub sample_rate: u32,
    /// Samples per channel; 0 when the block does not declare it
    pub sample_count: u32,
    #[serde(default)]
    pub stereo_pair_count: u8,
}

impl fmt::Display for AudioBlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "audio/{}/channels={}/rate={}/samples={}",
            self.sample_format, self.channel_count, self.sample_rate, self.sample_count
        )?;
        if self.stereo_pair_count > 0 {
            write!(f, "/stereo_pairs={}", self.stereo_pair_count)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub format: BlockFormat,
    pub spec: AudioBlockSpec,
    pub payload: Bytes,
}

impl ContentBlock {
    pub fn linear(spec: AudioBlockSpec, payload: impl Into<Bytes>) -> Self {
        Self {
            format: BlockFormat::Linear,
            spec,
            payload: payload.into(),
        }
    }

    pub fn opus(spec: AudioBlockSpec, payload: impl Into<Bytes>) -> Self {
        Self {
            format: BlockFormat::Compressed(CodecId::Opus),
            spec,
            payload: payload.into(),
        }
    }

    pub fn block_size(&self) -> usize {
        self.payload.len()
    }

    pub fn describe(&self) -> String {
        match self.format {
            BlockFormat::Linear => self.spec.to_string(),
            BlockFormat::Compressed(CodecId::Opus) => format!("{}/opus", self.spec),
        }
    }
}

/// One record as delivered by the container: header, descriptor, optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub header: CurrentRecord,
    pub descriptor: Descriptor,
    pub block: Option<ContentBlock>,
}

/// Serialized form of a record, used by record dumps.
///
/// Payload bytes are stored as a plain integer array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDump {
    pub stream_id: StreamId,
    pub record_type: RecordType,
    pub timestamp: f64,
    pub descriptor: Descriptor,
    #[serde(default)]
    pub block: Option<BlockDump>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDump {
    pub format: BlockFormat,
    pub spec: AudioBlockSpec,
    pub payload: Vec<u8>,
}

impl From<RecordDump> for Record {
    fn from(dump: RecordDump) -> Self {
        Record {
            header: CurrentRecord {
                stream_id: dump.stream_id,
                record_type: dump.record_type,
                timestamp: dump.timestamp,
            },
            descriptor: dump.descriptor,
            block: dump.block.map(|b| ContentBlock {
                format: b.format,
                spec: b.spec,
                payload: Bytes::from(b.payload),
            }),
        }
    }
}
