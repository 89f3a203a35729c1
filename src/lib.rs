//! Decoding of timestamped multi-channel audio records.
//!
//! A container layer delivers records for one audio stream in file order,
//! possibly jumping around when seeking. [`AudioPlayer`] interprets each
//! record's descriptor, decodes its content block (linear PCM or Opus) and
//! hands the result to a consumer callback.

pub mod audio;
pub mod config;
pub mod error;
pub mod metadata;
pub mod player;
pub mod record;
pub mod replay;

pub use audio::{AudioData, DecoderFactory, DecoderSpec, SampleMatrix, StreamDecoder};
pub use config::PlayerConfig;
pub use error::{CodecError, MetadataError, PlayerError};
pub use metadata::{AudioConfig, AudioDataRecord};
pub use player::{AudioCallback, AudioPlayer, RecordPlayer};
pub use record::{
    AudioBlockSpec, BlockFormat, CodecId, ContentBlock, CurrentRecord, Descriptor, Record,
    RecordType, SampleFormat, StreamId,
};
pub use replay::{ReplaySummary, replay};
