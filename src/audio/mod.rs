//! audio - Decoding of recorded audio content blocks
//!
//! Linear PCM blocks are widened to i32 directly. Opus blocks are decoded
//! through a persistent decoder handle managed by [`DecodeEngine`].

mod decode_engine;
mod opus_codec;
mod opus_ms;
mod pcm;
mod samples;
pub mod stream_decoder;

pub use decode_engine::{DecodeEngine, RebuildReason};
pub use opus_codec::{OpusDecoder, OpusDecoderFactory};
pub use samples::{AudioData, SampleMatrix, ShapeError};
pub use stream_decoder::{DecoderFactory, DecoderSpec, StreamDecoder};
