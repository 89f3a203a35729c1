//! Shared fixtures: a scripted codec that records every handle event.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use aria_audio_player::{
    AudioBlockSpec, CodecError, ContentBlock, CurrentRecord, DecoderFactory, DecoderSpec, Record,
    RecordType, SampleFormat, StreamDecoder, StreamId,
};
use serde_json::json;

pub const STREAM: StreamId = StreamId {
    type_id: 231,
    instance_id: 1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Create(usize),
    Decode(usize),
    Destroy(usize),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Each handle decodes a packet to `max` frames whose values are
/// `handle id * 1000 + packet[0]`, so reuse is visible in the output.
pub struct ScriptedDecoder {
    id: usize,
    channels: usize,
    log: EventLog,
}

impl StreamDecoder for ScriptedDecoder {
    fn decode(&mut self, data: &[u8], max: usize) -> Result<Vec<i16>, CodecError> {
        self.log.lock().unwrap().push(Event::Decode(self.id));
        if data.first() == Some(&0xee) {
            return Err(CodecError::Decode("corrupt packet".into()));
        }
        Ok(vec![(self.id * 1000) as i16 + data[0] as i16; max * self.channels])
    }
}

impl Drop for ScriptedDecoder {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(Event::Destroy(self.id));
    }
}

#[derive(Clone, Default)]
pub struct ScriptedFactory {
    pub log: EventLog,
    pub specs: Arc<Mutex<Vec<DecoderSpec>>>,
    next_id: Arc<Mutex<usize>>,
}

impl DecoderFactory for ScriptedFactory {
    fn create(&mut self, spec: &DecoderSpec) -> Result<Box<dyn StreamDecoder>, CodecError> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.log.lock().unwrap().push(Event::Create(id));
        self.specs.lock().unwrap().push(*spec);
        Ok(Box::new(ScriptedDecoder {
            id,
            channels: spec.channel_count as usize,
            log: self.log.clone(),
        }))
    }
}

impl ScriptedFactory {
    pub fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    pub fn creations(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Create(_)))
            .count()
    }
}

pub fn header(record_type: RecordType, timestamp: f64) -> CurrentRecord {
    CurrentRecord {
        stream_id: STREAM,
        record_type,
        timestamp,
    }
}

pub fn config_record(channels: u8, rate: u32, format: SampleFormat) -> Record {
    Record {
        header: header(RecordType::Configuration, 0.0),
        descriptor: json!({
            "stream_id": 231,
            "num_channels": channels,
            "sample_rate": rate,
            "sample_format": format.tag(),
        }),
        block: None,
    }
}

/// Timestamps for `samples` consecutive samples at `rate` starting at `start_ns`.
pub fn timestamps(start_ns: i64, rate: u32, samples: usize) -> Vec<i64> {
    let period = 1_000_000_000 / rate as i64;
    (0..samples as i64).map(|i| start_ns + i * period).collect()
}

pub fn opus_record(
    start_ns: i64,
    channels: u8,
    rate: u32,
    samples: u32,
    packet: Vec<u8>,
) -> Record {
    Record {
        header: header(RecordType::Data, start_ns as f64 / 1e9),
        descriptor: json!({
            "capture_timestamps_ns": timestamps(start_ns, rate, samples as usize),
            "audio_muted": 0,
        }),
        block: Some(ContentBlock::opus(
            AudioBlockSpec {
                sample_format: SampleFormat::S16Le,
                channel_count: channels,
                sample_rate: rate,
                sample_count: samples,
                stereo_pair_count: 0,
            },
            packet,
        )),
    }
}

pub fn pcm_record(start_ns: i64, channels: u8, rate: u32, samples: &[i32]) -> Record {
    let n = samples.len() / channels as usize;
    Record {
        header: header(RecordType::Data, start_ns as f64 / 1e9),
        descriptor: json!({
            "capture_timestamps_ns": timestamps(start_ns, rate, n),
            "audio_muted": 0,
        }),
        block: Some(ContentBlock::linear(
            AudioBlockSpec {
                sample_format: SampleFormat::S32Le,
                channel_count: channels,
                sample_rate: rate,
                sample_count: n as u32,
                stereo_pair_count: 0,
            },
            samples.iter().flat_map(|s| s.to_le_bytes()).collect::<Vec<u8>>(),
        )),
    }
}
