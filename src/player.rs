//! Per-stream audio player.
//!
//! The container calls [`RecordPlayer::on_data_layout_read`] and then
//! [`RecordPlayer::on_audio_read`] for each record of the stream, strictly in
//! that order and one record at a time. After a record is decoded the
//! registered callback receives the data, the record metadata and the current
//! configuration; its return value tells the container whether to keep
//! delivering records.

use crate::audio::{AudioData, DecodeEngine, DecoderFactory, DecoderSpec, OpusDecoderFactory};
use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};
use crate::metadata::{self, AudioConfig, AudioDataRecord};
use crate::record::{ContentBlock, CurrentRecord, Descriptor, RecordType, StreamId};

pub type AudioCallback =
    Box<dyn FnMut(&AudioData, &AudioDataRecord, &AudioConfig, bool) -> bool + Send>;

/// Entry points used by the record-delivery layer.
pub trait RecordPlayer {
    /// Interpret the descriptor of the current record.
    fn on_data_layout_read(
        &mut self,
        record: &CurrentRecord,
        descriptor: &Descriptor,
    ) -> Result<()>;

    /// Decode the audio block of the current record.
    ///
    /// Returns `Ok(false)` when the consumer asked to stop.
    fn on_audio_read(&mut self, record: &CurrentRecord, block: &ContentBlock) -> Result<bool>;
}

pub struct AudioPlayer<F = OpusDecoderFactory> {
    stream_id: StreamId,
    callback: AudioCallback,
    data: AudioData,
    config_record: AudioConfig,
    data_record: AudioDataRecord,
    // Parsed descriptor of the current record, committed once its audio decodes.
    pending_record: Option<AudioDataRecord>,
    next_timestamp_sec: f64,
    verbose: bool,
    // Set when the current record's descriptor was rejected, so its payload is skipped.
    metadata_rejected: bool,
    engine: DecodeEngine<F>,
}

impl AudioPlayer<OpusDecoderFactory> {
    pub fn new(stream_id: StreamId) -> Self {
        Self::with_factory(stream_id, OpusDecoderFactory, &PlayerConfig::default())
    }
}

impl<F: DecoderFactory> AudioPlayer<F> {
    pub fn with_factory(stream_id: StreamId, factory: F, config: &PlayerConfig) -> Self {
        Self {
            stream_id,
            callback: Box::new(|_, _, _, _| true),
            data: AudioData::default(),
            config_record: AudioConfig::default(),
            data_record: AudioDataRecord::default(),
            pending_record: None,
            next_timestamp_sec: 0.0,
            verbose: config.verbose,
            metadata_rejected: false,
            engine: DecodeEngine::new(factory, config),
        }
    }

    pub fn set_callback<C>(&mut self, callback: C)
    where
        C: FnMut(&AudioData, &AudioDataRecord, &AudioConfig, bool) -> bool + Send + 'static,
    {
        self.callback = Box::new(callback);
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_config(&mut self, config: &PlayerConfig) {
        self.verbose = config.verbose;
        self.engine.apply_config(config);
    }

    pub fn data(&self) -> &AudioData {
        &self.data
    }

    pub fn config_record(&self) -> &AudioConfig {
        &self.config_record
    }

    pub fn data_record(&self) -> &AudioDataRecord {
        &self.data_record
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Smallest timestamp strictly after the last decoded record.
    pub fn next_timestamp_sec(&self) -> f64 {
        self.next_timestamp_sec
    }

    pub fn decoder_spec(&self) -> Option<DecoderSpec> {
        self.engine.decoder_spec()
    }

    pub fn decoder_generation(&self) -> u64 {
        self.engine.decoder_generation()
    }

    pub fn engine(&self) -> &DecodeEngine<F> {
        &self.engine
    }

    fn log_record(&self, record: &CurrentRecord, block: &ContentBlock) {
        let channels = block.spec.channel_count as usize;
        log::info!(
            "{:.3} {} [{}]: {} {}x{} samples.",
            record.timestamp,
            record.stream_id.name(),
            record.stream_id.numeric_name(),
            block.describe(),
            self.data.num_samples(channels),
            channels,
        );
    }
}

impl<F: DecoderFactory> RecordPlayer for AudioPlayer<F> {
    fn on_data_layout_read(
        &mut self,
        record: &CurrentRecord,
        descriptor: &Descriptor,
    ) -> Result<()> {
        match record.record_type {
            RecordType::Configuration => {
                let config = metadata::read_config(descriptor).inspect_err(|e| {
                    log::warn!(
                        "{} [{}]: rejected configuration record at {:.3}: {}",
                        record.stream_id.name(),
                        record.stream_id.numeric_name(),
                        record.timestamp,
                        e
                    );
                })?;
                self.config_record = config;
            }
            RecordType::Data => match metadata::read_data_record(descriptor) {
                Ok(data_record) => {
                    self.pending_record = Some(data_record);
                    self.metadata_rejected = false;
                }
                Err(e) => {
                    log::warn!(
                        "{} [{}]: rejected data record at {:.3}: {}",
                        record.stream_id.name(),
                        record.stream_id.numeric_name(),
                        record.timestamp,
                        e
                    );
                    self.pending_record = None;
                    self.metadata_rejected = true;
                    return Err(e.into());
                }
            },
            RecordType::State => {}
        }
        Ok(())
    }

    fn on_audio_read(&mut self, record: &CurrentRecord, block: &ContentBlock) -> Result<bool> {
        if std::mem::take(&mut self.metadata_rejected) {
            return Err(PlayerError::SkippedAfterMetadataFailure);
        }

        let data_record = self
            .pending_record
            .take()
            .unwrap_or_else(|| self.data_record.clone());
        let audio = self.engine.decode(block, &data_record).inspect_err(|e| {
            if e.is_fatal() {
                log::error!("{:.3} {}: {}", record.timestamp, record.stream_id.numeric_name(), e);
            } else {
                log::warn!("{:.3} {}: {}", record.timestamp, record.stream_id.numeric_name(), e);
            }
        })?;

        self.data = audio;
        self.data_record = data_record;
        self.next_timestamp_sec = record.timestamp.next_up();
        let keep_going = (self.callback)(
            &self.data,
            &self.data_record,
            &self.config_record,
            self.verbose,
        );

        if self.verbose {
            self.log_record(record, block);
        }
        Ok(keep_going)
    }
}
