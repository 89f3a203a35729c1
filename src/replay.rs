//! Minimal in-order record delivery.
//!
//! Feeds records through a [`RecordPlayer`] the way a container reader does:
//! descriptor first, then the content block. A failed record is logged and
//! skipped; delivery only stops when the consumer callback asks for it.

use crate::player::RecordPlayer;
use crate::record::Record;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub delivered: usize,
    pub decoded: usize,
    pub skipped: usize,
    pub stopped_early: bool,
}

pub fn replay<P, I>(player: &mut P, records: I) -> ReplaySummary
where
    P: RecordPlayer + ?Sized,
    I: IntoIterator<Item = Record>,
{
    let mut summary = ReplaySummary::default();

    for record in records {
        summary.delivered += 1;

        let metadata = player.on_data_layout_read(&record.header, &record.descriptor);
        let Some(block) = record.block.as_ref() else {
            if let Err(e) = metadata {
                log::warn!("Record at {:.3} skipped: {}", record.header.timestamp, e);
                summary.skipped += 1;
            }
            continue;
        };

        // The payload entry point also runs after a rejected descriptor so the
        // player can drop the payload that belongs to it.
        match player.on_audio_read(&record.header, block) {
            Ok(keep_going) => {
                summary.decoded += 1;
                if !keep_going {
                    log::info!("Consumer stopped delivery at {:.3}", record.header.timestamp);
                    summary.stopped_early = true;
                    break;
                }
            }
            Err(e) => {
                if e.is_fatal() {
                    log::error!("Record at {:.3} failed: {}", record.header.timestamp, e);
                } else {
                    log::debug!("Record at {:.3} skipped: {}", record.header.timestamp, e);
                }
                summary.skipped += 1;
            }
        }
    }

    summary
}
