use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use aria_audio_player::record::{AUDIO_RECORDABLE_TYPE_ID, RecordDump};
use aria_audio_player::{AudioPlayer, PlayerConfig, Record, StreamId, replay};

fn usage() -> ! {
    eprintln!("usage: aria-audio-replay <records.json> [config.toml] [--limit N]");
    std::process::exit(2);
}

fn main() -> anyhow::Result<()> {
    // 初始化日志
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(records_path) = args.next() else { usage() };

    let mut config_path = None;
    let mut limit = None;
    while let Some(arg) = args.next() {
        if arg == "--limit" {
            let n = args.next().unwrap_or_else(|| usage());
            limit = Some(n.parse::<usize>().context("--limit expects a number")?);
        } else {
            config_path = Some(arg);
        }
    }

    // 加载配置
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {path}"))?;
            PlayerConfig::from_toml_str(&text)?
        }
        None => PlayerConfig::default(),
    };

    let text = std::fs::read_to_string(&records_path)
        .with_context(|| format!("failed to read {records_path}"))?;
    let dumps: Vec<RecordDump> =
        serde_json::from_str(&text).with_context(|| format!("failed to parse {records_path}"))?;

    let stream_id = dumps
        .first()
        .map(|d| d.stream_id)
        .unwrap_or(StreamId::new(AUDIO_RECORDABLE_TYPE_ID, 1));
    let records: Vec<Record> = dumps
        .into_iter()
        .filter(|d| d.stream_id == stream_id)
        .map(Record::from)
        .collect();

    let mut player = AudioPlayer::with_factory(
        stream_id,
        aria_audio_player::audio::OpusDecoderFactory,
        &config,
    );

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    player.set_callback(move |data, record, config, _verbose| {
        let channels = config.num_channels.max(1) as usize;
        let peak = data.normalized().fold(0.0f64, |acc, s| acc.max(s.abs()));
        println!(
            "{} samples x {} ch, first ts {:?}, muted {}, peak {:.3}",
            data.num_samples(channels),
            channels,
            record.capture_timestamps_ns.first(),
            record.is_muted(),
            peak
        );
        let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
        limit.is_none_or(|limit| n < limit)
    });

    let summary = replay(&mut player, records);
    println!(
        "{}: delivered {}, decoded {}, skipped {}, decoder builds {}{}",
        stream_id.numeric_name(),
        summary.delivered,
        summary.decoded,
        summary.skipped,
        player.decoder_generation(),
        if summary.stopped_early { " (stopped early)" } else { "" }
    );
    Ok(())
}
