use std::fs;
use std::path::Path;
use serde::Deserialize;

#[derive(Deserialize)]
struct Config {
    application: Application,
    decoder: Decoder,
    player: Player,
}

#[derive(Deserialize)]
struct Application {
    name: String,
    version: String,
}

#[derive(Deserialize)]
struct Decoder {
    continuity_tolerance: f64,
    max_opus_frame_ms: u32,
}

#[derive(Deserialize)]
struct Player {
    verbose: bool,
}

// 在编译时读取 config.toml 并设置环境变量
fn main() {
    println!("cargo:rerun-if-changed=config.toml");

    let config_path = Path::new("config.toml");
    if !config_path.exists() {
        panic!("config.toml not found!");
    }

    let config_str = fs::read_to_string(config_path).expect("Failed to read config.toml");
    let config: Config = toml::from_str(&config_str).expect("Failed to parse config.toml");

    println!("cargo:rustc-env=APP_NAME={}", config.application.name);
    println!("cargo:rustc-env=APP_VERSION={}", config.application.version);

    // 解码器配置
    println!(
        "cargo:rustc-env=DECODER_CONTINUITY_TOLERANCE={}",
        config.decoder.continuity_tolerance
    );
    println!(
        "cargo:rustc-env=DECODER_MAX_OPUS_FRAME_MS={}",
        config.decoder.max_opus_frame_ms
    );

    println!("cargo:rustc-env=PLAYER_VERBOSE={}", config.player.verbose);
}
