use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    // 时间戳连续性容差，单位为一个采样周期的比例
    pub continuity_tolerance: f64,
    // 块未声明采样数时单个 Opus 包的最大时长
    pub max_opus_frame_ms: u32,
    pub verbose: bool,
}

impl PlayerConfig {
    /// 从编译时设置的环境变量创建配置
    /// 所有参数都在编译时从 config.toml 中读取
    pub fn new() -> Result<Self, ConfigError> {
        let config = Self {
            continuity_tolerance: env!("DECODER_CONTINUITY_TOLERANCE")
                .parse()
                .map_err(|_| ConfigError::Parse("DECODER_CONTINUITY_TOLERANCE"))?,
            max_opus_frame_ms: env!("DECODER_MAX_OPUS_FRAME_MS")
                .parse()
                .map_err(|_| ConfigError::Parse("DECODER_MAX_OPUS_FRAME_MS"))?,
            verbose: env!("PLAYER_VERBOSE")
                .parse()
                .map_err(|_| ConfigError::Parse("PLAYER_VERBOSE"))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a runtime override. Missing keys fall back to the build-time defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Format(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| ConfigError::Format(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_continuity_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigError> {
        self.continuity_tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.continuity_tolerance.is_finite()
            || !(0.0..1.0).contains(&self.continuity_tolerance)
        {
            return Err(ConfigError::Tolerance(self.continuity_tolerance));
        }
        if self.max_opus_frame_ms == 0 {
            return Err(ConfigError::Parse("max_opus_frame_ms"));
        }
        Ok(())
    }
}

impl PlayerConfig {
    fn fallback() -> Self {
        Self {
            continuity_tolerance: 0.5,
            max_opus_frame_ms: 120,
            verbose: false,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        // config.toml 校验失败时退回到保守的内置值
        Self::new().unwrap_or_else(|e| {
            log::warn!("Invalid built-in player config, using fallback values: {}", e);
            Self::fallback()
        })
    }
}
