//! 演示程序的配置文件

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::pixel::PixelFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    pub framebuffer: FramebufferConfig,
    pub warning: WarningConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramebufferConfig {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// 不活动提示框
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningConfig {
    pub width: u16,
    pub height: u16,
    /// 倒计时总长，秒
    pub warn_secs: u64,
    /// 重画间隔，毫秒
    pub tick_millis: u64,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            format: PixelFormat::Xrgb8888,
        }
    }
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 160,
            warn_secs: 10,
            tick_millis: 500,
        }
    }
}

impl WarningConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.warn_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("deserialize config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fb = &self.framebuffer;
        let warning = &self.warning;
        ensure!(
            fb.width > 0 && fb.height > 0,
            "framebuffer size must be non-zero, got {}x{}",
            fb.width,
            fb.height
        );
        ensure!(
            warning.width > 0 && warning.height > 0,
            "warning size must be non-zero, got {}x{}",
            warning.width,
            warning.height
        );
        ensure!(
            u32::from(warning.width) <= fb.width && u32::from(warning.height) <= fb.height,
            "warning {}x{} does not fit into framebuffer {}x{}",
            warning.width,
            warning.height,
            fb.width,
            fb.height
        );
        ensure!(warning.tick_millis > 0, "tick_millis must be non-zero");
        Ok(())
    }
}
