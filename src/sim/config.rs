//! 仿真配置
//!
//! `GbnConfig` 是可从 JSON 读取的原始配置；驱动器只接受经过
//! [`GbnConfig::validate`] 检查后的 [`ValidConfig`]。

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::time::SimTime;

pub const DEFAULT_TOTAL_PACKETS: u64 = 40;
pub const DEFAULT_WINDOW_SIZE: u64 = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 7;
pub const DEFAULT_DELAY_SECS: u64 = 3;
pub const DEFAULT_SEQ_SPACE: u64 = 41;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("total_packets must be positive")]
    ZeroTotalPackets,
    #[error("window_size must be positive")]
    ZeroWindow,
    #[error("timeout_secs must be positive")]
    ZeroTimeout,
    #[error("window_size {window} exceeds sequence space {seq_space}")]
    WindowExceedsSeqSpace { window: u64, seq_space: u64 },
    #[error("total_packets {total} exceeds sequence space {seq_space}")]
    TotalExceedsSeqSpace { total: u64, seq_space: u64 },
    #[error("{list} loss entry {seq} is outside [0, {total})")]
    LossOutOfRange {
        list: &'static str,
        seq: u64,
        total: u64,
    },
    #[error("malformed sequence list {input:?}: bad entry {token:?}")]
    MalformedSeqList { input: String, token: String },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 原始配置（时间单位：秒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GbnConfig {
    pub total_packets: u64,
    pub window_size: u64,
    pub timeout_secs: u64,
    pub delay_secs: u64,
    pub seq_space: u64,
    /// 只丢一次的 DATA 序号
    pub loss_data: BTreeSet<u64>,
    /// 只丢一次的 ACK 序号
    pub loss_ack: BTreeSet<u64>,
}

impl Default for GbnConfig {
    fn default() -> Self {
        Self {
            total_packets: DEFAULT_TOTAL_PACKETS,
            window_size: DEFAULT_WINDOW_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delay_secs: DEFAULT_DELAY_SECS,
            seq_space: DEFAULT_SEQ_SPACE,
            loss_data: BTreeSet::new(),
            loss_ack: BTreeSet::new(),
        }
    }
}

impl GbnConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// 校验配置；通过后核心不再产生配置错误。
    pub fn validate(self) -> Result<ValidConfig, ConfigError> {
        if self.total_packets == 0 {
            return Err(ConfigError::ZeroTotalPackets);
        }
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.window_size > self.seq_space {
            return Err(ConfigError::WindowExceedsSeqSpace {
                window: self.window_size,
                seq_space: self.seq_space,
            });
        }
        if self.total_packets > self.seq_space {
            return Err(ConfigError::TotalExceedsSeqSpace {
                total: self.total_packets,
                seq_space: self.seq_space,
            });
        }
        for (list, set) in [("data", &self.loss_data), ("ack", &self.loss_ack)] {
            if let Some(&seq) = set.iter().find(|&&s| s >= self.total_packets) {
                return Err(ConfigError::LossOutOfRange {
                    list,
                    seq,
                    total: self.total_packets,
                });
            }
        }
        Ok(ValidConfig(self))
    }
}

/// 已校验的配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidConfig(GbnConfig);

impl ValidConfig {
    pub fn get(&self) -> &GbnConfig {
        &self.0
    }

    pub fn timeout(&self) -> SimTime {
        SimTime::from_secs(self.0.timeout_secs)
    }

    pub fn delay(&self) -> SimTime {
        SimTime::from_secs(self.0.delay_secs)
    }
}

/// 解析逗号分隔的序号列表，例如 `"2, 5, 8"`。空白项被跳过，其余必须是非负整数。
pub fn parse_seq_list(input: &str) -> Result<BTreeSet<u64>, ConfigError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<u64>().map_err(|_| ConfigError::MalformedSeqList {
                input: input.to_string(),
                token: tok.to_string(),
            })
        })
        .collect()
}
