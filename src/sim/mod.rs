//! 仿真核心模块
//!
//! 此模块包含仿真时间、配置与离散时间驱动器。

// 子模块声明
mod config;
mod simulator;
mod time;

// 重新导出公共接口
pub use config::{
    ConfigError, DEFAULT_DELAY_SECS, DEFAULT_SEQ_SPACE, DEFAULT_TIMEOUT_SECS,
    DEFAULT_TOTAL_PACKETS, DEFAULT_WINDOW_SIZE, GbnConfig, ValidConfig, parse_seq_list,
};
pub use simulator::{DRAIN_GRACE_TICKS, Simulator};
pub use time::SimTime;
