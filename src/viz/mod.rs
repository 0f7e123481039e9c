//! 事件与状态快照（供展示层或离线回放使用）
//!
//! 设计目标：
//! - **结构化**：展示层消费事件流与快照，而不是解析文本日志
//! - **可回放**：每个 tick 一条记录，可整体写成 JSON

mod types;

pub use types::{EventTag, InFlightInfo, Phase, SimEvent, Snapshot, StepOutcome, TickRecord, TraceRecorder};
