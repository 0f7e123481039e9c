use serde::{Deserialize, Serialize};
use std::fmt;

use crate::net::{Endpoint, PacketKind};

/// 事件类别（展示层按此上色）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTag {
    Send,
    Ack,
    Loss,
    Timeout,
    Info,
    Done,
}

/// 一条离散事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    /// 发生时的 tick（秒）
    pub tick: u64,
    pub tag: EventTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    pub message: String,
}

impl SimEvent {
    pub fn new(tick: u64, tag: EventTag, seq: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            tick,
            tag,
            seq,
            message: message.into(),
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:02}s] {}", self.tick, self.message)
    }
}

/// 驱动器所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Running,
    /// 全部确认完毕，等待在途数据包落地
    Draining,
    Stopped,
}

/// 在途数据包
///
/// `*_ns` 为纳秒整数，与 `SimTime.0` 同口径；`send_time`/`arrival_time` 为秒，供展示层直接使用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InFlightInfo {
    pub kind: PacketKind,
    pub seq: u64,
    pub to: Endpoint,
    pub send_ns: u64,
    pub arrive_ns: u64,
    pub send_time: f64,
    pub arrival_time: f64,
}

/// 每个 tick 之后的引擎状态快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_time: u64,
    pub phase: Phase,
    pub base: u64,
    pub next_seq: u64,
    pub expected_seq: u64,
    pub window_size: u64,
    pub total_packets: u64,
    pub delivered_count: u64,
    pub in_flight: Vec<InFlightInfo>,
    pub retransmissions: u64,
    pub duplicate_packets: u64,
}

/// `step()` 的返回值
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub events: Vec<SimEvent>,
    pub snapshot: Snapshot,
    pub terminal: bool,
}

/// 一个 tick 的回放记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickRecord {
    pub events: Vec<SimEvent>,
    pub snapshot: Snapshot,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct TraceRecorder {
    pub ticks: Vec<TickRecord>,
}

impl TraceRecorder {
    pub fn record(&mut self, out: &StepOutcome) {
        self.ticks.push(TickRecord {
            events: out.events.clone(),
            snapshot: out.snapshot.clone(),
        });
    }

    /// 所有事件（按发生顺序）
    pub fn events(&self) -> impl Iterator<Item = &SimEvent> {
        self.ticks.iter().flat_map(|t| t.events.iter())
    }
}
