//! 数据包类型
//!
//! 定义 Go-Back-N 协议消息。数据包创建后不可变。

use serde::{Deserialize, Serialize};

/// 数据包类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    Data,
    Ack,
}

/// 协议数据包
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    kind: PacketKind,
    seq: u64,
    payload: Option<String>,
}

impl Packet {
    /// 构造数据段，载荷为 `Payload_<seq>`
    pub fn data(seq: u64) -> Self {
        Self {
            kind: PacketKind::Data,
            seq,
            payload: Some(format!("Payload_{seq}")),
        }
    }

    /// 构造（累计）确认
    pub fn ack(seq: u64) -> Self {
        Self {
            kind: PacketKind::Ack,
            seq,
            payload: None,
        }
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn is_data(&self) -> bool {
        self.kind == PacketKind::Data
    }

    pub fn is_ack(&self) -> bool {
        self.kind == PacketKind::Ack
    }
}
