//! Go-Back-N 接收端
//!
//! 只按序接收；乱序和重复数据段一律丢弃。

use crate::net::Packet;
use crate::sim::SimTime;
use tracing::{debug, trace};

/// 接收端对一个数据段的处理结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataVerdict {
    /// 按序接收，需为 `seq` 发送 ACK
    Accepted { seq: u64 },
    /// 已交付过的重复数据段，静默丢弃
    Duplicate { seq: u64 },
    /// 乱序数据段被丢弃；`resend` 为需要重发的上一个 ACK
    OutOfOrder { seq: u64, resend: AckResend },
}

/// 乱序时是否重发上一个累计 ACK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckResend {
    /// 尚未收到任何数据段，没有可确认的序号
    Nothing,
    /// 上一个 ACK 就是它，抑制重复发送
    Suppressed { ack: u64 },
    Resend { ack: u64 },
}

impl DataVerdict {
    /// 需要发回发送端的 ACK（若有）
    pub fn ack(&self) -> Option<Packet> {
        match *self {
            DataVerdict::Accepted { seq } => Some(Packet::ack(seq)),
            DataVerdict::OutOfOrder {
                resend: AckResend::Resend { ack },
                ..
            } => Some(Packet::ack(ack)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GbnReceiver {
    expected_seq: u64,
    delivered_count: u64,
    last_ack_sent: Option<u64>,
}

impl GbnReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expected_seq(&self) -> u64 {
        self.expected_seq
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count
    }

    pub fn last_ack_sent(&self) -> Option<u64> {
        self.last_ack_sent
    }

    /// 处理到达的数据段。ACK 应以 `arrive_at` 为发送基准时刻，
    /// 使 ACK 之间的间隔与数据段一致。
    #[tracing::instrument(skip(self, pkt), fields(seq = pkt.seq(), expected = self.expected_seq))]
    pub fn on_data(&mut self, pkt: &Packet, arrive_at: SimTime) -> DataVerdict {
        let seq = pkt.seq();

        if seq == self.expected_seq {
            self.delivered_count += 1;
            self.expected_seq += 1;
            self.last_ack_sent = Some(seq);
            debug!(delivered = self.delivered_count, "✅ 按序交付");
            return DataVerdict::Accepted { seq };
        }

        if seq < self.expected_seq {
            trace!("重复数据段，丢弃");
            return DataVerdict::Duplicate { seq };
        }

        // 乱序：重发上一个累计 ACK，除非刚发过
        let resend = match self.expected_seq.checked_sub(1) {
            None => AckResend::Nothing,
            Some(ack) if self.last_ack_sent == Some(ack) => AckResend::Suppressed { ack },
            Some(ack) => {
                self.last_ack_sent = Some(ack);
                AckResend::Resend { ack }
            }
        };
        trace!(?resend, "乱序数据段，丢弃");
        DataVerdict::OutOfOrder { seq, resend }
    }
}
