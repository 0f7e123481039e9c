//! 信道模型
//!
//! 固定传播时延 + 一次性丢包。丢包集合按 DATA / ACK 分开维护，
//! 某个序号第一次出现（无论首发还是重传）时被丢弃并从集合中移除，
//! 之后同序号的数据包都能正常通过，因此同一实验可重复。

use std::collections::BTreeSet;

use super::endpoint::Endpoint;
use super::packet::{Packet, PacketKind};
use crate::sim::SimTime;
use tracing::{debug, trace};

/// 投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Dropped,
}

/// 在途数据包
#[derive(Debug, Clone)]
pub struct InFlight {
    pub arrive_at: SimTime,
    pub pkt: Packet,
    pub to: Endpoint,
    pub sent_at: SimTime,
}

/// 网络信道
#[derive(Debug, Default)]
pub struct Channel {
    loss_data: BTreeSet<u64>,
    loss_ack: BTreeSet<u64>,
    delay: SimTime,
    // 按入队顺序保存；drain 依此顺序返回
    in_flight: Vec<InFlight>,
}

impl Channel {
    /// 创建新信道
    pub fn new(delay: SimTime, loss_data: BTreeSet<u64>, loss_ack: BTreeSet<u64>) -> Self {
        Self {
            loss_data,
            loss_ack,
            delay,
            in_flight: Vec::new(),
        }
    }

    pub fn delay(&self) -> SimTime {
        self.delay
    }

    /// 尚未消耗的 DATA 丢包序号
    pub fn pending_data_losses(&self) -> &BTreeSet<u64> {
        &self.loss_data
    }

    /// 尚未消耗的 ACK 丢包序号
    pub fn pending_ack_losses(&self) -> &BTreeSet<u64> {
        &self.loss_ack
    }

    /// 在途数据包（入队顺序）
    pub fn in_flight(&self) -> &[InFlight] {
        &self.in_flight
    }

    /// 把数据包放上信道。
    ///
    /// 发送时刻为 `now + offset`，到达时刻再加上传播时延。
    #[tracing::instrument(skip(self, pkt), fields(kind = ?pkt.kind(), seq = pkt.seq()))]
    pub fn offer(&mut self, pkt: Packet, to: Endpoint, now: SimTime, offset: SimTime) -> SendOutcome {
        let losses = match pkt.kind() {
            PacketKind::Data => &mut self.loss_data,
            PacketKind::Ack => &mut self.loss_ack,
        };
        if losses.remove(&pkt.seq()) {
            debug!("💥 命中丢包序号，数据包被丢弃");
            return SendOutcome::Dropped;
        }

        let sent_at = now.saturating_add(offset);
        let arrive_at = sent_at.saturating_add(self.delay);
        trace!(sent_at = ?sent_at, arrive_at = ?arrive_at, "数据包进入信道");

        self.in_flight.push(InFlight {
            arrive_at,
            pkt,
            to,
            sent_at,
        });
        SendOutcome::Sent
    }

    /// 取出所有 `arrive_at <= now` 的数据包，按入队顺序返回（不一定按到达时刻排序）。
    #[tracing::instrument(skip(self))]
    pub fn drain(&mut self, now: SimTime) -> Vec<InFlight> {
        let (arrived, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|item| item.arrive_at <= now);
        self.in_flight = pending;

        debug!(
            arrived = arrived.len(),
            remaining = self.in_flight.len(),
            "信道交付到达的数据包"
        );
        arrived
    }
}
