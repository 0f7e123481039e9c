//! Go-Back-N 发送端
//!
//! 滑动窗口 + 单个重传计时器：
//! - 窗口 `[base, next_seq)` 内的数据段都缓存在 `buffer` 中
//! - 计时器只跟踪最早未确认段；超时后重传整个窗口
//! - 累计 ACK：收到 ACK k（k >= base）即确认 `<= k` 的全部数据段

use std::collections::BTreeMap;

use crate::net::{Channel, Endpoint, Packet, SendOutcome};
use crate::sim::SimTime;
use tracing::{debug, info, trace};

/// 同一 tick 内连续发送的数据包之间的间隔（突发偏移 Δ）。
pub const BURST_GAP: SimTime = SimTime::from_millis(200);

/// 一次发送尝试的结果，交给驱动器生成事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transmission {
    pub seq: u64,
    pub outcome: SendOutcome,
}

#[derive(Debug, Clone)]
pub struct GbnSender {
    window_size: u64,
    total_packets: u64,
    timeout: SimTime,

    base: u64,
    next_seq: u64,
    buffer: BTreeMap<u64, Packet>, // seq -> packet，键恰为 [base, next_seq)
    timer_start: Option<SimTime>,

    // stats
    retransmissions: u64,
    duplicate_packets: u64,
}

impl GbnSender {
    pub fn new(window_size: u64, total_packets: u64, timeout: SimTime) -> Self {
        Self {
            window_size,
            total_packets,
            timeout,
            base: 0,
            next_seq: 0,
            buffer: BTreeMap::new(),
            timer_start: None,
            retransmissions: 0,
            duplicate_packets: 0,
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    pub fn total_packets(&self) -> u64 {
        self.total_packets
    }

    pub fn timer_start(&self) -> Option<SimTime> {
        self.timer_start
    }

    pub fn retransmissions(&self) -> u64 {
        self.retransmissions
    }

    pub fn duplicate_packets(&self) -> u64 {
        self.duplicate_packets
    }

    /// 当前缓存的序号（升序）
    pub fn buffered_seqs(&self) -> impl Iterator<Item = u64> + '_ {
        self.buffer.keys().copied()
    }

    /// 所有数据段都已被累计确认
    pub fn is_done(&self) -> bool {
        self.base >= self.total_packets
    }

    fn window_empty(&self) -> bool {
        self.base == self.next_seq
    }

    /// 计时器是否到期；窗口为空时计时器不运行。
    pub fn timer_expired(&self, now: SimTime) -> bool {
        if self.window_empty() {
            return false;
        }
        match self.timer_start {
            Some(start) => now.saturating_sub(start) >= self.timeout,
            None => false,
        }
    }

    /// 超时：按突发偏移重传整个未确认窗口，并重启计时器。
    #[tracing::instrument(skip(self, channel), fields(base = self.base, next_seq = self.next_seq))]
    pub fn on_timeout(&mut self, now: SimTime, channel: &mut Channel) -> Vec<Transmission> {
        info!("⏰ 重传计时器超时，回退 N 重传整个窗口");
        self.retransmissions = self.retransmissions.saturating_add(1);
        self.timer_start = Some(now);

        let mut out = Vec::with_capacity(self.buffer.len());
        for (i, (&seq, pkt)) in self.buffer.range(self.base..self.next_seq).enumerate() {
            self.duplicate_packets = self.duplicate_packets.saturating_add(1);
            let offset = BURST_GAP.times(i as u64);
            let outcome = channel.offer(pkt.clone(), Endpoint::Receiver, now, offset);
            trace!(seq, ?outcome, "重传数据段");
            out.push(Transmission { seq, outcome });
        }
        out
    }

    /// 用新数据段填满窗口。
    #[tracing::instrument(skip(self, channel), fields(base = self.base, next_seq = self.next_seq))]
    pub fn fill_window(&mut self, now: SimTime, channel: &mut Channel) -> Vec<Transmission> {
        let mut out = Vec::new();
        let mut burst = 0u64;

        while self.next_seq < self.base.saturating_add(self.window_size)
            && self.next_seq < self.total_packets
        {
            let seq = self.next_seq;
            let pkt = Packet::data(seq);
            self.buffer.insert(seq, pkt.clone());

            // 窗口原本为空：这是最早未确认段，启动计时器
            if self.window_empty() {
                self.timer_start = Some(now);
            }

            let outcome = channel.offer(pkt, Endpoint::Receiver, now, BURST_GAP.times(burst));
            burst += 1;
            trace!(seq, ?outcome, "发送新数据段");
            out.push(Transmission { seq, outcome });

            self.next_seq += 1;
        }

        if !out.is_empty() {
            debug!(sent = out.len(), next_seq = self.next_seq, "窗口已填满");
        }
        out
    }

    /// 处理累计 ACK。返回窗口是否前移。
    #[tracing::instrument(skip(self), fields(base = self.base))]
    pub fn on_ack(&mut self, seq: u64, now: SimTime) -> bool {
        if seq < self.base {
            trace!("过期/重复 ACK，忽略");
            return false;
        }

        // ACK 不可能超过已发送的最大序号；截断以保持 base <= next_seq
        let new_base = seq.saturating_add(1).min(self.next_seq);
        self.base = new_base;
        self.buffer = self.buffer.split_off(&new_base);

        if self.base < self.next_seq {
            self.timer_start = Some(now);
        } else {
            self.timer_start = None;
        }
        debug!(new_base, timer = ?self.timer_start, "窗口前移");
        true
    }
}
