//! 仿真器
//!
//! 离散时间驱动器：每个仿真秒调用一次 [`Simulator::step`]，依次检查超时、
//! 填充窗口、从信道取出到达的数据包并分派给收发两端。驱动器是信道、
//! 发送端与接收端唯一的修改者；两次 step 之间状态是静止的。

use super::config::ValidConfig;
use super::time::SimTime;
use crate::net::{Channel, Endpoint, InFlight, PacketKind, SendOutcome};
use crate::proto::{AckResend, DataVerdict, GbnReceiver, GbnSender, Transmission};
use crate::viz::{EventTag, InFlightInfo, Phase, SimEvent, Snapshot, StepOutcome, TraceRecorder};
use tracing::{debug, info, trace, warn};

/// 全部确认后继续推进的 tick 数，让在途数据包落地后再停止。
pub const DRAIN_GRACE_TICKS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Draining { stop_at: u64 },
    Stopped,
}

/// Go-Back-N 仿真驱动器
#[derive(Debug)]
pub struct Simulator {
    cfg: ValidConfig,
    tick: u64,
    state: RunState,
    channel: Channel,
    sender: GbnSender,
    receiver: GbnReceiver,
    // 尚未随 step 交出的事件（例如启动事件）
    pending: Vec<SimEvent>,
}

impl Simulator {
    /// 用已校验的配置启动仿真，返回驱动器与初始快照。
    pub fn start(cfg: ValidConfig) -> (Self, Snapshot) {
        let sim = Self::build(cfg);
        let snapshot = sim.snapshot();
        (sim, snapshot)
    }

    fn build(cfg: ValidConfig) -> Self {
        let c = cfg.get();
        info!(
            total_packets = c.total_packets,
            window_size = c.window_size,
            timeout_secs = c.timeout_secs,
            delay_secs = c.delay_secs,
            loss_data = ?c.loss_data,
            loss_ack = ?c.loss_ack,
            "▶️  开始运行仿真"
        );
        let channel = Channel::new(cfg.delay(), c.loss_data.clone(), c.loss_ack.clone());
        let sender = GbnSender::new(c.window_size, c.total_packets, cfg.timeout());
        Self {
            tick: 0,
            state: RunState::Running,
            channel,
            sender,
            receiver: GbnReceiver::new(),
            pending: vec![SimEvent::new(0, EventTag::Info, None, "--- Simulation Started ---")],
            cfg,
        }
    }

    /// 丢弃全部状态，用同一配置从头开始。
    pub fn restart(&mut self) -> Snapshot {
        *self = Self::build(self.cfg.clone());
        self.snapshot()
    }

    /// 下一次 step 将处理的 tick
    pub fn now(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &ValidConfig {
        &self.cfg
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            RunState::Running => Phase::Running,
            RunState::Draining { .. } => Phase::Draining,
            RunState::Stopped => Phase::Stopped,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state == RunState::Stopped
    }

    pub fn sender(&self) -> &GbnSender {
        &self.sender
    }

    pub fn receiver(&self) -> &GbnReceiver {
        &self.receiver
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// 以 `now()` 为当前时间的状态快照
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(self.tick)
    }

    fn snapshot_at(&self, tick: u64) -> Snapshot {
        let in_flight = self
            .channel
            .in_flight()
            .iter()
            .map(|f| InFlightInfo {
                kind: f.pkt.kind(),
                seq: f.pkt.seq(),
                to: f.to,
                send_ns: f.sent_at.0,
                arrive_ns: f.arrive_at.0,
                send_time: f.sent_at.as_secs_f64(),
                arrival_time: f.arrive_at.as_secs_f64(),
            })
            .collect();
        Snapshot {
            current_time: tick,
            phase: self.phase(),
            base: self.sender.base(),
            next_seq: self.sender.next_seq(),
            expected_seq: self.receiver.expected_seq(),
            window_size: self.sender.window_size(),
            total_packets: self.sender.total_packets(),
            delivered_count: self.receiver.delivered_count(),
            in_flight,
            retransmissions: self.sender.retransmissions(),
            duplicate_packets: self.sender.duplicate_packets(),
        }
    }

    /// 外部停止请求。
    ///
    /// 返回尚未随 step 交出的事件，最后一条是停止事件；已停止时返回空。
    pub fn stop(&mut self) -> Vec<SimEvent> {
        if self.state == RunState::Stopped {
            return Vec::new();
        }
        let mut events = std::mem::take(&mut self.pending);
        events.push(self.halt());
        events
    }

    fn halt(&mut self) -> SimEvent {
        info!(tick = self.tick, "⏹️  仿真停止");
        self.state = RunState::Stopped;
        SimEvent::new(self.tick, EventTag::Info, None, "--- Simulation Stopped ---")
    }

    /// 推进一个仿真秒。
    ///
    /// 快照的 `current_time` 为本次处理的 tick。停止后调用是空操作。
    #[tracing::instrument(skip(self), fields(tick = self.tick))]
    pub fn step(&mut self) -> StepOutcome {
        let t = self.tick;
        let mut events = std::mem::take(&mut self.pending);

        match self.state {
            RunState::Stopped => {
                return StepOutcome {
                    events,
                    snapshot: self.snapshot_at(t),
                    terminal: true,
                };
            }
            RunState::Draining { stop_at } if t >= stop_at => {
                events.push(self.halt());
                return StepOutcome {
                    events,
                    snapshot: self.snapshot_at(t),
                    terminal: true,
                };
            }
            _ => {}
        }

        let now = SimTime::at_tick(t);

        if self.sender.is_done() && self.state == RunState::Running {
            info!(tick = t, "🎉 全部数据段已确认，进入收尾阶段");
            self.state = RunState::Draining {
                stop_at: t.saturating_add(DRAIN_GRACE_TICKS),
            };
            events.push(SimEvent::new(
                t,
                EventTag::Done,
                None,
                "All Packets Acknowledged! Simulation Complete...",
            ));
        }

        // 收尾阶段不再检查计时器、不再发送新数据
        if self.state == RunState::Running {
            if self.sender.timer_expired(now) {
                let base = self.sender.base();
                events.push(SimEvent::new(
                    t,
                    EventTag::Timeout,
                    Some(base),
                    format!("Timeout Packet {base}. Retransmitting Window."),
                ));
                let sent = self.sender.on_timeout(now, &mut self.channel);
                events.extend(sent.into_iter().map(|tx| retransmit_event(t, tx)));
            }

            let sent = self.sender.fill_window(now, &mut self.channel);
            events.extend(sent.into_iter().map(|tx| send_event(t, tx)));
        }

        let arrived = self.channel.drain(now);
        for item in arrived {
            self.dispatch(t, now, item, &mut events);
        }

        debug!(
            base = self.sender.base(),
            next_seq = self.sender.next_seq(),
            expected_seq = self.receiver.expected_seq(),
            in_flight = self.channel.in_flight().len(),
            events = events.len(),
            "tick 完成"
        );

        let snapshot = self.snapshot_at(t);
        self.tick = t.saturating_add(1);
        StepOutcome {
            events,
            snapshot,
            terminal: false,
        }
    }

    fn dispatch(&mut self, t: u64, now: SimTime, item: InFlight, events: &mut Vec<SimEvent>) {
        let InFlight {
            arrive_at, pkt, to, ..
        } = item;

        match (to, pkt.kind()) {
            (Endpoint::Receiver, PacketKind::Data) => {
                let verdict = self.receiver.on_data(&pkt, arrive_at);
                push_verdict_events(t, verdict, events);

                if let Some(ack) = verdict.ack() {
                    let seq = ack.seq();
                    // ACK 以数据段的实际到达时刻为基准发出
                    if self.channel.offer(ack, Endpoint::Sender, arrive_at, SimTime::ZERO)
                        == SendOutcome::Dropped
                    {
                        events.push(SimEvent::new(
                            t,
                            EventTag::Loss,
                            Some(seq),
                            format!("ACK {seq} Dropped by Channel"),
                        ));
                    }
                }
            }
            (Endpoint::Sender, PacketKind::Ack) => {
                let seq = pkt.seq();
                events.push(SimEvent::new(
                    t,
                    EventTag::Ack,
                    Some(seq),
                    format!("Sender received ACK {seq}"),
                ));
                self.sender.on_ack(seq, now);
            }
            (to, kind) => {
                trace!(?to, ?kind, "目的端点与包类型不匹配，忽略");
            }
        }
    }

    /// 连续 step 直到处理完 `until`（含）或仿真停止，返回期间的全部事件。
    pub fn run_until(&mut self, until: u64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        while self.tick <= until {
            let out = self.step();
            events.extend(out.events);
            if out.terminal {
                break;
            }
        }
        events
    }

    /// 运行到自动停止，最多 `max_ticks` 个 tick；返回逐 tick 记录。
    pub fn run_to_completion(&mut self, max_ticks: u64) -> TraceRecorder {
        let mut trace = TraceRecorder::default();
        let mut ticks = 0u64;
        while ticks < max_ticks {
            let out = self.step();
            ticks += 1;
            trace.record(&out);
            if out.terminal {
                break;
            }
        }
        if self.is_stopped() {
            info!(ticks, final_tick = self.tick, "✅ 仿真完成");
        } else {
            warn!(ticks, final_tick = self.tick, "⏸️  达到 tick 上限，仿真未结束");
        }
        trace
    }
}

fn send_event(t: u64, tx: Transmission) -> SimEvent {
    let seq = tx.seq;
    match tx.outcome {
        SendOutcome::Sent => SimEvent::new(t, EventTag::Send, Some(seq), format!("Sender Data {seq}")),
        SendOutcome::Dropped => SimEvent::new(
            t,
            EventTag::Loss,
            Some(seq),
            format!("Sender Data {seq} -> DROPPED"),
        ),
    }
}

fn retransmit_event(t: u64, tx: Transmission) -> SimEvent {
    let seq = tx.seq;
    match tx.outcome {
        SendOutcome::Sent => SimEvent::new(
            t,
            EventTag::Send,
            Some(seq),
            format!("Retransmitting Data {seq}"),
        ),
        SendOutcome::Dropped => SimEvent::new(
            t,
            EventTag::Loss,
            Some(seq),
            format!("Retransmission Data {seq} DROPPED by Channel"),
        ),
    }
}

fn push_verdict_events(t: u64, verdict: DataVerdict, events: &mut Vec<SimEvent>) {
    let note = |seq: u64, msg: String| SimEvent::new(t, EventTag::Info, Some(seq), msg);
    match verdict {
        DataVerdict::Accepted { seq } => {
            events.push(note(seq, format!("Receiver Data {seq} (Expected). Sending ACK.")));
        }
        DataVerdict::Duplicate { seq } => {
            events.push(note(seq, format!("Receiver Data {seq} (Duplicate). Ignore.")));
        }
        DataVerdict::OutOfOrder { seq, resend } => {
            events.push(note(seq, format!("Receiver Data {seq} (Out of Order). Discard.")));
            match resend {
                AckResend::Nothing => {}
                AckResend::Suppressed { ack } => {
                    events.push(note(ack, format!("Receiver sent ACK {ack}. Suppress duplicate.")));
                }
                AckResend::Resend { ack } => {
                    events.push(note(ack, format!("Receiver re-sending ACK {ack}")));
                }
            }
        }
    }
}
