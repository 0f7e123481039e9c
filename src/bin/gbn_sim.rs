//! Go-Back-N 仿真命令行
//!
//! 逐 tick 运行一对收发端，打印事件日志与汇总信息。

use clap::Parser;
use gbn_sim::sim::{
    DEFAULT_DELAY_SECS, DEFAULT_SEQ_SPACE, DEFAULT_TIMEOUT_SECS, DEFAULT_TOTAL_PACKETS,
    DEFAULT_WINDOW_SIZE, GbnConfig, Simulator, parse_seq_list,
};
use gbn_sim::viz::TraceRecorder;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gbn-sim", about = "Go-Back-N ARQ 仿真：单发送端/接收端，固定时延 + 一次性丢包")]
struct Args {
    /// 从 JSON 文件读取配置（忽略其余配置参数）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 要发送的数据段个数
    #[arg(long, default_value_t = DEFAULT_TOTAL_PACKETS)]
    total_packets: u64,

    /// 发送窗口大小 N
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: u64,

    /// 重传超时（秒）
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// 单向传播时延（秒）
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    delay: u64,

    /// 序号空间大小
    #[arg(long, default_value_t = DEFAULT_SEQ_SPACE)]
    seq_space: u64,

    /// 只丢一次的 DATA 序号，逗号分隔，例如 "2,5"
    #[arg(long, default_value = "")]
    loss_data: String,

    /// 只丢一次的 ACK 序号，逗号分隔
    #[arg(long, default_value = "")]
    loss_ack: String,

    /// 最多运行多少个 tick
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    /// 不打印逐条事件，只打印汇总
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// 输出逐 tick 的 JSON 回放文件；不填则不生成
    #[arg(long)]
    viz_json: Option<PathBuf>,
}

fn build_config(args: &Args) -> Result<GbnConfig, gbn_sim::sim::ConfigError> {
    if let Some(path) = &args.config {
        return GbnConfig::from_json_file(path);
    }
    Ok(GbnConfig {
        total_packets: args.total_packets,
        window_size: args.window_size,
        timeout_secs: args.timeout,
        delay_secs: args.delay,
        seq_space: args.seq_space,
        loss_data: parse_seq_list(&args.loss_data)?,
        loss_ack: parse_seq_list(&args.loss_ack)?,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let cfg = match build_config(&args).and_then(GbnConfig::validate) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let (mut sim, _initial) = Simulator::start(cfg);
    let mut trace = TraceRecorder::default();

    while sim.now() < args.max_ticks {
        let out = sim.step();
        if !args.quiet {
            for ev in &out.events {
                println!("{ev}");
            }
        }
        if args.viz_json.is_some() {
            trace.record(&out);
        }
        if out.terminal {
            break;
        }
    }
    // 达到 max_ticks 仍未结束
    let tail = sim.stop();
    if !args.quiet {
        for ev in &tail {
            println!("{ev}");
        }
    }

    if let Some(path) = args.viz_json {
        let json = serde_json::to_string_pretty(&trace.ticks).expect("serialize trace");
        fs::write(&path, json).expect("write viz json");
        eprintln!("wrote trace to {}", path.display());
    }

    let s = sim.snapshot();
    println!(
        "done @ {}s\n  sender: base={}, next_seq={}, total={}, retransmissions={}, duplicate_pkts={}\n  receiver: expected_seq={}, delivered={}\n  complete={}",
        s.current_time,
        s.base,
        s.next_seq,
        s.total_packets,
        s.retransmissions,
        s.duplicate_packets,
        s.expected_seq,
        s.delivered_count,
        s.base == s.total_packets
    );
}
