//! 分档传输演示
//!
//! 读取录制文件，经过一个有消息上限的内存通道发送再接收，写出接收到的副本

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use uirec_rs::config::PipelineConfig;
use uirec_rs::recording::Recording;
use uirec_rs::transfer::{FileStore, MemoryChannel, Strategy, TransferLayer};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Inline,
    Chunked,
    Reference,
}

impl From<StrategyArg> for Strategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Inline => Strategy::Inline,
            StrategyArg::Chunked => Strategy::Chunked,
            StrategyArg::Reference => Strategy::Reference,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "transfer-recording", about = "经受限通道传输录制文件")]
struct Args {
    #[arg(long)]
    recording: PathBuf,
    /// 接收端写出的录制文件
    #[arg(long)]
    out: PathBuf,
    /// 通道单条消息上限（字节）
    #[arg(long, default_value_t = 64 * 1024)]
    ceiling_bytes: usize,
    /// 流水线配置（JSON）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 覆盖 reference 阈值（字节）
    #[arg(long)]
    reference_min_bytes: Option<usize>,
    /// 覆盖每片最大事件数
    #[arg(long)]
    chunk_events: Option<usize>,
    /// 覆盖存储目录
    #[arg(long)]
    store_dir: Option<PathBuf>,
    /// 强制使用某个策略（默认按大小选择）
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// 通道不保证顺序，逐片等待确认
    #[arg(long)]
    unordered: bool,
}

fn run(args: &Args) -> uirec_rs::Result<()> {
    let mut cfg = PipelineConfig::load_or_default(args.config.as_deref())?;
    if let Some(v) = args.reference_min_bytes {
        cfg.transfer.reference_min_bytes = v;
    }
    if let Some(v) = args.chunk_events {
        cfg.transfer.chunk_events = v;
    }
    if let Some(dir) = &args.store_dir {
        cfg.store.dir = dir.clone();
    }
    cfg.validate()?;

    let recording = Recording::load(&args.recording)?;
    let store = FileStore::open(&cfg.store.dir, cfg.store.retention.clone())?;
    let layer = TransferLayer::new(cfg.transfer, Arc::new(store));

    let mut channel = MemoryChannel::new(args.ceiling_bytes);
    if args.unordered {
        channel = channel.unordered();
    }

    let envelope = match args.strategy {
        Some(s) => layer.send_with(&recording, s.into(), &mut channel)?,
        None => layer.send(&recording, &mut channel)?,
    };
    println!("envelope {}", serde_json::to_string(&envelope)?);

    let received = layer.receive(envelope, &mut channel)?;
    received.save(&args.out)?;
    info!(path = %args.out.display(), events = received.len(), "接收副本已保存");
    println!("received events={}", received.len());
    Ok(())
}

fn main() -> ExitCode {
    // 日志写 stderr，stdout 只留给结果
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "传输失败");
            ExitCode::FAILURE
        }
    }
}
