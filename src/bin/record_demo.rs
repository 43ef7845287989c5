//! 演示录制
//!
//! 在内存仪表盘上跑一段脚本化交互，把录制结果写成 JSON 文件

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use uirec_rs::config::PipelineConfig;
use uirec_rs::demo::{ScriptOpts, build_dashboard, record_scripted_session};

#[derive(Debug, Parser)]
#[command(name = "record-demo", about = "演示录制：在内存仪表盘上录制一段脚本化会话")]
struct Args {
    /// 输出的录制文件
    #[arg(long)]
    out: PathBuf,
    /// 流水线配置（JSON）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 覆盖配置里的起始节点 id
    #[arg(long)]
    first_id: Option<u64>,
    #[arg(long, default_value_t = 8)]
    pan_steps: u32,
    #[arg(long, default_value_t = 4)]
    zoom_steps: u32,
    /// 相邻输入的间隔（毫秒）
    #[arg(long, default_value_t = 40)]
    gap_ms: u64,
}

fn run(args: &Args) -> uirec_rs::Result<()> {
    let cfg = PipelineConfig::load_or_default(args.config.as_deref())?;
    let first_id = args.first_id.unwrap_or(cfg.snapshot.first_id);

    let dash = build_dashboard(&cfg.naming);
    let opts = ScriptOpts {
        pan_steps: args.pan_steps,
        zoom_steps: args.zoom_steps,
        gap_ms: args.gap_ms,
    };
    let recording = record_scripted_session(&dash, &cfg.naming, first_id, &opts)?;
    recording.save(&args.out)?;
    info!(path = %args.out.display(), "录制已保存");

    println!(
        "saved events={} path={}",
        recording.len(),
        args.out.display()
    );
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
            error!(error = %e, "录制失败");
            ExitCode::FAILURE
        }
    }
}
