//! 回放到指定时刻
//!
//! 从初始快照出发应用事件，打印重建出的可视状态

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use uirec_rs::recording::Recording;
use uirec_rs::replay::Player;
use uirec_rs::time::SessionTime;

#[derive(Debug, Parser)]
#[command(name = "replay-state", about = "回放录制到指定逻辑时刻并输出可视状态")]
struct Args {
    #[arg(long)]
    recording: PathBuf,
    /// 逻辑时刻（毫秒）；缺省回放全部事件
    #[arg(long)]
    at_ms: Option<u64>,
    /// 逐条打印被应用的事件
    #[arg(long)]
    trace: bool,
}

fn run(args: &Args) -> uirec_rs::Result<()> {
    let recording = Recording::load(&args.recording)?;
    let last = recording
        .events()
        .iter()
        .map(|e| e.timestamp)
        .max()
        .unwrap_or(SessionTime::ZERO);
    let until = args.at_ms.map_or(last, SessionTime);

    let mut player = Player::new(&recording)?;
    if args.trace {
        while player.next_at().is_some_and(|at| at <= until) {
            let Some(ev) = player.step() else { break };
            println!("apply t={} kind={}", ev.timestamp.0, ev.kind());
        }
    }
    player.run_until(until);

    println!("{}", serde_json::to_string_pretty(player.state())?);
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
            error!(error = %e, "回放失败");
            ExitCode::FAILURE
        }
    }
}
