//! 录制分析
//!
//! 读取录制文件，按组件汇总交互并打印报告

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use uirec_rs::analyze::Analyzer;
use uirec_rs::config::PipelineConfig;
use uirec_rs::recording::Recording;

#[derive(Debug, Parser)]
#[command(name = "analyze-recording", about = "分析录制文件：按组件汇总交互")]
struct Args {
    /// 录制文件（完整格式或裸 rrweb 事件数组）
    #[arg(long)]
    recording: PathBuf,
    /// 流水线配置（JSON）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 覆盖组件属性名（默认 data-component）
    #[arg(long)]
    component_attribute: Option<String>,
    /// 以 JSON 输出分析结果
    #[arg(long)]
    json: bool,
}

fn run(args: &Args) -> uirec_rs::Result<()> {
    let mut cfg = PipelineConfig::load_or_default(args.config.as_deref())?;
    if let Some(attr) = &args.component_attribute {
        cfg.naming.component_attribute = attr.clone();
        cfg.validate()?;
    }

    let recording = Recording::load(&args.recording)?;
    let analysis = Analyzer::new(cfg.naming).analyze(&recording)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", analysis.render_report());
    }
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
            error!(error = %e, "分析失败");
            ExitCode::FAILURE
        }
    }
}
