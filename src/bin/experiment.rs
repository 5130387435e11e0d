//! 运行一次实验
//!
//! 读取实验 JSON，构建拓扑、生成流量、计算路由权重，并把产物写入输出目录。

use clap::Parser;
use flexfly_rs::config::{ExperimentSpec, RoutingSpec};
use flexfly_rs::pipeline::{ExperimentError, run_experiment};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "experiment",
    about = "构建分组拓扑并计算入口路由权重，输出给包级模拟器"
)]
struct Args {
    /// 实验描述 JSON
    #[arg(long)]
    config: PathBuf,

    /// 输出目录（不存在时创建）
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// 覆盖入口负载容忍度 sigma
    #[arg(long)]
    sigma: Option<f64>,

    /// 覆盖组内最大跳数
    #[arg(long)]
    max_hops: Option<usize>,

    /// 覆盖 expander 随机种子
    #[arg(long)]
    seed: Option<u64>,

    /// 关闭日志输出
    #[arg(long)]
    quiet: bool,
}

fn load_spec(args: &Args) -> Result<ExperimentSpec, ExperimentError> {
    let raw = fs::read_to_string(&args.config)?;
    let mut spec = ExperimentSpec::from_json_str(&raw)?;
    if args.sigma.is_some() || args.max_hops.is_some() {
        let routing = spec.routing.get_or_insert_with(RoutingSpec::default);
        if let Some(sigma) = args.sigma {
            routing.sigma = Some(sigma);
        }
        if let Some(hops) = args.max_hops {
            routing.max_intra_hops = Some(hops);
        }
    }
    if let Some(seed) = args.seed {
        spec.seed = Some(seed);
    }
    Ok(spec)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let result = load_spec(&args).and_then(|spec| run_experiment(&spec, &args.out_dir));
    match result {
        Ok(summary) => {
            println!(
                "topology={} switches={} links={} degraded_pairs={}",
                summary.topology,
                summary.total_switches,
                summary.total_links,
                summary.degraded_pairs.len()
            );
            println!("wrote results to {}", args.out_dir.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("experiment failed: {err}");
            ExitCode::FAILURE
        }
    }
}
