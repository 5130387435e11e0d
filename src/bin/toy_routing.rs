//! 8 交换机、2 分组的小例子
//!
//! 流量只在交换机 0 -> 7 之间，打印全部路由权重记录。

use clap::Parser;
use flexfly_rs::routing::{AdaptiveRouting, AdaptiveRoutingOpts, RoutingWeightTable};
use flexfly_rs::topo::{GroupId, SwitchId};
use flexfly_rs::traffic::TrafficMatrix;
use std::error::Error;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "toy_routing", about = "两个分组的玩具拓扑上的入口路由")]
struct Args {
    #[arg(long, default_value_t = 0.0)]
    sigma: f64,
    #[arg(long, default_value_t = 2)]
    max_hops: usize,
}

fn toy_adjacency() -> Vec<Vec<SwitchId>> {
    [
        vec![1, 2, 3],
        vec![0, 2, 3, 4],
        vec![0, 1, 3, 5],
        vec![0, 1, 2, 6],
        vec![5, 6, 7, 1],
        vec![4, 6, 7, 2],
        vec![4, 5, 7, 3],
        vec![4, 5, 6],
    ]
    .into_iter()
    .map(|row| row.into_iter().map(SwitchId).collect())
    .collect()
}

fn run(args: &Args) -> Result<RoutingWeightTable, Box<dyn Error>> {
    let adj = toy_adjacency();
    let groups: Vec<GroupId> = (0..8).map(|sw| GroupId(sw / 4)).collect();
    let mut traffic = TrafficMatrix::zeros(8);
    traffic.set(0, 7, 5.0)?;
    let router = AdaptiveRouting::new(AdaptiveRoutingOpts {
        sigma: args.sigma,
        max_intra_hops: args.max_hops,
    })?;
    Ok(router.route(&adj, &groups, &traffic)?)
}

fn main() -> ExitCode {
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
    let table = match run(&args) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("toy routing failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("switchID,targetBlock,entrySwitch,weight");
    for r in table.records() {
        println!("{},{},{},{:.6}", r.switch, r.target_group, r.entrance, r.weight);
    }
    for pair in table.pairs() {
        println!("# {}->{}: {:?}", pair.pair.src, pair.pair.dst, pair.status);
    }
    ExitCode::SUCCESS
}
