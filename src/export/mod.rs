//! 实验产物导出
//!
//! 四类纯文本记录（拓扑、交换机分组、流量概率、路由权重）加一个 JSON 摘要。

mod records;

pub use records::{
    sci, write_routing_weights, write_switch_to_group, write_topology, write_traffic_probability,
};

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::routing::RoutingWeightTable;
use crate::topo::{GroupMap, SwitchId};
use crate::traffic::TrafficMatrix;

pub const TOPOLOGY_FILE: &str = "topology.txt";
pub const SWITCH_TO_GROUP_FILE: &str = "switch_to_block.txt";
pub const TRAFFIC_FILE: &str = "traffic_probability.txt";
pub const ROUTING_WEIGHTS_FILE: &str = "routing_weights.txt";
pub const SUMMARY_FILE: &str = "summary.json";

/// 一次实验的全部导出输入
pub struct Bundle<'a, T: Serialize> {
    pub adjacency: &'a [Vec<SwitchId>],
    pub groups: &'a GroupMap,
    pub traffic: &'a TrafficMatrix,
    pub routing: &'a RoutingWeightTable,
    pub summary: &'a T,
}

fn create(dir: &Path, name: &str) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(dir.join(name))?))
}

/// 写入 `dir`（不存在时创建），返回写出的文件路径
pub fn write_bundle<T: Serialize>(dir: &Path, bundle: &Bundle<'_, T>) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut w = create(dir, TOPOLOGY_FILE)?;
    write_topology(&mut w, bundle.adjacency)?;
    w.flush()?;

    let mut w = create(dir, SWITCH_TO_GROUP_FILE)?;
    write_switch_to_group(&mut w, bundle.groups)?;
    w.flush()?;

    let mut w = create(dir, TRAFFIC_FILE)?;
    write_traffic_probability(&mut w, bundle.traffic, bundle.adjacency.len())?;
    w.flush()?;

    let mut w = create(dir, ROUTING_WEIGHTS_FILE)?;
    write_routing_weights(&mut w, bundle.routing)?;
    w.flush()?;

    let mut w = create(dir, SUMMARY_FILE)?;
    serde_json::to_writer_pretty(&mut w, bundle.summary)?;
    writeln!(w)?;
    w.flush()?;

    let written: Vec<PathBuf> = [
        TOPOLOGY_FILE,
        SWITCH_TO_GROUP_FILE,
        TRAFFIC_FILE,
        ROUTING_WEIGHTS_FILE,
        SUMMARY_FILE,
    ]
    .iter()
    .map(|name| dir.join(name))
    .collect();
    info!(dir = %dir.display(), files = written.len(), "✅ 实验产物已写出");
    Ok(written)
}
