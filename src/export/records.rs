//! 交给外部包级模拟器的纯文本记录

use std::io::{self, Write};

use crate::routing::RoutingWeightTable;
use crate::topo::{GroupMap, SwitchId};
use crate::traffic::TrafficMatrix;

/// `1.234560E-01` 形式的科学计数法（指数带符号、至少两位）
pub fn sci(value: f64) -> String {
    let raw = format!("{value:.6E}");
    match raw.split_once('E') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}E{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

/// 邻接表文件：头部 + 每条有向链路一行 `src dst`（并行链路重复）
pub fn write_topology<W: Write>(w: &mut W, adj: &[Vec<SwitchId>]) -> io::Result<()> {
    let n = adj.len();
    let edges: usize = adj.iter().map(Vec::len).sum();
    writeln!(w, "# topology adj list file")?;
    writeln!(w, "|V|={n}")?;
    writeln!(w, "|E|={edges}")?;
    writeln!(w, "ToRs=incl_range(0,{})", n.saturating_sub(1))?;
    writeln!(w, "Servers=incl_range(0,{})", n.saturating_sub(1))?;
    writeln!(w, "Switches=set()")?;
    writeln!(w)?;
    for (src, neighbors) in adj.iter().enumerate() {
        for dst in neighbors {
            writeln!(w, "{src} {dst}")?;
        }
    }
    Ok(())
}

pub fn write_switch_to_group<W: Write>(w: &mut W, groups: &GroupMap) -> io::Result<()> {
    writeln!(w, "## switch_id, block_id")?;
    for (sw, group) in groups.switch_to_group().iter().enumerate() {
        writeln!(w, "{sw},{group}")?;
    }
    Ok(())
}

/// 只写正的非对角元素；端点编号偏移 `num_switches`（服务器编号）
pub fn write_traffic_probability<W: Write>(
    w: &mut W,
    traffic: &TrafficMatrix,
    num_switches: usize,
) -> io::Result<()> {
    writeln!(w, "#tor_pair_id,src,dst,pdf_num_bytes")?;
    let mut pair_id = 0_usize;
    for i in 0..traffic.size() {
        for (j, &p) in traffic.row(i).iter().enumerate() {
            if i != j && p > 0.0 {
                writeln!(
                    w,
                    "{pair_id},{},{},{}",
                    i + num_switches,
                    j + num_switches,
                    sci(p)
                )?;
                pair_id += 1;
            }
        }
    }
    writeln!(w)?;
    Ok(())
}

pub fn write_routing_weights<W: Write>(w: &mut W, table: &RoutingWeightTable) -> io::Result<()> {
    writeln!(w, "##switchID, targetBlock, entrySwitch, weight")?;
    for r in table.records() {
        writeln!(
            w,
            "{},{},{},{}",
            r.switch,
            r.target_group,
            r.entrance,
            sci(r.weight)
        )?;
    }
    writeln!(w)?;
    Ok(())
}
