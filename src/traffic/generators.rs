//! 流量生成器
//!
//! 生成器只依赖拓扑的分组结构（[`SingleGlobalLink`] 额外需要已构建的邻接矩阵）。

use tracing::debug;

use super::error::TrafficError;
use super::matrix::TrafficMatrix;
use crate::topo::{GroupId, GroupedTopology, SwitchId};

pub trait TrafficGenerator {
    fn generate(&self, topo: &GroupedTopology) -> Result<TrafficMatrix, TrafficError>;

    fn name(&self) -> String;
}

fn check_fraction(fraction: f64) -> Result<(), TrafficError> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(TrafficError::InvalidParameter(format!(
            "inter-group traffic fraction {fraction} must lie in [0, 1]"
        )));
    }
    Ok(())
}

/// 两位有效数字，去掉多余的尾零但保留一位小数：0.5 -> `0.5`，0.126 -> `0.13`，1 -> `1.0`
pub(crate) fn two_significant(v: f64) -> String {
    if v == 0.0 {
        return "0.0".to_string();
    }
    let sci = format!("{v:.1e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    if (-4..2).contains(&exp) {
        let decimals = (1 - exp).max(0) as usize;
        let mut out = format!("{v:.decimals$}");
        if out.contains('.') {
            let trimmed = out.trim_end_matches('0').len();
            out.truncate(trimmed);
        } else {
            out.push('.');
        }
        if out.ends_with('.') {
            out.push('0');
        }
        return out;
    }
    let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.abs())
}

fn fraction_tag(fraction: f64) -> String {
    two_significant(fraction).replace('.', "p")
}

/// 每个分组把 `(1 - fraction) / G` 的流量均摊到组内所有有序交换机对
fn fill_intra_group(
    tm: &mut TrafficMatrix,
    topo: &GroupedTopology,
    fraction: f64,
) -> Result<(), TrafficError> {
    let g = topo.num_groups();
    let per_group = (1.0 - fraction) / g as f64;
    for group in topo.group_map().groups() {
        let switches = topo.switches_in(group);
        let entries = switches.len() * switches.len().saturating_sub(1);
        if entries == 0 {
            continue;
        }
        let value = per_group / entries as f64;
        for &src in switches {
            for &dst in switches {
                if src != dst {
                    tm.set(src.0, dst.0, value)?;
                }
            }
        }
    }
    Ok(())
}

/// 每个分组把 `fraction / G` 的流量发往下一个分组 `(g + 1) mod G`，
/// 在两组的所有交换机对之间均摊
#[derive(Debug, Clone, Copy)]
pub struct Adversarial {
    pub intergroup_fraction: f64,
}

impl TrafficGenerator for Adversarial {
    fn generate(&self, topo: &GroupedTopology) -> Result<TrafficMatrix, TrafficError> {
        check_fraction(self.intergroup_fraction)?;
        let g = topo.num_groups();
        let mut tm = TrafficMatrix::zeros(topo.total_switches());
        let per_group = self.intergroup_fraction / g as f64;
        for group in 0..g {
            let src_switches = topo.switches_in(GroupId(group));
            let dst_switches = topo.switches_in(GroupId((group + 1) % g));
            let value = per_group / (src_switches.len() * dst_switches.len()) as f64;
            for &src in src_switches {
                for &dst in dst_switches {
                    tm.set(src.0, dst.0, value)?;
                }
            }
        }
        fill_intra_group(&mut tm, topo, self.intergroup_fraction)?;
        debug!(name = %self.name(), total = tm.total(), "生成流量矩阵");
        Ok(tm)
    }

    fn name(&self) -> String {
        format!("dfly_adversarial_{}", fraction_tag(self.intergroup_fraction))
    }
}

/// 与 [`Adversarial`] 相同，但每个分组的组间流量集中在一对交换机上：
/// 源和目的各取当前行和最小的交换机
#[derive(Debug, Clone, Copy)]
pub struct AdversarialSingleSwitch {
    pub intergroup_fraction: f64,
}

impl TrafficGenerator for AdversarialSingleSwitch {
    fn generate(&self, topo: &GroupedTopology) -> Result<TrafficMatrix, TrafficError> {
        check_fraction(self.intergroup_fraction)?;
        let g = topo.num_groups();
        let mut tm = TrafficMatrix::zeros(topo.total_switches());
        let per_group = self.intergroup_fraction / g as f64;
        for group in 0..g {
            let least_loaded = |group: usize, tm: &TrafficMatrix| {
                let mut best = topo.switches_in(GroupId(group))[0];
                for &sw in topo.switches_in(GroupId(group)) {
                    if tm.row_sum(sw.0) < tm.row_sum(best.0) {
                        best = sw;
                    }
                }
                best
            };
            let src = least_loaded(group, &tm);
            let dst = least_loaded((group + 1) % g, &tm);
            tm.set(src.0, dst.0, per_group)?;
        }
        fill_intra_group(&mut tm, topo, self.intergroup_fraction)?;
        debug!(name = %self.name(), total = tm.total(), "生成流量矩阵");
        Ok(tm)
    }

    fn name(&self) -> String {
        format!(
            "dfly_singleswitch_adversarial_{}",
            fraction_tag(self.intergroup_fraction)
        )
    }
}

/// 每条组间链路承载相同的流量
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleGlobalLink;

impl TrafficGenerator for SingleGlobalLink {
    fn generate(&self, topo: &GroupedTopology) -> Result<TrafficMatrix, TrafficError> {
        let n = topo.total_switches();
        let m = topo.adjacency();
        let is_global = |i: usize, j: usize| topo.group_of(SwitchId(i)) != topo.group_of(SwitchId(j));
        let global_links: u64 = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .filter(|&(i, j)| is_global(i, j))
            .map(|(i, j)| m.get(i, j) as u64)
            .sum();
        if global_links == 0 {
            return Err(TrafficError::InvalidParameter(
                "topology has no inter-group links yet".to_string(),
            ));
        }
        let per_link = 1.0 / global_links as f64;
        let mut tm = TrafficMatrix::zeros(n);
        for i in 0..n {
            for j in 0..n {
                if is_global(i, j) && m.get(i, j) > 0 {
                    tm.set(i, j, m.get(i, j) as f64 * per_link)?;
                }
            }
        }
        Ok(tm)
    }

    fn name(&self) -> String {
        "dfly_strain_single_link".to_string()
    }
}

/// 三维 27 点 stencil：网格点与其 26 个邻居交换数据，
/// 再缩放到交换机数量并归一化
#[derive(Debug, Clone, Copy)]
pub struct Stencil27Point {
    pub dims: [usize; 3],
}

impl Stencil27Point {
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.dims[1] + y) * self.dims[2] + z
    }

    fn grid_traffic(&self) -> Result<TrafficMatrix, TrafficError> {
        let [dx, dy, dz] = self.dims;
        let mut tm = TrafficMatrix::zeros(dx * dy * dz);
        for x in 0..dx {
            for y in 0..dy {
                for z in 0..dz {
                    let src = self.index(x, y, z);
                    for ox in -1_i64..=1 {
                        for oy in -1_i64..=1 {
                            for oz in -1_i64..=1 {
                                let (nx, ny, nz) = (x as i64 + ox, y as i64 + oy, z as i64 + oz);
                                if nx < 0 || ny < 0 || nz < 0 {
                                    continue;
                                }
                                let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
                                if nx >= dx || ny >= dy || nz >= dz {
                                    continue;
                                }
                                let nbr = self.index(nx, ny, nz);
                                if nbr != src {
                                    tm.add(nbr, src, 1.0)?;
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(tm)
    }
}

impl TrafficGenerator for Stencil27Point {
    fn generate(&self, topo: &GroupedTopology) -> Result<TrafficMatrix, TrafficError> {
        if self.dims.iter().any(|&d| d == 0) {
            return Err(TrafficError::InvalidParameter(format!(
                "stencil dimensions {:?} must all be positive",
                self.dims
            )));
        }
        let grid = self.grid_traffic()?;
        grid.rescale(topo.total_switches()).normalized(1.0)
    }

    fn name(&self) -> String {
        format!(
            "stencil27P_{}_{}_{}",
            self.dims[0], self.dims[1], self.dims[2]
        )
    }
}

/// 直接给定的交换机级流量矩阵，对角线清零后归一化为概率
#[derive(Debug, Clone)]
pub struct ExplicitMatrix {
    pub rows: Vec<Vec<f64>>,
}

impl TrafficGenerator for ExplicitMatrix {
    fn generate(&self, topo: &GroupedTopology) -> Result<TrafficMatrix, TrafficError> {
        let mut tm = TrafficMatrix::from_rows(&self.rows)?;
        if tm.size() != topo.total_switches() {
            return Err(TrafficError::SizeMismatch {
                expected: topo.total_switches(),
                actual: tm.size(),
            });
        }
        for i in 0..tm.size() {
            tm.set(i, i, 0.0)?;
        }
        let tm = tm.normalized(1.0)?;
        debug!(name = %self.name(), switches = tm.size(), "生成流量矩阵");
        Ok(tm)
    }

    fn name(&self) -> String {
        "explicit_matrix".to_string()
    }
}
