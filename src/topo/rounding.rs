//! 把分数组间链路矩阵取整
//!
//! 先对每个位置取下整，剩余预算通过一个二部流网络分配：
//!
//! ```text
//! source --(B - 行下整和)--> egress_i --(1, 费用)--> ingress_j --(B - 列下整和)--> sink
//! ```
//!
//! `egress_i -> ingress_j` 的费用为 `(ceil - frac) * 1e6`，越接近上整的位置越先被进位。
//! 最终 `r = floor + flow`，再取两个方向的较小值保持对称。取较小值会丢掉单向的进位，
//! 所以最后按费用从小到大补位：两端分组都还有余量的分数位置对称地进位到上整。

use tracing::{debug, info};

use super::error::TopologyError;
use crate::opt::{EdgeId, FlowNetwork, MinCostFlowSolver};

/// 判定分数值“已经是整数”的容差
const SNAP_EPS: f64 = 1e-6;
/// 费用的整数精度
const COST_SCALE: f64 = 1e6;

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPS { r } else { v }
}

pub struct IntegerRoundingEngine<'a, F: MinCostFlowSolver + ?Sized> {
    solver: &'a F,
    budget: u32,
}

impl<'a, F: MinCostFlowSolver + ?Sized> IntegerRoundingEngine<'a, F> {
    pub fn new(solver: &'a F, budget: u32) -> Self {
        Self { solver, budget }
    }

    #[tracing::instrument(skip(self, frac), fields(groups = frac.len(), budget = self.budget))]
    pub fn round(&self, frac: &[Vec<f64>]) -> Result<Vec<Vec<u32>>, TopologyError> {
        let g = frac.len();
        if frac.iter().any(|row| row.len() != g) {
            return Err(TopologyError::Rounding(format!(
                "fractional matrix must be square ({g} rows)"
            )));
        }

        let mut snapped = vec![vec![0.0; g]; g];
        let mut floor = vec![vec![0_u32; g]; g];
        for i in 0..g {
            for j in 0..g {
                if i == j {
                    continue;
                }
                let v = snap(frac[i][j]);
                if !v.is_finite() || v < 0.0 {
                    return Err(TopologyError::Rounding(format!(
                        "entry ({i}, {j}) = {v} is not a valid link count"
                    )));
                }
                snapped[i][j] = v;
                floor[i][j] = v.floor() as u32;
            }
        }

        let source = 0;
        let sink = 2 * g + 1;
        let egress = |i: usize| 1 + i;
        let ingress = |j: usize| 1 + g + j;
        let mut net = FlowNetwork::new(2 * g + 2);

        for i in 0..g {
            let out_sum: u32 = floor[i].iter().sum();
            let in_sum: u32 = (0..g).map(|k| floor[k][i]).sum();
            if out_sum > self.budget || in_sum > self.budget {
                return Err(TopologyError::Rounding(format!(
                    "group {i} needs {} links after flooring, budget is {}",
                    out_sum.max(in_sum),
                    self.budget
                )));
            }
            net.add_edge(source, egress(i), (self.budget - out_sum) as i64, 0);
            net.add_edge(ingress(i), sink, (self.budget - in_sum) as i64, 0);
        }

        // 只有真正的分数位置才允许进位，保证 r <= ceil
        let mut round_up: Vec<(usize, usize, EdgeId)> = Vec::new();
        for i in 0..g {
            for j in 0..g {
                if i == j {
                    continue;
                }
                let v = snapped[i][j];
                if v.fract() == 0.0 {
                    continue;
                }
                let cost = ((v.ceil() - v) * COST_SCALE) as i64;
                let edge = net.add_edge(egress(i), ingress(j), 1, cost);
                round_up.push((i, j, edge));
            }
        }

        let flow = self
            .solver
            .max_flow_min_cost(&net, source, sink)
            .map_err(|err| TopologyError::Rounding(err.to_string()))?;
        debug!(
            total_flow = flow.total_flow(),
            total_cost = flow.total_cost(),
            "最小费用流已求解"
        );

        let mut result = floor;
        for (i, j, edge) in round_up {
            result[i][j] += flow.flow(edge) as u32;
        }

        for i in 0..g {
            for j in i + 1..g {
                let v = result[i][j].min(result[j][i]);
                result[i][j] = v;
                result[j][i] = v;
            }
        }
        let topped = self.top_up(&snapped, &mut result);
        debug!(topped, "对称补位完成");

        for i in 0..g {
            for j in i + 1..g {
                if result[i][j] < 1 {
                    return Err(TopologyError::DisconnectedGroupPair { src: i, dst: j });
                }
            }
        }

        info!(groups = g, "✅ 组间链路取整完成");
        Ok(result)
    }

    /// 把仍低于上整、两端行和都小于预算的位置对称地加一，返回进位的分组对数量
    fn top_up(&self, snapped: &[Vec<f64>], result: &mut [Vec<u32>]) -> usize {
        let g = result.len();
        let mut candidates: Vec<(i64, usize, usize)> = Vec::new();
        for i in 0..g {
            for j in i + 1..g {
                let (a, b) = (snapped[i][j], snapped[j][i]);
                if a.fract() == 0.0 || b.fract() == 0.0 {
                    continue;
                }
                let v = f64::from(result[i][j]);
                if v + 1.0 > a.ceil() || v + 1.0 > b.ceil() {
                    continue;
                }
                let cost = ((a.ceil() - a + b.ceil() - b) * COST_SCALE) as i64;
                candidates.push((cost, i, j));
            }
        }
        candidates.sort_unstable();

        let mut rows: Vec<u32> = result.iter().map(|row| row.iter().sum()).collect();
        let mut topped = 0;
        for (_, i, j) in candidates {
            if rows[i] < self.budget && rows[j] < self.budget {
                result[i][j] += 1;
                result[j][i] += 1;
                rows[i] += 1;
                rows[j] += 1;
                topped += 1;
            }
        }
        topped
    }
}
