//! 按流量比例规划组间链路（分数解）
//!
//! 最大化保证吞吐比例 `t`：
//!
//! ```text
//! max t
//! s.t. 1 <= l_ij <= B                    （每个无序分组对一个变量）
//!      sum_j l_ij <= B                   （每个分组的组间链路预算）
//!      l_ij >= t * demand_ij             （每个有需求的分组对）
//! ```
//!
//! 非对称流量先按两个方向求和做对称化。

use tracing::{debug, info, warn};

use crate::opt::{LinearProgram, LpSolver, Relation, Sense, SolverError, VarId};

#[derive(Debug, Clone, PartialEq)]
pub struct FractionalLinkPlan {
    /// 对称的分数链路矩阵，对角线为 0
    pub links: Vec<Vec<f64>>,
    /// 最优吞吐比例；流量全为 0 时没有意义，为 `None`
    pub throughput: Option<f64>,
}

/// `sym[i][j] = d[i][j] + d[j][i]`
pub fn symmetrize_demand(demand: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = demand.len();
    let mut sym = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i + 1..n {
            let v = demand[i][j] + demand[j][i];
            sym[i][j] = v;
            sym[j][i] = v;
        }
    }
    sym
}

fn is_symmetric(m: &[Vec<f64>]) -> bool {
    let n = m.len();
    (0..n).all(|i| (i + 1..n).all(|j| (m[i][j] - m[j][i]).abs() <= 1e-12))
}

pub struct InterGroupLinkPlanner<'a, S: LpSolver + ?Sized> {
    solver: &'a S,
    num_groups: usize,
    budget: f64,
}

impl<'a, S: LpSolver + ?Sized> InterGroupLinkPlanner<'a, S> {
    /// `budget` 为每个分组的组间链路总数 `A * h`
    pub fn new(solver: &'a S, num_groups: usize, budget: usize) -> Self {
        Self {
            solver,
            num_groups,
            budget: budget as f64,
        }
    }

    #[tracing::instrument(skip(self, group_traffic), fields(groups = self.num_groups, budget = self.budget))]
    pub fn plan(&self, group_traffic: &[Vec<f64>]) -> Result<FractionalLinkPlan, SolverError> {
        let g = self.num_groups;
        if group_traffic.len() != g || group_traffic.iter().any(|row| row.len() != g) {
            return Err(SolverError::Malformed(format!(
                "group traffic must be {g}x{g}"
            )));
        }
        if group_traffic
            .iter()
            .flatten()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(SolverError::Malformed(
                "group traffic must be finite and non-negative".to_string(),
            ));
        }

        let demand = if is_symmetric(group_traffic) {
            group_traffic.to_vec()
        } else {
            debug!("流量矩阵不对称，按双向求和对称化");
            symmetrize_demand(group_traffic)
        };

        let has_demand = (0..g).any(|i| (0..g).any(|j| i != j && demand[i][j] > 0.0));
        if !has_demand {
            let share = self.budget / (g - 1) as f64;
            info!(share, "流量全为 0，均分组间链路预算");
            let links = (0..g)
                .map(|i| (0..g).map(|j| if i == j { 0.0 } else { share }).collect())
                .collect();
            return Ok(FractionalLinkPlan {
                links,
                throughput: None,
            });
        }

        let mut lp = LinearProgram::new(Sense::Maximize);
        let throughput = lp.add_var("throughput", 0.0, f64::INFINITY, 1.0);
        let mut pair_var: Vec<Vec<Option<VarId>>> = vec![vec![None; g]; g];
        for i in 0..g {
            for j in i + 1..g {
                let v = lp.add_var(format!("l_{i}_{j}"), 1.0, self.budget, 0.0);
                pair_var[i][j] = Some(v);
                pair_var[j][i] = Some(v);
            }
        }

        // 变量对称，出度与入度约束相同，只需一条
        for i in 0..g {
            let terms: Vec<(VarId, f64)> = (0..g)
                .filter_map(|j| pair_var[i][j])
                .map(|v| (v, 1.0))
                .collect();
            lp.add_constraint(terms, Relation::Le, self.budget);
        }

        for i in 0..g {
            for j in i + 1..g {
                let d = demand[i][j];
                if d <= 0.0 {
                    continue;
                }
                if let Some(v) = pair_var[i][j] {
                    lp.add_constraint(vec![(v, 1.0), (throughput, -d)], Relation::Ge, 0.0);
                }
            }
        }

        let solution = self.solver.solve(&lp).inspect_err(|err| {
            warn!(error = %err, "组间链路规划求解失败");
        })?;

        let mut links = vec![vec![0.0; g]; g];
        for i in 0..g {
            for j in i + 1..g {
                if let Some(v) = pair_var[i][j] {
                    let x = solution.value(v);
                    links[i][j] = x;
                    links[j][i] = x;
                }
            }
        }
        let t = solution.value(throughput);
        info!(throughput = t, "✅ 分数组间链路规划完成");
        Ok(FractionalLinkPlan {
            links,
            throughput: Some(t),
        })
    }
}
