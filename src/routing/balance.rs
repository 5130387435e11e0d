//! 分组对内的流量切分（线性规划）
//!
//! 对有序分组对 `(src, dst)`，为 `src` 中每台非入口交换机求出发往各入口交换机的权重：
//!
//! ```text
//! min  sum_s sum_e demand_s * hops(s, e) * w_se
//! s.t. sum_e w_se = 1                                    （每台有需求的非入口交换机）
//!      own_e + sum_s demand_s * w_se <= (1 + sigma) * total / C   （每个入口交换机）
//!      0 <= w_se <= 1
//! ```
//!
//! 入口交换机自身的流量直接出组，权重固定为 `(e, e) = 1`。

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::paths::PathSet;
use crate::opt::{LinearProgram, LpSolver, Relation, Sense, VarId};
use crate::topo::{GroupPair, SwitchId, WeightKey};

/// 分组对的路由结果状态
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairStatus {
    /// 线性规划求解成功
    Optimized,
    /// 退化为均匀权重。每个源交换机只在它能在跳数上限内到达的入口之间均分；
    /// 一个入口都到不了时才在全部入口之间均分
    Uniform { reason: String },
    /// 两组之间没有直连链路
    NoEntrance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairRouting {
    pub pair: GroupPair,
    pub status: PairStatus,
    pub weights: BTreeMap<WeightKey, f64>,
}

impl PairRouting {
    pub fn weight(&self, switch: SwitchId, entrance: SwitchId) -> f64 {
        self.weights
            .get(&WeightKey { switch, entrance })
            .copied()
            .unwrap_or(0.0)
    }

    /// `switch` 的全部 (入口交换机, 权重)
    pub fn weights_from(&self, switch: SwitchId) -> impl Iterator<Item = (SwitchId, f64)> + '_ {
        self.weights
            .range(
                WeightKey {
                    switch,
                    entrance: SwitchId(0),
                }..=WeightKey {
                    switch,
                    entrance: SwitchId(usize::MAX),
                },
            )
            .map(|(k, &w)| (k.entrance, w))
    }

    pub fn weight_sum(&self, switch: SwitchId) -> f64 {
        self.weights_from(switch).map(|(_, w)| w).sum()
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self.status, PairStatus::Optimized)
    }
}

/// 单个方向的输入
#[derive(Debug, Clone, Copy)]
pub struct PairDemand<'a> {
    pub pair: GroupPair,
    /// `src` 到 `dst` 的有向链路数
    pub capacity: u32,
    /// `src` 组内全部交换机
    pub sources: &'a [SwitchId],
    /// 已排序的入口交换机
    pub entrances: &'a [SwitchId],
    /// 每台交换机发往 `dst` 组的需求，与 `sources` 一一对应
    pub demand: &'a [f64],
}

pub struct LoadBalancer<'a, S: LpSolver + ?Sized> {
    solver: &'a S,
    sigma: f64,
}

struct SourceVars {
    switch: SwitchId,
    vars: Vec<(SwitchId, VarId)>,
}

impl<'a, S: LpSolver + ?Sized> LoadBalancer<'a, S> {
    /// `sigma` 为入口交换机负载相对公平份额的容忍度
    pub fn new(solver: &'a S, sigma: f64) -> Self {
        Self { solver, sigma }
    }

    #[tracing::instrument(skip(self, input, paths), fields(src = %input.pair.src, dst = %input.pair.dst))]
    pub fn split_traffic(&self, input: &PairDemand<'_>, paths: &PathSet) -> PairRouting {
        let pair = input.pair;
        if input.entrances.is_empty() || input.capacity == 0 {
            warn!(src = %pair.src, dst = %pair.dst, "分组对之间没有入口交换机");
            return PairRouting {
                pair,
                status: PairStatus::NoEntrance,
                weights: BTreeMap::new(),
            };
        }

        let is_entrance = |s: SwitchId| input.entrances.binary_search(&s).is_ok();
        let demand_of: BTreeMap<SwitchId, f64> = input
            .sources
            .iter()
            .copied()
            .zip(input.demand.iter().copied())
            .collect();
        let total: f64 = input.demand.iter().sum();
        let bound = (1.0 + self.sigma) * total / input.capacity as f64;

        let mut lp = LinearProgram::new(Sense::Minimize);
        let mut routed: Vec<SourceVars> = Vec::new();
        for &s in input.sources {
            let demand = demand_of.get(&s).copied().unwrap_or(0.0);
            if is_entrance(s) || demand <= 0.0 {
                continue;
            }
            let reachable = paths.min_hops(s, pair.dst);
            if reachable.is_empty() {
                let reason = format!("switch {s} has no bounded path to any entrance");
                warn!(src = %pair.src, dst = %pair.dst, switch = %s, "路径缺失，退化为均匀权重");
                return self.uniform(input, paths, reason);
            }
            let vars = reachable
                .into_iter()
                .map(|(e, hops)| {
                    let var = lp.add_var(format!("w_{s}_{e}"), 0.0, 1.0, demand * hops as f64);
                    (e, var)
                })
                .collect::<Vec<_>>();
            lp.add_constraint(vars.iter().map(|&(_, v)| (v, 1.0)).collect(), Relation::Eq, 1.0);
            routed.push(SourceVars { switch: s, vars });
        }

        for &e in input.entrances {
            let own = demand_of.get(&e).copied().unwrap_or(0.0);
            let terms: Vec<(VarId, f64)> = routed
                .iter()
                .flat_map(|sv| {
                    let demand = demand_of.get(&sv.switch).copied().unwrap_or(0.0);
                    sv.vars
                        .iter()
                        .filter(move |(entrance, _)| *entrance == e)
                        .map(move |&(_, var)| (var, demand))
                })
                .collect();
            let rhs = bound - own;
            if terms.is_empty() {
                if rhs < -1e-9 {
                    let reason = format!("entrance {e} alone exceeds the fair-share bound");
                    warn!(src = %pair.src, dst = %pair.dst, entrance = %e, "入口交换机自身流量超出公平份额");
                    return self.uniform(input, paths, reason);
                }
                continue;
            }
            lp.add_constraint(terms, Relation::Le, rhs);
        }

        let mut weights = BTreeMap::new();
        if !routed.is_empty() {
            match self.solver.solve(&lp) {
                Ok(solution) => {
                    for sv in &routed {
                        for &(e, var) in &sv.vars {
                            let w = solution.value(var).clamp(0.0, 1.0);
                            weights.insert(
                                WeightKey {
                                    switch: sv.switch,
                                    entrance: e,
                                },
                                w,
                            );
                        }
                    }
                    debug!(objective = solution.objective(), vars = lp.num_vars(), "分组对切分完成");
                }
                Err(err) => {
                    warn!(src = %pair.src, dst = %pair.dst, error = %err, "线性规划失败，退化为均匀权重");
                    return self.uniform(input, paths, err.to_string());
                }
            }
        }

        let solved: Vec<SwitchId> = routed.iter().map(|sv| sv.switch).collect();
        self.fill_defaults(input, paths, &solved, &mut weights);
        PairRouting {
            pair,
            status: PairStatus::Optimized,
            weights,
        }
    }

    fn uniform(&self, input: &PairDemand<'_>, paths: &PathSet, reason: String) -> PairRouting {
        let mut weights = BTreeMap::new();
        self.fill_defaults(input, paths, &[], &mut weights);
        PairRouting {
            pair: input.pair,
            status: PairStatus::Uniform { reason },
            weights,
        }
    }

    /// 入口交换机 `(e, e) = 1`；其余未求解的交换机在可达入口上均分（无可达入口时在全部入口上均分）
    fn fill_defaults(
        &self,
        input: &PairDemand<'_>,
        paths: &PathSet,
        solved: &[SwitchId],
        weights: &mut BTreeMap<WeightKey, f64>,
    ) {
        for &s in input.sources {
            if solved.contains(&s) {
                continue;
            }
            if input.entrances.binary_search(&s).is_ok() {
                weights.insert(
                    WeightKey {
                        switch: s,
                        entrance: s,
                    },
                    1.0,
                );
                continue;
            }
            let reachable: Vec<SwitchId> = paths.min_hops(s, input.pair.dst).into_keys().collect();
            let targets = if reachable.is_empty() {
                input.entrances
            } else {
                reachable.as_slice()
            };
            let share = 1.0 / targets.len() as f64;
            for &e in targets {
                weights.insert(
                    WeightKey {
                        switch: s,
                        entrance: e,
                    },
                    share,
                );
            }
        }
    }
}
