//! 自适应入口路由
//!
//! 流程：识别入口交换机 -> 枚举有界路径 -> 对每个有序分组对做负载均衡。
//! 单个分组对的求解失败只会让该分组对退化，不会中断整体流程。

use tracing::info;

use super::balance::{LoadBalancer, PairDemand};
use super::entrance::EntranceSets;
use super::error::RoutingError;
use super::paths::{DEFAULT_MAX_INTRA_HOPS, EntrancePathFinder, PathSet};
use super::weights::RoutingWeightTable;
use crate::opt::{LpSolver, MinilpSolver};
use crate::topo::{GroupId, GroupMap, GroupPair, SwitchId};
use crate::traffic::TrafficMatrix;

/// 入口负载相对公平份额的默认容忍度
pub const DEFAULT_SIGMA: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveRoutingOpts {
    pub sigma: f64,
    pub max_intra_hops: usize,
}

impl Default for AdaptiveRoutingOpts {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            max_intra_hops: DEFAULT_MAX_INTRA_HOPS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AdaptiveRouting {
    opts: AdaptiveRoutingOpts,
}

impl AdaptiveRouting {
    pub fn new(opts: AdaptiveRoutingOpts) -> Result<Self, RoutingError> {
        if !opts.sigma.is_finite() || opts.sigma < 0.0 {
            return Err(RoutingError::InvalidOption(format!(
                "sigma must be finite and non-negative, got {}",
                opts.sigma
            )));
        }
        Ok(Self { opts })
    }

    pub fn opts(&self) -> &AdaptiveRoutingOpts {
        &self.opts
    }

    /// 使用默认求解后端
    pub fn route(
        &self,
        adj: &[Vec<SwitchId>],
        switch_to_group: &[GroupId],
        traffic: &TrafficMatrix,
    ) -> Result<RoutingWeightTable, RoutingError> {
        self.route_with(adj, switch_to_group, traffic, &MinilpSolver)
    }

    /// `adj` 为邻接表（并行链路重复出现），`switch_to_group` 为逐交换机的分组编号
    #[tracing::instrument(skip_all, fields(switches = adj.len(), sigma = self.opts.sigma))]
    pub fn route_with<S: LpSolver + ?Sized>(
        &self,
        adj: &[Vec<SwitchId>],
        switch_to_group: &[GroupId],
        traffic: &TrafficMatrix,
        solver: &S,
    ) -> Result<RoutingWeightTable, RoutingError> {
        let n = adj.len();
        if switch_to_group.len() != n {
            return Err(RoutingError::SwitchCountMismatch {
                adjacency: n,
                groups: switch_to_group.len(),
            });
        }
        if traffic.size() != n {
            return Err(RoutingError::TrafficSizeMismatch {
                switches: n,
                traffic: traffic.size(),
            });
        }
        for (sw, neighbors) in adj.iter().enumerate() {
            if let Some(bad) = neighbors.iter().find(|nbr| nbr.0 >= n) {
                return Err(RoutingError::NeighborOutOfRange {
                    switch: sw,
                    neighbor: bad.0,
                });
            }
        }

        let groups = GroupMap::from_assignment(switch_to_group.to_vec());
        let entrances = EntranceSets::identify(adj, &groups);
        let paths = self.path_selection(adj, &groups, &entrances);
        let table = self.load_balance(&groups, traffic, &entrances, &paths, solver);

        let counts = table.status_counts();
        info!(
            pairs = table.len(),
            optimized = counts.optimized,
            uniform = counts.uniform,
            no_entrance = counts.no_entrance,
            "✅ 路由权重计算完成"
        );
        Ok(table)
    }

    pub fn path_selection(
        &self,
        adj: &[Vec<SwitchId>],
        groups: &GroupMap,
        entrances: &EntranceSets,
    ) -> PathSet {
        EntrancePathFinder::new(self.opts.max_intra_hops).find_all(adj, groups, entrances)
    }

    /// 对每个无序分组对的两个方向分别切分流量
    #[tracing::instrument(skip_all, fields(groups = groups.num_groups()))]
    pub fn load_balance<S: LpSolver + ?Sized>(
        &self,
        groups: &GroupMap,
        traffic: &TrafficMatrix,
        entrances: &EntranceSets,
        paths: &PathSet,
        solver: &S,
    ) -> RoutingWeightTable {
        let balancer = LoadBalancer::new(solver, self.opts.sigma);
        let mut table = RoutingWeightTable::new();
        let g = groups.num_groups();
        for g1 in 0..g {
            for g2 in g1 + 1..g {
                let forward = GroupPair::new(GroupId(g1), GroupId(g2));
                for pair in [forward, forward.reversed()] {
                    let sources = groups.switches_in(pair.src);
                    let demand: Vec<f64> = sources
                        .iter()
                        .map(|&s| traffic.demand_to_group(s, pair.dst, groups))
                        .collect();
                    let input = PairDemand {
                        pair,
                        capacity: entrances.capacity(pair),
                        sources,
                        entrances: entrances.get(pair),
                        demand: &demand,
                    };
                    table.insert(balancer.split_traffic(&input, paths));
                }
            }
        }
        table
    }
}
