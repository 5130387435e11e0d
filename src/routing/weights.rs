//! 路由权重表

use std::collections::BTreeMap;

use serde::Serialize;

use super::balance::{PairRouting, PairStatus};
use crate::topo::{GroupId, GroupPair, SwitchId};

/// 导出用的一行记录：`switch` 发往 `target_group` 的流量以 `weight` 经 `entrance` 出组
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightRecord {
    pub switch: SwitchId,
    pub target_group: GroupId,
    pub entrance: SwitchId,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub optimized: usize,
    pub uniform: usize,
    pub no_entrance: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingWeightTable {
    pairs: BTreeMap<GroupPair, PairRouting>,
}

impl RoutingWeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, routing: PairRouting) {
        self.pairs.insert(routing.pair, routing);
    }

    pub fn get(&self, pair: GroupPair) -> Option<&PairRouting> {
        self.pairs.get(&pair)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &PairRouting> + '_ {
        self.pairs.values()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn weight(&self, pair: GroupPair, switch: SwitchId, entrance: SwitchId) -> f64 {
        self.get(pair)
            .map(|p| p.weight(switch, entrance))
            .unwrap_or(0.0)
    }

    pub fn degraded_pairs(&self) -> Vec<GroupPair> {
        self.pairs
            .values()
            .filter(|p| p.is_degraded())
            .map(|p| p.pair)
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for p in self.pairs.values() {
            match p.status {
                PairStatus::Optimized => counts.optimized += 1,
                PairStatus::Uniform { .. } => counts.uniform += 1,
                PairStatus::NoEntrance => counts.no_entrance += 1,
            }
        }
        counts
    }

    /// 按 (分组对, 源交换机, 入口交换机) 排序的全部记录
    pub fn records(&self) -> impl Iterator<Item = WeightRecord> + '_ {
        self.pairs.values().flat_map(|p| {
            p.weights.iter().map(move |(key, &weight)| WeightRecord {
                switch: key.switch,
                target_group: p.pair.dst,
                entrance: key.entrance,
                weight,
            })
        })
    }
}
