//! 组间链路负载评估
//!
//! 交换机发往某个分组的需求按路由权重分给各入口交换机，
//! 再在该入口交换机通往目标分组的链路上均分。

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::weights::RoutingWeightTable;
use crate::topo::{GroupId, GroupMap, GroupPair, SwitchId};
use crate::traffic::TrafficMatrix;

/// 一对交换机之间的有向组间链路（并行链路合并，`load` 为单条链路的负载）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkLoad {
    pub from: SwitchId,
    pub to: SwitchId,
    pub links: u32,
    pub load: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UtilizationSummary {
    pub links: usize,
    pub max_load: f64,
    pub mean_load: f64,
    /// 单条链路负载 / 所属分组对的公平份额，取最大值；没有流量时为 `None`
    pub max_over_fair_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationReport {
    pub links: Vec<LinkLoad>,
    pub summary: UtilizationSummary,
}

pub fn evaluate_link_utilization(
    adj: &[Vec<SwitchId>],
    groups: &GroupMap,
    table: &RoutingWeightTable,
    traffic: &TrafficMatrix,
) -> UtilizationReport {
    // (from, to) -> (并行链路数, 总负载)
    let mut loads: BTreeMap<(SwitchId, SwitchId), (u32, f64)> = BTreeMap::new();
    // (入口交换机, 目标分组) -> 远端邻居
    let mut exits: BTreeMap<(SwitchId, GroupId), Vec<SwitchId>> = BTreeMap::new();
    let mut capacity: BTreeMap<GroupPair, u32> = BTreeMap::new();
    for (sw, neighbors) in adj.iter().enumerate() {
        let from = SwitchId(sw);
        let src = groups.group_of(from);
        for &to in neighbors {
            let dst = groups.group_of(to);
            if dst == src {
                continue;
            }
            loads.entry((from, to)).or_insert((0, 0.0)).0 += 1;
            exits.entry((from, dst)).or_default().push(to);
            *capacity.entry(GroupPair::new(src, dst)).or_default() += 1;
        }
    }

    let mut pair_demand: BTreeMap<GroupPair, f64> = BTreeMap::new();
    for routing in table.pairs() {
        let dst = routing.pair.dst;
        for (key, &weight) in &routing.weights {
            let demand = traffic.demand_to_group(key.switch, dst, groups);
            if demand <= 0.0 || weight <= 0.0 {
                continue;
            }
            *pair_demand.entry(routing.pair).or_default() += demand * weight;
            let Some(targets) = exits.get(&(key.entrance, dst)) else {
                continue;
            };
            let share = demand * weight / targets.len() as f64;
            for &to in targets {
                if let Some(entry) = loads.get_mut(&(key.entrance, to)) {
                    entry.1 += share;
                }
            }
        }
    }

    let links: Vec<LinkLoad> = loads
        .into_iter()
        .map(|((from, to), (links, total))| LinkLoad {
            from,
            to,
            links,
            load: total / links as f64,
        })
        .collect();

    let mut max_load = 0.0_f64;
    let mut sum = 0.0;
    let mut max_ratio: Option<f64> = None;
    for link in &links {
        max_load = max_load.max(link.load);
        sum += link.load;
        let pair = GroupPair::new(groups.group_of(link.from), groups.group_of(link.to));
        let demand = pair_demand.get(&pair).copied().unwrap_or(0.0);
        let cap = capacity.get(&pair).copied().unwrap_or(0);
        if demand > 0.0 && cap > 0 {
            let ratio = link.load / (demand / cap as f64);
            max_ratio = Some(max_ratio.map_or(ratio, |r| r.max(ratio)));
        }
    }
    let summary = UtilizationSummary {
        links: links.len(),
        max_load,
        mean_load: if links.is_empty() {
            0.0
        } else {
            sum / links.len() as f64
        },
        max_over_fair_share: max_ratio,
    };
    debug!(
        links = summary.links,
        max_load = summary.max_load,
        max_over_fair_share = ?summary.max_over_fair_share,
        "组间链路负载评估完成"
    );
    UtilizationReport { links, summary }
}
