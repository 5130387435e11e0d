//! 到入口交换机的有界路径枚举
//!
//! 对每台交换机和每个远端分组，枚举到该方向所有入口交换机的简单路径：
//! 跳数不超过上限，中间节点只在源交换机所在分组内，且不能是其它入口交换机。

use std::collections::BTreeMap;

use tracing::debug;

use super::entrance::EntranceSets;
use crate::topo::{GroupId, GroupMap, GroupPair, SwitchGroupKey, SwitchId};

/// 组内最大跳数的默认值
pub const DEFAULT_MAX_INTRA_HOPS: usize = 2;

/// 从源交换机到入口交换机的交换机序列（含两端）
pub type Path = Vec<SwitchId>;

#[derive(Debug, Clone, Default)]
pub struct PathSet {
    paths: BTreeMap<SwitchGroupKey, Vec<Path>>,
}

impl PathSet {
    pub fn get(&self, switch: SwitchId, group: GroupId) -> &[Path] {
        self.paths
            .get(&SwitchGroupKey { switch, group })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 每个可达入口交换机的最短跳数
    pub fn min_hops(&self, switch: SwitchId, group: GroupId) -> BTreeMap<SwitchId, usize> {
        let mut out: BTreeMap<SwitchId, usize> = BTreeMap::new();
        for path in self.get(switch, group) {
            let Some(&entrance) = path.last() else {
                continue;
            };
            let hops = path.len() - 1;
            out.entry(entrance)
                .and_modify(|h| *h = (*h).min(hops))
                .or_insert(hops);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (SwitchGroupKey, &[Path])> + '_ {
        self.paths.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EntrancePathFinder {
    max_hops: usize,
}

impl Default for EntrancePathFinder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INTRA_HOPS)
    }
}

impl EntrancePathFinder {
    pub fn new(max_hops: usize) -> Self {
        Self { max_hops }
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// 只保留组内邻居并去重（并行链路不产生重复路径）
    pub fn intra_adjacency(adj: &[Vec<SwitchId>], groups: &GroupMap) -> Vec<Vec<SwitchId>> {
        adj.iter()
            .enumerate()
            .map(|(sw, neighbors)| {
                let own = groups.group_of(SwitchId(sw));
                let mut intra: Vec<SwitchId> = neighbors
                    .iter()
                    .copied()
                    .filter(|&n| n.0 != sw && groups.group_of(n) == own)
                    .collect();
                intra.sort_unstable();
                intra.dedup();
                intra
            })
            .collect()
    }

    /// 为每个 (交换机, 远端分组) 枚举路径
    pub fn find_all(
        &self,
        adj: &[Vec<SwitchId>],
        groups: &GroupMap,
        entrances: &EntranceSets,
    ) -> PathSet {
        let intra = Self::intra_adjacency(adj, groups);
        let mut paths = BTreeMap::new();
        for sw in 0..adj.len() {
            let switch = SwitchId(sw);
            let own = groups.group_of(switch);
            for target in groups.groups() {
                if target == own {
                    continue;
                }
                let entry = entrances.get(GroupPair::new(own, target));
                let mut collected = Vec::new();
                for &entrance in entry {
                    collected.extend(self.paths_to_switch(&intra, switch, entrance, entry));
                }
                paths.insert(
                    SwitchGroupKey {
                        switch,
                        group: target,
                    },
                    collected,
                );
            }
        }
        let set = PathSet { paths };
        debug!(paths = set.len(), max_hops = self.max_hops, "路径枚举完成");
        set
    }

    /// 从 `source` 到 `target` 的全部有界简单路径。
    ///
    /// `intra` 为组内邻接表；`prohibited` 中除 `target` 外的节点不能作为中间节点。
    /// `source == target` 时只返回单节点路径。
    pub fn paths_to_switch(
        &self,
        intra: &[Vec<SwitchId>],
        source: SwitchId,
        target: SwitchId,
        prohibited: &[SwitchId],
    ) -> Vec<Path> {
        if source == target {
            return vec![vec![source]];
        }
        let mut found = Vec::new();
        let mut path: Path = vec![source];
        // cursor[k] 为 path[k] 下一个待尝试的邻居下标
        let mut cursor: Vec<usize> = vec![0];
        let mut on_path = vec![false; intra.len()];
        on_path[source.0] = true;

        while let Some(&node) = path.last() {
            let depth = path.len() - 1;
            let idx = cursor[depth];
            let neighbors = &intra[node.0];
            if depth >= self.max_hops || idx >= neighbors.len() {
                on_path[node.0] = false;
                path.pop();
                cursor.pop();
                continue;
            }
            cursor[depth] += 1;

            let next = neighbors[idx];
            if on_path[next.0] {
                continue;
            }
            if next == target {
                let mut complete = path.clone();
                complete.push(next);
                found.push(complete);
                continue;
            }
            if prohibited.contains(&next) {
                continue;
            }
            path.push(next);
            cursor.push(0);
            on_path[next.0] = true;
        }
        found
    }
}
