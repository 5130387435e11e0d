//! 入口交换机识别
//!
//! 对有序分组对 `(src, dst)`，入口交换机是 `src` 中至少有一条直连链路通往 `dst` 的交换机。

use std::collections::BTreeMap;

use tracing::debug;

use crate::topo::{GroupMap, GroupPair, SwitchId};

#[derive(Debug, Clone, Default)]
pub struct EntranceSets {
    /// 已排序、去重
    sets: BTreeMap<GroupPair, Vec<SwitchId>>,
    /// `src` 到 `dst` 的有向链路数（并行链路重复计数）
    capacity: BTreeMap<GroupPair, u32>,
}

impl EntranceSets {
    /// `adj[i]` 为交换机 `i` 的邻居（并行链路重复出现）
    pub fn identify(adj: &[Vec<SwitchId>], groups: &GroupMap) -> Self {
        let mut sets: BTreeMap<GroupPair, Vec<SwitchId>> = BTreeMap::new();
        let mut capacity: BTreeMap<GroupPair, u32> = BTreeMap::new();
        for (sw, neighbors) in adj.iter().enumerate() {
            let switch = SwitchId(sw);
            let src = groups.group_of(switch);
            for &nbr in neighbors {
                let dst = groups.group_of(nbr);
                if dst == src {
                    continue;
                }
                let pair = GroupPair::new(src, dst);
                sets.entry(pair).or_default().push(switch);
                *capacity.entry(pair).or_default() += 1;
            }
        }
        for entrances in sets.values_mut() {
            entrances.sort_unstable();
            entrances.dedup();
        }
        debug!(pairs = sets.len(), "识别入口交换机");
        Self { sets, capacity }
    }

    /// 没有任何直连链路时返回空切片
    pub fn get(&self, pair: GroupPair) -> &[SwitchId] {
        self.sets.get(&pair).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, pair: GroupPair, switch: SwitchId) -> bool {
        self.get(pair).binary_search(&switch).is_ok()
    }

    pub fn capacity(&self, pair: GroupPair) -> u32 {
        self.capacity.get(&pair).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupPair, &[SwitchId])> + '_ {
        self.sets.iter().map(|(pair, v)| (*pair, v.as_slice()))
    }
}
