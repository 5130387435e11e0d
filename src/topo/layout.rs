//! 交换机与分组之间的映射

use super::id::{GroupId, SwitchId};

/// 交换机 -> 分组、分组 -> 交换机 的双向映射。
///
/// 拓扑生成的分组总是连续编号的（`group = switch / switches_per_group`），
/// 但路由侧也接受任意的分配（例如手写的小拓扑）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMap {
    switch_to_group: Vec<GroupId>,
    group_to_switches: Vec<Vec<SwitchId>>,
}

impl GroupMap {
    /// 连续编号的均匀分组
    pub fn contiguous(num_groups: usize, switches_per_group: usize) -> Self {
        let assignment = (0..num_groups * switches_per_group)
            .map(|sw| GroupId(sw / switches_per_group.max(1)))
            .collect();
        Self::from_assignment(assignment)
    }

    /// 由逐交换机的分组分配构建。分组编号需为 `0..n` 的稠密区间，
    /// 缺失的编号会得到一个空分组。
    pub fn from_assignment(switch_to_group: Vec<GroupId>) -> Self {
        let num_groups = switch_to_group
            .iter()
            .map(|g| g.0 + 1)
            .max()
            .unwrap_or(0);
        let mut group_to_switches = vec![Vec::new(); num_groups];
        for (sw, group) in switch_to_group.iter().enumerate() {
            group_to_switches[group.0].push(SwitchId(sw));
        }
        Self {
            switch_to_group,
            group_to_switches,
        }
    }

    pub fn num_groups(&self) -> usize {
        self.group_to_switches.len()
    }

    pub fn num_switches(&self) -> usize {
        self.switch_to_group.len()
    }

    pub fn group_of(&self, switch: SwitchId) -> GroupId {
        self.switch_to_group[switch.0]
    }

    pub fn switches_in(&self, group: GroupId) -> &[SwitchId] {
        &self.group_to_switches[group.0]
    }

    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        (0..self.group_to_switches.len()).map(GroupId)
    }

    pub fn switch_to_group(&self) -> &[GroupId] {
        &self.switch_to_group
    }
}
