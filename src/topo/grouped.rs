//! 分组拓扑（dragonfly 类结构）的公共部分
//!
//! 负责参数校验、分组映射、按轮转偏移布置组间链路，以及构建后的一致性检查。
//! 具体的组内连接方式（全连接 / expander）和组间链路数量由各变体决定。

use tracing::{debug, trace};

use super::error::TopologyError;
use super::id::{GroupId, SwitchId};
use super::layout::GroupMap;
use super::matrix::AdjacencyMatrix;

/// 分组拓扑参数 `(G, A, L)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupParams {
    pub num_groups: usize,
    pub switches_per_group: usize,
    pub links_per_group_pair: usize,
}

impl GroupParams {
    /// 校验并构建参数：`G >= 2`，`G - 1 <= A`，`L >= 1`。
    pub fn new(
        num_groups: usize,
        switches_per_group: usize,
        links_per_group_pair: usize,
    ) -> Result<Self, TopologyError> {
        if num_groups < 2 {
            return Err(TopologyError::InvalidConfig(format!(
                "need at least 2 groups, got {num_groups}"
            )));
        }
        if switches_per_group == 0 {
            return Err(TopologyError::InvalidConfig(
                "groups must contain at least one switch".to_string(),
            ));
        }
        if num_groups - 1 > switches_per_group {
            return Err(TopologyError::InvalidConfig(format!(
                "G - 1 = {} exceeds switches per group A = {switches_per_group}",
                num_groups - 1
            )));
        }
        if links_per_group_pair == 0 {
            return Err(TopologyError::InvalidConfig(
                "links per group pair must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            num_groups,
            switches_per_group,
            links_per_group_pair,
        })
    }

    pub fn total_switches(&self) -> usize {
        self.num_groups * self.switches_per_group
    }

    /// 每个分组的组间链路预算 `A * h = (G - 1) * L`
    pub fn inter_links_per_group(&self) -> usize {
        (self.num_groups - 1) * self.links_per_group_pair
    }

    /// 每台交换机的组间链路数 `h`（可能不是整数）
    pub fn inter_links_per_switch(&self) -> f64 {
        self.inter_links_per_group() as f64 / self.switches_per_group as f64
    }

    /// `(G - 1) * L` 能被 `A` 整除时，每台交换机的组间度数完全相同
    pub fn is_degree_regular(&self) -> bool {
        self.inter_links_per_group() % self.switches_per_group == 0
    }
}

/// 组内连接的期望形态，用于一致性检查
#[derive(Debug, Clone, Copy)]
pub enum IntraPattern<'a> {
    FullMesh,
    Template(&'a AdjacencyMatrix),
}

#[derive(Debug, Clone)]
pub struct GroupedTopology {
    params: GroupParams,
    adjacency: AdjacencyMatrix,
    groups: GroupMap,
}

impl GroupedTopology {
    pub fn new(params: GroupParams) -> Self {
        Self {
            adjacency: AdjacencyMatrix::new(params.total_switches()),
            groups: GroupMap::contiguous(params.num_groups, params.switches_per_group),
            params,
        }
    }

    pub fn params(&self) -> &GroupParams {
        &self.params
    }

    pub fn num_groups(&self) -> usize {
        self.params.num_groups
    }

    pub fn switches_per_group(&self) -> usize {
        self.params.switches_per_group
    }

    pub fn total_switches(&self) -> usize {
        self.params.total_switches()
    }

    pub fn adjacency(&self) -> &AdjacencyMatrix {
        &self.adjacency
    }

    pub fn adjacency_list(&self) -> Vec<Vec<SwitchId>> {
        self.adjacency.adjacency_list()
    }

    pub fn group_map(&self) -> &GroupMap {
        &self.groups
    }

    pub fn group_of(&self, switch: SwitchId) -> GroupId {
        self.groups.group_of(switch)
    }

    pub fn switches_in(&self, group: GroupId) -> &[SwitchId] {
        self.groups.switches_in(group)
    }

    /// 组间连接矩阵：`[g1][g2]` 为两组之间的链路数
    pub fn inter_group_connectivity(&self) -> Vec<Vec<u32>> {
        let g = self.num_groups();
        let a = self.switches_per_group();
        let mut conn = vec![vec![0_u32; g]; g];
        for i in 0..self.total_switches() {
            for j in 0..self.total_switches() {
                let (gi, gj) = (i / a, j / a);
                if gi != gj {
                    conn[gi][gj] += self.adjacency.get(i, j);
                }
            }
        }
        conn
    }

    /// 拓扑只允许构建一次
    pub(crate) fn ensure_unbuilt(&self) -> Result<(), TopologyError> {
        if self.adjacency.total_links() > 0 {
            return Err(TopologyError::InvalidConfig(
                "topology has already been designed".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn form_full_mesh(&mut self, group: GroupId) {
        let switches = self.groups.switches_in(group).to_vec();
        for (idx, &s1) in switches.iter().enumerate() {
            for &s2 in &switches[idx + 1..] {
                self.adjacency.add_links(s1.0, s2.0, 1);
            }
        }
    }

    /// 把同一个组内模板复制到每个分组
    pub(crate) fn apply_intra_template(&mut self, template: &AdjacencyMatrix) {
        let a = self.switches_per_group();
        debug_assert_eq!(template.size(), a);
        for group in 0..self.num_groups() {
            let offset = group * a;
            for i in 0..a {
                for j in i + 1..a {
                    let links = template.get(i, j);
                    if links > 0 {
                        self.adjacency.add_links(offset + i, offset + j, links);
                    }
                }
            }
        }
    }

    /// 按轮转偏移布置组间链路：`pair_links(g1, g2)` 给出 `g1 < g2` 两组之间的链路数。
    ///
    /// 每布置一条链路，两端分组的偏移各前进一位，使每台交换机的组间度数保持均衡。
    pub(crate) fn wire_round_robin(&mut self, pair_links: impl Fn(usize, usize) -> u32) {
        let g = self.num_groups();
        let a = self.switches_per_group();
        let mut offset = vec![0_usize; g];
        for g1 in 0..g {
            for g2 in g1 + 1..g {
                let links = pair_links(g1, g2);
                for _ in 0..links {
                    let sw1 = g1 * a + offset[g1];
                    let sw2 = g2 * a + offset[g2];
                    trace!(g1, g2, sw1, sw2, "布置组间链路");
                    self.adjacency.add_links(sw1, sw2, 1);
                    offset[g1] = (offset[g1] + 1) % a;
                    offset[g2] = (offset[g2] + 1) % a;
                }
            }
        }
    }

    /// 构建后的一致性检查。
    ///
    /// - 组内连接与 `intra` 完全一致
    /// - 对称、对角线为零、每个位置至多一条链路
    /// - 任何交换机不会有两条链路连向同一个远端分组
    /// - 组间连接矩阵对称且等于 `target`
    /// - `balanced` 时，每台交换机的组间度数为 `h` 的上取整或下取整
    pub fn check_consistency(
        &self,
        intra: IntraPattern<'_>,
        target: &[Vec<u32>],
        balanced: bool,
    ) -> Result<(), TopologyError> {
        let n = self.total_switches();
        let a = self.switches_per_group();
        let g = self.num_groups();
        let m = &self.adjacency;

        for i in 0..n {
            if m.get(i, i) != 0 {
                return Err(self.inconsistent(format!("switch {i} has a self-loop")));
            }
            for j in i + 1..n {
                if m.get(i, j) != m.get(j, i) {
                    return Err(self.inconsistent(format!("links {i}<->{j} are asymmetric")));
                }
                if m.get(i, j) > 1 {
                    return Err(self.inconsistent(format!(
                        "switches {i} and {j} share {} parallel links",
                        m.get(i, j)
                    )));
                }
                if i / a == j / a {
                    let expected = match intra {
                        IntraPattern::FullMesh => 1,
                        IntraPattern::Template(t) => t.get(i % a, j % a),
                    };
                    if m.get(i, j) != expected {
                        return Err(self.inconsistent(format!(
                            "intra-group link {i}<->{j} is {} but should be {expected}",
                            m.get(i, j)
                        )));
                    }
                }
            }
        }

        let mut conn = vec![vec![0_u32; g]; g];
        let h = self.params.inter_links_per_switch();
        for i in 0..n {
            let src_group = i / a;
            let mut seen = vec![false; g];
            let mut inter_degree = 0_u32;
            for j in 0..n {
                let dst_group = j / a;
                if dst_group == src_group || m.get(i, j) == 0 {
                    continue;
                }
                if seen[dst_group] {
                    return Err(self.inconsistent(format!(
                        "switch {i} has more than one link into group {dst_group}"
                    )));
                }
                seen[dst_group] = true;
                conn[src_group][dst_group] += m.get(i, j);
                inter_degree += m.get(i, j);
            }
            if balanced {
                let d = inter_degree as f64;
                if d < h.floor() || d > h.ceil() {
                    return Err(self.inconsistent(format!(
                        "switch {i} has {inter_degree} inter-group links, expected about {h}"
                    )));
                }
            }
        }

        for g1 in 0..g {
            for g2 in g1 + 1..g {
                if conn[g1][g2] != conn[g2][g1] {
                    return Err(self.inconsistent(format!(
                        "groups {g1} and {g2} see {} vs {} links",
                        conn[g1][g2], conn[g2][g1]
                    )));
                }
                if conn[g1][g2] != target[g1][g2] {
                    return Err(self.inconsistent(format!(
                        "groups {g1} and {g2} have {} links, target is {}",
                        conn[g1][g2], target[g1][g2]
                    )));
                }
            }
        }

        debug!(switches = n, groups = g, "一致性检查通过");
        Ok(())
    }

    fn inconsistent(&self, reason: String) -> TopologyError {
        debug!(reason = %reason, matrix = %self.adjacency, "一致性检查失败");
        TopologyError::Inconsistent {
            reason,
            matrix: self.adjacency.to_string(),
        }
    }
}
