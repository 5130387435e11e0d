//! 组内 expander 模板与均匀 expander 拓扑
//!
//! 模板是一个近似 d-正则的随机图：先按随机顺序贪心连边，
//! 再对仍然缺至少两条边的交换机做局部换边。换边不一定能让所有顶点
//! 都达到 d，剩余的缺口会在 [`ExpanderTemplate::shortfalls`] 中如实报告。

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::TopologyError;
use super::grouped::{GroupParams, GroupedTopology, IntraPattern};
use super::matrix::AdjacencyMatrix;

/// 默认的组内网格随机种子
pub const DEFAULT_MESH_SEED: u64 = 33632;

/// 某台交换机距离目标度数还缺多少条边
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub switch: usize,
    pub missing: u32,
}

#[derive(Debug, Clone)]
pub struct ExpanderTemplate {
    matrix: AdjacencyMatrix,
    degree: u32,
    shortfalls: Vec<Shortfall>,
}

impl ExpanderTemplate {
    pub fn matrix(&self) -> &AdjacencyMatrix {
        &self.matrix
    }

    pub fn target_degree(&self) -> u32 {
        self.degree
    }

    pub fn shortfalls(&self) -> &[Shortfall] {
        &self.shortfalls
    }

    pub fn is_regular(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// 组内连接构建器，随机源由调用方显式注入
pub struct IntraGroupMeshBuilder<R: Rng> {
    switches: usize,
    degree: u32,
    rng: R,
}

impl<R: Rng> IntraGroupMeshBuilder<R> {
    /// 要求 `degree < switches - 1`（等于时应直接使用全连接）
    pub fn new(switches: usize, degree: usize, rng: R) -> Result<Self, TopologyError> {
        if degree + 1 >= switches {
            return Err(TopologyError::InvalidConfig(format!(
                "intra-group degree {degree} must be below {} for {switches} switches",
                switches.saturating_sub(1)
            )));
        }
        Ok(Self {
            switches,
            degree: degree as u32,
            rng,
        })
    }

    /// `n` 台交换机的全连接
    pub fn full_mesh(n: usize) -> AdjacencyMatrix {
        let mut m = AdjacencyMatrix::new(n);
        for i in 0..n {
            for j in i + 1..n {
                m.add_links(i, j, 1);
            }
        }
        m
    }

    pub fn build_expander(&mut self) -> ExpanderTemplate {
        let n = self.switches;
        let d = self.degree;
        let mut m = AdjacencyMatrix::new(n);
        let mut formed = vec![0_u32; n];
        let mut pairs: Vec<(usize, usize)> = Vec::new();

        for i in 0..n {
            let mut candidates: Vec<usize> = (0..n).collect();
            candidates.shuffle(&mut self.rng);
            for dst in candidates {
                if formed[i] >= d {
                    break;
                }
                if dst == i || formed[dst] >= d || m.get(i, dst) > 0 {
                    continue;
                }
                m.add_links(i, dst, 1);
                formed[i] += 1;
                formed[dst] += 1;
                pairs.push((i.min(dst), i.max(dst)));
            }
        }

        pairs.shuffle(&mut self.rng);

        // 换边：拆掉 (a, b)，改连 (i, a) 与 (i, b)；a、b 的度数不变，i 增加 2
        for i in 0..n {
            while d - formed[i] >= 2 {
                let pos = pairs
                    .iter()
                    .position(|&(a, b)| a != i && b != i && m.get(i, a) == 0 && m.get(i, b) == 0);
                let Some(pos) = pos else {
                    break;
                };
                let (a, b) = pairs.remove(pos);
                m.remove_link(a, b);
                m.add_links(i, a, 1);
                m.add_links(i, b, 1);
                formed[i] += 2;
                pairs.push((i.min(a), i.max(a)));
                pairs.push((i.min(b), i.max(b)));
                debug!(switch = i, a, b, "换边补足度数");
            }
        }

        let shortfalls: Vec<Shortfall> = formed
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f < d)
            .map(|(switch, &f)| Shortfall {
                switch,
                missing: d - f,
            })
            .collect();
        if !shortfalls.is_empty() {
            warn!(
                switches = n,
                degree = d,
                short = shortfalls.len(),
                "expander 模板未能达到目标度数"
            );
        }

        ExpanderTemplate {
            matrix: m,
            degree: d,
            shortfalls,
        }
    }
}

/// 均匀 expander：组内为 expander 模板，任意两组之间 `L` 条链路
pub struct UniformExpander {
    topo: GroupedTopology,
    intra_degree: usize,
    rng: StdRng,
    template: Option<ExpanderTemplate>,
}

impl UniformExpander {
    pub fn new(params: GroupParams, intra_degree: usize, rng: StdRng) -> Result<Self, TopologyError> {
        if intra_degree + 1 >= params.switches_per_group {
            return Err(TopologyError::InvalidConfig(format!(
                "intra-group degree {intra_degree} must be below A - 1 = {}",
                params.switches_per_group.saturating_sub(1)
            )));
        }
        if params.links_per_group_pair > params.switches_per_group {
            return Err(TopologyError::InvalidConfig(format!(
                "L = {} links per group pair exceeds A = {} switches per group",
                params.links_per_group_pair, params.switches_per_group
            )));
        }
        Ok(Self {
            topo: GroupedTopology::new(params),
            intra_degree,
            rng,
            template: None,
        })
    }

    pub fn name(&self) -> String {
        let p = self.topo.params();
        format!(
            "uexpander_g{}_a{}_h{}_m{}",
            p.num_groups,
            p.switches_per_group,
            p.inter_links_per_switch(),
            self.intra_degree
        )
    }

    #[tracing::instrument(skip(self), fields(name = %self.name()))]
    pub fn design_full_topology(&mut self) -> Result<(), TopologyError> {
        self.topo.ensure_unbuilt()?;
        let a = self.topo.switches_per_group();
        let template =
            IntraGroupMeshBuilder::new(a, self.intra_degree, &mut self.rng)?.build_expander();
        self.topo.apply_intra_template(template.matrix());

        let links = self.topo.params().links_per_group_pair as u32;
        self.topo.wire_round_robin(|_, _| links);

        let g = self.topo.num_groups();
        let target = vec![vec![links; g]; g];
        self.topo
            .check_consistency(IntraPattern::Template(template.matrix()), &target, true)?;

        info!(
            switches = self.topo.total_switches(),
            links = self.topo.adjacency().total_links(),
            short = template.shortfalls().len(),
            "✅ expander 拓扑构建完成"
        );
        self.template = Some(template);
        Ok(())
    }

    pub fn template(&self) -> Option<&ExpanderTemplate> {
        self.template.as_ref()
    }

    pub fn topology(&self) -> &GroupedTopology {
        &self.topo
    }

    pub fn into_topology(self) -> GroupedTopology {
        self.topo
    }
}
