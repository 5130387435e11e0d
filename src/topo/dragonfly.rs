//! 均匀 dragonfly：组内全连接，任意两组之间 `L` 条链路

use tracing::info;

use super::error::TopologyError;
use super::grouped::{GroupParams, GroupedTopology, IntraPattern};

#[derive(Debug, Clone)]
pub struct UniformDragonfly {
    topo: GroupedTopology,
}

impl UniformDragonfly {
    /// 额外要求 `L <= A`，否则同一台交换机必然会有两条链路连向同一个分组
    pub fn new(params: GroupParams) -> Result<Self, TopologyError> {
        if params.links_per_group_pair > params.switches_per_group {
            return Err(TopologyError::InvalidConfig(format!(
                "L = {} links per group pair exceeds A = {} switches per group",
                params.links_per_group_pair, params.switches_per_group
            )));
        }
        Ok(Self {
            topo: GroupedTopology::new(params),
        })
    }

    pub fn name(&self) -> String {
        let p = self.topo.params();
        format!(
            "dfly_g{}_a{}_h{}",
            p.num_groups,
            p.switches_per_group,
            p.inter_links_per_switch()
        )
    }

    #[tracing::instrument(skip(self), fields(name = %self.name()))]
    pub fn design_full_topology(&mut self) -> Result<(), TopologyError> {
        self.topo.ensure_unbuilt()?;
        for group in self.topo.group_map().groups().collect::<Vec<_>>() {
            self.topo.form_full_mesh(group);
        }
        let links = self.topo.params().links_per_group_pair as u32;
        self.topo.wire_round_robin(|_, _| links);

        let g = self.topo.num_groups();
        let target = vec![vec![links; g]; g];
        self.topo
            .check_consistency(IntraPattern::FullMesh, &target, true)?;

        info!(
            switches = self.topo.total_switches(),
            links = self.topo.adjacency().total_links(),
            "✅ dragonfly 拓扑构建完成"
        );
        Ok(())
    }

    pub fn topology(&self) -> &GroupedTopology {
        &self.topo
    }

    pub fn into_topology(self) -> GroupedTopology {
        self.topo
    }
}
