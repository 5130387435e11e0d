//! 按流量倾斜的 expander（组间链路数与分组间流量成比例）
//!
//! 构建分两步：先复制组内 expander 模板，再按“分数规划 -> 取整 -> 轮转布线”
//! 生成组间链路。

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::TopologyError;
use super::expander::{ExpanderTemplate, IntraGroupMeshBuilder};
use super::grouped::{GroupParams, GroupedTopology, IntraPattern};
use super::planner::{FractionalLinkPlan, InterGroupLinkPlanner};
use super::rounding::IntegerRoundingEngine;
use crate::opt::{LpSolver, MinCostFlowSolver, MinilpSolver, SuccessiveShortestPaths};

/// 构建后一致性检查失败时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// 返回错误，不交出拓扑
    Fatal,
    /// 记录告警后继续
    Warn,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Fatal
        } else {
            Self::Warn
        }
    }
}

pub struct SkewedExpander {
    topo: GroupedTopology,
    intra_degree: usize,
    rng: StdRng,
    validation: ValidationPolicy,
    template: Option<ExpanderTemplate>,
    plan: Option<FractionalLinkPlan>,
    group_links: Option<Vec<Vec<u32>>>,
}

impl SkewedExpander {
    pub fn new(params: GroupParams, intra_degree: usize, rng: StdRng) -> Result<Self, TopologyError> {
        if intra_degree + 1 >= params.switches_per_group {
            return Err(TopologyError::InvalidConfig(format!(
                "intra-group degree {intra_degree} must be below A - 1 = {}",
                params.switches_per_group.saturating_sub(1)
            )));
        }
        Ok(Self {
            topo: GroupedTopology::new(params),
            intra_degree,
            rng,
            validation: ValidationPolicy::default(),
            template: None,
            plan: None,
            group_links: None,
        })
    }

    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    pub fn name(&self) -> String {
        let p = self.topo.params();
        format!(
            "skewedexpander_g{}_a{}_h{}_m{}",
            p.num_groups,
            p.switches_per_group,
            p.inter_links_per_switch(),
            self.intra_degree
        )
    }

    /// 使用默认求解后端构建
    pub fn design_full_topology(&mut self, group_traffic: &[Vec<f64>]) -> Result<(), TopologyError> {
        self.design_full_topology_with(group_traffic, &MinilpSolver, &SuccessiveShortestPaths)
    }

    #[tracing::instrument(skip_all, fields(name = %self.name()))]
    pub fn design_full_topology_with<S, F>(
        &mut self,
        group_traffic: &[Vec<f64>],
        lp: &S,
        flow: &F,
    ) -> Result<(), TopologyError>
    where
        S: LpSolver + ?Sized,
        F: MinCostFlowSolver + ?Sized,
    {
        self.topo.ensure_unbuilt()?;
        let a = self.topo.switches_per_group();
        let g = self.topo.num_groups();
        let budget = self.topo.params().inter_links_per_group();

        let template =
            IntraGroupMeshBuilder::new(a, self.intra_degree, &mut self.rng)?.build_expander();
        self.topo.apply_intra_template(template.matrix());

        let plan = InterGroupLinkPlanner::new(lp, g, budget)
            .plan(group_traffic)
            .map_err(TopologyError::Planning)?;
        let links = IntegerRoundingEngine::new(flow, budget as u32).round(&plan.links)?;

        self.topo.wire_round_robin(|g1, g2| links[g1][g2]);

        if let Err(err) =
            self.topo
                .check_consistency(IntraPattern::Template(template.matrix()), &links, false)
        {
            match self.validation {
                ValidationPolicy::Fatal => return Err(err),
                ValidationPolicy::Warn => warn!(error = %err, "倾斜拓扑一致性检查未通过"),
            }
        }

        info!(
            switches = self.topo.total_switches(),
            links = self.topo.adjacency().total_links(),
            throughput = ?plan.throughput,
            "✅ 倾斜 expander 拓扑构建完成"
        );
        self.template = Some(template);
        self.plan = Some(plan);
        self.group_links = Some(links);
        Ok(())
    }

    pub fn template(&self) -> Option<&ExpanderTemplate> {
        self.template.as_ref()
    }

    pub fn fractional_plan(&self) -> Option<&FractionalLinkPlan> {
        self.plan.as_ref()
    }

    /// 取整后的组间链路矩阵
    pub fn group_links(&self) -> Option<&[Vec<u32>]> {
        self.group_links.as_deref()
    }

    pub fn topology(&self) -> &GroupedTopology {
        &self.topo
    }

    pub fn into_topology(self) -> GroupedTopology {
        self.topo
    }
}
