//! 端到端实验流程
//!
//! 拓扑 -> 流量 -> 路由 -> 链路负载评估 -> 导出。

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ExperimentSpec, SUPPORTED_SCHEMA_VERSION, TopologySpec, TrafficSpec};
use crate::export::{Bundle, write_bundle};
use crate::routing::{
    AdaptiveRouting, RoutingError, StatusCounts, UtilizationSummary, evaluate_link_utilization,
};
use crate::topo::{
    GroupPair, GroupParams, GroupedTopology, Shortfall, SkewedExpander, TopologyError,
    UniformDragonfly, UniformExpander,
};
use crate::traffic::{
    Adversarial, AdversarialSingleSwitch, ExplicitMatrix, SingleGlobalLink, Stencil27Point,
    TrafficError, TrafficGenerator, TrafficMatrix,
};

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("unsupported schema_version {found}, expected {expected}")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Traffic(#[from] TrafficError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid experiment json: {0}")]
    Json(#[from] serde_json::Error),
}

/// 写入 `summary.json` 的实验摘要
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentSummary {
    pub name: Option<String>,
    pub topology: String,
    pub traffic: String,
    pub num_groups: usize,
    pub switches_per_group: usize,
    pub total_switches: usize,
    pub total_links: u64,
    pub inter_group_links: Vec<Vec<u32>>,
    pub shortfalls: Vec<Shortfall>,
    pub seed: u64,
    pub sigma: f64,
    pub max_intra_hops: usize,
    pub routing_status: StatusCounts,
    pub degraded_pairs: Vec<GroupPair>,
    pub utilization: UtilizationSummary,
}

struct BuiltTopology {
    name: String,
    topo: GroupedTopology,
    shortfalls: Vec<Shortfall>,
}

fn traffic_generator(spec: &TrafficSpec) -> Box<dyn TrafficGenerator> {
    match spec {
        TrafficSpec::Adversarial {
            intergroup_fraction,
        } => Box::new(Adversarial {
            intergroup_fraction: *intergroup_fraction,
        }),
        TrafficSpec::AdversarialSingleSwitch {
            intergroup_fraction,
        } => Box::new(AdversarialSingleSwitch {
            intergroup_fraction: *intergroup_fraction,
        }),
        TrafficSpec::SingleGlobalLink => Box::new(SingleGlobalLink),
        TrafficSpec::Stencil27p { dims } => Box::new(Stencil27Point { dims: *dims }),
        TrafficSpec::Matrix { rows } => Box::new(ExplicitMatrix { rows: rows.clone() }),
    }
}

/// 倾斜拓扑需要在布线前拿到流量，用未布线的分组布局生成
fn build_topology(
    spec: &ExperimentSpec,
    generator: &dyn TrafficGenerator,
) -> Result<BuiltTopology, ExperimentError> {
    let rng = StdRng::seed_from_u64(spec.seed());
    match spec.topology {
        TopologySpec::Dragonfly {
            num_groups,
            switches_per_group,
            links_per_group_pair,
        } => {
            let params = GroupParams::new(num_groups, switches_per_group, links_per_group_pair)?;
            let mut dfly = UniformDragonfly::new(params)?;
            dfly.design_full_topology()?;
            Ok(BuiltTopology {
                name: dfly.name(),
                topo: dfly.into_topology(),
                shortfalls: Vec::new(),
            })
        }
        TopologySpec::Expander {
            num_groups,
            switches_per_group,
            links_per_group_pair,
            intra_degree,
        } => {
            let params = GroupParams::new(num_groups, switches_per_group, links_per_group_pair)?;
            let mut expander = UniformExpander::new(params, intra_degree, rng)?;
            expander.design_full_topology()?;
            let shortfalls = expander
                .template()
                .map(|t| t.shortfalls().to_vec())
                .unwrap_or_default();
            Ok(BuiltTopology {
                name: expander.name(),
                topo: expander.into_topology(),
                shortfalls,
            })
        }
        TopologySpec::SkewedExpander {
            num_groups,
            switches_per_group,
            links_per_group_pair,
            intra_degree,
        } => {
            let params = GroupParams::new(num_groups, switches_per_group, links_per_group_pair)?;
            let layout = GroupedTopology::new(params);
            let traffic = generator.generate(&layout)?;
            let group_traffic = traffic.aggregate_groups(layout.group_map());
            let mut skewed = SkewedExpander::new(params, intra_degree, rng)?
                .with_validation(spec.validation());
            skewed.design_full_topology(&group_traffic)?;
            let shortfalls = skewed
                .template()
                .map(|t| t.shortfalls().to_vec())
                .unwrap_or_default();
            Ok(BuiltTopology {
                name: skewed.name(),
                topo: skewed.into_topology(),
                shortfalls,
            })
        }
    }
}

/// 运行一次实验并把产物写入 `out_dir`
#[tracing::instrument(skip(spec), fields(out_dir = %out_dir.display()))]
pub fn run_experiment(
    spec: &ExperimentSpec,
    out_dir: &Path,
) -> Result<ExperimentSummary, ExperimentError> {
    if spec.schema_version != SUPPORTED_SCHEMA_VERSION {
        return Err(ExperimentError::UnsupportedSchema {
            found: spec.schema_version,
            expected: SUPPORTED_SCHEMA_VERSION,
        });
    }

    let generator = traffic_generator(&spec.traffic);
    let built = build_topology(spec, generator.as_ref())?;
    let topo = &built.topo;
    if !built.shortfalls.is_empty() {
        warn!(
            switches = built.shortfalls.len(),
            "组内 expander 未达到目标度数"
        );
    }
    info!(
        topology = %built.name,
        switches = topo.total_switches(),
        links = topo.adjacency().total_links(),
        "拓扑就绪"
    );

    let traffic: TrafficMatrix = generator.generate(topo)?;
    let adj = topo.adjacency_list();
    let opts = spec.routing_opts();
    let router = AdaptiveRouting::new(opts)?;
    let table = router.route(&adj, topo.group_map().switch_to_group(), &traffic)?;
    let utilization = evaluate_link_utilization(&adj, topo.group_map(), &table, &traffic);

    let summary = ExperimentSummary {
        name: spec.name.clone(),
        topology: built.name.clone(),
        traffic: generator.name(),
        num_groups: topo.num_groups(),
        switches_per_group: topo.switches_per_group(),
        total_switches: topo.total_switches(),
        total_links: topo.adjacency().total_links(),
        inter_group_links: topo.inter_group_connectivity(),
        shortfalls: built.shortfalls.clone(),
        seed: spec.seed(),
        sigma: opts.sigma,
        max_intra_hops: opts.max_intra_hops,
        routing_status: table.status_counts(),
        degraded_pairs: table.degraded_pairs(),
        utilization: utilization.summary,
    };

    write_bundle(
        out_dir,
        &Bundle {
            adjacency: &adj,
            groups: topo.group_map(),
            traffic: &traffic,
            routing: &table,
            summary: &summary,
        },
    )?;
    info!(
        topology = %summary.topology,
        degraded = summary.degraded_pairs.len(),
        max_over_fair_share = ?summary.utilization.max_over_fair_share,
        "✅ 实验完成"
    );
    Ok(summary)
}
