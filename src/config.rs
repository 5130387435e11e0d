//! 实验描述（JSON）
//!
//! 例：
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "topology": { "kind": "dragonfly", "num_groups": 5, "switches_per_group": 4, "links_per_group_pair": 1 },
//!   "traffic": { "kind": "adversarial", "intergroup_fraction": 0.8 },
//!   "routing": { "sigma": 0.1, "max_intra_hops": 2 },
//!   "seed": 33632
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::routing::AdaptiveRoutingOpts;
use crate::topo::{DEFAULT_MESH_SEED, ValidationPolicy};

pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub topology: TopologySpec,
    pub traffic: TrafficSpec,
    #[serde(default)]
    pub routing: Option<RoutingSpec>,
    /// expander 组内模板的随机种子
    #[serde(default)]
    pub seed: Option<u64>,
    /// 仅对 `skewed_expander` 生效
    #[serde(default)]
    pub validation: Option<ValidationPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySpec {
    Dragonfly {
        num_groups: usize,
        switches_per_group: usize,
        links_per_group_pair: usize,
    },
    Expander {
        num_groups: usize,
        switches_per_group: usize,
        links_per_group_pair: usize,
        intra_degree: usize,
    },
    SkewedExpander {
        num_groups: usize,
        switches_per_group: usize,
        links_per_group_pair: usize,
        intra_degree: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrafficSpec {
    Adversarial { intergroup_fraction: f64 },
    AdversarialSingleSwitch { intergroup_fraction: f64 },
    SingleGlobalLink,
    Stencil27p { dims: [usize; 3] },
    Matrix { rows: Vec<Vec<f64>> },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingSpec {
    #[serde(default)]
    pub sigma: Option<f64>,
    #[serde(default)]
    pub max_intra_hops: Option<usize>,
}

impl ExperimentSpec {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_MESH_SEED)
    }

    pub fn validation(&self) -> ValidationPolicy {
        self.validation.unwrap_or_default()
    }

    /// 未给出的字段取默认值
    pub fn routing_opts(&self) -> AdaptiveRoutingOpts {
        let defaults = AdaptiveRoutingOpts::default();
        let routing = self.routing.clone().unwrap_or_default();
        AdaptiveRoutingOpts {
            sigma: routing.sigma.unwrap_or(defaults.sigma),
            max_intra_hops: routing.max_intra_hops.unwrap_or(defaults.max_intra_hops),
        }
    }
}
