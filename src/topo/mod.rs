//! 分组拓扑生成模块
//!
//! 包含分组拓扑的公共结构、组内全连接 / expander 构建、按流量比例的组间链路规划
//! 与取整，以及三种拓扑变体（均匀 dragonfly、均匀 expander、倾斜 expander）。

// 子模块声明
mod dragonfly;
mod error;
mod expander;
mod grouped;
mod id;
mod layout;
mod matrix;
mod planner;
mod rounding;
mod skewed;

// 重新导出公共接口
pub use dragonfly::UniformDragonfly;
pub use error::TopologyError;
pub use expander::{
    DEFAULT_MESH_SEED, ExpanderTemplate, IntraGroupMeshBuilder, Shortfall, UniformExpander,
};
pub use grouped::{GroupParams, GroupedTopology, IntraPattern};
pub use id::{GroupId, GroupPair, SwitchGroupKey, SwitchId, WeightKey};
pub use layout::GroupMap;
pub use matrix::AdjacencyMatrix;
pub use planner::{FractionalLinkPlan, InterGroupLinkPlanner, symmetrize_demand};
pub use rounding::IntegerRoundingEngine;
pub use skewed::{SkewedExpander, ValidationPolicy};
