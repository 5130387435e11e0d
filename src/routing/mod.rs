//! 入口交换机路由
//!
//! 为每台交换机和每个远端分组计算发往各入口交换机的流量权重，
//! 使组间链路负载保持在公平份额的容忍范围内。

mod adaptive;
mod balance;
mod entrance;
mod error;
mod paths;
mod utilization;
mod weights;

pub use adaptive::{AdaptiveRouting, AdaptiveRoutingOpts, DEFAULT_SIGMA};
pub use balance::{LoadBalancer, PairDemand, PairRouting, PairStatus};
pub use entrance::EntranceSets;
pub use error::RoutingError;
pub use paths::{DEFAULT_MAX_INTRA_HOPS, EntrancePathFinder, Path, PathSet};
pub use utilization::{LinkLoad, UtilizationReport, UtilizationSummary, evaluate_link_utilization};
pub use weights::{RoutingWeightTable, StatusCounts, WeightRecord};
