use thiserror::Error;

use crate::opt::SolverError;

/// 拓扑构建错误
///
/// 配置错误在构建任何链路之前返回；一致性错误说明构建算法本身有缺陷，
/// 附带出错时的邻接矩阵以便诊断。
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid topology configuration: {0}")]
    InvalidConfig(String),

    #[error("topology consistency check failed: {reason}\n{matrix}")]
    Inconsistent { reason: String, matrix: String },

    #[error("inter-group link planning failed: {0}")]
    Planning(#[source] SolverError),

    #[error("integer rounding failed: {0}")]
    Rounding(String),

    #[error("group pair ({src}, {dst}) would be left without links after rounding")]
    DisconnectedGroupPair { src: usize, dst: usize },
}
