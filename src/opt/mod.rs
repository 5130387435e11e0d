//! 优化求解器接口
//!
//! 拓扑设计与负载均衡只通过这里的两个窄接口使用求解器：
//! - [`LpSolver`]：连续变量 + 线性约束 + 线性目标
//! - [`MinCostFlowSolver`]：有向图 + 容量/费用，求最小费用最大流
//!
//! 模型每次调用都重新构建，不在调用之间共享求解器状态。

mod error;
mod flow;
mod lp;

pub use error::SolverError;
pub use flow::{EdgeId, FlowNetwork, FlowSolution, MinCostFlowSolver, SuccessiveShortestPaths};
pub use lp::{
    Constraint, LinearProgram, LpSolution, LpSolver, MinilpSolver, Relation, Sense, VarId,
    Variable,
};
