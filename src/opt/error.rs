use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("problem is infeasible")]
    Infeasible,

    #[error("problem is unbounded")]
    Unbounded,

    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("solver backend error: {0}")]
    Backend(String),
}
