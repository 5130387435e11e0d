//! 线性规划模型与求解后端
//!
//! [`LinearProgram`] 只是一个与后端无关的模型描述；[`MinilpSolver`]
//! 把它翻译给 `minilp` 求解。换后端只需实现 [`LpSolver`]。

use tracing::{debug, trace};

use super::error::SolverError;

/// 模型内变量的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub objective: f64,
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

#[derive(Debug, Clone)]
pub struct LinearProgram {
    sense: Sense,
    vars: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            vars: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// 添加连续变量；`upper` 可以是 `f64::INFINITY`
    pub fn add_var(&mut self, name: impl Into<String>, lower: f64, upper: f64, objective: f64) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(Variable {
            name: name.into(),
            lower,
            upper,
            objective,
        });
        id
    }

    pub fn add_constraint(&mut self, terms: Vec<(VarId, f64)>, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint {
            terms,
            relation,
            rhs,
        });
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// 检查模型是否良构：系数有限、变量编号有效、上下界有序
    pub fn validate(&self) -> Result<(), SolverError> {
        for v in &self.vars {
            if v.lower.is_nan() || v.upper.is_nan() || v.lower > v.upper {
                return Err(SolverError::Malformed(format!(
                    "variable {} has bounds [{}, {}]",
                    v.name, v.lower, v.upper
                )));
            }
            if !v.objective.is_finite() {
                return Err(SolverError::Malformed(format!(
                    "variable {} has objective coefficient {}",
                    v.name, v.objective
                )));
            }
        }
        for (idx, c) in self.constraints.iter().enumerate() {
            if !c.rhs.is_finite() {
                return Err(SolverError::Malformed(format!(
                    "constraint #{idx} has rhs {}",
                    c.rhs
                )));
            }
            for &(var, coeff) in &c.terms {
                if var.0 >= self.vars.len() || !coeff.is_finite() {
                    return Err(SolverError::Malformed(format!(
                        "constraint #{idx} has term ({}, {coeff})",
                        var.0
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LpSolution {
    values: Vec<f64>,
    objective: f64,
}

impl LpSolution {
    pub fn new(values: Vec<f64>, objective: f64) -> Self {
        Self { values, objective }
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.0]
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }
}

pub trait LpSolver {
    fn solve(&self, lp: &LinearProgram) -> Result<LpSolution, SolverError>;
}

/// 基于 `minilp` 的纯 Rust 单纯形后端
#[derive(Debug, Default, Clone, Copy)]
pub struct MinilpSolver;

impl LpSolver for MinilpSolver {
    fn solve(&self, lp: &LinearProgram) -> Result<LpSolution, SolverError> {
        lp.validate()?;

        let direction = match lp.sense() {
            Sense::Minimize => minilp::OptimizationDirection::Minimize,
            Sense::Maximize => minilp::OptimizationDirection::Maximize,
        };
        let mut problem = minilp::Problem::new(direction);
        let vars: Vec<minilp::Variable> = lp
            .vars()
            .iter()
            .map(|v| problem.add_var(v.objective, (v.lower, v.upper)))
            .collect();

        for c in lp.constraints() {
            let mut expr = minilp::LinearExpr::empty();
            for &(var, coeff) in &c.terms {
                expr.add(vars[var.0], coeff);
            }
            let op = match c.relation {
                Relation::Le => minilp::ComparisonOp::Le,
                Relation::Ge => minilp::ComparisonOp::Ge,
                Relation::Eq => minilp::ComparisonOp::Eq,
            };
            problem.add_constraint(expr, op, c.rhs);
        }

        debug!(
            vars = lp.num_vars(),
            constraints = lp.constraints().len(),
            "求解线性规划"
        );

        let solution = problem.solve().map_err(|err| match err {
            minilp::Error::Infeasible => SolverError::Infeasible,
            minilp::Error::Unbounded => SolverError::Unbounded,
            #[allow(unreachable_patterns)]
            other => SolverError::Backend(other.to_string()),
        })?;

        let values: Vec<f64> = vars.iter().map(|&v| solution[v]).collect();
        trace!(objective = solution.objective(), "线性规划已求解");
        Ok(LpSolution::new(values, solution.objective()))
    }
}
