use crate::opt::{
    FlowNetwork, LinearProgram, LpSolver, MinCostFlowSolver, MinilpSolver, Relation, Sense,
    SolverError, SuccessiveShortestPaths,
};

#[test]
fn minilp_solves_small_maximization() {
    // max x + y, x + 2y <= 4, 3x + y <= 6
    let mut lp = LinearProgram::new(Sense::Maximize);
    let x = lp.add_var("x", 0.0, f64::INFINITY, 1.0);
    let y = lp.add_var("y", 0.0, f64::INFINITY, 1.0);
    lp.add_constraint(vec![(x, 1.0), (y, 2.0)], Relation::Le, 4.0);
    lp.add_constraint(vec![(x, 3.0), (y, 1.0)], Relation::Le, 6.0);

    let sol = MinilpSolver.solve(&lp).unwrap();
    assert!((sol.value(x) - 1.6).abs() < 1e-6);
    assert!((sol.value(y) - 1.2).abs() < 1e-6);
    assert!((sol.objective() - 2.8).abs() < 1e-6);
}

#[test]
fn minilp_handles_equality_and_minimization() {
    // min 2a + b, a + b = 1, a >= 0.25
    let mut lp = LinearProgram::new(Sense::Minimize);
    let a = lp.add_var("a", 0.0, 1.0, 2.0);
    let b = lp.add_var("b", 0.0, 1.0, 1.0);
    lp.add_constraint(vec![(a, 1.0), (b, 1.0)], Relation::Eq, 1.0);
    lp.add_constraint(vec![(a, 1.0)], Relation::Ge, 0.25);

    let sol = MinilpSolver.solve(&lp).unwrap();
    assert!((sol.value(a) - 0.25).abs() < 1e-6);
    assert!((sol.value(b) - 0.75).abs() < 1e-6);
}

#[test]
fn minilp_reports_infeasible() {
    let mut lp = LinearProgram::new(Sense::Minimize);
    let x = lp.add_var("x", 0.0, 1.0, 1.0);
    lp.add_constraint(vec![(x, 1.0)], Relation::Ge, 2.0);
    assert_eq!(MinilpSolver.solve(&lp).unwrap_err(), SolverError::Infeasible);
}

#[test]
fn malformed_models_are_rejected_before_solving() {
    let mut lp = LinearProgram::new(Sense::Minimize);
    lp.add_var("bad", 2.0, 1.0, 0.0);
    assert!(matches!(
        MinilpSolver.solve(&lp),
        Err(SolverError::Malformed(_))
    ));

    let mut lp = LinearProgram::new(Sense::Minimize);
    let x = lp.add_var("x", 0.0, 1.0, 0.0);
    lp.add_constraint(vec![(x, f64::NAN)], Relation::Le, 1.0);
    assert!(matches!(lp.validate(), Err(SolverError::Malformed(_))));
}

#[test]
fn successive_shortest_paths_finds_min_cost_max_flow() {
    let mut net = FlowNetwork::new(4);
    let s1 = net.add_edge(0, 1, 2, 1);
    let s2 = net.add_edge(0, 2, 1, 5);
    let a = net.add_edge(1, 3, 1, 1);
    let b = net.add_edge(2, 3, 2, 1);
    let cross = net.add_edge(1, 2, 1, 1);

    let sol = SuccessiveShortestPaths.max_flow_min_cost(&net, 0, 3).unwrap();
    assert_eq!(sol.total_flow(), 3);
    assert_eq!(sol.total_cost(), 11);
    assert_eq!(sol.flow(s1), 2);
    assert_eq!(sol.flow(s2), 1);
    assert_eq!(sol.flow(a), 1);
    assert_eq!(sol.flow(b), 2);
    assert_eq!(sol.flow(cross), 1);
}

#[test]
fn min_cost_flow_prefers_cheaper_parallel_route() {
    let mut net = FlowNetwork::new(4);
    net.add_edge(0, 1, 1, 0);
    net.add_edge(0, 2, 1, 0);
    let cheap = net.add_edge(1, 3, 1, 1);
    let pricey = net.add_edge(2, 3, 1, 10);
    let sol = SuccessiveShortestPaths.max_flow_min_cost(&net, 0, 3).unwrap();
    assert_eq!(sol.total_flow(), 2);
    assert_eq!(sol.flow(cheap), 1);
    assert_eq!(sol.flow(pricey), 1);
    assert_eq!(sol.total_cost(), 11);
}

#[test]
fn min_cost_flow_rejects_bad_networks() {
    let mut net = FlowNetwork::new(2);
    net.add_edge(0, 1, -1, 0);
    assert!(SuccessiveShortestPaths.max_flow_min_cost(&net, 0, 1).is_err());

    let net = FlowNetwork::new(2);
    assert!(SuccessiveShortestPaths.max_flow_min_cost(&net, 0, 0).is_err());
    assert!(SuccessiveShortestPaths.max_flow_min_cost(&net, 0, 5).is_err());
}
