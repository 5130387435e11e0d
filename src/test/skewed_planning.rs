use crate::opt::{
    LinearProgram, LpSolution, LpSolver, MinilpSolver, SolverError, SuccessiveShortestPaths,
};
use crate::topo::{
    GroupParams, IntegerRoundingEngine, InterGroupLinkPlanner, SkewedExpander, TopologyError,
    ValidationPolicy, symmetrize_demand,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

struct FailingSolver;

impl LpSolver for FailingSolver {
    fn solve(&self, _lp: &LinearProgram) -> Result<LpSolution, SolverError> {
        Err(SolverError::Backend("offline".to_string()))
    }
}

fn skewed_traffic() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 10.0, 1.0],
        vec![10.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ]
}

#[test]
fn symmetrize_sums_both_directions() {
    let d = vec![vec![0.0, 3.0], vec![1.0, 0.0]];
    let sym = symmetrize_demand(&d);
    assert_eq!(sym, vec![vec![0.0, 4.0], vec![4.0, 0.0]]);
}

#[test]
fn planner_gives_heavy_pair_most_links() {
    let plan = InterGroupLinkPlanner::new(&MinilpSolver, 3, 4)
        .plan(&skewed_traffic())
        .unwrap();
    let t = plan.throughput.unwrap();
    assert!((t - 0.3).abs() < 1e-6);
    assert!((plan.links[0][1] - 3.0).abs() < 1e-6);
    assert!((plan.links[0][2] - 1.0).abs() < 1e-6);
    assert!((plan.links[1][2] - 1.0).abs() < 1e-6);
    for i in 0..3 {
        assert_eq!(plan.links[i][i], 0.0);
        let row: f64 = plan.links[i].iter().sum();
        assert!(row <= 4.0 + 1e-6);
        for j in 0..3 {
            assert!((plan.links[i][j] - plan.links[j][i]).abs() < 1e-9);
        }
    }
}

#[test]
fn planner_splits_budget_evenly_without_demand() {
    let zeros = vec![vec![0.0; 4]; 4];
    let plan = InterGroupLinkPlanner::new(&MinilpSolver, 4, 6)
        .plan(&zeros)
        .unwrap();
    assert!(plan.throughput.is_none());
    assert_eq!(plan.links[0][1], 2.0);
    assert_eq!(plan.links[3][2], 2.0);
    assert_eq!(plan.links[2][2], 0.0);
}

#[test]
fn planner_surfaces_solver_failure_and_bad_shapes() {
    let err = InterGroupLinkPlanner::new(&FailingSolver, 3, 4)
        .plan(&skewed_traffic())
        .unwrap_err();
    assert_eq!(err, SolverError::Backend("offline".to_string()));

    let err = InterGroupLinkPlanner::new(&MinilpSolver, 3, 4)
        .plan(&[vec![0.0, 1.0], vec![1.0, 0.0]])
        .unwrap_err();
    assert!(matches!(err, SolverError::Malformed(_)));
}

#[test]
fn rounding_keeps_integer_matrices() {
    let frac = vec![
        vec![0.0, 2.0, 1.0],
        vec![2.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ];
    let r = IntegerRoundingEngine::new(&SuccessiveShortestPaths, 3)
        .round(&frac)
        .unwrap();
    assert_eq!(r, vec![vec![0, 2, 1], vec![2, 0, 1], vec![1, 1, 0]]);
}

#[test]
fn rounding_fills_remaining_budget_within_ceil() {
    let frac = vec![
        vec![0.0, 2.9, 1.1],
        vec![2.9, 0.0, 1.1],
        vec![1.1, 1.1, 0.0],
    ];
    let r = IntegerRoundingEngine::new(&SuccessiveShortestPaths, 4)
        .round(&frac)
        .unwrap();
    for i in 0..3 {
        let sum: u32 = r[i].iter().sum();
        assert!(sum <= 4);
        for j in 0..3 {
            if i == j {
                continue;
            }
            assert!((r[i][j] as f64) >= frac[i][j].floor());
            assert!((r[i][j] as f64) <= frac[i][j].ceil());
            assert!(r[i][j] >= 1);
            assert_eq!(r[i][j], r[j][i]);
        }
    }
    assert_eq!(r[0][1], 2);
    assert_eq!(r[0][2], 2);
}

#[test]
fn rounding_tops_up_pairs_lost_to_asymmetric_flow() {
    // 余量只能沿一个三角环流动，取较小值后三个分组对都回到下整
    let frac = vec![
        vec![0.0, 1.5, 1.5],
        vec![1.5, 0.0, 1.5],
        vec![1.5, 1.5, 0.0],
    ];
    let r = IntegerRoundingEngine::new(&SuccessiveShortestPaths, 3)
        .round(&frac)
        .unwrap();
    assert_eq!(r, vec![vec![0, 2, 1], vec![2, 0, 1], vec![1, 1, 0]]);
}

#[test]
fn rounding_rejects_pairs_left_without_links() {
    let frac = vec![
        vec![0.0, 2.0, 0.0],
        vec![2.0, 0.0, 1.0],
        vec![0.0, 1.0, 0.0],
    ];
    let err = IntegerRoundingEngine::new(&SuccessiveShortestPaths, 3)
        .round(&frac)
        .unwrap_err();
    assert!(matches!(
        err,
        TopologyError::DisconnectedGroupPair { src: 0, dst: 2 }
    ));
}

#[test]
fn skewed_expander_follows_traffic() {
    let params = GroupParams::new(3, 4, 2).unwrap();
    let mut skewed = SkewedExpander::new(params, 2, StdRng::seed_from_u64(11))
        .unwrap()
        .with_validation(ValidationPolicy::Fatal);
    skewed.design_full_topology(&skewed_traffic()).unwrap();

    let links = skewed.group_links().unwrap().to_vec();
    assert_eq!(links, vec![vec![0, 3, 1], vec![3, 0, 1], vec![1, 1, 0]]);
    let conn = skewed.topology().inter_group_connectivity();
    assert_eq!(conn, links);
    assert!(skewed.fractional_plan().is_some());
    assert!(skewed.name().starts_with("skewedexpander_g3_a4_h"));

    assert!(matches!(
        skewed.design_full_topology(&skewed_traffic()),
        Err(TopologyError::InvalidConfig(_))
    ));
}

#[test]
fn skewed_expander_planning_failure_is_fatal() {
    let params = GroupParams::new(3, 4, 2).unwrap();
    let mut skewed = SkewedExpander::new(params, 2, StdRng::seed_from_u64(11)).unwrap();
    let err = skewed
        .design_full_topology_with(&skewed_traffic(), &FailingSolver, &SuccessiveShortestPaths)
        .unwrap_err();
    assert!(matches!(err, TopologyError::Planning(_)));
}
