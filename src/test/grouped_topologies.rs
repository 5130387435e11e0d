use crate::topo::{
    GroupId, GroupParams, IntraGroupMeshBuilder, SwitchId, TopologyError, UniformDragonfly,
    UniformExpander,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn inter_degree(dfly: &crate::topo::GroupedTopology, sw: usize) -> u32 {
    let a = dfly.switches_per_group();
    let m = dfly.adjacency();
    (0..dfly.total_switches())
        .filter(|&j| j / a != sw / a)
        .map(|j| m.get(sw, j))
        .sum()
}

#[test]
fn group_params_reject_invalid_shapes() {
    assert!(matches!(
        GroupParams::new(1, 4, 1),
        Err(TopologyError::InvalidConfig(_))
    ));
    assert!(matches!(
        GroupParams::new(6, 4, 1),
        Err(TopologyError::InvalidConfig(_))
    ));
    assert!(matches!(
        GroupParams::new(3, 4, 0),
        Err(TopologyError::InvalidConfig(_))
    ));
    assert!(matches!(
        GroupParams::new(2, 0, 1),
        Err(TopologyError::InvalidConfig(_))
    ));

    let p = GroupParams::new(5, 4, 1).unwrap();
    assert_eq!(p.total_switches(), 20);
    assert_eq!(p.inter_links_per_group(), 4);
    assert_eq!(p.inter_links_per_switch(), 1.0);
    assert!(p.is_degree_regular());
}

#[test]
fn dragonfly_two_groups_of_four_with_two_links() {
    let params = GroupParams::new(2, 4, 2).unwrap();
    let mut dfly = UniformDragonfly::new(params).unwrap();
    dfly.design_full_topology().unwrap();
    let topo = dfly.topology();
    let m = topo.adjacency();

    // 每组 6 条组内链路
    for g in 0..2 {
        let base = g * 4;
        let mut intra = 0;
        for i in 0..4 {
            for j in i + 1..4 {
                assert_eq!(m.get(base + i, base + j), 1);
                intra += 1;
            }
        }
        assert_eq!(intra, 6);
    }

    let conn = topo.inter_group_connectivity();
    assert_eq!(conn[0][1], 2);
    assert_eq!(conn[1][0], 2);
    assert_eq!(m.total_links(), 6 + 6 + 2);
    assert!(m.is_symmetric());

    let degrees: Vec<u32> = (0..8).map(|i| m.degree(i)).collect();
    assert!(degrees.iter().all(|&d| d == 3 || d == 4));
    assert_eq!(degrees.iter().filter(|&&d| d == 4).count(), 4);
    for g in 0..2 {
        let fours = (g * 4..g * 4 + 4).filter(|&i| degrees[i] == 4).count();
        assert_eq!(fours, 2, "group {g} should have exactly two switches with an inter-group link");
    }
    assert_eq!(dfly.name(), "dfly_g2_a4_h0.5");
}

#[test]
fn dragonfly_five_groups_every_pair_gets_one_link() {
    let params = GroupParams::new(5, 4, 1).unwrap();
    let mut dfly = UniformDragonfly::new(params).unwrap();
    dfly.design_full_topology().unwrap();
    let topo = dfly.topology();

    let conn = topo.inter_group_connectivity();
    for (g1, row) in conn.iter().enumerate() {
        for (g2, &links) in row.iter().enumerate() {
            assert_eq!(links, if g1 == g2 { 0 } else { 1 });
        }
    }
    for sw in 0..topo.total_switches() {
        assert_eq!(inter_degree(topo, sw), 1);
        assert_eq!(topo.adjacency().get(sw, sw), 0);
    }
    assert_eq!(topo.group_of(SwitchId(13)), GroupId(3));
    assert_eq!(
        topo.switches_in(GroupId(2)),
        &[SwitchId(8), SwitchId(9), SwitchId(10), SwitchId(11)]
    );
    assert_eq!(dfly.name(), "dfly_g5_a4_h1");
}

#[test]
fn dragonfly_designs_only_once() {
    let params = GroupParams::new(3, 4, 1).unwrap();
    let mut dfly = UniformDragonfly::new(params).unwrap();
    dfly.design_full_topology().unwrap();
    assert!(matches!(
        dfly.design_full_topology(),
        Err(TopologyError::InvalidConfig(_))
    ));
}

#[test]
fn dragonfly_rejects_more_pair_links_than_switches() {
    let params = GroupParams::new(2, 3, 4).unwrap();
    assert!(matches!(
        UniformDragonfly::new(params),
        Err(TopologyError::InvalidConfig(_))
    ));
}

#[test]
fn consistency_check_reports_wrong_targets() {
    let params = GroupParams::new(3, 2, 1).unwrap();
    let mut dfly = UniformDragonfly::new(params).unwrap();
    dfly.design_full_topology().unwrap();
    let wrong = vec![vec![0, 2, 1], vec![2, 0, 1], vec![1, 1, 0]];
    let err = dfly
        .topology()
        .check_consistency(crate::topo::IntraPattern::FullMesh, &wrong, true)
        .unwrap_err();
    match err {
        TopologyError::Inconsistent { reason, matrix } => {
            assert!(reason.contains("groups 0 and 1"), "reason: {reason}");
            assert!(!matrix.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn expander_template_degrees_are_target_or_reported() {
    for seed in [1_u64, 7, 33632] {
        let mut builder = IntraGroupMeshBuilder::new(10, 3, StdRng::seed_from_u64(seed)).unwrap();
        let template = builder.build_expander();
        let m = template.matrix();
        assert!(m.is_symmetric());
        for i in 0..10 {
            assert_eq!(m.get(i, i), 0);
            for j in 0..10 {
                assert!(m.get(i, j) <= 1);
            }
            let missing = template
                .shortfalls()
                .iter()
                .find(|s| s.switch == i)
                .map(|s| s.missing)
                .unwrap_or(0);
            assert_eq!(m.degree(i) + missing, 3, "switch {i} seed {seed}");
        }
    }
}

#[test]
fn expander_template_is_deterministic_for_a_seed() {
    let build = |seed| {
        IntraGroupMeshBuilder::new(12, 4, StdRng::seed_from_u64(seed))
            .unwrap()
            .build_expander()
    };
    assert_eq!(build(42).matrix(), build(42).matrix());
}

#[test]
fn expander_template_rejects_full_degree() {
    assert!(IntraGroupMeshBuilder::new(5, 4, StdRng::seed_from_u64(1)).is_err());
    let mesh = IntraGroupMeshBuilder::<StdRng>::full_mesh(5);
    assert!((0..5).all(|i| mesh.degree(i) == 4));
}

#[test]
fn uniform_expander_copies_template_into_every_group() {
    let params = GroupParams::new(3, 6, 2).unwrap();
    let mut expander = UniformExpander::new(params, 3, StdRng::seed_from_u64(5)).unwrap();
    expander.design_full_topology().unwrap();
    let template = expander.template().unwrap().matrix().clone();
    let topo = expander.topology();
    for g in 0..3 {
        let base = g * 6;
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(topo.adjacency().get(base + i, base + j), template.get(i, j));
            }
        }
    }
    let conn = topo.inter_group_connectivity();
    assert_eq!(conn[0][1], 2);
    assert_eq!(conn[1][2], 2);
    assert_eq!(conn[0][2], 2);
    assert!(expander.name().starts_with("uexpander_g3_a6_h"));
}
