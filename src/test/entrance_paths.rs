use crate::routing::{EntrancePathFinder, EntranceSets};
use crate::topo::{GroupId, GroupMap, GroupPair, GroupParams, SwitchId, UniformDragonfly};

/// 两个 4 交换机分组：1-4、2-5、3-6 为组间链路
pub(super) fn toy_adjacency() -> Vec<Vec<SwitchId>> {
    [
        vec![1, 2, 3],
        vec![0, 2, 3, 4],
        vec![0, 1, 3, 5],
        vec![0, 1, 2, 6],
        vec![5, 6, 7, 1],
        vec![4, 6, 7, 2],
        vec![4, 5, 7, 3],
        vec![4, 5, 6],
    ]
    .into_iter()
    .map(|row| row.into_iter().map(SwitchId).collect())
    .collect()
}

pub(super) fn toy_groups() -> Vec<GroupId> {
    (0..8).map(|sw| GroupId(sw / 4)).collect()
}

fn ids(raw: &[usize]) -> Vec<SwitchId> {
    raw.iter().copied().map(SwitchId).collect()
}

#[test]
fn entrance_sets_and_capacity_on_toy_topology() {
    let groups = GroupMap::from_assignment(toy_groups());
    let sets = EntranceSets::identify(&toy_adjacency(), &groups);
    let forward = GroupPair::new(GroupId(0), GroupId(1));
    assert_eq!(sets.get(forward), ids(&[1, 2, 3]).as_slice());
    assert_eq!(sets.get(forward.reversed()), ids(&[4, 5, 6]).as_slice());
    assert_eq!(sets.capacity(forward), 3);
    assert!(sets.contains(forward, SwitchId(2)));
    assert!(!sets.contains(forward, SwitchId(0)));
    assert!(sets.get(GroupPair::new(GroupId(0), GroupId(0))).is_empty());
}

#[test]
fn parallel_links_count_toward_capacity_but_not_entrances() {
    let adj = vec![
        ids(&[1, 2, 2]),
        ids(&[0]),
        ids(&[0, 0, 3]),
        ids(&[2]),
    ];
    let groups = GroupMap::from_assignment(vec![GroupId(0), GroupId(0), GroupId(1), GroupId(1)]);
    let sets = EntranceSets::identify(&adj, &groups);
    let pair = GroupPair::new(GroupId(0), GroupId(1));
    assert_eq!(sets.get(pair), &[SwitchId(0)]);
    assert_eq!(sets.capacity(pair), 2);
}

#[test]
fn entrance_source_gets_trivial_path() {
    let finder = EntrancePathFinder::default();
    let intra = EntrancePathFinder::intra_adjacency(
        &toy_adjacency(),
        &GroupMap::from_assignment(toy_groups()),
    );
    let paths = finder.paths_to_switch(&intra, SwitchId(2), SwitchId(2), &ids(&[1, 2, 3]));
    assert_eq!(paths, vec![vec![SwitchId(2)]]);
}

#[test]
fn other_entrances_are_not_intermediate_hops() {
    let groups = GroupMap::from_assignment(toy_groups());
    let intra = EntrancePathFinder::intra_adjacency(&toy_adjacency(), &groups);
    let finder = EntrancePathFinder::new(2);

    let paths = finder.paths_to_switch(&intra, SwitchId(0), SwitchId(1), &ids(&[1, 2, 3]));
    assert_eq!(paths, vec![ids(&[0, 1])]);

    let mut open = finder.paths_to_switch(&intra, SwitchId(0), SwitchId(1), &[]);
    open.sort();
    assert_eq!(open, vec![ids(&[0, 1]), ids(&[0, 2, 1]), ids(&[0, 3, 1])]);

    let short = EntrancePathFinder::new(1).paths_to_switch(&intra, SwitchId(0), SwitchId(1), &[]);
    assert_eq!(short, vec![ids(&[0, 1])]);
}

#[test]
fn find_all_covers_every_switch_and_remote_group() {
    let groups = GroupMap::from_assignment(toy_groups());
    let adj = toy_adjacency();
    let sets = EntranceSets::identify(&adj, &groups);
    let paths = EntrancePathFinder::default().find_all(&adj, &groups, &sets);

    assert_eq!(paths.iter().count(), 8);
    let from0 = paths.min_hops(SwitchId(0), GroupId(1));
    assert_eq!(from0.len(), 3);
    assert!(from0.values().all(|&h| h == 1));

    let from1 = paths.min_hops(SwitchId(1), GroupId(1));
    assert_eq!(from1.get(&SwitchId(1)), Some(&0));
    assert!(paths.get(SwitchId(0), GroupId(0)).is_empty());
}

#[test]
fn dragonfly_paths_are_simple_and_bounded() {
    let mut dfly = UniformDragonfly::new(GroupParams::new(4, 4, 1).unwrap()).unwrap();
    dfly.design_full_topology().unwrap();
    let topo = dfly.topology();
    let adj = topo.adjacency_list();
    let sets = EntranceSets::identify(&adj, topo.group_map());
    let paths = EntrancePathFinder::new(2).find_all(&adj, topo.group_map(), &sets);

    for (key, list) in paths.iter() {
        let own = topo.group_of(key.switch);
        let pair = GroupPair::new(own, key.group);
        assert!(!list.is_empty(), "switch {} has no path to group {}", key.switch, key.group);
        for path in list {
            assert_eq!(path[0], key.switch);
            assert!(path.len() <= 3);
            let last = *path.last().unwrap();
            assert!(sets.contains(pair, last));
            let mut seen = path.clone();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), path.len());
            for mid in path.iter().skip(1).take(path.len().saturating_sub(2)) {
                assert_eq!(topo.group_of(*mid), own);
                assert!(!sets.contains(pair, *mid));
            }
        }
    }
}
