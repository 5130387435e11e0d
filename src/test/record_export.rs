use super::entrance_paths::{toy_adjacency, toy_groups};
use crate::export::{
    sci, write_routing_weights, write_switch_to_group, write_topology, write_traffic_probability,
};
use crate::routing::{AdaptiveRouting, AdaptiveRoutingOpts};
use crate::topo::{GroupMap, SwitchId};
use crate::traffic::TrafficMatrix;

fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
    let mut buf = Vec::new();
    f(&mut buf).expect("write into memory");
    String::from_utf8(buf).expect("utf8 output")
}

#[test]
fn scientific_notation_uses_signed_two_digit_exponent() {
    assert_eq!(sci(0.5), "5.000000E-01");
    assert_eq!(sci(1.0), "1.000000E+00");
    assert_eq!(sci(12345.0), "1.234500E+04");
    assert_eq!(sci(0.0), "0.000000E+00");
}

#[test]
fn topology_file_lists_every_directed_link() {
    let adj = vec![
        vec![SwitchId(1), SwitchId(1)],
        vec![SwitchId(0), SwitchId(0)],
        vec![],
    ];
    let out = render(|w| write_topology(w, &adj));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "# topology adj list file");
    assert_eq!(lines[1], "|V|=3");
    assert_eq!(lines[2], "|E|=4");
    assert_eq!(lines[3], "ToRs=incl_range(0,2)");
    assert_eq!(lines[4], "Servers=incl_range(0,2)");
    assert_eq!(lines.iter().filter(|l| **l == "0 1").count(), 2);
    assert_eq!(lines.iter().filter(|l| **l == "1 0").count(), 2);
}

#[test]
fn switch_to_group_file_has_one_line_per_switch() {
    let groups = GroupMap::contiguous(2, 3);
    let out = render(|w| write_switch_to_group(w, &groups));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[1], "0,0");
    assert_eq!(lines[6], "5,1");
}

#[test]
fn traffic_file_offsets_servers_and_skips_zeros() {
    let mut tm = TrafficMatrix::zeros(3);
    tm.set(0, 2, 0.25).unwrap();
    tm.set(2, 1, 0.75).unwrap();
    let out = render(|w| write_traffic_probability(w, &tm, 3));
    let lines: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(
        lines,
        vec![
            "#tor_pair_id,src,dst,pdf_num_bytes",
            "0,3,5,2.500000E-01",
            "1,5,4,7.500000E-01",
        ]
    );
}

#[test]
fn routing_weights_file_matches_table_records() {
    let mut tm = TrafficMatrix::zeros(8);
    tm.set(0, 7, 5.0).unwrap();
    let table = AdaptiveRouting::new(AdaptiveRoutingOpts {
        sigma: 0.0,
        max_intra_hops: 2,
    })
    .unwrap()
    .route(&toy_adjacency(), &toy_groups(), &tm)
    .unwrap();
    let out = render(|w| write_routing_weights(w, &table));
    let body: Vec<&str> = out
        .lines()
        .skip(1)
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(body.len(), table.records().count());
    assert!(body.contains(&"1,1,1,1.000000E+00"));
    assert!(body.iter().any(|l| l.starts_with("0,1,2,3.3333")));
    assert!(body.iter().all(|l| l.split(',').count() == 4));
}
