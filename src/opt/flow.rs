//! 最小费用最大流
//!
//! [`SuccessiveShortestPaths`] 在残量网络上反复用 Bellman-Ford（队列优化）
//! 寻找最短费用增广路。初始费用非负，因此残量网络中不会出现负环，
//! 得到的最大流同时也是最小费用的。

use std::collections::VecDeque;

use tracing::trace;

use super::error::SolverError;

/// 网络中一条边的句柄（按添加顺序编号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone)]
struct FlowEdge {
    from: usize,
    to: usize,
    capacity: i64,
    cost: i64,
}

#[derive(Debug, Clone, Default)]
pub struct FlowNetwork {
    nodes: usize,
    edges: Vec<FlowEdge>,
}

impl FlowNetwork {
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    pub fn add_edge(&mut self, from: usize, to: usize, capacity: i64, cost: i64) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(FlowEdge {
            from,
            to,
            capacity,
            cost,
        });
        id
    }
}

#[derive(Debug, Clone)]
pub struct FlowSolution {
    flows: Vec<i64>,
    total_flow: i64,
    total_cost: i64,
}

impl FlowSolution {
    pub fn flow(&self, edge: EdgeId) -> i64 {
        self.flows[edge.0]
    }

    pub fn total_flow(&self) -> i64 {
        self.total_flow
    }

    pub fn total_cost(&self) -> i64 {
        self.total_cost
    }
}

pub trait MinCostFlowSolver {
    fn max_flow_min_cost(
        &self,
        net: &FlowNetwork,
        source: usize,
        sink: usize,
    ) -> Result<FlowSolution, SolverError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SuccessiveShortestPaths;

/// 残量网络中的弧；`rev` 为反向弧在 `arcs` 中的下标
#[derive(Debug, Clone)]
struct Arc {
    to: usize,
    cap: i64,
    cost: i64,
    rev: usize,
}

impl MinCostFlowSolver for SuccessiveShortestPaths {
    fn max_flow_min_cost(
        &self,
        net: &FlowNetwork,
        source: usize,
        sink: usize,
    ) -> Result<FlowSolution, SolverError> {
        let n = net.nodes;
        if source >= n || sink >= n || source == sink {
            return Err(SolverError::Malformed(format!(
                "source {source} / sink {sink} invalid for {n} nodes"
            )));
        }

        let mut arcs: Vec<Arc> = Vec::with_capacity(net.edges.len() * 2);
        let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
        // 原始边 e 对应的正向弧下标
        let mut forward = Vec::with_capacity(net.edges.len());
        for e in &net.edges {
            if e.from >= n || e.to >= n {
                return Err(SolverError::Malformed(format!(
                    "edge {} -> {} out of range",
                    e.from, e.to
                )));
            }
            if e.capacity < 0 || e.cost < 0 {
                return Err(SolverError::Malformed(format!(
                    "edge {} -> {} has capacity {} cost {}",
                    e.from, e.to, e.capacity, e.cost
                )));
            }
            let fwd = arcs.len();
            arcs.push(Arc {
                to: e.to,
                cap: e.capacity,
                cost: e.cost,
                rev: fwd + 1,
            });
            arcs.push(Arc {
                to: e.from,
                cap: 0,
                cost: -e.cost,
                rev: fwd,
            });
            out[e.from].push(fwd);
            out[e.to].push(fwd + 1);
            forward.push(fwd);
        }

        let mut total_flow = 0_i64;
        let mut total_cost = 0_i64;
        let mut dist = vec![i64::MAX; n];
        let mut in_queue = vec![false; n];
        let mut via: Vec<Option<usize>> = vec![None; n];
        let mut q: VecDeque<usize> = VecDeque::new();

        loop {
            dist.fill(i64::MAX);
            via.fill(None);
            dist[source] = 0;
            q.clear();
            q.push_back(source);
            in_queue[source] = true;

            while let Some(u) = q.pop_front() {
                in_queue[u] = false;
                let du = dist[u];
                for &a in &out[u] {
                    let arc = &arcs[a];
                    if arc.cap <= 0 {
                        continue;
                    }
                    let nd = du.saturating_add(arc.cost);
                    if nd < dist[arc.to] {
                        dist[arc.to] = nd;
                        via[arc.to] = Some(a);
                        if !in_queue[arc.to] {
                            in_queue[arc.to] = true;
                            q.push_back(arc.to);
                        }
                    }
                }
            }

            if dist[sink] == i64::MAX {
                break;
            }

            // 沿最短路回溯求瓶颈
            let mut push = i64::MAX;
            let mut v = sink;
            while let Some(a) = via[v] {
                push = push.min(arcs[a].cap);
                v = arcs[arcs[a].rev].to;
            }
            let mut v = sink;
            while let Some(a) = via[v] {
                arcs[a].cap -= push;
                let rev = arcs[a].rev;
                arcs[rev].cap += push;
                v = arcs[rev].to;
            }

            total_flow += push;
            total_cost += push.saturating_mul(dist[sink]);
            trace!(push, path_cost = dist[sink], "增广");
        }

        let flows = forward
            .iter()
            .zip(&net.edges)
            .map(|(&a, e)| e.capacity - arcs[a].cap)
            .collect();

        Ok(FlowSolution {
            flows,
            total_flow,
            total_cost,
        })
    }
}
