//! 邻接矩阵
//!
//! `M[i][j]` 为交换机 i 到 j 的并行链路数。所有修改都同时作用于
//! `(i, j)` 与 `(j, i)`，因此矩阵始终是对称的。

use std::fmt;

use super::id::SwitchId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    n: usize,
    cells: Vec<u32>,
}

impl AdjacencyMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![0; n * n],
        }
    }

    /// 从行向量构建（不检查对称性，交由一致性检查处理）
    pub fn from_rows(rows: &[Vec<u32>]) -> Self {
        let n = rows.len();
        let mut m = Self::new(n);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate().take(n) {
                m.cells[i * n + j] = v;
            }
        }
        m
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.n + j]
    }

    /// 在 i 与 j 之间增加 `count` 条双向链路
    pub fn add_links(&mut self, i: usize, j: usize, count: u32) {
        debug_assert!(i != j, "self-loop on switch {i}");
        self.cells[i * self.n + j] += count;
        self.cells[j * self.n + i] += count;
    }

    /// 移除 i 与 j 之间的一条双向链路；没有链路时返回 false
    pub fn remove_link(&mut self, i: usize, j: usize) -> bool {
        if self.get(i, j) == 0 {
            return false;
        }
        self.cells[i * self.n + j] -= 1;
        self.cells[j * self.n + i] -= 1;
        true
    }

    pub fn degree(&self, i: usize) -> u32 {
        self.row(i).iter().sum()
    }

    pub fn row(&self, i: usize) -> &[u32] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// 双向链路总数（每条物理链路计一次）
    pub fn total_links(&self) -> u64 {
        let directed: u64 = self.cells.iter().map(|&v| v as u64).sum();
        directed / 2
    }

    /// 邻接表；并行链路会重复出现
    pub fn adjacency_list(&self) -> Vec<Vec<SwitchId>> {
        (0..self.n)
            .map(|i| {
                let mut nbrs = Vec::new();
                for (j, &links) in self.row(i).iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    for _ in 0..links {
                        nbrs.push(SwitchId(j));
                    }
                }
                nbrs
            })
            .collect()
    }
}

impl fmt::Display for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.n {
            let row: Vec<String> = self.row(i).iter().map(|v| v.to_string()).collect();
            writeln!(f, "[{}]", row.join(" "))?;
        }
        Ok(())
    }
}
