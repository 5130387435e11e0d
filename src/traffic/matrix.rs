//! 交换机级流量矩阵

use serde::Serialize;

use super::error::TrafficError;
use crate::topo::{GroupId, GroupMap, SwitchId};

/// 非负、有限的方阵，`[src][dst]` 为相对需求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficMatrix {
    n: usize,
    cells: Vec<f64>,
}

impl TrafficMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            cells: vec![0.0; n * n],
        }
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, TrafficError> {
        let n = rows.len();
        let mut m = Self::zeros(n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(TrafficError::NotSquare {
                    row: i,
                    len: row.len(),
                    expected: n,
                });
            }
            for (j, &v) in row.iter().enumerate() {
                m.set(i, j, v)?;
            }
        }
        Ok(m)
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, src: usize, dst: usize) -> f64 {
        self.cells[src * self.n + dst]
    }

    pub fn set(&mut self, src: usize, dst: usize, value: f64) -> Result<(), TrafficError> {
        if !value.is_finite() || value < 0.0 {
            return Err(TrafficError::InvalidEntry { src, dst, value });
        }
        self.cells[src * self.n + dst] = value;
        Ok(())
    }

    /// 在 `[src][dst]` 上累加需求
    pub fn add(&mut self, src: usize, dst: usize, value: f64) -> Result<(), TrafficError> {
        let current = self.get(src, dst);
        self.set(src, dst, current + value)
    }

    pub fn row(&self, src: usize) -> &[f64] {
        &self.cells[src * self.n..(src + 1) * self.n]
    }

    pub fn row_sum(&self, src: usize) -> f64 {
        self.row(src).iter().sum()
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// 缩放到 `new_size x new_size`：放大时把每个元素均摊到 `ratio^2` 个位置，
    /// 缩小时按块求和；对角线清零。
    pub fn rescale(&self, new_size: usize) -> TrafficMatrix {
        let orig = self.n;
        if new_size == orig {
            return self.clone();
        }
        let mut out = TrafficMatrix::zeros(new_size);
        if orig == 0 || new_size == 0 {
            return out;
        }
        if new_size > orig {
            let ratio = new_size as f64 / orig as f64;
            let spread = ratio * ratio;
            for i in 0..new_size {
                let x = i * orig / new_size;
                for j in 0..new_size {
                    let y = j * orig / new_size;
                    out.cells[i * new_size + j] = self.get(x, y) / spread;
                }
            }
        } else {
            for i in 0..orig {
                let x = i * new_size / orig;
                for j in 0..orig {
                    let y = j * new_size / orig;
                    out.cells[x * new_size + y] += self.get(i, j);
                }
            }
        }
        for i in 0..new_size {
            out.cells[i * new_size + i] = 0.0;
        }
        out
    }

    /// 按比例缩放，使所有元素之和为 `norm`
    pub fn normalized(&self, norm: f64) -> Result<TrafficMatrix, TrafficError> {
        let total = self.total();
        if total <= 0.0 {
            return Err(TrafficError::EmptyTraffic);
        }
        let k = norm / total;
        Ok(TrafficMatrix {
            n: self.n,
            cells: self.cells.iter().map(|v| v * k).collect(),
        })
    }

    /// 聚合为分组级流量矩阵（组内流量不计）
    pub fn aggregate_groups(&self, groups: &GroupMap) -> Vec<Vec<f64>> {
        let g = groups.num_groups();
        let mut out = vec![vec![0.0; g]; g];
        for i in 0..self.n {
            let gi = groups.group_of(SwitchId(i)).0;
            for j in 0..self.n {
                let gj = groups.group_of(SwitchId(j)).0;
                if gi != gj {
                    out[gi][gj] += self.get(i, j);
                }
            }
        }
        out
    }

    /// 交换机 `src` 发往分组 `dst` 内所有交换机的需求之和
    pub fn demand_to_group(&self, src: SwitchId, dst: GroupId, groups: &GroupMap) -> f64 {
        groups
            .switches_in(dst)
            .iter()
            .map(|t| self.get(src.0, t.0))
            .sum()
    }
}
