//! 标识符类型
//!
//! 定义交换机、分组以及复合键（分组对、路由权重键）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 交换机标识符，取值范围 `[0, total_switches)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwitchId(pub usize);

/// 分组（block）标识符，取值范围 `[0, num_groups)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub usize);

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 有序分组对 (src, dst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupPair {
    pub src: GroupId,
    pub dst: GroupId,
}

impl GroupPair {
    pub fn new(src: GroupId, dst: GroupId) -> Self {
        Self { src, dst }
    }

    pub fn reversed(self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
        }
    }
}

/// (交换机, 目标分组) 复合键，用于索引路径集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwitchGroupKey {
    pub switch: SwitchId,
    pub group: GroupId,
}

/// (源交换机, 入口交换机) 复合键，用于索引路由权重
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeightKey {
    pub switch: SwitchId,
    pub entrance: SwitchId,
}
