//! 流量矩阵与合成流量生成器

mod error;
mod generators;
mod matrix;

pub use error::TrafficError;
pub use generators::{
    Adversarial, AdversarialSingleSwitch, ExplicitMatrix, SingleGlobalLink, Stencil27Point,
    TrafficGenerator,
};
pub use matrix::TrafficMatrix;

pub(crate) use generators::two_significant;
