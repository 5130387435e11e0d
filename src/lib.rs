pub mod config;
pub mod export;
pub mod opt;
pub mod pipeline;
pub mod routing;
pub mod topo;
pub mod traffic;

#[cfg(test)]
mod test;
