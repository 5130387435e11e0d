use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("adjacency list covers {adjacency} switches, group map covers {groups}")]
    SwitchCountMismatch { adjacency: usize, groups: usize },

    #[error("traffic matrix covers {traffic} switches, topology has {switches}")]
    TrafficSizeMismatch { switches: usize, traffic: usize },

    #[error("switch {switch} lists neighbour {neighbor} outside the topology")]
    NeighborOutOfRange { switch: usize, neighbor: usize },

    #[error("invalid routing option: {0}")]
    InvalidOption(String),
}
