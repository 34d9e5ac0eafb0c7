use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("invalid swarm config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("unknown gesture label `{0}`")]
    UnknownGesture(String),

    #[error("expected {expected} hand landmarks as x,y pairs or x,y,z triples, found {found} values")]
    LandmarkCount { expected: usize, found: usize },

    #[error("expected {expected} matrix values, found {found}")]
    MatrixLength { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, SwarmError>;
