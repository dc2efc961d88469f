use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid network: {0}")]
    Cidr(#[from] ripd_types::CidrError),

    #[error("neighbor file error: {0}")]
    NeighborFile(String),

    #[error("RPC server error: {0}")]
    Rpc(#[from] ripd_rpc::RpcError),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task failed: {0}")]
    Task(String),
}
