pub mod config;
pub mod fault;
pub mod ipc;

pub use fault::CommunicationFault;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Ipc(#[from] ipc::IpcError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
