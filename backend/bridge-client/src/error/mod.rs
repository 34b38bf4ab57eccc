pub mod config;
pub mod link;

pub use config::ConfigError;
pub use link::LinkError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Link(#[from] link::LinkError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
