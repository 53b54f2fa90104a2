use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("trial-arci: Uninitialized : {}", message)]
    Uninitialized { message: String },
    #[error("trial-arci: Connection error : {}", message)]
    Connection { message: String },
    #[error("trial-arci: Other: {:?}", .0)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
