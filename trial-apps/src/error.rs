use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("trial-apps: Failed to parse {:?} as toml ({}).", .0, .1)]
    TomlParseFailure(PathBuf, #[source] toml::de::Error),
    #[error("trial-apps: No File {:?} is found ({}).", .0, .1)]
    NoFile(PathBuf, #[source] std::io::Error),
    #[error("trial-apps: Invalid config overwrite {:?}: {}", .0, .1)]
    InvalidOverwrite(String, String),
    #[error("trial-apps: Invalid config: {}", .0)]
    InvalidConfig(String),
    #[error("trial-apps: Backend {:?} is not available in this build (enable the `{}` feature).", .0, .0)]
    BackendUnavailable(String),
    #[error("trial-apps: Interrupted, robot was sent a stop command.")]
    Interrupted,
    #[error("trial-apps: trial-controller: {:?}", .0)]
    Controller(#[from] trial_controller::Error),
    #[error("trial-apps: trial-base: {:?}", .0)]
    Base(#[from] trial_base::Error),
    #[error("trial-apps: trial-arci: {:?}", .0)]
    Arci(#[from] trial_arci::Error),
}
