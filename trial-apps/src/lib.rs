mod error;
mod overwrite;
mod run;
mod trial_app_config;
pub mod utils;

pub use error::*;
pub use overwrite::*;
pub use run::*;
pub use trial_app_config::*;
