pub mod blend;
pub mod channel;
pub mod config;
pub mod constants;
pub mod director;
pub mod error;
pub mod gaze;
pub mod mixer;
pub mod phase;
pub mod soundscape;
pub mod stage;
pub mod status;
pub mod visual;

pub use channel::*;
pub use config::*;
pub use director::*;
pub use error::ConfigError;
pub use gaze::*;
pub use mixer::*;
pub use phase::*;
pub use soundscape::*;
pub use stage::*;
pub use status::*;
pub use visual::*;
