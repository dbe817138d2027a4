pub mod config;
pub mod draw;
pub mod editor;
pub mod host;
pub mod markers;
pub mod records;
pub mod session;
pub mod storage;
pub mod utils;

pub use config::ToolboxConfig;
pub use session::{DrawOutcome, DrawSession, SessionError};
