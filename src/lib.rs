// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod abacus;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod level;
pub mod logging;
pub mod output;
pub mod runtime;
pub mod session;
pub mod timer;

pub use error::AppError;
pub use session::{SessionController, SessionOptions};
