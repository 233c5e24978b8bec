pub mod api;
pub mod chain;
pub mod config;
pub mod entity;
pub mod notify;
pub mod queue;
pub mod session;
pub mod trade;
pub mod utils;
pub mod view;

// Re-export commonly used items
pub use api::*;
pub use chain::*;
pub use config::*;
pub use entity::*;
pub use notify::*;
pub use queue::*;
pub use session::*;
pub use trade::*;
pub use utils::*;
pub use view::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
