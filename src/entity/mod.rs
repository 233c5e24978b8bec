mod bot_error;
mod position;
mod swap;
mod swap_job;
mod token;
mod user;

pub use bot_error::BotError;
pub use position::Position;
pub use swap::{SwapRequest, TradeDirection};
pub use swap_job::{SwapJob, SwapStatus};
pub use token::TokenMeta;
pub use user::{UserProfile, Wallet};
