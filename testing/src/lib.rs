#[cfg(feature = "chrono")]
pub mod chrono;
#[cfg(feature = "platform")]
pub mod platform;

mod utils;
pub use utils::*;
