pub mod error;
pub mod notice;
pub mod platform;
pub mod user;

pub use platform::Platform;
