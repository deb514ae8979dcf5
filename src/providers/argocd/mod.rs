pub mod client;
pub mod core;
pub mod types;

pub use self::core::ArgoCdProvider;
