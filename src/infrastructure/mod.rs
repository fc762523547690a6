pub mod core;
pub mod observability;

pub use self::core::HttpClientFactory;
