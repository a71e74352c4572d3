mod claims;
pub mod extractors;
pub mod jwt;

pub use extractors::ApiCaller;
