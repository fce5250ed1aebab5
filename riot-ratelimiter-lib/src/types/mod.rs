#![allow(unreachable_pub)]

mod error;
mod region;
mod request;

pub use error::ErrorKind;
pub use region::PlatformId;
pub use request::ApiRequest;

/// The rate limiter `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
