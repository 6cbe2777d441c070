#![deny(unsafe_code, rust_2018_idioms)]

mod error;
mod handler;
mod protocols;
mod response;

#[cfg(test)]
mod tests;

pub use error::HandlerError;
pub use handler::*;
pub use protocols::*;
pub use response::*;

pub type Result<T> = std::result::Result<T, HandlerError>;
