#![deny(unsafe_code, rust_2018_idioms)]

pub mod error;
pub mod optimizer;
pub mod query_document;
pub mod schema;
pub mod settings;

pub use error::*;
pub use optimizer::*;
pub use query_document::*;
pub use schema::*;
pub use settings::*;

pub type CoreResult<T> = Result<T, CoreError>;
