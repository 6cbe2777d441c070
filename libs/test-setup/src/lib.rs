#![deny(unsafe_code, rust_2018_idioms)]

//! Fixtures shared by the tests of the query engine crates: a small project management
//! datamodel, a schema on top of it, and logging setup.

mod fixture;
mod logging;

pub use fixture::*;
pub use logging::init_logger;
