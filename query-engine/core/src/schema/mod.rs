mod filterset;
mod hooks;
mod object_type;
mod orderset;
mod output_field;
mod output_type;
mod query_schema;

pub use filterset::*;
pub use hooks::*;
pub use object_type::*;
pub use orderset::*;
pub use output_field::*;
pub use output_type::*;
pub use query_schema::*;

#[cfg(test)]
mod tests;
