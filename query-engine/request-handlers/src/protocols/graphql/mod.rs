mod body;
mod document;
mod protocol_adapter;

pub use body::*;
pub use document::*;
pub use protocol_adapter::*;
