mod argument;
mod resolve_info;
mod selection;

pub use argument::*;
pub use resolve_info::*;
pub use selection::*;

use indexmap::IndexMap;
use query_structure::QueryValue;

pub type Fragments = IndexMap<String, FragmentDefinition>;
pub type Variables = IndexMap<String, QueryValue>;
