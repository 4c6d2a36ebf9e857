#![forbid(unsafe_code)]
//! Path codec for the TutorSwap client: route templates, the declaration
//! ordered route table, and the sorted query-string codec.

mod args;
mod query;
mod table;
mod template;

pub use args::RouteArgs;
pub use query::{encode_query, parse_query, split_target, Query};
pub use table::{PathError, Route, RouteTable};
pub use template::{PathTemplate, Segment, PLACEHOLDER_MARKER};

pub use tutorswap_model::ValidationError;

pub const CRATE_NAME: &str = "tutorswap-routing";
