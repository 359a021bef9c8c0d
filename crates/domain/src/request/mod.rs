//! HTTP Request domain types

mod body;
mod header;
mod method;
mod query;
mod spec;

pub use body::{FormField, RequestBody};
pub use header::Header;
pub use method::HttpMethod;
pub use query::QueryParam;
pub use spec::RequestSpec;
