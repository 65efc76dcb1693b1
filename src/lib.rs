pub mod config;
pub mod errors;
pub mod filter;
pub mod models;
pub mod options;
pub mod routes;
pub mod search;
pub mod sort;
pub mod traits;

pub use config::SelectConfig;
pub use errors::ApiError;
pub use models::{OptionsParams, OptionsRequest, Record};
pub use options::{Options, Resource};
pub use routes::options_router;
pub use search::{ComparisonOperator, Search, SearchMode};
pub use traits::{SelectResource, relation_path_of};
