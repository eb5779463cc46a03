pub mod errors;
pub mod filters;
pub mod models;
pub mod resolve;
pub mod scheduler;
pub mod schema;
pub mod service;
pub mod source;
pub mod stats;

pub use errors::*;
pub use filters::*;
pub use models::*;
pub use resolve::*;
pub use scheduler::*;
pub use service::*;
pub use source::DataSource;
pub use stats::*;
