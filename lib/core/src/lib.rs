pub mod caller;
pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use caller::Caller;
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
pub use types::{merge_patch, new_id, now_rfc3339, ListParams, ListResult};
