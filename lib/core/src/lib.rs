pub mod config;
pub mod error;
pub mod extract;
pub mod module;
pub mod response;
pub mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use extract::ApiJson;
pub use module::Module;
pub use response::Envelope;
pub use types::now_rfc3339;
