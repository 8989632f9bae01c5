pub mod http;
pub mod tools;

pub use http::{router, serve, ApiError};
pub use tools::ValidatorServer;
