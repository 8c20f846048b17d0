pub mod batch;
pub mod error;
pub mod middleware;
pub mod routes;

pub use error::ApiError;
pub use middleware::RequestCancellation;
pub use routes::create_router;
