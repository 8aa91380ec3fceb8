mod blocking;
mod http;
mod traits;

pub use blocking::BlockingClient;
pub use http::HttpClient;
pub use traits::{Api, ApiError};
