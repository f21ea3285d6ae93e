pub mod transport;

#[cfg(test)]
pub mod testing;

pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};
