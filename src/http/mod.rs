//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID minted or kept, echoed on the response)
//!     → security (CORS, session validation)
//!     → handlers.rs (multipart parse, file operations)
//!     → JSON response or error body
//!     → response.rs (JSON body for layer-generated 408/413)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
