pub mod auth;
pub mod drive;
pub mod error;
pub mod net;

// Re-exports for convenience
pub use auth::{ServiceAccountTokens, StaticToken, TokenProvider};
pub use drive::{DriveClient, DriveMediaStream, MediaChunk};
pub use error::{RemoteError, RemoteErrorKind};
pub use net::default_http_client;
