//! roundtrip
//!
//! Single-shot HTTP request executor: one [`RequestConfig`] in, one settled
//! outcome out. Requests run through an injectable [`Transport`], and every
//! outcome is either a normalized [`Response`] or a classified [`Error`] with
//! the originating config and request context attached. Timeouts are
//! transport-native; cancellation is cooperative through [`CancelHandle`].
//!
//! ```no_run
//! use roundtrip::{Executor, RequestConfig};
//!
//! # async fn run() -> Result<(), roundtrip::Error> {
//! let executor = Executor::default();
//! let response = executor
//!     .execute(RequestConfig::builder("https://example.com/status").build())
//!     .await?;
//! println!("{} {}", response.status, response.status_text);
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod cancel;
pub mod error;
pub mod executor;
pub mod headers;
pub mod transform;
pub mod transport;
pub mod types;

pub use cancel::CancelHandle;
pub use error::Error;
pub use executor::Executor;
pub use transport::reqwest::ReqwestTransport;
pub use transport::Transport;
pub use types::{
    Body, RequestConfig, RequestConfigBuilder, RequestContext, Response, ResponseData,
    ResponseType,
};
