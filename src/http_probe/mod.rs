pub mod client;
pub mod encoding;
pub mod error;
pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::client::{HttpClient, ProbeRequest, RawResponse, ReqwestClient};
    pub use super::encoding::{EncodingTransform, canonical_variants};
    pub use super::error::{ConfigurationError, TransportError};
    pub use super::probe::{ProbeRunner, RunnerOptions, Strategy};
    pub use super::result::{ProbeOutcome, ProbeResult, ProbeTarget};
}

use std::fmt::Write;

/// Flatten an error and its `source()` chain into one message.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
