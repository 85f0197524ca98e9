/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Provides `SDK-HMAC-SHA256` request signing for cloud API clients.
//!
//! The signer turns an HTTP method, URL, header set and body into a canonical
//! request, hashes it, and computes an HMAC-SHA256 signature keyed directly by
//! the secret key. The result is a set of transport parameters (host, path,
//! method, headers with `Authorization` injected) that can be handed to any
//! HTTP client.
//!
//! # Example: Signing a request
//!
//! ```rust
//! use sdk_signer::http_request::{SignableRequest, Signer};
//! use sdk_signer::Credentials;
//!
//! # fn main() -> Result<(), sdk_signer::http_request::SigningError> {
//! let signer = Signer::new(Credentials::new(
//!     "QTWAOYTTINDUT2QVKYUC",
//!     "MFyfvK41ba2giqM7Uio6PznpdUKGpownRZlmVmHc",
//! ));
//! let request = SignableRequest::new(
//!     "GET",
//!     "https://service.region.example.com/v1/77b6a44cba5143ab91d13ab9a8ff44fd/vpcs?limit=2",
//!     [("Content-Type", "application/json"), ("X-Sdk-Date", "20191115T033655Z")],
//!     &[],
//! )?;
//! let (transport, signature) = signer.sign(request)?.into_parts();
//! assert_eq!(signature.len(), 64);
//! assert_eq!(transport.hostname(), "service.region.example.com");
//! assert!(transport.headers().contains_key("authorization"));
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod credentials;
pub mod http_request;
pub mod sign;
pub mod time_source;

mod date_time;

pub use credentials::Credentials;

/// Container for the signed output and the signature.
///
/// Returned by [`Signer::sign`](crate::http_request::Signer::sign).
#[derive(Debug)]
pub struct SigningOutput<T> {
    output: T,
    signature: String,
}

impl<T> SigningOutput<T> {
    /// Creates a new [`SigningOutput`]
    pub fn new(output: T, signature: String) -> Self {
        Self { output, signature }
    }

    /// Returns the signed output
    pub fn output(&self) -> &T {
        &self.output
    }

    /// Returns the signature as a lowercase hex string
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Decomposes the `SigningOutput` into a tuple of the signed output and the signature
    pub fn into_parts(self) -> (T, String) {
        (self.output, self.signature)
    }
}
