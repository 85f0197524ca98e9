/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use http::header::{InvalidHeaderName, InvalidHeaderValue};
use std::str::Utf8Error;
use thiserror::Error;

/// Error signing a request.
///
/// Every variant is fatal: signing either produces a complete signature or fails.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SigningError {
    /// The URL could not be parsed, or is not an absolute `http`/`https` URL.
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl {
        /// The URL as given by the caller
        url: String,
        /// Why it was rejected
        reason: String,
    },
    /// The HTTP method is not a valid token.
    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),
    /// Text could not be percent-encoded or decoded.
    #[error("invalid encoding input")]
    InvalidEncodingInput(#[from] EncodingError),
    /// A signed header had no value when the canonical headers were built. This is a bug.
    #[error("signed header `{0}` has no value")]
    MissingRequiredHeaderValue(String),
    /// A header name supplied by the caller is not valid.
    #[error("invalid header name")]
    InvalidHeaderName(#[from] InvalidHeaderName),
    /// A header value supplied by the caller (or the computed `Authorization` value) is not valid.
    #[error("invalid header value")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
    /// A header value to be signed is not valid UTF-8.
    #[error("invalid UTF-8 in value of header `{name}`")]
    InvalidUtf8InHeaderValue {
        /// Name of the offending header
        name: String,
        /// The underlying UTF-8 error
        #[source]
        source: Utf8Error,
    },
    /// A required input was not provided to the request builder.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
}

impl SigningError {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Error percent-encoding or percent-decoding text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodingError {
    /// A UTF-16 surrogate was not part of a high/low pair.
    #[error("unpaired surrogate {0:#06x}")]
    UnpairedSurrogate(u16),
    /// A `%` was not followed by two hex digits.
    #[error("malformed percent-escape at byte {0}")]
    MalformedEscape(usize),
    /// Percent-escapes starting at the given byte decode to invalid UTF-8.
    #[error("percent-escapes at byte {0} do not decode to valid UTF-8")]
    InvalidUtf8(usize),
}
