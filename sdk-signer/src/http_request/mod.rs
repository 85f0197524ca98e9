/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Utilities to sign HTTP requests.

mod canonical_request;
mod error;
mod settings;
mod sign;
mod uri_path_normalization;
mod url_escape;


pub use canonical_request::{CanonicalRequest, SignedHeaders, StringToSign};
pub use error::{EncodingError, SigningError};
pub use settings::{PayloadChecksumKind, SigningSettings};
pub use sign::{SignableRequest, SignableRequestBuilder, Signer, TransportParameters};
pub use url_escape::{percent_encode, percent_encode_utf16};
