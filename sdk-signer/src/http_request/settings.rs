/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// HTTP signing parameters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SigningSettings {
    /// Specifies how to encode the request payload hash
    pub payload_checksum_kind: PayloadChecksumKind,
}

/// Config value to specify how the payload hash is exposed on the request
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum PayloadChecksumKind {
    /// Add `x-sdk-content-sha256` with the body hash to the request, and sign it.
    ///
    /// A value the caller already set for that header is kept.
    XSdkContentSha256,

    /// Do not add an additional header when creating the canonical request
    ///
    /// This is "NoHeader" because the hash is still part of the canonical request either way.
    #[default]
    NoHeader,
}
