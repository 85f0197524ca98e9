/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Hashing and HMAC primitives used to calculate signatures.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// Name of the signing algorithm, the first line of every string to sign.
pub const ALGORITHM: &str = "SDK-HMAC-SHA256";

/// HashedPayload = Lowercase(HexEncode(Hash(requestPayload)))
pub fn sha256_hex_string(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Calculates a signature over `string_to_sign`.
///
/// The secret key is used as the HMAC key as-is; no per-date or per-scope key is derived.
pub fn calculate_signature(secret_key: impl AsRef<[u8]>, string_to_sign: &[u8]) -> String {
    let key = secret_key.as_ref();
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(string_to_sign);
    hex::encode(mac.finalize().into_bytes())
}
