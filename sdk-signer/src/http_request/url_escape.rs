/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Percent-encoding used by the signature and by the transport path.

use super::error::EncodingError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;

/// Everything except ALPHA / DIGIT / "-" / "." / "_" / "~" is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters that may appear unescaped in the request path sent on the wire.
const URI: &AsciiSet = &UNRESERVED
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'!')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'#');

/// Escapes of these characters survive path decoding untouched.
const RESERVED: &[u8] = b";/?:@&=+$,#";

/// Percent-encodes `value` for use in the canonical request.
///
/// Each byte of the UTF-8 encoding of a character outside the unreserved set
/// becomes `%XX` (uppercase hex). Input made only of unreserved characters is
/// returned borrowed.
pub fn percent_encode(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, UNRESERVED).into()
}

/// Percent-encodes UTF-16 code units, as [`percent_encode`] does for `str`.
///
/// Fails without partial output if any surrogate is not part of a high/low pair.
pub fn percent_encode_utf16(units: &[u16]) -> Result<String, EncodingError> {
    let mut out = String::with_capacity(units.len());
    let mut buf = [0; 4];
    for c in char::decode_utf16(units.iter().copied()) {
        let c = match c {
            Ok(c) => c,
            Err(err) => return Err(EncodingError::UnpairedSurrogate(err.unpaired_surrogate())),
        };
        out.extend(utf8_percent_encode(c.encode_utf8(&mut buf), UNRESERVED));
    }
    Ok(out)
}

/// Decodes the percent-escapes of a URI path.
///
/// Escapes that decode to a reserved delimiter (`;/?:@&=+$,#`) are kept as-is
/// so that an encoded `/` never becomes a segment separator.
pub(crate) fn decode_uri(input: &str) -> Result<Cow<'_, str>, EncodingError> {
    if !input.contains('%') {
        return Ok(Cow::Borrowed(input));
    }
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            decoded.push(bytes[i]);
            i += 1;
            continue;
        }
        let lead = escape_at(bytes, i)?;
        if lead < 0x80 {
            if RESERVED.contains(&lead) {
                decoded.extend_from_slice(&bytes[i..i + 3]);
            } else {
                decoded.push(lead);
            }
            i += 3;
            continue;
        }

        let start = i;
        let len = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(EncodingError::InvalidUtf8(start)),
        };
        let mut sequence = [lead, 0, 0, 0];
        i += 3;
        for slot in sequence.iter_mut().take(len).skip(1) {
            if bytes.get(i) != Some(&b'%') {
                return Err(EncodingError::InvalidUtf8(start));
            }
            *slot = escape_at(bytes, i)?;
            i += 3;
        }
        let c = std::str::from_utf8(&sequence[..len])
            .map_err(|_| EncodingError::InvalidUtf8(start))?;
        decoded.extend_from_slice(c.as_bytes());
    }
    String::from_utf8(decoded)
        .map(Cow::Owned)
        .map_err(|err| EncodingError::InvalidUtf8(err.utf8_error().valid_up_to()))
}

/// Escapes a request path for the wire.
///
/// Existing `%XX` escapes are preserved; any other character outside the URI
/// character set is escaped.
pub(crate) fn escape_path(path: &str) -> Cow<'_, str> {
    let bytes = path.as_bytes();
    let mut escaped = String::with_capacity(path.len());
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && hex_escape(bytes, i).is_some() {
            escaped.extend(utf8_percent_encode(&path[start..i], URI));
            escaped.push_str(&path[i..i + 3]);
            i += 3;
            start = i;
        } else {
            i += 1;
        }
    }
    if start == 0 {
        return utf8_percent_encode(path, URI).into();
    }
    escaped.extend(utf8_percent_encode(&path[start..], URI));
    Cow::Owned(escaped)
}

fn escape_at(bytes: &[u8], at: usize) -> Result<u8, EncodingError> {
    hex_escape(bytes, at).ok_or(EncodingError::MalformedEscape(at))
}

fn hex_escape(bytes: &[u8], at: usize) -> Option<u8> {
    let hi = char::from(*bytes.get(at + 1)?).to_digit(16)?;
    let lo = char::from(*bytes.get(at + 2)?).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}
