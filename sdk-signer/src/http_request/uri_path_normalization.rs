/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::borrow::Cow;

/// Removes `.` and `..` segments from an absolute URI path (RFC 3986 §5.2.4).
///
/// Percent-encoded dots (`%2e`, any case) count as dots. A path ending in a
/// dot segment keeps its trailing `/`. Returns the input borrowed when there
/// is nothing to remove.
pub(crate) fn normalize_uri_path(path: &str) -> Cow<'_, str> {
    let segments = path.strip_prefix('/').unwrap_or(path).split('/');
    if !segments.clone().any(|s| is_dot(s) || is_double_dot(s)) {
        return Cow::Borrowed(path);
    }

    let mut output: Vec<&str> = Vec::new();
    let mut segments = segments.peekable();
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        if is_double_dot(segment) {
            output.pop();
        } else if !is_dot(segment) {
            output.push(segment);
            continue;
        }
        if last {
            output.push("");
        }
    }
    Cow::Owned(format!("/{}", output.join("/")))
}

fn is_dot(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

fn is_double_dot(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let dot = |b: &[u8]| b == b"." || b.eq_ignore_ascii_case(b"%2e");
    match bytes.len() {
        2 => bytes == b"..",
        4 => (dot(&bytes[..1]) && dot(&bytes[1..])) || (dot(&bytes[..3]) && dot(&bytes[3..])),
        6 => dot(&bytes[..3]) && dot(&bytes[3..]),
        _ => false,
    }
}
