/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use super::error::SigningError;
use super::sign::SignableRequest;
use super::url_escape::{decode_uri, percent_encode};
use crate::sign::{calculate_signature, sha256_hex_string, ALGORITHM};
use http::header::HeaderName;
use http::{HeaderMap, HeaderValue, Method};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

pub(crate) mod header {
    pub(crate) const X_SDK_DATE: &str = "x-sdk-date";
    pub(crate) const X_SDK_CONTENT_SHA_256: &str = "x-sdk-content-sha256";
}

/// The canonical form of a [`SignableRequest`].
///
/// Every part is derived once, from the same header set, when the canonical
/// request is created. `Display` renders the canonical request string:
///
/// ```text
/// METHOD
/// CANONICAL_URI
/// CANONICAL_QUERY
/// CANONICAL_HEADERS (one `name:value\n` line per signed header)
///
/// SIGNED_HEADERS
/// CONTENT_HASH
/// ```
#[derive(Debug, PartialEq)]
pub struct CanonicalRequest<'a> {
    method: &'a Method,
    path: String,
    params: String,
    headers: String,
    signed_headers: SignedHeaders,
    date_time: &'a str,
    content_sha256: Cow<'a, str>,
}

impl<'a> CanonicalRequest<'a> {
    /// Construct a CanonicalRequest from a SignableRequest
    ///
    /// ## Behavior
    /// - Every header on the request is signed; there are no excluded headers.
    /// - The content hash is the value of `x-sdk-content-sha256` when the request
    ///   carries one, otherwise the SHA-256 of the body.
    /// - The timestamp comes from the `x-sdk-date` header, which
    ///   [`SignableRequest`] guarantees is present.
    pub fn from(req: &'a SignableRequest<'_>) -> Result<Self, SigningError> {
        let signed_headers = SignedHeaders::new(req.headers());
        let headers = Self::headers(req.headers(), &signed_headers)?;
        let date_time = match header_value(req.headers(), header::X_SDK_DATE)? {
            Some(date_time) => date_time,
            None => {
                let name = header::X_SDK_DATE.to_string();
                return Err(SigningError::MissingRequiredHeaderValue(name));
            }
        };
        let content_sha256 = match header_value(req.headers(), header::X_SDK_CONTENT_SHA_256)? {
            Some(precomputed) => Cow::Borrowed(precomputed),
            None => Cow::Owned(sha256_hex_string(req.body())),
        };
        Ok(CanonicalRequest {
            method: req.method(),
            path: Self::path(req.uri().path())?,
            params: Self::params(req.uri().query()),
            headers,
            signed_headers,
            date_time,
            content_sha256,
        })
    }

    fn path(path: &str) -> Result<String, SigningError> {
        let decoded = decode_uri(path)?;
        let mut canonical = decoded
            .split('/')
            .map(percent_encode)
            .collect::<Vec<_>>()
            .join("/");
        if !canonical.ends_with('/') {
            canonical.push('/');
        }
        Ok(canonical)
    }

    fn params(query: Option<&str>) -> String {
        let Some(query) = query else {
            return String::new();
        };
        let mut grouped: BTreeMap<Cow<'_, str>, Vec<Cow<'_, str>>> = BTreeMap::new();
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            grouped.entry(name).or_default().push(value);
        }
        let mut params: Vec<_> = grouped.into_iter().collect();
        params.sort_by(|(a, _), (b, _)| utf16_order(a, b));

        let mut out = String::new();
        for (name, mut values) in params {
            values.sort_by(|a, b| utf16_order(a, b));
            let encoded_name = percent_encode(&name);
            // parameters without a value are left out entirely
            for value in values.iter().filter(|value| !value.is_empty()) {
                if !out.is_empty() {
                    out.push('&');
                }
                out.push_str(&encoded_name);
                out.push('=');
                out.push_str(&percent_encode(value));
            }
        }
        out
    }

    fn headers(
        headers: &HeaderMap,
        signed_headers: &SignedHeaders,
    ) -> Result<String, SigningError> {
        let mut out = String::new();
        for name in &signed_headers.inner {
            let value = headers
                .get(name)
                .ok_or_else(|| SigningError::MissingRequiredHeaderValue(name.to_string()))?;
            let value = header_str(name.as_str(), value)?;
            out.push_str(name.as_str());
            out.push(':');
            out.push_str(value.trim());
            out.push('\n');
        }
        Ok(out)
    }

    /// Returns the HTTP method
    pub fn method(&self) -> &Method {
        self.method
    }

    /// Returns the canonical URI: every path segment percent-encoded, always ending in `/`.
    pub fn canonical_uri(&self) -> &str {
        &self.path
    }

    /// Returns the canonical query string, sorted by parameter name.
    ///
    /// Empty if there are no parameters with a value.
    pub fn canonical_query_string(&self) -> &str {
        &self.params
    }

    /// Returns the canonical headers block, `name:value\n` for each signed header.
    pub fn canonical_headers(&self) -> &str {
        &self.headers
    }

    /// Returns the names of the signed headers
    pub fn signed_headers(&self) -> &SignedHeaders {
        &self.signed_headers
    }

    /// Returns the content hash placed on the last line of the canonical request
    pub fn content_sha256(&self) -> &str {
        &self.content_sha256
    }

    /// Returns the `x-sdk-date` timestamp the signature is bound to
    pub fn date_time(&self) -> &'a str {
        self.date_time
    }

    /// Returns the string to sign for this canonical request
    pub fn string_to_sign(&self) -> StringToSign<'a> {
        StringToSign::new(self.date_time, sha256_hex_string(self.to_string()))
    }

    /// Calculates the signature of this canonical request with the given secret key
    pub fn signature(&self, secret_key: impl AsRef<[u8]>) -> String {
        calculate_signature(secret_key, self.string_to_sign().to_string().as_bytes())
    }
}

impl<'a> fmt::Display for CanonicalRequest<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.params)?;
        // every header line already ends with a newline
        write!(f, "{}", self.headers)?;
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.content_sha256)?;
        Ok(())
    }
}

fn header_value<'h>(headers: &'h HeaderMap, name: &str) -> Result<Option<&'h str>, SigningError> {
    headers
        .get(name)
        .map(|value| header_str(name, value))
        .transpose()
}

fn header_str<'h>(name: &str, value: &'h HeaderValue) -> Result<&'h str, SigningError> {
    match std::str::from_utf8(value.as_bytes()) {
        Ok(value) => Ok(value),
        Err(source) => Err(SigningError::InvalidUtf8InHeaderValue {
            name: name.to_string(),
            source,
        }),
    }
}

/// Orders strings by their UTF-16 code units.
fn utf16_order(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// The sorted, lowercase names of every header bound into a signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedHeaders {
    inner: Vec<HeaderName>,
    formatted: String,
}

impl SignedHeaders {
    fn new(headers: &HeaderMap) -> Self {
        let mut inner: Vec<HeaderName> = headers.keys().cloned().collect();
        inner.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let formatted = inner
            .iter()
            .map(HeaderName::as_str)
            .collect::<Vec<_>>()
            .join(";");
        SignedHeaders { inner, formatted }
    }

    /// Returns the names joined by `;`
    pub fn as_str(&self) -> &str {
        &self.formatted
    }

    /// Iterates the header names in signing order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(HeaderName::as_str)
    }
}

impl fmt::Display for SignedHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted)
    }
}

/// The pre-image fed into HMAC-SHA256: algorithm, timestamp and canonical request hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToSign<'a> {
    date_time: &'a str,
    hashed_creq: String,
}

impl<'a> StringToSign<'a> {
    /// Creates a string to sign from a timestamp and a lowercase hex canonical request hash
    pub fn new(date_time: &'a str, hashed_creq: String) -> Self {
        Self {
            date_time,
            hashed_creq,
        }
    }

    /// Returns the signing algorithm name
    pub fn algorithm(&self) -> &'static str {
        ALGORITHM
    }

    /// Returns the lowercase hex SHA-256 of the canonical request
    pub fn hashed_canonical_request(&self) -> &str {
        &self.hashed_creq
    }
}

impl<'a> fmt::Display for StringToSign<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n", ALGORITHM, self.date_time)?;
        f.write_str(&self.hashed_creq)
    }
}

#[cfg(test)]
mod tests {
    use super::CanonicalRequest;
    use crate::http_request::error::{EncodingError, SigningError};
    use crate::http_request::test::{self, test_request};
    use crate::http_request::SignableRequest;
    use crate::sign::sha256_hex_string;
    use http::HeaderValue;
    use pretty_assertions::assert_eq;
    use proptest::{prop_assert, prop_assert_eq, proptest};

    fn request(method: &str, url: &str) -> SignableRequest<'static> {
        SignableRequest::new(
            method,
            url,
            [("X-Sdk-Date", test::DATE_TIME)],
            b"{\"key\":\"value\"}",
        )
        .unwrap()
    }

    fn canonical_uri(url: &str) -> String {
        let req = request("GET", url);
        let creq = CanonicalRequest::from(&req).unwrap();
        creq.canonical_uri().to_string()
    }

    fn canonical_query(url: &str) -> String {
        let req = request("GET", url);
        let creq = CanonicalRequest::from(&req).unwrap();
        creq.canonical_query_string().to_string()
    }

    #[test]
    fn test_canonical_request_parts() {
        let req = test_request();
        let creq = CanonicalRequest::from(&req).unwrap();
        assert_eq!(test::CANONICAL_URI, creq.canonical_uri());
        assert_eq!(test::CANONICAL_QUERY, creq.canonical_query_string());
        assert_eq!(test::CANONICAL_HEADERS, creq.canonical_headers());
        assert_eq!(test::SIGNED_HEADERS, creq.signed_headers().as_str());
        assert_eq!(test::DATE_TIME, creq.date_time());
        assert_eq!(test::CANONICAL_REQUEST, creq.to_string());
    }

    #[test]
    fn test_string_to_sign() {
        let req = test_request();
        let creq = CanonicalRequest::from(&req).unwrap();
        assert_eq!(test::STRING_TO_SIGN, creq.string_to_sign().to_string());
        assert_eq!("SDK-HMAC-SHA256", creq.string_to_sign().algorithm());
    }

    #[test]
    fn test_digest_of_canonical_request() {
        let expected = "b25362e603ee30f4f25e7858e8a7160fd36e803bb2dfe206278659d71a9bcd7a";
        assert_eq!(expected, sha256_hex_string(test::CANONICAL_REQUEST));
    }

    #[test]
    fn test_signature() {
        let req = test_request();
        let creq = CanonicalRequest::from(&req).unwrap();
        assert_eq!(test::SIGNATURE, creq.signature(test::SECRET_KEY));
    }

    #[test]
    fn canonical_uri_trailing_slash() {
        assert_eq!("/", canonical_uri("https://example.com"));
        assert_eq!("/", canonical_uri("https://example.com/"));
        assert_eq!("/a/b/", canonical_uri("https://example.com/a/b"));
        assert_eq!("/a/b/", canonical_uri("https://example.com/a/b/"));
        assert_eq!(
            "/~user/a.b_c-d/",
            canonical_uri("https://example.com/~user/a.b_c-d")
        );
    }

    #[test]
    fn canonical_uri_encodes_segments() {
        assert_eq!(
            "/%E4%B8%AD/a%20b/",
            canonical_uri("https://example.com/%E4%B8%AD/a%20b")
        );
        assert_eq!("/a%3Db%40c/", canonical_uri("https://example.com/a=b@c"));
        // an escaped slash is not a segment separator
        assert_eq!("/a%252Fb/", canonical_uri("https://example.com/a%2Fb"));
    }

    #[test]
    fn canonical_uri_without_dot_segments() {
        assert_eq!("/b/", canonical_uri("https://h.com/a/../b"));
        assert_eq!("/a/b/", canonical_uri("https://h.com/a/./b"));
        assert_eq!("/a/", canonical_uri("https://h.com/a/b/.."));
        assert_eq!("/b/", canonical_uri("https://h.com/a/%2E%2E/b"));
    }

    #[test]
    fn canonical_uri_invalid_escape() {
        let req = request("GET", "https://example.com/%C0%80");
        let err = CanonicalRequest::from(&req).unwrap_err();
        assert!(matches!(
            err,
            SigningError::InvalidEncodingInput(EncodingError::InvalidUtf8(1))
        ));
    }

    #[test]
    fn canonical_query_sorted_by_name() {
        assert_eq!(
            "a=1&b=2&c=3",
            canonical_query("https://example.com/?c=3&a=1&b=2")
        );
    }

    #[test]
    fn canonical_query_omits_empty_values() {
        assert_eq!("b=2", canonical_query("https://example.com/?a=&b=2&flag"));
        assert_eq!("", canonical_query("https://example.com/?"));
        assert_eq!("", canonical_query("https://example.com/"));
    }

    #[test]
    fn canonical_query_encodes_names_and_values() {
        assert_eq!(
            "k%20y=%E4%B8%AD&name=hello%20world&t=~-._",
            canonical_query("https://example.com/?name=hello+world&k%20y=%E4%B8%AD&t=~-._")
        );
        assert_eq!(
            "q=a%2Fb%3Dc",
            canonical_query("https://example.com/?q=a%2Fb%3Dc")
        );
    }

    #[test]
    fn canonical_query_sorted_by_utf16_code_units() {
        // U+FF5E sorts before U+1F600 as UTF-8, after it as UTF-16
        let url = "https://example.com/?%EF%BD%9E=1&%F0%9F%98%80=2";
        assert_eq!("%F0%9F%98%80=2&%EF%BD%9E=1", canonical_query(url));

        let url = "https://example.com/?a=%EF%BD%9E&a=%F0%9F%98%80";
        assert_eq!("a=%F0%9F%98%80&a=%EF%BD%9E", canonical_query(url));
    }

    #[test]
    fn canonical_query_repeated_names() {
        assert_eq!(
            "a=1&a=2&b=0",
            canonical_query("https://example.com/?a=2&b=0&a=&a=1")
        );
    }

    #[test]
    fn canonical_headers_trimmed() {
        let req = SignableRequest::new(
            "GET",
            "https://example.com/",
            [
                ("X-Sdk-Date", test::DATE_TIME),
                ("X-Custom", "  spaced  value \t"),
            ],
            &[],
        )
        .unwrap();
        let creq = CanonicalRequest::from(&req).unwrap();
        assert_eq!(
            "host:example.com\nx-custom:spaced  value\nx-sdk-date:20191115T033655Z\n",
            creq.canonical_headers()
        );
        assert_eq!(
            "host;x-custom;x-sdk-date",
            creq.signed_headers().to_string()
        );
        assert_eq!(
            vec!["host", "x-custom", "x-sdk-date"],
            creq.signed_headers().iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn content_hash_of_body() {
        let req = request("POST", "https://example.com/");
        let creq = CanonicalRequest::from(&req).unwrap();
        let expected = sha256_hex_string(b"{\"key\":\"value\"}");
        assert_eq!(expected, creq.content_sha256());
    }

    #[test]
    fn content_hash_from_header() {
        let req = SignableRequest::new(
            "PUT",
            "https://example.com/object",
            [
                ("X-Sdk-Date", test::DATE_TIME),
                ("X-Sdk-Content-Sha256", "UNSIGNED-PAYLOAD"),
            ],
            b"streamed",
        )
        .unwrap();
        let creq = CanonicalRequest::from(&req).unwrap();
        assert_eq!("UNSIGNED-PAYLOAD", creq.content_sha256());
        assert!(creq.to_string().ends_with("\nUNSIGNED-PAYLOAD"));
        assert_eq!(
            "host;x-sdk-content-sha256;x-sdk-date",
            creq.signed_headers().as_str()
        );
    }

    #[test]
    fn invalid_utf8_header_value() {
        let value = HeaderValue::from_bytes(&[0xC0, 0xC1]).unwrap();
        let http_req = http::Request::builder()
            .uri("https://example.com/")
            .header("x-sign-me", value)
            .body(Vec::<u8>::new())
            .unwrap();
        let req = SignableRequest::try_from(&http_req).unwrap();
        let err = CanonicalRequest::from(&req).unwrap_err();
        assert!(matches!(
            err,
            SigningError::InvalidUtf8InHeaderValue { ref name, .. } if name == "x-sign-me"
        ));
    }

    fn join_query<'p>(params: impl Iterator<Item = &'p (String, String)>) -> String {
        let query = params
            .map(|(k, v)| format!("{}={}", k, v.replace(' ', "+")))
            .collect::<Vec<_>>()
            .join("&");
        format!("https://example.com/?{}", query)
    }

    proptest! {
        #[test]
        fn canonical_query_ignores_input_order(
            params in proptest::collection::vec(("[a-zA-Z_.~-]{1,4}", "[a-z0-9 ]{0,4}"), 0..8)
        ) {
            let forward = canonical_query(&join_query(params.iter()));
            let backward = canonical_query(&join_query(params.iter().rev()));
            prop_assert_eq!(&forward, &backward);

            let names: Vec<&str> = forward
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| pair.split('=').next().unwrap())
                .collect();
            let mut sorted = names.clone();
            sorted.sort();
            prop_assert_eq!(names, sorted);
            let no_empty_values = forward.split('&').all(|p| p.is_empty() || !p.ends_with('='));
            prop_assert!(no_empty_values);
        }
    }
}
