/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use super::canonical_request::{header, CanonicalRequest, SignedHeaders};
use super::error::SigningError;
use super::uri_path_normalization::normalize_uri_path;
use super::url_escape::escape_path;
use super::{PayloadChecksumKind, SigningSettings};
use crate::credentials::Credentials;
use crate::date_time::format_date_time;
use crate::sign::{calculate_signature, sha256_hex_string, ALGORITHM};
use crate::time_source::{SystemTimeSource, TimeSource};
use crate::SigningOutput;
use http::header::{HeaderName, AUTHORIZATION, HOST};
use http::uri::{PathAndQuery, Scheme};
use http::{HeaderMap, HeaderValue, Method, Uri};
use std::borrow::Cow;

/// Represents all of the information necessary to sign an HTTP request.
///
/// Construction normalizes the request:
/// - `host` is always set to the URL authority (`host[:port]`, without
///   user-info and without the scheme's default port), replacing any
///   caller-supplied value. The host name is lowercased.
/// - `.` and `..` segments are removed from the path.
/// - `x-sdk-date` is kept if the caller supplied it, otherwise it is set from
///   the time source in `YYYYMMDDTHHMMSSZ` form.
/// - The body is only kept for `PUT`, `PATCH` and `POST`.
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    method: Method,
    uri: Uri,
    scheme: Scheme,
    hostname: String,
    port: Option<u16>,
    headers: HeaderMap,
    body: &'a [u8],
}

impl<'a> SignableRequest<'a> {
    /// Creates a new `SignableRequest`, using the system clock for a missing `X-Sdk-Date`.
    ///
    /// If you have an [`http::Request`], consider using `SignableRequest::try_from` instead.
    pub fn new<K, V>(
        method: &str,
        url: &str,
        headers: impl IntoIterator<Item = (K, V)>,
        body: &'a [u8],
    ) -> Result<Self, SigningError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        SignableRequestBuilder::default()
            .method(method)
            .url(url)
            .headers(headers)
            .body(body)
            .build()
    }

    /// Returns a builder that can create a new `SignableRequest`.
    pub fn builder() -> SignableRequestBuilder<'a> {
        SignableRequestBuilder::default()
    }

    fn from_parts(
        method: Method,
        uri: Uri,
        mut headers: HeaderMap,
        body: &'a [u8],
        time_source: &dyn TimeSource,
    ) -> Result<Self, SigningError> {
        let invalid_url = |reason: &str| SigningError::invalid_url(uri.to_string(), reason);
        let scheme = match uri.scheme() {
            Some(scheme) if is_http(scheme) => scheme.clone(),
            Some(scheme) => {
                let reason = format!("unsupported scheme `{}`", scheme);
                return Err(invalid_url(&reason));
            }
            None => return Err(invalid_url("URL must be absolute")),
        };
        let authority = match uri.authority() {
            Some(authority) if !authority.host().is_empty() => authority,
            _ => return Err(invalid_url("URL has no host")),
        };
        let hostname = authority.host().to_ascii_lowercase();
        let default_port = if scheme == Scheme::HTTPS { 443 } else { 80 };
        let port = authority.port_u16().filter(|port| *port != default_port);

        let host = match port {
            Some(port) => format!("{}:{}", hostname, port),
            None => hostname.clone(),
        };
        headers.insert(HOST, HeaderValue::try_from(host)?);
        if !headers.contains_key(header::X_SDK_DATE) {
            let date_time = format_date_time(time_source.now());
            tracing::debug!(date_time = %date_time, "using the current time as x-sdk-date");
            headers.insert(header::X_SDK_DATE, HeaderValue::try_from(date_time)?);
        }

        let normalized = match normalize_uri_path(uri.path()) {
            Cow::Owned(path) => Some(path),
            Cow::Borrowed(_) => None,
        };
        let uri = match normalized {
            Some(path) => replace_path(uri, &path)?,
            None => uri,
        };

        let body = if carries_body(&method) { body } else { &[] };
        Ok(Self {
            method,
            uri,
            scheme,
            hostname,
            port,
            headers,
            body,
        })
    }

    /// Returns the signable HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the signable URI
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request headers, including `host` and `x-sdk-date`
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the signable body; always empty for methods other than `PUT`, `PATCH` and `POST`
    pub fn body(&self) -> &[u8] {
        self.body
    }

    /// Returns the host name without port
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Returns the port, if one is given that differs from the scheme's default
    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

fn is_http(scheme: &Scheme) -> bool {
    *scheme == Scheme::HTTP || *scheme == Scheme::HTTPS
}

fn carries_body(method: &Method) -> bool {
    *method == Method::PUT || *method == Method::PATCH || *method == Method::POST
}

/// Rebuilds `uri` with `path` in place of its path, keeping the query.
fn replace_path(uri: Uri, path: &str) -> Result<Uri, SigningError> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };
    let path_and_query = PathAndQuery::try_from(path_and_query)
        .map_err(|err| SigningError::invalid_url(uri.to_string(), err))?;
    let mut parts = uri.into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).map_err(|err| SigningError::invalid_url(path, err))
}

impl<'a, B> TryFrom<&'a http::Request<B>> for SignableRequest<'a>
where
    B: AsRef<[u8]>,
{
    type Error = SigningError;

    fn try_from(request: &'a http::Request<B>) -> Result<Self, Self::Error> {
        // one value per header name; the last one wins
        let mut headers = HeaderMap::with_capacity(request.headers().keys_len());
        for (name, value) in request.headers() {
            headers.insert(name.clone(), value.clone());
        }
        SignableRequest::from_parts(
            request.method().clone(),
            request.uri().clone(),
            headers,
            request.body().as_ref(),
            &SystemTimeSource::new(),
        )
    }
}

/// Builder for [`SignableRequest`]
#[derive(Debug, Default)]
pub struct SignableRequestBuilder<'a> {
    method: Option<String>,
    url: Option<String>,
    headers: Vec<(String, String)>,
    body: &'a [u8],
    time_source: Option<&'a dyn TimeSource>,
}

impl<'a> SignableRequestBuilder<'a> {
    /// Sets the HTTP method (required)
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.set_method(Some(method.into()));
        self
    }
    /// Sets the HTTP method (required)
    pub fn set_method(&mut self, method: Option<String>) -> &mut Self {
        self.method = method;
        self
    }
    /// Sets the absolute URL (required)
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.set_url(Some(url.into()));
        self
    }
    /// Sets the absolute URL (required)
    pub fn set_url(&mut self, url: Option<String>) -> &mut Self {
        self.url = url;
        self
    }
    /// Adds a header. A later header with the same (case-insensitive) name replaces an earlier one.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
    /// Adds several headers
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let headers = headers.into_iter().map(|(k, v)| (k.into(), v.into()));
        self.headers.extend(headers);
        self
    }
    /// Sets the body
    pub fn body(mut self, body: &'a [u8]) -> Self {
        self.body = body;
        self
    }
    /// Sets the clock used when no `X-Sdk-Date` header is given. Defaults to the system clock.
    pub fn time_source(mut self, time_source: &'a dyn TimeSource) -> Self {
        self.time_source = Some(time_source);
        self
    }

    /// Builds a [`SignableRequest`]. Fails if a required field is missing, or
    /// if the method, URL or a header is invalid.
    pub fn build(self) -> Result<SignableRequest<'a>, SigningError> {
        let Some(method) = self.method else {
            return Err(SigningError::InvalidRequest("method is required"));
        };
        let method = match Method::from_bytes(method.as_bytes()) {
            Ok(method) => method,
            Err(_) => return Err(SigningError::InvalidMethod(method)),
        };
        let Some(url) = self.url else {
            return Err(SigningError::InvalidRequest("url is required"));
        };
        let uri = match url.parse::<Uri>() {
            Ok(uri) => uri,
            Err(err) => return Err(SigningError::invalid_url(url, err)),
        };

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        let time_source = self.time_source.unwrap_or(&SystemTimeSource);
        SignableRequest::from_parts(method, uri, headers, self.body, time_source)
    }
}

/// Signs requests with a long-lived access key / secret key pair.
///
/// The signer holds no state besides its credentials and settings, so one
/// instance can be shared by any number of concurrent signing calls.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    settings: SigningSettings,
}

impl Signer {
    /// Creates a signer with default [`SigningSettings`]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            settings: SigningSettings::default(),
        }
    }

    /// Replaces the signing settings
    pub fn with_settings(mut self, settings: SigningSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the credentials used to sign
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the signing settings
    pub fn settings(&self) -> &SigningSettings {
        &self.settings
    }

    /// Signs `request` and returns the parameters needed to send it.
    ///
    /// The request's headers move into the output with `authorization` added.
    /// Nothing is cached; every call recomputes the signature.
    pub fn sign(
        &self,
        mut request: SignableRequest<'_>,
    ) -> Result<SigningOutput<TransportParameters>, SigningError> {
        tracing::trace!(request = ?request, "signing request");
        if self.settings.payload_checksum_kind == PayloadChecksumKind::XSdkContentSha256
            && !request.headers.contains_key(header::X_SDK_CONTENT_SHA_256)
        {
            let payload_hash = sha256_hex_string(request.body);
            request.headers.insert(
                header::X_SDK_CONTENT_SHA_256,
                HeaderValue::try_from(payload_hash)?,
            );
        }

        let (authorization, signature, query) = {
            // Step 1: canonical request
            let creq = CanonicalRequest::from(&request)?;
            // Step 2: string to sign
            let sts = creq.string_to_sign();
            // Step 3: signature, keyed by the secret key itself
            let string_to_sign = sts.to_string();
            let secret_key = self.credentials.secret_key();
            let signature = calculate_signature(secret_key, string_to_sign.as_bytes());
            tracing::trace!(
                canonical_request = %creq,
                string_to_sign = %sts,
                "calculated signing parameters"
            );
            // Step 4: authorization header
            let authorization = self.authorization_header_value(creq.signed_headers(), &signature);
            (
                authorization,
                signature,
                creq.canonical_query_string().to_string(),
            )
        };

        let mut path = escape_path(request.uri.path()).into_owned();
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query);
        }

        let mut authorization = HeaderValue::try_from(authorization)?;
        authorization.set_sensitive(true);
        let SignableRequest {
            method,
            scheme,
            hostname,
            port,
            mut headers,
            ..
        } = request;
        headers.insert(AUTHORIZATION, authorization);

        Ok(SigningOutput::new(
            TransportParameters {
                scheme,
                hostname,
                port,
                path,
                method,
                headers,
            },
            signature,
        ))
    }

    /// Formats the `Authorization` header value:
    /// `SDK-HMAC-SHA256 Access=<access key>, SignedHeaders=<a;b;c>, Signature=<hex>`
    pub fn authorization_header_value(
        &self,
        signed_headers: &SignedHeaders,
        signature: &str,
    ) -> String {
        format!(
            "{} Access={}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.access_key(),
            signed_headers,
            signature
        )
    }
}

/// Everything a transport needs to send a signed request.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct TransportParameters {
    scheme: Scheme,
    hostname: String,
    port: Option<u16>,
    path: String,
    method: Method,
    headers: HeaderMap,
}

impl TransportParameters {
    /// Returns the URL scheme, `http` or `https`
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Returns the host name without port
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Returns the port, if it differs from the scheme's default
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns `hostname[:port]`, the value sent in the `Host` header
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.hostname, port),
            None => self.hostname.clone(),
        }
    }

    /// Returns the percent-encoded path and, if not empty, `?` plus the canonical query
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the headers to send, including `authorization`
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Converts the parameters into an [`http::Request`] carrying `body`.
    pub fn into_request<B>(self, body: B) -> Result<http::Request<B>, SigningError> {
        let authority = self.authority();
        let target = format!("{}://{}{}", self.scheme, authority, self.path);
        let uri: Uri = target
            .parse()
            .map_err(|err| SigningError::invalid_url(&target, err))?;

        let mut request = http::Request::new(body);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}
