//! In-memory HTTP/1.x request model
//!
//! Holds a captured request as method, target, version, ordered headers and
//! raw body. Exposes URL-query and form-body parameters with their raw wire
//! values, and produces updated copies with one parameter replaced.
//! Untouched requests serialize back to the exact bytes they came from
//! (for CRLF input with `Name: value` headers).

use crate::aura::{Param, ParamKind, ParamRequest, RequestError};
use crate::aura::transform::percent_decode;
use bytes::Bytes;
use std::fmt;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Upper bound on header lines in one request head
const MAX_HEADERS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    target: String,
    version: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HttpRequest {
    pub fn new(
        method: impl Into<String>,
        target: impl Into<String>,
        version: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            version: version.into(),
            headers,
            body: body.into(),
        }
    }

    /// Parse a raw request (head, blank line, body)
    ///
    /// Accepts bare `\n` line endings for hand-written files. Everything
    /// after the blank line is the body, whatever Content-Length says.
    pub fn parse(raw: &[u8]) -> Result<Self, RequestError> {
        let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut head = httparse::Request::new(&mut slots);
        let header_len = match head.parse(raw) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => {
                return Err(RequestError::Malformed("incomplete request head".into()))
            }
            Err(e) => return Err(RequestError::Malformed(e.to_string())),
        };

        let (Some(method), Some(target), Some(minor)) = (head.method, head.path, head.version)
        else {
            return Err(RequestError::Malformed("incomplete request line".into()));
        };

        let headers = head
            .headers
            .iter()
            .map(|h| {
                let value = std::str::from_utf8(h.value).map_err(|_| {
                    RequestError::Malformed(format!("header {:?} is not UTF-8", h.name))
                })?;
                Ok((h.name.to_string(), value.to_string()))
            })
            .collect::<Result<Vec<_>, RequestError>>()?;

        Ok(Self::new(
            method,
            target,
            format!("HTTP/1.{}", minor),
            headers,
            Bytes::copy_from_slice(&raw[header_len..]),
        ))
    }

    /// Serialize back to wire bytes with CRLF line endings
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} {}\r\n", self.method, self.target, self.version).into_bytes();
        for (name, value) in &self.headers {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request target as it appeared on the request line
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First header with this name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first header with this name, or append it
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    /// Path without scheme, authority or query
    pub fn path(&self) -> &str {
        let without_query = self.target.split('?').next().unwrap_or("");
        match without_query.split_once("://") {
            Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/"),
            None => without_query,
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }

    /// Host from an absolute target, else from the Host header
    pub fn host(&self) -> Option<&str> {
        if let Some((_, rest)) = self.target.split_once("://") {
            return rest.split(['/', '?']).next().filter(|h| !h.is_empty());
        }
        self.header("host")
    }

    pub fn is_form_body(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
    }

    /// Absolute URL to send this request to
    ///
    /// Absolute-form targets are used as-is, origin-form targets are
    /// appended to `upstream`.
    pub fn url(&self, upstream: &str) -> String {
        if self.target.starts_with("http://") || self.target.starts_with("https://") {
            self.target.clone()
        } else {
            format!("{}{}", upstream.trim_end_matches('/'), self.target)
        }
    }

    fn body_str(&self) -> Option<&str> {
        if !self.is_form_body() {
            return None;
        }
        std::str::from_utf8(&self.body).ok()
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.target)
    }
}

impl ParamRequest for HttpRequest {
    fn params(&self) -> Vec<Param> {
        let mut params = Vec::new();
        if let Some(query) = self.query() {
            params.extend(parse_pairs(query, ParamKind::Url));
        }
        if let Some(body) = self.body_str() {
            params.extend(parse_pairs(body, ParamKind::Body));
        }
        params
    }

    fn with_param(&self, param: &Param, value: &str) -> Result<Self, RequestError> {
        let mut next = self.clone();
        match param.kind {
            ParamKind::Url => {
                let (base, query) = self
                    .target
                    .split_once('?')
                    .ok_or(RequestError::NoParams(ParamKind::Url))?;
                let query = replace_pair(query, param, value)?;
                next.target = format!("{}?{}", base, query);
            }
            ParamKind::Body => {
                let body = self
                    .body_str()
                    .ok_or(RequestError::NoParams(ParamKind::Body))?;
                let body = replace_pair(body, param, value)?;
                next.set_header("Content-Length", body.len().to_string());
                next.body = Bytes::from(body);
            }
        }
        Ok(next)
    }
}

/// `a=1&b=2` pairs; empty segments are skipped but keep their place
fn segments(source: &str) -> impl Iterator<Item = (&str, &str)> {
    source
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|s| s.split_once('=').unwrap_or((s, "")))
}

fn parse_pairs(source: &str, kind: ParamKind) -> Vec<Param> {
    segments(source)
        .enumerate()
        .map(|(index, (name, value))| Param {
            name: percent_decode(name),
            value: value.to_string(),
            kind,
            index,
        })
        .collect()
}

fn replace_pair(source: &str, param: &Param, value: &str) -> Result<String, RequestError> {
    let mut index = 0;
    let mut found = false;
    let rebuilt: Vec<String> = source
        .split('&')
        .map(|segment| {
            if segment.is_empty() {
                return String::new();
            }
            let name = segment.split_once('=').map_or(segment, |(n, _)| n);
            let this = index;
            index += 1;
            if this == param.index && percent_decode(name) == param.name {
                found = true;
                format!("{}={}", name, value)
            } else {
                segment.to_string()
            }
        })
        .collect();

    if found {
        Ok(rebuilt.join("&"))
    } else {
        Err(RequestError::MissingParam {
            name: param.name.clone(),
            kind: param.kind,
            index: param.index,
        })
    }
}
