//! Splice edited parameter values back into a request
//!
//! Only parameters whose surface reports a modification are re-encoded.
//! A rewrite is all-or-nothing: if the request model rejects any update,
//! the original request goes through untouched.

use super::editor::TextSurface;
use super::is_watched;
use super::request::{ParamRequest, RequestError};
use super::transform;
use std::borrow::Cow;
use std::collections::HashMap;

/// Apply the edits held by `surfaces` to `request`
///
/// `Cow::Borrowed` means nothing was modified and the original request is
/// returned as-is.
pub fn try_rewrite<'r, 'n, 's, R, S, I>(
    request: &'r R,
    surfaces: I,
) -> Result<Cow<'r, R>, RequestError>
where
    R: ParamRequest,
    S: TextSurface + 's,
    I: IntoIterator<Item = (&'n str, &'s S)>,
{
    let edits: HashMap<&'n str, String> = surfaces
        .into_iter()
        .filter(|(name, surface)| is_watched(name) && surface.is_modified())
        .map(|(name, surface)| (name, transform::encode(&surface.text())))
        .collect();

    if edits.is_empty() {
        return Ok(Cow::Borrowed(request));
    }

    let mut current: Cow<'r, R> = Cow::Borrowed(request);
    for param in request.params() {
        if let Some(wire) = edits.get(param.name.as_str()) {
            let updated = current.with_param(&param, wire)?;
            tracing::debug!(
                param = %param.name,
                kind = %param.kind,
                bytes = wire.len(),
                "Parameter rewritten"
            );
            current = Cow::Owned(updated);
        }
    }

    Ok(current)
}

/// Like [`try_rewrite`], but falls back to the original request on failure
pub fn rewrite<'r, 'n, 's, R, S, I>(request: &'r R, surfaces: I) -> Cow<'r, R>
where
    R: ParamRequest,
    S: TextSurface + 's,
    I: IntoIterator<Item = (&'n str, &'s S)>,
{
    match try_rewrite(request, surfaces) {
        Ok(rewritten) => rewritten,
        Err(e) => {
            tracing::warn!("Error updating parameters: {}", e);
            Cow::Borrowed(request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::editor::TextBuffer;
    use crate::aura::request::{Param, ParamKind};

    /// Minimal request: an ordered list of body parameters
    #[derive(Debug, Clone, PartialEq)]
    struct FakeRequest {
        params: Vec<(String, String)>,
        reject: Option<&'static str>,
    }

    impl FakeRequest {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                params: pairs
                    .iter()
                    .map(|(n, v)| (n.to_string(), v.to_string()))
                    .collect(),
                reject: None,
            }
        }

        fn value(&self, name: &str) -> Option<&str> {
            self.params
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }
    }

    impl ParamRequest for FakeRequest {
        fn params(&self) -> Vec<Param> {
            self.params
                .iter()
                .enumerate()
                .map(|(index, (name, value))| Param {
                    name: name.clone(),
                    value: value.clone(),
                    kind: ParamKind::Body,
                    index,
                })
                .collect()
        }

        fn with_param(&self, param: &Param, value: &str) -> Result<Self, RequestError> {
            if self.reject == Some(param.name.as_str()) {
                return Err(RequestError::Malformed("rejected".to_string()));
            }
            let mut next = self.clone();
            next.params[param.index].1 = value.to_string();
            Ok(next)
        }
    }

    fn loaded(text: &str) -> TextBuffer {
        let mut buf = TextBuffer::new(true);
        buf.set_text(text);
        buf
    }

    fn edited(text: &str) -> TextBuffer {
        let mut buf = TextBuffer::new(true);
        buf.set_text("");
        buf.insert_str(text);
        buf
    }

    #[test]
    fn test_unmodified_returns_original() {
        let request = FakeRequest::new(&[("message", "%7B%22a%22%3A1%7D"), ("aura.token", "t")]);
        let message = loaded("{\n    \"a\": 1\n}");
        let context = loaded("");

        let result = rewrite(&request, [("message", &message), ("aura.context", &context)]);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert!(std::ptr::eq(result.as_ref(), &request));
    }

    #[test]
    fn test_only_modified_params_are_rewritten() {
        let request = FakeRequest::new(&[
            ("message", "%7B%22a%22%3A1%7D"),
            ("aura.context", "%7B%22mode%22%3A%22PROD%22%7D"),
            ("aura.token", "t"),
        ]);
        let message = edited("{\n    \"a\": 2\n}");
        let context = loaded("{\n    \"mode\": \"PROD\"\n}");

        let result = rewrite(&request, [("message", &message), ("aura.context", &context)]);
        let result = result.into_owned();
        assert_eq!(result.value("message"), Some("%7B%22a%22%3A2%7D"));
        assert_eq!(result.value("aura.context"), Some("%7B%22mode%22%3A%22PROD%22%7D"));
        assert_eq!(result.value("aura.token"), Some("t"));
    }

    #[test]
    fn test_modified_surface_for_absent_param_is_ignored() {
        let request = FakeRequest::new(&[("message", "m")]);
        let page = edited("/s/new");

        let result = rewrite(&request, [("aura.pageURI", &page)]).into_owned();
        assert_eq!(result, request);
    }

    #[test]
    fn test_unwatched_surface_names_are_ignored() {
        let request = FakeRequest::new(&[("aura.token", "t")]);
        let token = edited("forged");

        let result = rewrite(&request, [("aura.token", &token)]);
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_failure_returns_original_request() {
        let mut request = FakeRequest::new(&[("message", "m"), ("aura.pageURI", "p")]);
        request.reject = Some("aura.pageURI");
        let message = edited("changed");
        let page = edited("also_changed");

        assert!(try_rewrite(&request, [("message", &message), ("aura.pageURI", &page)]).is_err());

        let result = rewrite(&request, [("message", &message), ("aura.pageURI", &page)]);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.value("message"), Some("m"));
    }

    #[test]
    fn test_plain_text_is_compacted() {
        let request = FakeRequest::new(&[("aura.pageURI", "x")]);
        let page = edited("a b\nc");

        let result = rewrite(&request, [("aura.pageURI", &page)]).into_owned();
        assert_eq!(result.value("aura.pageURI"), Some("abc"));
    }
}
