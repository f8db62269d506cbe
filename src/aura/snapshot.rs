//! Decoded view of the watched parameters of one request

use super::request::Param;
use super::transform::percent_decode;
use super::{is_watched, WATCHED_PARAMS};
use std::collections::BTreeMap;

/// Watched parameter name → percent-decoded value
///
/// Plain owned data: every holder gets its own copy and nothing is shared.
/// When a name repeats, the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSnapshot {
    values: BTreeMap<String, String>,
}

impl ParameterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the watched parameters out of a request's parameter list
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = &'a Param>,
    {
        let values = params
            .into_iter()
            .filter(|p| is_watched(&p.name))
            .map(|p| (p.name.clone(), percent_decode(&p.value)))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Entries in watch-list order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        WATCHED_PARAMS
            .iter()
            .filter_map(|name| self.get(name).map(|v| (*name, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::ParamKind;

    fn param(name: &str, value: &str, index: usize) -> Param {
        Param {
            name: name.to_string(),
            value: value.to_string(),
            kind: ParamKind::Body,
            index,
        }
    }

    #[test]
    fn test_keeps_only_watched_params_decoded() {
        let params = vec![
            param("message", "%7B%22a%22%3A1%7D", 0),
            param("aura.token", "secret", 1),
            param("aura.pageURI", "%2Fs%2Fhome", 2),
        ];
        let snapshot = ParameterSnapshot::from_params(&params);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("message"), Some(r#"{"a":1}"#));
        assert_eq!(snapshot.get("aura.pageURI"), Some("/s/home"));
        assert_eq!(snapshot.get("aura.token"), None);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let params = vec![param("message", "first", 0), param("message", "second", 1)];
        assert_eq!(ParameterSnapshot::from_params(&params).get("message"), Some("second"));
    }

    #[test]
    fn test_iter_follows_watch_list_order() {
        let params = vec![param("aura.pageURI", "p", 0), param("message", "m", 1)];
        let snapshot = ParameterSnapshot::from_params(&params);
        let names: Vec<_> = snapshot.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["message", "aura.pageURI"]);
    }

    #[test]
    fn test_copies_are_independent() {
        let original = ParameterSnapshot::from_params(&[param("message", "m", 0)]);
        let mut copy = original.clone();
        copy.values.insert("aura.context".to_string(), "ctx".to_string());
        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
    }
}
