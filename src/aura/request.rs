//! Request contract consumed by the Aura logic
//!
//! Any request model can be plugged in as long as it can list its named
//! parameters and produce an updated copy with one value replaced.

use std::fmt;

/// Where a parameter lives in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// URL query string
    Url,
    /// `application/x-www-form-urlencoded` body
    Body,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Url => f.write_str("url"),
            ParamKind::Body => f.write_str("body"),
        }
    }
}

/// A named request parameter with its raw wire value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// Value exactly as carried on the wire (still percent-encoded)
    pub value: String,
    pub kind: ParamKind,
    /// Position among the parameters of the same kind
    pub index: usize,
}

/// Errors raised by a request model when asked to change a parameter
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("parameter {name:?} ({kind}) not found at position {index}")]
    MissingParam {
        name: String,
        kind: ParamKind,
        index: usize,
    },

    #[error("request has no {0} parameters")]
    NoParams(ParamKind),
}

/// A request exposing named parameters
pub trait ParamRequest: Clone {
    /// All parameters, in wire order per kind
    fn params(&self) -> Vec<Param>;

    /// Copy of this request with `param` set to `value` (a wire value)
    fn with_param(&self, param: &Param, value: &str) -> Result<Self, RequestError>;

    fn param_names(&self) -> Vec<String> {
        self.params().into_iter().map(|p| p.name).collect()
    }
}
