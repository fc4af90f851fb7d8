//! Query string tokenizer, parameter matching, and the two codec directions.
//!
//! Parsing accepts a full URL or a bare query string: everything through the
//! first `?` is ignored, tokens are split on `&` (ignoring `&` inside
//! matched double quotes, which handwritten device URLs use to protect
//! embedded separators), and each token is matched against the schema —
//! scalar parameters by exact name, sparse parameters by `name[index]` keys.
//! Unmatched tokens are ignored for forward compatibility.
//!
//! Serialization walks the schema in declared order, omits parameters still
//! at their default, and packs sparse arrays into one `name[k]=a,b,c` pair
//! per contiguous index run. The two directions round-trip: parsing a
//! serialized set reproduces every observable value.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::escape::{percent_decode, percent_encode, protect, unprotect};
use crate::param::{Kind, ParamDef};
use crate::set::{ParamSet, Schema, SetError};
use crate::value::{Delta, Value};

/// Why a URL failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A parameter rejected its value; carries that parameter's own error.
    Set(SetError),
    /// A token could not be split into a name/value pair, or a declared
    /// array key carried an unparseable index.
    MalformedToken { token: String },
}

impl From<SetError> for QueryError {
    fn from(e: SetError) -> Self {
        QueryError::Set(e)
    }
}

/// Split the query part of `input` into raw (undecoded) name/value pairs.
///
/// Low-level: most callers want [`parse`]. Empty tokens (from `&&` or a
/// trailing `&`) are skipped; a token without `=` is malformed.
pub fn name_value_pairs(input: &str) -> Result<Vec<(&str, &str)>, QueryError> {
    let query = query_part(input);
    let mut pairs = Vec::new();
    for token in split_outside_quotes(query, '&') {
        if token.is_empty() {
            continue;
        }
        match token.find('=') {
            Some(pos) => pairs.push((&token[..pos], &token[pos + 1..])),
            None => {
                return Err(QueryError::MalformedToken {
                    token: String::from(token),
                });
            }
        }
    }
    Ok(pairs)
}

/// Parse a URL (or bare query string) into a [`ParamSet`] for `schema`.
///
/// Starts from the all-defaults set and folds each matched token in the
/// order it appears; the first failing assignment surfaces that parameter's
/// error. Tokens naming undeclared parameters are silently ignored.
pub fn parse(input: &str, schema: &'static Schema) -> Result<ParamSet, QueryError> {
    let mut set = ParamSet::new(schema);
    'tokens: for (raw_name, raw_value) in name_value_pairs(input)? {
        let name = percent_decode(raw_name);
        for def in schema.params() {
            match def.kind() {
                Kind::Sparse => {
                    // Once the stem is claimed with a `[`, broken bracket
                    // syntax is an error rather than an unknown key.
                    if let Some(rest) = name.strip_prefix(def.name())
                        && let Some(index_text) = rest.strip_prefix('[')
                    {
                        let start: u32 = index_text
                            .strip_suffix(']')
                            .and_then(|t| t.parse().ok())
                            .ok_or_else(|| QueryError::MalformedToken {
                                token: String::from(raw_name),
                            })?;
                        set = set.apply(def, sparse_delta(def, start, raw_value, raw_name)?)?;
                        continue 'tokens;
                    }
                }
                Kind::Scalar | Kind::Optional => {
                    if name == def.name() {
                        let text = unprotect(&percent_decode(raw_value));
                        let value = decode(def, &text)?;
                        set = set.apply(def, Delta::Scalar(value))?;
                        continue 'tokens;
                    }
                }
            }
        }
        // Unknown parameter: ignored.
    }
    Ok(set)
}

impl ParamSet {
    /// Serialize to a query string: schema-declared order, defaults omitted,
    /// values escaped. Feeding the result back through [`parse`] with the
    /// same schema reproduces every observable value.
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        for def in self.schema().params() {
            if let Some(frag) = fragment(def, self.stored(def.name())) {
                parts.push(frag);
            }
        }
        parts.join("&")
    }
}

/// The text between the first `?` and the end, or the whole input when there
/// is no `?`. A leading `?` on a bare query is tolerated the same way.
fn query_part(input: &str) -> &str {
    match input.find('?') {
        Some(pos) => &input[pos + 1..],
        None => input,
    }
}

/// Split on `sep`, ignoring separators inside matched double quotes.
fn split_outside_quotes(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&s[start..i]);
            start = i + sep.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(s)
}

fn decode(def: &ParamDef, text: &str) -> Result<Value, QueryError> {
    def.codec().decode(text).map_err(|e| {
        QueryError::Set(SetError::Conversion {
            param: def.name(),
            value: String::from(text),
            reason: e.reason,
        })
    })
}

/// Decode one sparse token value: comma-separated elements (quotes protect
/// embedded separators) bound to consecutive indices from `start`.
fn sparse_delta(
    def: &ParamDef,
    start: u32,
    raw_value: &str,
    raw_name: &str,
) -> Result<Delta, QueryError> {
    let mut pairs = Vec::new();
    for (offset, element) in split_outside_quotes(raw_value, ',').into_iter().enumerate() {
        let index = u32::try_from(offset)
            .ok()
            .and_then(|o| start.checked_add(o))
            .ok_or_else(|| QueryError::MalformedToken {
                token: String::from(raw_name),
            })?;
        let text = unprotect(&percent_decode(strip_quotes(element)));
        pairs.push((index, decode(def, &text)?));
    }
    Ok(Delta::Pairs(pairs))
}

/// One parameter's serialized fragment, or `None` when it has nothing to
/// emit (unset, still at its default, or an empty array).
fn fragment(def: &ParamDef, stored: Option<&Value>) -> Option<String> {
    let value = stored?;
    match value {
        Value::Sparse(map) => {
            if map.is_empty() {
                return None;
            }
            let mut frags: Vec<String> = Vec::new();
            let mut run: Vec<String> = Vec::new();
            let mut run_start = 0u32;
            let mut expected = 0u32;
            for (&index, element) in map {
                if !run.is_empty() && index != expected {
                    frags.push(format!("{}[{}]={}", def.name(), run_start, run.join(",")));
                    run.clear();
                }
                if run.is_empty() {
                    run_start = index;
                }
                run.push(encode_element(def, element)?);
                expected = index.wrapping_add(1);
            }
            frags.push(format!("{}[{}]={}", def.name(), run_start, run.join(",")));
            Some(frags.join("&"))
        }
        scalar => {
            if def.default().materialize().as_ref() == Some(scalar) {
                return None;
            }
            let raw = def.codec().encode(scalar).ok()?;
            Some(format!("{}={}", def.name(), percent_encode(&protect(&raw))))
        }
    }
}

/// Escape one array element, re-quoting it when the raw text contains the
/// list separator.
fn encode_element(def: &ParamDef, element: &Value) -> Option<String> {
    let raw = def.codec().encode(element).ok()?;
    let escaped = percent_encode(&protect(&raw));
    if raw.contains(',') {
        Some(format!("\"{escaped}\""))
    } else {
        Some(escaped)
    }
}
