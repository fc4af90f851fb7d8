//! Stored parameter values: the closed [`Value`] sum, const-constructible
//! defaults, and the typed bridges used by [`ParamSet`](crate::ParamSet)
//! accessors.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// A stored parameter value.
///
/// Every parameter variant stores one of these shapes. The set is closed and
/// exhaustively matched wherever values are interpreted; sparse entries only
/// ever hold scalar values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Boolean, serialized as `true`/`false`.
    Bool(bool),
    /// Signed decimal integer.
    Int(i64),
    /// Unsigned value with hexadecimal text form.
    Hex(u64),
    /// Free text.
    Text(String),
    /// Sparse indexed array: index → scalar value.
    Sparse(BTreeMap<u32, Value>),
}

/// A parameter default, in a form declarable in `const`/`static` context.
///
/// [`Value`] itself cannot appear in a `const` parameter declaration because
/// of its owned `String`; this mirror can, and materializes on demand.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DefaultVal {
    /// No default — the parameter reads as absent until set.
    Unset,
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Int(i64),
    /// Hex-form default.
    Hex(u64),
    /// Text default.
    Text(&'static str),
    /// Sparse arrays default to an empty index map.
    EmptySparse,
}

impl DefaultVal {
    /// Materialize the default as a stored [`Value`], or `None` for
    /// [`Unset`](Self::Unset).
    pub fn materialize(&self) -> Option<Value> {
        match self {
            DefaultVal::Unset => None,
            DefaultVal::Bool(b) => Some(Value::Bool(*b)),
            DefaultVal::Int(i) => Some(Value::Int(*i)),
            DefaultVal::Hex(h) => Some(Value::Hex(*h)),
            DefaultVal::Text(t) => Some(Value::Text(String::from(*t))),
            DefaultVal::EmptySparse => Some(Value::Sparse(BTreeMap::new())),
        }
    }
}

/// Typed view of a sparse array parameter: an ordered map from non-negative
/// index to element value. Indices are unbounded; unassigned indices simply
/// have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseArray<T> {
    entries: BTreeMap<u32, T>,
}

impl<T> SparseArray<T> {
    /// Empty array.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Build from `(index, value)` pairs; later pairs overwrite earlier ones
    /// at the same index.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, T)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Value at `index`, if assigned.
    pub fn get(&self, index: u32) -> Option<&T> {
        self.entries.get(&index)
    }

    /// Number of assigned indices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no index is assigned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(index, value)` in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

/// Extraction of a typed scalar from a stored [`Value`].
pub trait FromValue: Sized {
    /// `None` when the stored shape does not carry this type.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Hex(h) => Some(*h),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(t) => Some(t.clone()),
            _ => None,
        }
    }
}

/// Read of a parameter's output type from its stored slot, falling back to
/// the declared default when the slot was never written.
///
/// Slots are only written through the parameter's own codec, so the stored
/// shape always matches; the default fallbacks exist to keep reads total.
pub trait Fetch: Sized {
    fn fetch(stored: Option<&Value>, default: &DefaultVal) -> Self;
}

impl Fetch for bool {
    fn fetch(stored: Option<&Value>, default: &DefaultVal) -> Self {
        if let Some(Value::Bool(b)) = stored {
            return *b;
        }
        match default {
            DefaultVal::Bool(b) => *b,
            _ => false,
        }
    }
}

impl Fetch for i64 {
    fn fetch(stored: Option<&Value>, default: &DefaultVal) -> Self {
        if let Some(Value::Int(i)) = stored {
            return *i;
        }
        match default {
            DefaultVal::Int(i) => *i,
            _ => 0,
        }
    }
}

impl Fetch for u64 {
    fn fetch(stored: Option<&Value>, default: &DefaultVal) -> Self {
        if let Some(Value::Hex(h)) = stored {
            return *h;
        }
        match default {
            DefaultVal::Hex(h) => *h,
            _ => 0,
        }
    }
}

impl Fetch for String {
    fn fetch(stored: Option<&Value>, default: &DefaultVal) -> Self {
        if let Some(Value::Text(t)) = stored {
            return t.clone();
        }
        match default {
            DefaultVal::Text(t) => String::from(*t),
            _ => String::new(),
        }
    }
}

impl<T: FromValue> Fetch for Option<T> {
    fn fetch(stored: Option<&Value>, _default: &DefaultVal) -> Self {
        stored.and_then(T::from_value)
    }
}

impl<T: FromValue> Fetch for SparseArray<T> {
    fn fetch(stored: Option<&Value>, _default: &DefaultVal) -> Self {
        match stored {
            Some(Value::Sparse(map)) => SparseArray {
                entries: map
                    .iter()
                    .filter_map(|(k, v)| T::from_value(v).map(|t| (*k, t)))
                    .collect(),
            },
            _ => SparseArray::new(),
        }
    }
}

/// One `with()` argument in stored form: a single scalar for scalar and
/// optional parameters, or `(index, value)` pairs for sparse parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    Scalar(Value),
    Pairs(Vec<(u32, Value)>),
}

/// Conversion of a typed `with()` argument into a [`Delta`].
pub trait ParamInput {
    fn into_delta(self) -> Delta;
}

impl ParamInput for bool {
    fn into_delta(self) -> Delta {
        Delta::Scalar(Value::Bool(self))
    }
}

impl ParamInput for i64 {
    fn into_delta(self) -> Delta {
        Delta::Scalar(Value::Int(self))
    }
}

impl ParamInput for u64 {
    fn into_delta(self) -> Delta {
        Delta::Scalar(Value::Hex(self))
    }
}

impl ParamInput for String {
    fn into_delta(self) -> Delta {
        Delta::Scalar(Value::Text(self))
    }
}

impl ParamInput for (u32, String) {
    fn into_delta(self) -> Delta {
        Delta::Pairs(alloc::vec![(self.0, Value::Text(self.1))])
    }
}

impl ParamInput for (u32, i64) {
    fn into_delta(self) -> Delta {
        Delta::Pairs(alloc::vec![(self.0, Value::Int(self.1))])
    }
}
