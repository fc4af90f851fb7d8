//! Schemas, whole-set validators, and the immutable parameter set.
//!
//! A [`Schema`] is a process-wide constant: the declared parameters (in
//! serialization order) plus zero or more cross-parameter [`Rule`]s. A
//! [`ParamSet`] is an immutable mapping from those parameters to stored
//! values; [`with`](ParamSet::with) never mutates in place — it produces a
//! new set after checking the parameter's own constraints and re-running
//! every rule against the full candidate. A failed call leaves the original
//! set untouched, so sharing a set across branches (or threads) is always
//! safe.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;

use crate::param::{Kind, Param, ParamDef};
use crate::value::{Delta, Fetch, FromValue, ParamInput, Value};

/// Why a [`ParamSet::with`] call (or a parse feeding it) was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    /// The text did not convert to the parameter's type, or an assigned
    /// value has no representation in the parameter's text form.
    Conversion {
        param: &'static str,
        value: String,
        reason: &'static str,
    },
    /// A non-array parameter was assigned a second time.
    AlreadySet { param: &'static str },
    /// A bounded integer was outside `[min, max]`.
    OutOfRange {
        param: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// The parameter's banned value was assigned.
    IllegalValue { param: &'static str },
    /// A whole-set rule rejected the candidate.
    Validation { reason: &'static str },
}

/// Forced read of an optional parameter that was never assigned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UnsetError {
    /// The parameter that was absent.
    pub param: &'static str,
}

/// A whole-set validity rule, evaluated against the full candidate after
/// every assignment.
#[derive(Debug, Copy, Clone)]
pub enum Rule {
    /// At most one of `params` may sit away from its default.
    MutuallyExclusive {
        params: &'static [ParamDef],
        reason: &'static str,
    },
    /// Reject any candidate for which `check` returns `true`.
    Forbid {
        check: fn(&ParamSet) -> bool,
        reason: &'static str,
    },
}

impl Rule {
    /// At most one of `params` may be set away from its default.
    pub const fn mutually_exclusive(
        params: &'static [ParamDef],
        reason: &'static str,
    ) -> Self {
        Rule::MutuallyExclusive { params, reason }
    }

    /// Reject any candidate for which `check` returns `true`.
    pub const fn forbid(check: fn(&ParamSet) -> bool, reason: &'static str) -> Self {
        Rule::Forbid { check, reason }
    }
}

/// A parameter schema: declared parameters in serialization order, plus the
/// cross-parameter rules. Declare once as a `static` and share freely.
#[derive(Debug, Copy, Clone)]
pub struct Schema {
    pub(crate) params: &'static [ParamDef],
    pub(crate) rules: &'static [Rule],
}

impl Schema {
    /// Names must be unique within `params`; this is debug-asserted when the
    /// first set is created.
    pub const fn new(params: &'static [ParamDef], rules: &'static [Rule]) -> Self {
        Self { params, rules }
    }

    /// Declared parameters, in serialization order.
    pub fn params(&self) -> &'static [ParamDef] {
        self.params
    }
}

/// An immutable collection of current values for a [`Schema`].
///
/// Created empty (every parameter at its default) and grown through
/// [`with`](Self::with), which returns a new set per call.
#[derive(Debug, Clone)]
pub struct ParamSet {
    schema: &'static Schema,
    values: BTreeMap<&'static str, Value>,
}

/// Sets are equal when they were built against the same schema (by
/// identity) and store the same values.
impl PartialEq for ParamSet {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.schema, other.schema) && self.values == other.values
    }
}

impl Eq for ParamSet {}

impl ParamSet {
    /// The all-defaults set for `schema`.
    pub fn new(schema: &'static Schema) -> Self {
        #[cfg(debug_assertions)]
        for (i, a) in schema.params.iter().enumerate() {
            for b in &schema.params[i + 1..] {
                debug_assert!(a.name != b.name, "duplicate parameter name {:?}", a.name);
            }
        }
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// The schema this set was built against.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Produce a new set with `value` assigned to `param`.
    ///
    /// Fails with the parameter's own error (`AlreadySet`, `OutOfRange`,
    /// `IllegalValue`) or with `Validation` when a whole-set rule rejects
    /// the candidate. On failure `self` is unaffected.
    pub fn with<In: ParamInput, Out>(
        &self,
        param: &Param<In, Out>,
        value: In,
    ) -> Result<Self, SetError> {
        self.apply(&param.def, value.into_delta())
    }

    /// The stored value for `param`, or its declared default when never
    /// assigned. Optional parameters read as `Option<T>`; sparse parameters
    /// as a [`SparseArray`](crate::SparseArray).
    pub fn get<In, Out: Fetch>(&self, param: &Param<In, Out>) -> Out {
        Out::fetch(self.values.get(param.def.name), &param.def.default)
    }

    /// Forced read of an optional parameter.
    pub fn require<In, T: FromValue>(
        &self,
        param: &Param<In, Option<T>>,
    ) -> Result<T, UnsetError> {
        self.values
            .get(param.def.name)
            .and_then(T::from_value)
            .ok_or(UnsetError {
                param: param.def.name,
            })
    }

    /// Whether `def` still reads as its declared default.
    pub fn is_default(&self, def: &ParamDef) -> bool {
        match self.values.get(def.name) {
            None => true,
            Some(stored) => match def.default.materialize() {
                Some(default) => *stored == default,
                // No default to compare with: any assignment counts.
                None => false,
            },
        }
    }

    pub(crate) fn apply(&self, def: &ParamDef, delta: Delta) -> Result<Self, SetError> {
        match &delta {
            Delta::Scalar(v) => check_constraints(def, v)?,
            Delta::Pairs(pairs) => {
                for (_, v) in pairs {
                    check_constraints(def, v)?;
                }
            }
        }

        let mut values = self.values.clone();
        match (def.kind, delta) {
            (Kind::Scalar, Delta::Scalar(value)) => {
                // At-most-once by value: a slot still reading as its default
                // (whether unset or explicitly assigned the default) accepts
                // one assignment.
                if !self.is_default(def) {
                    return Err(SetError::AlreadySet { param: def.name });
                }
                values.insert(def.name, value);
            }
            (Kind::Optional, Delta::Scalar(value)) => {
                if values.contains_key(def.name) {
                    return Err(SetError::AlreadySet { param: def.name });
                }
                values.insert(def.name, value);
            }
            (Kind::Sparse, Delta::Pairs(pairs)) => {
                let slot = values
                    .entry(def.name)
                    .or_insert_with(|| Value::Sparse(BTreeMap::new()));
                if let Value::Sparse(map) = slot {
                    // Later pairs overwrite earlier ones at the same index.
                    for (index, value) in pairs {
                        map.insert(index, value);
                    }
                }
            }
            _ => {
                return Err(SetError::Conversion {
                    param: def.name,
                    value: String::new(),
                    reason: "value shape does not match the parameter",
                });
            }
        }

        let candidate = ParamSet {
            schema: self.schema,
            values,
        };
        candidate.validate()?;
        Ok(candidate)
    }

    fn validate(&self) -> Result<(), SetError> {
        for rule in self.schema.rules {
            match *rule {
                Rule::MutuallyExclusive { params, reason } => {
                    let assigned = params.iter().filter(|&d| !self.is_default(d)).count();
                    if assigned > 1 {
                        return Err(SetError::Validation { reason });
                    }
                }
                Rule::Forbid { check, reason } => {
                    if check(self) {
                        return Err(SetError::Validation { reason });
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn stored(&self, name: &'static str) -> Option<&Value> {
        self.values.get(name)
    }
}

fn check_constraints(def: &ParamDef, value: &Value) -> Result<(), SetError> {
    // Width first: a value the codec cannot re-encode within its range must
    // never be stored, or serialization would produce unparseable text.
    if let Some(cap) = def.hex_cap
        && let Value::Hex(h) = value
        && *h > cap
    {
        return Err(SetError::Conversion {
            param: def.name,
            value: format!("{h:x}"),
            reason: "hexadecimal value exceeds 32 bits",
        });
    }
    if let Some((min, max)) = def.bounds
        && let Value::Int(i) = value
        && (*i < min || *i > max)
    {
        return Err(SetError::OutOfRange {
            param: def.name,
            value: *i,
            min,
            max,
        });
    }
    if let Some(banned) = &def.banned
        && let Some(banned) = banned.materialize()
        && *value == banned
    {
        return Err(SetError::IllegalValue { param: def.name });
    }
    Ok(())
}
