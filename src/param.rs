//! Parameter descriptions: named, typed, convertible, optionally constrained
//! value slots.
//!
//! A [`Param`] is declared once as a `const`/`static` and shared by every
//! parse and build site. The erased [`ParamDef`] carries everything the
//! codec needs (name, text conversion, variant kind, default, constraints);
//! the `In`/`Out` type parameters on [`Param`] exist only to make
//! [`with`](crate::ParamSet::with) and [`get`](crate::ParamSet::get)
//! type-safe, and cost nothing at runtime.
//!
//! Variants:
//! - default-valued scalar ([`Param::int`], [`Param::hex`], [`Param::flag`],
//!   [`Param::text`], …): at most one assignment per set, suppressed from
//!   serialization while at its default;
//! - optional scalar (`*_opt`): no default, reads as `Option<T>`;
//! - sparse array ([`Param::sparse_text`], [`Param::sparse_int`]): indexed
//!   assignments reconstructed from `name[index]=…` keys;
//! - [`bounded`](Param::bounded) and [`disallowing`](Param::disallowing)
//!   constrain accepted values before the assignment is counted.

use core::marker::PhantomData;

use alloc::string::String;

use crate::convert::{self, TextCodec};
use crate::value::{DefaultVal, SparseArray};

/// Which shape of parameter a [`ParamDef`] declares.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Default-valued scalar; assignable at most once.
    Scalar,
    /// Scalar without a default; reads as absent until assigned once.
    Optional,
    /// Sparse indexed array; assignments merge by index.
    Sparse,
}

/// Erased parameter description: everything the codec needs to parse, check,
/// merge and re-serialize one named parameter. `Copy` so schemas can embed
/// descriptions in `const`/`static` tables.
#[derive(Debug, Copy, Clone)]
pub struct ParamDef {
    pub(crate) name: &'static str,
    pub(crate) codec: TextCodec,
    pub(crate) kind: Kind,
    pub(crate) default: DefaultVal,
    pub(crate) bounds: Option<(i64, i64)>,
    pub(crate) banned: Option<DefaultVal>,
    pub(crate) hex_cap: Option<u64>,
}

impl ParamDef {
    /// The URL key (or, for sparse parameters, the key stem before `[`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Which shape of parameter this is.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The text conversion used for values of this parameter.
    pub fn codec(&self) -> TextCodec {
        self.codec
    }

    /// The declared default.
    pub fn default(&self) -> DefaultVal {
        self.default
    }
}

/// A typed parameter description.
///
/// `In` is the type accepted per assignment, `Out` the type read back from a
/// set: `Out = In` for default-valued scalars, `Option<In>` for optional
/// scalars, and [`SparseArray`] for sparse parameters (whose `In` is one
/// `(index, value)` pair).
#[derive(Debug, Copy, Clone)]
pub struct Param<In, Out = In> {
    pub(crate) def: ParamDef,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<In, Out> Param<In, Out> {
    const fn raw(name: &'static str, codec: TextCodec, kind: Kind, default: DefaultVal) -> Self {
        Self {
            def: ParamDef {
                name,
                codec,
                kind,
                default,
                bounds: None,
                banned: None,
                hex_cap: None,
            },
            _marker: PhantomData,
        }
    }

    /// Copy of the erased description, for [`Schema`](crate::Schema)
    /// declarations and validator rules.
    pub const fn def(&self) -> ParamDef {
        self.def
    }

    /// The parameter's URL key.
    pub const fn name(&self) -> &'static str {
        self.def.name
    }

    /// Replace the text conversion. For parameters whose text form is not
    /// covered by the built-in codecs.
    pub const fn with_codec(mut self, codec: TextCodec) -> Self {
        self.def.codec = codec;
        self
    }
}

impl Param<i64> {
    /// Decimal integer scalar with a default.
    pub const fn int(name: &'static str, default: i64) -> Self {
        Self::raw(name, convert::INT, Kind::Scalar, DefaultVal::Int(default))
    }
}

impl Param<u64> {
    /// 32-bit hex scalar with a default (e.g. alarm masks). Assigned
    /// values above `u32::MAX` are rejected, matching the text form.
    pub const fn hex(name: &'static str, default: u64) -> Self {
        let mut p = Self::raw(name, convert::HEX_INT, Kind::Scalar, DefaultVal::Hex(default));
        p.def.hex_cap = Some(u32::MAX as u64);
        p
    }

    /// 64-bit hex scalar with a default.
    pub const fn hex_long(name: &'static str, default: u64) -> Self {
        Self::raw(name, convert::HEX_LONG, Kind::Scalar, DefaultVal::Hex(default))
    }
}

impl Param<bool> {
    /// Boolean scalar with a default; text form `true`/`false`.
    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self::raw(name, convert::BOOL, Kind::Scalar, DefaultVal::Bool(default))
    }
}

impl Param<String> {
    /// Free-text scalar with a default.
    pub const fn text(name: &'static str, default: &'static str) -> Self {
        Self::raw(name, convert::IDENT, Kind::Scalar, DefaultVal::Text(default))
    }
}

impl Param<i64, Option<i64>> {
    /// Decimal integer scalar with no default.
    pub const fn int_opt(name: &'static str) -> Self {
        Self::raw(name, convert::INT, Kind::Optional, DefaultVal::Unset)
    }
}

impl Param<u64, Option<u64>> {
    /// 32-bit hex scalar with no default.
    pub const fn hex_opt(name: &'static str) -> Self {
        let mut p = Self::raw(name, convert::HEX_INT, Kind::Optional, DefaultVal::Unset);
        p.def.hex_cap = Some(u32::MAX as u64);
        p
    }
}

impl Param<bool, Option<bool>> {
    /// Boolean scalar with no default.
    pub const fn flag_opt(name: &'static str) -> Self {
        Self::raw(name, convert::BOOL, Kind::Optional, DefaultVal::Unset)
    }
}

impl Param<String, Option<String>> {
    /// Free-text scalar with no default.
    pub const fn text_opt(name: &'static str) -> Self {
        Self::raw(name, convert::IDENT, Kind::Optional, DefaultVal::Unset)
    }
}

impl Param<(u32, String), SparseArray<String>> {
    /// Sparse array of text elements, parsed from `name[index]=a,b,c` keys.
    pub const fn sparse_text(name: &'static str) -> Self {
        Self::raw(name, convert::IDENT, Kind::Sparse, DefaultVal::EmptySparse)
    }
}

impl Param<(u32, i64), SparseArray<i64>> {
    /// Sparse array of decimal integer elements.
    pub const fn sparse_int(name: &'static str) -> Self {
        Self::raw(name, convert::INT, Kind::Sparse, DefaultVal::EmptySparse)
    }
}

impl<Out> Param<i64, Out> {
    /// Accept only values in `[min, max]` inclusive. Checked before the
    /// at-most-once rule, so a rejected value does not count as the one
    /// permitted assignment.
    pub const fn bounded(mut self, min: i64, max: i64) -> Self {
        self.def.bounds = Some((min, max));
        self
    }

    /// Reject exactly `value` at assignment time.
    pub const fn disallowing(mut self, value: i64) -> Self {
        self.def.banned = Some(DefaultVal::Int(value));
        self
    }
}

impl<Out> Param<u64, Out> {
    /// Reject exactly `value` at assignment time.
    pub const fn disallowing(mut self, value: u64) -> Self {
        self.def.banned = Some(DefaultVal::Hex(value));
        self
    }
}

impl<Out> Param<String, Out> {
    /// Reject exactly `value` at assignment time.
    pub const fn disallowing(mut self, value: &'static str) -> Self {
        self.def.banned = Some(DefaultVal::Text(value));
        self
    }
}

impl<T, Out> Param<(u32, T), Out> {
    /// Reject array elements equal to `value` at assignment time.
    pub const fn disallowing_text(mut self, value: &'static str) -> Self {
        self.def.banned = Some(DefaultVal::Text(value));
        self
    }
}
