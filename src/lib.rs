//! Declarative query-string parameter schemas with validated, immutable
//! parameter sets and round-trip URL serialization.
//!
//! Pure text transform — no network I/O, no HTTP semantics beyond
//! query-string syntax, `no_std` compatible (requires `alloc`).
//!
//! Parameters are declared once as typed constants, grouped into a
//! [`Schema`] with optional cross-parameter rules, and from that one
//! declaration a caller gets parsing ([`parse`]), validated incremental
//! building ([`ParamSet::with`]), typed reads ([`ParamSet::get`]) and
//! re-serialization ([`ParamSet::to_query`]) — with the guarantee that a
//! serialized set parses back to the same observable values.
//!
//! # Example
//!
//! ```
//! use zenquery::{Param, Rule, Schema};
//!
//! const TIME: Param<i64> = Param::int("time", 0).bounded(0, i64::MAX);
//! const RANGE: Param<i64> = Param::int("range", i32::MAX as i64);
//! const TEXT: Param<String> = Param::text("text", "");
//! const ALMMASK: Param<u64> = Param::hex("almmask", 0);
//!
//! static RULES: [Rule; 1] = [Rule::mutually_exclusive(
//!     &[TEXT.def(), ALMMASK.def()],
//!     "text and almmask are mutually exclusive",
//! )];
//! static SCHEMA: Schema = Schema::new(
//!     &[TIME.def(), RANGE.def(), TEXT.def(), ALMMASK.def()],
//!     &RULES,
//! );
//!
//! let set = zenquery::parse("?time=100&text=hello", &SCHEMA).unwrap();
//! assert_eq!(set.get(&TIME), 100);
//! assert_eq!(set.get(&RANGE), i64::from(i32::MAX));
//! assert_eq!(set.get(&TEXT), "hello");
//!
//! // Defaults are omitted and schema order is kept.
//! assert_eq!(set.to_query(), "time=100&text=hello");
//!
//! // Cross-parameter rules guard every assignment.
//! assert!(set.with(&ALMMASK, 5).is_err());
//! ```
//!
//! # Modules
//!
//! - [`convert`] — paired partial string conversions ([`TextCodec`])
//! - [`param`] — parameter descriptions and constraint builders
//! - [`set`] — schemas, validators, and the immutable [`ParamSet`]
//! - [`query`] — tokenizer and the two codec directions
//! - [`escape`] — the two reversible escaping layers
//! - [`value`] — stored values and the typed access bridges

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod convert;
pub mod escape;
pub mod param;
pub mod query;
pub mod set;
pub mod value;

pub use convert::{ConvertError, TextCodec};
pub use param::{Kind, Param, ParamDef};
pub use query::{QueryError, name_value_pairs, parse};
pub use set::{ParamSet, Rule, Schema, SetError, UnsetError};
pub use value::{SparseArray, Value};
