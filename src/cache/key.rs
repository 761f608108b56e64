//! Cache Key Module
//!
//! Derives stable, collision-resistant keys from a namespace and an argument set.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{self, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Result;

// == Call Arguments ==
/// The arguments that distinguish one cached computation from another.
///
/// Positional arguments keep their order. Named arguments live in a
/// `BTreeMap`, so insertion order never reaches the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl CallArgs {
    // == Constructor ==
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl IntoArg) -> Self {
        self.positional.push(value.into_arg());
        self
    }

    /// Sets a named argument, replacing any previous value under `name`.
    pub fn named(mut self, name: impl Into<String>, value: impl IntoArg) -> Self {
        self.named.insert(name.into(), value.into_arg());
        self
    }

    /// Appends any serializable value as a positional argument.
    ///
    /// Fails with `CacheError::Serialization` for values outside the JSON
    /// data model (e.g. maps with non-string keys, NaN or infinite floats).
    pub fn try_arg<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        Ok(self.arg(to_arg_value(value)?))
    }

    /// Sets any serializable value as a named argument.
    pub fn try_named<T: Serialize + ?Sized>(
        self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        Ok(self.named(name, to_arg_value(value)?))
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named_args(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

// == Argument Values ==
/// Values accepted by the infallible `CallArgs::arg` and `CallArgs::named`.
///
/// Floats are left out: serde_json turns NaN and infinities into `null`,
/// which would give `inf`, `-inf` and `null` the same key. Pass floats
/// through `try_arg`/`try_named`, which reject non-finite values.
pub trait IntoArg {
    fn into_arg(self) -> Value;
}

impl IntoArg for Value {
    fn into_arg(self) -> Value {
        self
    }
}

impl<T: IntoArg> IntoArg for Option<T> {
    fn into_arg(self) -> Value {
        self.map_or(Value::Null, IntoArg::into_arg)
    }
}

macro_rules! impl_into_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoArg for $ty {
                fn into_arg(self) -> Value {
                    Value::from(self)
                }
            }
        )*
    };
}

impl_into_arg!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, String, &str);

fn to_arg_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(FiniteFloats)?;
    Ok(serde_json::to_value(value)?)
}

// == Cache Key ==
/// Opaque key of the form `<namespace>:<sha256 hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    // == Build ==
    /// Derives the key for `namespace` and `args`.
    ///
    /// The hashed input is the canonical JSON of `[namespace, positional, named]`.
    /// Object keys are emitted in sorted order at every depth, and the empty
    /// `[]`/`{}` markers are always present.
    pub fn build(namespace: &str, args: &CallArgs) -> Self {
        let canonical = canonical_json(&Value::Array(vec![
            Value::String(namespace.to_string()),
            Value::Array(args.positional.clone()),
            Value::Object(args.named.clone().into_iter().collect()),
        ]));

        let digest = Sha256::digest(canonical.as_bytes());
        Self(format!("{}:{}", namespace, hex::encode(digest)))
    }

    /// Builds a key from positional values and named values given separately.
    pub fn from_parts<I, K>(namespace: &str, positional: Vec<Value>, named: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let args = CallArgs {
            positional,
            named: named.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        };
        Self::build(namespace, &args)
    }

    /// Returns the namespace portion of the key.
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once(':').map(|(ns, _)| ns).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Canonical Encoding ==
/// Serializes `value` with object keys sorted at every depth.
///
/// serde_json sorts map keys unless its `preserve_order` feature is enabled
/// somewhere in the dependency graph, so the ordering is done here explicitly.
fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

// == Float Check ==
/// Walks a value without producing output, failing on NaN or infinite floats.
#[derive(Clone, Copy)]
struct FiniteFloats;

type Walk = std::result::Result<(), serde_json::Error>;

fn check_float(value: f64) -> Walk {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ser::Error::custom(format!(
            "float {} has no JSON representation",
            value
        )))
    }
}

impl ser::Serializer for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Walk {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Walk {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Walk {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Walk {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Walk {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Walk {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Walk {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Walk {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Walk {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Walk {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Walk {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Walk {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Walk {
        check_float(v)
    }

    fn serialize_char(self, _: char) -> Walk {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Walk {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Walk {
        Ok(())
    }

    fn serialize_none(self) -> Walk {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Walk {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Walk {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Walk {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Walk {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _: &'static str, value: &T) -> Walk {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Walk {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Walk {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}
