//! Positional argument binding.
//!
//! [`bind`] pairs a command's declared [`ArgumentSpec`]s with the raw words of
//! an [`Invocation`]. The resulting [`BoundArguments`] can be read by name or
//! converted into any `Deserialize` type, with string values coerced into
//! numbers and booleans on demand.

use serde::de::{
    self, DeserializeOwned, Error as _, IntoDeserializer, Visitor, value::MapDeserializer,
};
use serde::forward_to_deserialize_any;

use crate::command::ArgumentSpec;
use crate::error::BindingError;
use crate::parse::Invocation;

/// Declared arguments paired with their values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundArguments {
    values: Vec<(String, Option<String>)>,
    excess: Vec<String>,
}

impl BoundArguments {
    /// The value bound to a declared argument.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// The value of the declared argument at `index`.
    pub fn at(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|(_, v)| v.as_deref())
    }

    /// Returns `true` if `name` is a declared argument, bound or not.
    pub fn is_declared(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Raw words left over after every declared argument was bound.
    pub fn excess(&self) -> &[String] {
        &self.excess
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts the bound values into `T`, keyed by argument name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, BindingError> {
        let entries = self
            .values
            .iter()
            .map(|(name, value)| (name.as_str(), ArgValue(value.clone())));
        T::deserialize(MapDeserializer::new(entries)).map_err(|e| BindingError::Invalid(e.to_string()))
    }
}

/// Binds the raw words of `invocation` to `arguments`, in declaration order.
pub fn bind(
    arguments: &[ArgumentSpec],
    invocation: &Invocation,
) -> Result<BoundArguments, BindingError> {
    let mut raw = invocation.arguments.iter();
    let mut values = Vec::with_capacity(arguments.len());

    for (position, spec) in arguments.iter().enumerate() {
        let value = if spec.is_rest() {
            let rest = invocation.remainder_after(position);
            // The rest argument swallows everything, so nothing is excess.
            raw.by_ref().for_each(drop);
            if rest.is_empty() {
                spec.default_value().map(str::to_owned)
            } else {
                Some(rest.to_owned())
            }
        } else {
            match raw.next() {
                Some(word) => Some(word.clone()),
                None if spec.is_optional() => spec.default_value().map(str::to_owned),
                None => {
                    return Err(BindingError::MissingArgument {
                        name: spec.name().to_owned(),
                        position,
                    });
                }
            }
        };
        values.push((spec.name().to_owned(), value));
    }

    Ok(BoundArguments {
        values,
        excess: raw.cloned().collect(),
    })
}

/// A single bound value as seen by serde.
struct ArgValue(Option<String>);

impl ArgValue {
    fn require(self) -> Result<String, de::value::Error> {
        self.0
            .ok_or_else(|| de::value::Error::custom("argument has no value"))
    }
}

impl<'de> IntoDeserializer<'de, de::value::Error> for ArgValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

macro_rules! parse_scalar {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                let raw = self.require()?;
                let parsed = raw.trim().parse::<$ty>().map_err(|_| {
                    Self::Error::custom(format!("`{raw}` is not a valid {}", stringify!($ty)))
                })?;
                visitor.$visit(parsed)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ArgValue {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Some(s) => visitor.visit_string(s),
            None => visitor.visit_none(),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.0.is_some() {
            visitor.visit_some(self)
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let raw = self.require()?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => visitor.visit_bool(true),
            "false" | "no" | "off" | "0" => visitor.visit_bool(false),
            _ => Err(Self::Error::custom(format!("`{raw}` is not a valid bool"))),
        }
    }

    parse_scalar! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
        deserialize_char => visit_char: char,
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_enum(self.require()?.into_deserializer())
    }

    forward_to_deserialize_any! {
        i128 u128 str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
