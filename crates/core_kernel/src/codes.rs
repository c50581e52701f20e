//! Closed code enumerations
//!
//! Enumerations persisted or exchanged by code implement [`CodeEnum`]: a
//! total projection to a string code and description, and a partial
//! lookup from a code back to the variant. Codes outside the closed set are
//! reported as [`InvalidCodeError`]; there is no fallback variant.
//!
//! Some enumerations are also stored as a small dense integer and implement
//! [`NumericCodeEnum`] with the same contract.
//!
//! The [`code_enum!`](crate::code_enum) macro generates the enum, the
//! explicit mapping tables in both directions, `Display`, `FromStr` and a
//! serde representation as the string code.
//!
//! # Example
//!
//! ```rust
//! use core_kernel::code_enum;
//! use core_kernel::codes::{CodeEnum, NumericCodeEnum};
//!
//! code_enum! {
//!     /// Colour of a widget
//!     pub enum Colour("colour") numeric {
//!         Red => (1, "red", "Red"),
//!         Green => (2, "green", "Green"),
//!     }
//! }
//!
//! assert_eq!(Colour::from_code("green").unwrap(), Colour::Green);
//! assert_eq!(Colour::from_numeric_code(1).unwrap(), Colour::Red);
//! assert!(Colour::from_code("blue").is_err());
//! ```

use thiserror::Error;

/// A code that does not belong to an enumeration's closed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized {enum_name} code '{code}'")]
pub struct InvalidCodeError {
    /// Human-readable name of the enumeration
    pub enum_name: &'static str,
    /// The rejected code, rendered as a string
    pub code: String,
}

impl InvalidCodeError {
    pub fn new(enum_name: &'static str, code: impl ToString) -> Self {
        Self {
            enum_name,
            code: code.to_string(),
        }
    }
}

/// An enumeration with a string code and description per variant
pub trait CodeEnum: Sized + Copy + 'static {
    /// Human-readable name used in error messages
    const NAME: &'static str;

    /// Every variant, in declaration order
    fn values() -> &'static [Self];

    /// The persisted / wire code of this variant
    fn code(&self) -> &'static str;

    /// The English description of this variant
    fn description(&self) -> &'static str;

    /// Resolves a code to its variant
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] for any code outside the closed set
    fn from_code(code: &str) -> Result<Self, InvalidCodeError>;
}

/// An enumeration that is additionally stored as a small integer
pub trait NumericCodeEnum: CodeEnum {
    /// The numeric code of this variant
    fn numeric_code(&self) -> i32;

    /// Resolves a numeric code to its variant
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] for any number outside the closed set
    fn from_numeric_code(code: i32) -> Result<Self, InvalidCodeError>;
}

/// Declares a closed code enumeration
///
/// Two forms are accepted: `enum Name("label") { Variant => ("code", "Description"), .. }`
/// and `enum Name("label") numeric { Variant => (1, "code", "Description"), .. }`.
#[macro_export]
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($label:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => ($code:literal, $description:literal)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::codes::CodeEnum for $name {
            const NAME: &'static str = $label;

            fn values() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            fn description(&self) -> &'static str {
                match self {
                    $($name::$variant => $description,)+
                }
            }

            fn from_code(code: &str) -> ::std::result::Result<Self, $crate::codes::InvalidCodeError> {
                match code {
                    $($code => Ok($name::$variant),)+
                    other => Err($crate::codes::InvalidCodeError::new($label, other)),
                }
            }
        }

        $crate::code_enum!(@impls $name);
    };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($label:literal) numeric {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => ($number:literal, $code:literal, $description:literal)
            ),+ $(,)?
        }
    ) => {
        $crate::code_enum! {
            $(#[$meta])*
            $vis enum $name ($label) {
                $(
                    $(#[$vmeta])*
                    $variant => ($code, $description)
                ),+
            }
        }

        impl $crate::codes::NumericCodeEnum for $name {
            fn numeric_code(&self) -> i32 {
                match self {
                    $($name::$variant => $number,)+
                }
            }

            fn from_numeric_code(code: i32) -> ::std::result::Result<Self, $crate::codes::InvalidCodeError> {
                match code {
                    $($number => Ok($name::$variant),)+
                    other => Err($crate::codes::InvalidCodeError::new($label, other)),
                }
            }
        }
    };

    (@impls $name:ident) => {
        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::codes::CodeEnum::code(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::codes::InvalidCodeError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                <$name as $crate::codes::CodeEnum>::from_code(s)
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str($crate::codes::CodeEnum::code(self))
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let code = <::std::string::String as $crate::__serde::Deserialize>::deserialize(deserializer)?;
                <$name as $crate::codes::CodeEnum>::from_code(&code)
                    .map_err(<D::Error as $crate::__serde::de::Error>::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::code_enum! {
        enum Shape("shape") {
            Circle => ("circle", "Circle"),
            Square => ("square", "Square"),
        }
    }

    crate::code_enum! {
        enum Size("size") numeric {
            Small => (1, "small", "Small"),
            Large => (2, "large", "Large"),
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Shape::from_code("circle").unwrap(), Shape::Circle);
        assert_eq!(Shape::Square.code(), "square");
        assert_eq!(Shape::Square.description(), "Square");
    }

    #[test]
    fn test_unknown_code_is_error() {
        let err = Shape::from_code("triangle").unwrap_err();
        assert_eq!(err.enum_name, "shape");
        assert_eq!(err.code, "triangle");
        assert!(err.to_string().contains("triangle"));
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        assert!(Shape::from_code("CIRCLE").is_err());
    }

    #[test]
    fn test_numeric_codes() {
        assert_eq!(Size::Large.numeric_code(), 2);
        assert_eq!(Size::from_numeric_code(1).unwrap(), Size::Small);
        assert!(Size::from_numeric_code(0).is_err());
    }

    #[test]
    fn test_serde_uses_code() {
        let json = serde_json::to_string(&Shape::Circle).unwrap();
        assert_eq!(json, "\"circle\"");
        let back: Shape = serde_json::from_str("\"square\"").unwrap();
        assert_eq!(back, Shape::Square);
        assert!(serde_json::from_str::<Shape>("\"hexagon\"").is_err());
    }

    #[test]
    fn test_display_and_from_str() {
        assert_eq!(Size::Small.to_string(), "small");
        assert_eq!("large".parse::<Size>().unwrap(), Size::Large);
    }
}
