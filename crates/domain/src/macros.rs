//! Macro for implementing Display and FromStr for string-backed enums
//!
//! Regions and grantless scopes travel as plain strings in configuration
//! files and on the wire. This macro gives each enum a single table of
//! variant/string pairs from which both conversions are generated.
//!
//! # Example
//!
//! ```rust
//! use spapi_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Stage {
//!     Sandbox,
//!     Production,
//! }
//!
//! impl_domain_enum_conversions!(Stage {
//!     Sandbox => "sandbox",
//!     Production => "production",
//! });
//!
//! assert_eq!("SANDBOX".parse::<Stage>().unwrap(), Stage::Sandbox);
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// This macro generates:
/// - Display trait: writes the variant's canonical string
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// The canonical strings must be lowercase for parsing to round-trip.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
