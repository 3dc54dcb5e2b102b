//! References to types, with list and non-null wrappers

use crate::Name;
use std::fmt;

/// The type of a field, argument, or variable
///
/// Named types are referenced by name and looked up in [`Schema::types`][crate::Schema::types]
/// when needed. This indirection is what allows recursive schemas
/// (an object type with a field returning that same type)
/// without cyclic ownership.
///
/// The variants make it impossible to represent a non-null type wrapping another non-null type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A nullable named type: `Name`
    Named(Name),
    /// A non-null named type: `Name!`
    NonNullNamed(Name),
    /// A nullable list: `[Item]`
    List(Box<Type>),
    /// A non-null list: `[Item]!`
    NonNullList(Box<Type>),
}

/// Creates a [`Type`] from GraphQL type syntax
///
/// ```
/// use apollo_executor::ty;
/// use apollo_executor::Type;
///
/// assert_eq!(ty!(Int), Type::named("Int"));
/// assert_eq!(ty!([Droid!]!).to_string(), "[Droid!]!");
/// ```
#[macro_export]
macro_rules! ty {
    ($name: ident) => {
        $crate::Type::named(stringify!($name))
    };
    ($name: ident !) => {
        $crate::Type::named(stringify!($name)).non_null()
    };
    ([ $($tt: tt)+ ]) => {
        $crate::ty!($($tt)+).list()
    };
    ([ $($tt: tt)+ ]!) => {
        $crate::ty!($($tt)+).list().non_null()
    };
}

impl Type {
    /// Returns a nullable reference to the named type
    pub fn named(name: impl Into<Name>) -> Self {
        Type::Named(name.into())
    }

    /// Returns this type made non-null, if it isn’t already.
    pub fn non_null(self) -> Self {
        match self {
            Type::Named(name) => Type::NonNullNamed(name),
            Type::List(inner) => Type::NonNullList(inner),
            Type::NonNullNamed(_) => self,
            Type::NonNullList(_) => self,
        }
    }

    /// Returns this type made nullable, if it isn’t already.
    pub fn nullable(self) -> Self {
        match self {
            Type::NonNullNamed(name) => Type::Named(name),
            Type::NonNullList(inner) => Type::List(inner),
            Type::Named(_) => self,
            Type::List(_) => self,
        }
    }

    /// Returns a list type whose items are this type.
    pub fn list(self) -> Self {
        Type::List(Box::new(self))
    }

    /// If this is a list type, returns the type of its items.
    pub fn item_type(&self) -> Option<&Type> {
        match self {
            Type::List(inner) | Type::NonNullList(inner) => Some(inner),
            Type::Named(_) | Type::NonNullNamed(_) => None,
        }
    }

    /// Returns the inner named type, after unwrapping any non-null or list markers.
    pub fn inner_named_type(&self) -> &Name {
        match self {
            Type::Named(name) | Type::NonNullNamed(name) => name,
            Type::List(inner) | Type::NonNullList(inner) => inner.inner_named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_) | Type::NonNullList(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::NonNullNamed(name) => write!(f, "{name}!"),
            Type::List(inner) => write!(f, "[{inner}]"),
            Type::NonNullList(inner) => write!(f, "[{inner}]!"),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
