#![doc = include_str!("../README.md")]

pub mod collections;
pub mod executable;
mod name;
pub mod request;
pub mod resolvers;
pub mod response;
pub mod schema;
pub mod ty;

pub use self::executable::ExecutableDocument;
pub use self::name::InvalidNameError;
pub use self::name::Name;
pub use self::resolvers::execute;
pub use self::resolvers::Execution;
pub use self::schema::Schema;
pub use self::ty::Type;
