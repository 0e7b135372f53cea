//! Static typing: symbol table, type checker and the type oracle used by
//! the code generator.

pub mod checker;
pub mod environment;
pub mod oracle;
pub mod type_repr;

pub use checker::TypeChecker;
pub use environment::{TypeEnvironment, VariableInfo};
pub use oracle::TypeOracle;
pub use type_repr::Type;

/// Result type for type checking and oracle queries.
pub type TypeResult<T> = Result<T, crate::error::TypeError>;
