//! Embedded transformation language runtime for telemetry data: a small
//! statement grammar (`editor(...) where boolExpr`), a dynamic value
//! system with capability-based field/index/key access, and a
//! tree-walking interpreter that writes back through the host's own data
//! structures via lenses rather than copying them in and out.
pub mod compiler;
pub mod context;
pub mod enum_provider;
pub mod error;
pub mod expr;
pub mod function;
pub mod lexer;
pub mod parser;
pub mod statement;
pub mod stdlib;
pub mod types;
pub mod value;
