//! Lexical scopes, and the stack of scopes each resolution pass walks with.

pub mod environment;
pub mod scope;

pub use environment::Environment;
pub use scope::{Scope, ScopeKind, ScopeTag};
