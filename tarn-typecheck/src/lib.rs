//! Kinds and types: the solution store, kind inference for declarations and
//! annotations, subtyping, and type inference for whole namespaces.

pub mod annotation;
pub mod builtins;
pub mod environment;
pub mod kind_unification;
pub mod kindchecker;
mod sorts;
pub mod substitution;
pub mod subtyping;
pub mod typechecker;
pub mod union_find;

pub use environment::{TypeEnvironment, UnsolvedVariableSupply};
pub use kindchecker::{KindError, Kindchecker};
pub use subtyping::check_sub_type;
pub use typechecker::{TypeError, Typechecker};

use tarn_scope::Scope;
use tarn_syntax::{r#type::Attributes, Meta};

pub type TypingScope = Scope<Meta<Attributes>>;
