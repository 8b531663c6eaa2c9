use crate::NameEnvironment;
use lazy_static::lazy_static;
use std::sync::Arc;
use tarn_scope::{Environment, Scope, ScopeKind};
use tarn_syntax::{r#type::GROUND_BUILT_INS, Meta, Name};

lazy_static! {
    static ref BUILT_IN_NAMES: Arc<Scope<Meta<Name>>> = {
        let mut scope = Scope::new(ScopeKind::BuiltIn);
        for ty in GROUND_BUILT_INS {
            scope.populate_type(ty.name(), Meta::empty(Name::BuiltIn(Arc::from(ty.name()))));
        }
        Arc::new(scope)
    };
}

/// The names every namespace can refer to without importing them.
pub fn builtin_naming_scope() -> Arc<Scope<Meta<Name>>> {
    BUILT_IN_NAMES.clone()
}

pub fn with_builtin_names() -> NameEnvironment {
    Environment::with_builtins(builtin_naming_scope())
}
