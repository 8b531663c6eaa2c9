use crate::TypingScope;
use lazy_static::lazy_static;
use std::sync::Arc;
use tarn_scope::{Scope, ScopeKind};
use tarn_syntax::{
    r#type::{Attributes, Sort, GROUND_BUILT_INS},
    Meta, Name,
};

lazy_static! {
    static ref BUILT_IN_TYPES: Arc<TypingScope> = {
        let mut scope = Scope::new(ScopeKind::BuiltIn);
        for ty in GROUND_BUILT_INS {
            scope.put_type(
                ty.name(),
                Meta::empty(Attributes::new(
                    Name::BuiltIn(Arc::from(ty.name())),
                    Sort::Kind(ty.kind()),
                )),
            );
        }
        Arc::new(scope)
    };
}

/// The kinds of the built-in types, shared by every unit.
pub fn builtin_typing_scope() -> Arc<TypingScope> {
    BUILT_IN_TYPES.clone()
}
