//! Reading checked type annotations as [`Type`]s.

use tarn_syntax::{
    r#type::{Attributes, BuiltInType, TypeVar},
    Kind, Meta, Name, Type, TypeNode, TypeVarNode,
};

pub(crate) fn kind_of(meta: &Meta<Attributes>) -> Kind {
    match meta.meta.sort.unwrap_kind() {
        Some(kind) => kind.clone(),
        None => panic!(
            "type annotation has sort {} instead of a kind",
            meta.meta.sort.render()
        ),
    }
}

fn fold_name(name: &Name, kind: Kind, on_unresolved: &mut impl FnMut(Kind) -> Type) -> Type {
    match name {
        Name::BuiltIn(builtin) => match BuiltInType::from_name(builtin) {
            Some(builtin) => Type::BuiltIn(builtin),
            None => panic!("{} is not a built-in type", builtin),
        },
        Name::Data(data) => Type::Constructor(data.0.clone(), kind),
        Name::Constructor(constructor) => Type::Constructor(constructor.name.clone(), kind),
        Name::ForAllVar(var) => Type::ForAllVar(TypeVar {
            name: var.clone(),
            kind,
        }),
        Name::ExistsVar(var) => Type::ExistsVar(TypeVar {
            name: var.clone(),
            kind,
        }),
        Name::Nameless => on_unresolved(kind),
        Name::Namespace(_)
        | Name::Let(_)
        | Name::Field(_)
        | Name::Local(_)
        | Name::Synthetic(_) => panic!("{} does not name a type", name),
    }
}

fn fold_var(var: &TypeVarNode<Attributes>, on_unresolved: &mut impl FnMut(Kind) -> Type) -> Type {
    fold_name(&var.meta.meta.name, kind_of(&var.meta), on_unresolved)
}

/**
Convert a kind-checked annotation to a [`Type`].

References the renamer couldn't resolve are handed to `on_unresolved` with
their kind.

# Panics

When a node's sort isn't a kind, or a reference names something that isn't a
type.
*/
pub fn fold_annotation(
    node: &TypeNode<Attributes>,
    on_unresolved: &mut impl FnMut(Kind) -> Type,
) -> Type {
    match node {
        TypeNode::Quantified { meta, args, body } => Type::mk_quantified(
            args.iter().map(|arg| fold_var(arg, on_unresolved)).collect(),
            fold_annotation(body, on_unresolved),
            kind_of(meta),
        ),
        TypeNode::Fun { args, ret, .. } => Type::mk_function(
            args.iter()
                .map(|arg| fold_annotation(arg, on_unresolved))
                .collect(),
            fold_annotation(ret, on_unresolved),
        ),
        TypeNode::Apply { meta, head, args } => Type::mk_apply(
            fold_annotation(head, on_unresolved),
            args.iter()
                .map(|arg| fold_annotation(arg, on_unresolved))
                .collect(),
            kind_of(meta),
        ),
        TypeNode::Reference { meta, .. } => {
            fold_name(&meta.meta.name, kind_of(meta), on_unresolved)
        }
        TypeNode::Var(var) => fold_var(var, on_unresolved),
    }
}
