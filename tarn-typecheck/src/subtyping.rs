//! Subtyping between types, solving unsolved types along the way.
//!
//! Quantified types are instantiated on the flexible side only: universal
//! binders of a subtype and existential binders of a supertype get fresh
//! unsolved types, and every other binder stays a rigid variable.

#[cfg(test)]
mod test;

use crate::{environment::TypeEnvironment, kind_unification::check_sub_kind};
use fnv::FnvHashMap;
use tarn_scope::{ScopeKind, ScopeTag};
use tarn_syntax::{
    r#type::{QuantifiedType, UnsolvedType},
    Kind, Type,
};

fn instantiate_binders(
    environment: &mut TypeEnvironment,
    quantified: &QuantifiedType,
    is_flexible: impl Fn(&Type) -> bool,
) -> Type {
    let mut substitution = FnvHashMap::default();
    for arg in &quantified.args {
        if let Type::ForAllVar(var) | Type::ExistsVar(var) = arg {
            if is_flexible(arg) {
                let kind = environment.substitute_kind(&var.kind);
                let fresh = environment.new_unsolved_type(kind);
                substitution.insert(var.name.clone(), fresh);
            }
        }
    }
    quantified.body.instantiate(&substitution)
}

/// The body of a quantified subtype, with its universal binders made flexible.
pub(crate) fn instantiate_sub(environment: &mut TypeEnvironment, quantified: &QuantifiedType) -> Type {
    instantiate_binders(environment, quantified, |arg| {
        matches!(arg, Type::ForAllVar(_))
    })
}

/// The body of a quantified supertype, with its existential binders made flexible.
pub(crate) fn instantiate_super(environment: &mut TypeEnvironment, quantified: &QuantifiedType) -> Type {
    instantiate_binders(environment, quantified, |arg| {
        matches!(arg, Type::ExistsVar(_))
    })
}

/**
Check that `sub` can be used where `sup` is expected, solving unsolved types
(and their kinds) as needed.

Returns `false` on a mismatch. Solutions found before the mismatch are kept.
*/
pub fn check_sub_type(environment: &mut TypeEnvironment, sub: &Type, sup: &Type) -> bool {
    let sub = environment.substitute_type(sub);
    let sup = environment.substitute_type(sup);
    log::trace!("check {} <: {}", sub.render(), sup.render());

    match (&sub, &sup) {
        (Type::ForAllVar(left), Type::ForAllVar(right)) if left.name == right.name => true,
        (Type::ExistsVar(left), Type::ExistsVar(right)) if left.name == right.name => true,
        (Type::BuiltIn(left), Type::BuiltIn(right)) if left.is_subtype_of(right) => true,
        (Type::Constructor(left, _), Type::Constructor(right, _)) if left == right => true,
        (Type::Unsolved(left), Type::Unsolved(right)) if left == right => true,
        (_, Type::Quantified(quantified)) => {
            environment.push_scope(ScopeKind::CheckSubType);
            let sup = instantiate_super(environment, quantified);
            let result = check_sub_type(environment, &sub, &sup);
            environment.pop_scope(ScopeTag::CheckSubType);
            result
        }
        (Type::Quantified(quantified), _) => {
            environment.push_scope(ScopeKind::CheckSubType);
            let sub = instantiate_sub(environment, quantified);
            let result = check_sub_type(environment, &sub, &sup);
            environment.pop_scope(ScopeTag::CheckSubType);
            result
        }
        (Type::Unsolved(unsolved), _) if !sup.occurs(unsolved) => {
            if check_sub_kind(environment, &unsolved.kind, &sup.kind()) {
                instantiate_as_sub_type(environment, unsolved, &sup);
                true
            } else {
                false
            }
        }
        (_, Type::Unsolved(unsolved)) if !sub.occurs(unsolved) => {
            if check_sub_kind(environment, &sub.kind(), &unsolved.kind) {
                instantiate_as_super_type(environment, unsolved, &sub);
                true
            } else {
                false
            }
        }
        (Type::Apply(sub_apply), Type::Apply(sup_apply))
            if sub_apply.args.len() == sup_apply.args.len() =>
        {
            match (sub.unwrap_function(), sup.unwrap_function()) {
                (Some((sub_args, sub_ret)), Some((sup_args, sup_ret))) => {
                    sub_args
                        .iter()
                        .zip(sup_args.iter())
                        .all(|(sub_arg, sup_arg)| check_sub_type(environment, sup_arg, sub_arg))
                        && check_sub_type(environment, sub_ret, sup_ret)
                }
                _ => {
                    check_sub_type(environment, &sub_apply.head, &sup_apply.head)
                        && sub_apply
                            .args
                            .iter()
                            .zip(sup_apply.args.iter())
                            .all(|(sub_arg, sup_arg)| {
                                check_sub_type(environment, sub_arg, sup_arg)
                            })
                }
            }
        }
        _ => false,
    }
}

/// Fresh unsolved types standing in for `args`, each with the same kind.
fn fresh_types(environment: &mut TypeEnvironment, args: &[Type]) -> Vec<Type> {
    args.iter()
        .map(|arg| {
            let kind = arg.kind();
            environment.new_unsolved_type(kind)
        })
        .collect()
}

fn unwrap_unsolved(ty: &Type) -> Option<&UnsolvedType> {
    match ty {
        Type::Unsolved(unsolved) => Some(unsolved),
        _ => None,
    }
}

/**
Solve `unsolved` so that it can be used where `sup` is expected.

Functions and applications are solved structurally, so that a subtype of
`(Int) -> Long` may still take a `Long` or return an `Int`.

# Preconditions

* `unsolved` doesn't occur in `sup`.
* The kind of `unsolved` is a sub-kind of the kind of `sup`.
*/
pub fn instantiate_as_sub_type(
    environment: &mut TypeEnvironment,
    unsolved: &UnsolvedType,
    sup: &Type,
) {
    match sup {
        Type::Unsolved(other) => {
            environment.solve_type(other, &Type::Unsolved(unsolved.clone()));
        }
        Type::ForAllVar(_) | Type::ExistsVar(_) | Type::BuiltIn(_) | Type::Constructor(_, _) => {
            environment.solve_type(unsolved, sup);
        }
        Type::Apply(apply) => match sup.unwrap_function() {
            Some((args, ret)) => {
                let fresh_args = fresh_types(environment, args);
                let fresh_ret = environment.new_unsolved_type(Kind::Type);
                environment.solve_type(
                    unsolved,
                    &Type::mk_function(fresh_args.clone(), fresh_ret.clone()),
                );

                for (fresh, arg) in fresh_args.iter().zip(args.iter()) {
                    let arg = environment.substitute_type(arg);
                    if let Some(fresh) = unwrap_unsolved(fresh) {
                        instantiate_as_super_type(environment, fresh, &arg);
                    }
                }
                let ret = environment.substitute_type(ret);
                if let Some(fresh) = unwrap_unsolved(&fresh_ret) {
                    instantiate_as_sub_type(environment, fresh, &ret);
                }
            }
            None => {
                let fresh_args = fresh_types(environment, &apply.args);
                environment.solve_type(
                    unsolved,
                    &Type::mk_apply(apply.head.clone(), fresh_args.clone(), apply.kind.clone()),
                );

                for (fresh, arg) in fresh_args.iter().zip(apply.args.iter()) {
                    let arg = environment.substitute_type(arg);
                    if let Some(fresh) = unwrap_unsolved(fresh) {
                        instantiate_as_sub_type(environment, fresh, &arg);
                    }
                }
            }
        },
        Type::Quantified(quantified) => {
            environment.push_scope(ScopeKind::InstantiateType);
            let sup = instantiate_super(environment, quantified);
            instantiate_as_sub_type(environment, unsolved, &sup);
            environment.pop_scope(ScopeTag::InstantiateType);
        }
    }
}

/**
Solve `unsolved` so that `sub` can be used where it is expected.

# Preconditions

* `unsolved` doesn't occur in `sub`.
* The kind of `sub` is a sub-kind of the kind of `unsolved`.
*/
pub fn instantiate_as_super_type(
    environment: &mut TypeEnvironment,
    unsolved: &UnsolvedType,
    sub: &Type,
) {
    match sub {
        Type::Unsolved(other) => {
            environment.solve_type(other, &Type::Unsolved(unsolved.clone()));
        }
        Type::ForAllVar(_) | Type::ExistsVar(_) | Type::BuiltIn(_) | Type::Constructor(_, _) => {
            environment.solve_type(unsolved, sub);
        }
        Type::Apply(apply) => match sub.unwrap_function() {
            Some((args, ret)) => {
                let fresh_args = fresh_types(environment, args);
                let fresh_ret = environment.new_unsolved_type(Kind::Type);
                environment.solve_type(
                    unsolved,
                    &Type::mk_function(fresh_args.clone(), fresh_ret.clone()),
                );

                for (fresh, arg) in fresh_args.iter().zip(args.iter()) {
                    let arg = environment.substitute_type(arg);
                    if let Some(fresh) = unwrap_unsolved(fresh) {
                        instantiate_as_sub_type(environment, fresh, &arg);
                    }
                }
                let ret = environment.substitute_type(ret);
                if let Some(fresh) = unwrap_unsolved(&fresh_ret) {
                    instantiate_as_super_type(environment, fresh, &ret);
                }
            }
            None => {
                let fresh_args = fresh_types(environment, &apply.args);
                environment.solve_type(
                    unsolved,
                    &Type::mk_apply(apply.head.clone(), fresh_args.clone(), apply.kind.clone()),
                );

                for (fresh, arg) in fresh_args.iter().zip(apply.args.iter()) {
                    let arg = environment.substitute_type(arg);
                    if let Some(fresh) = unwrap_unsolved(fresh) {
                        instantiate_as_super_type(environment, fresh, &arg);
                    }
                }
            }
        },
        Type::Quantified(quantified) => {
            environment.push_scope(ScopeKind::InstantiateType);
            let sub = instantiate_sub(environment, quantified);
            instantiate_as_super_type(environment, unsolved, &sub);
            environment.pop_scope(ScopeTag::InstantiateType);
        }
    }
}
