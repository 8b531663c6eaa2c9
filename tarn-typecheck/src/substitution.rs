//! Applying the current solutions to kinds, types and sorts.


use crate::union_find::UnionFind;
use tarn_syntax::{
    kind::{HigherKind, UnsolvedKind},
    r#type::{Sort, TypeVar, UnsolvedType, UnsolvedTypeId},
    Kind, Type,
};

fn substitute_kind_with(
    kinds: &mut UnionFind<Kind>,
    seen: &mut Vec<UnsolvedKind>,
    kind: &Kind,
) -> Kind {
    match kind {
        Kind::Type => Kind::Type,
        Kind::Unsolved(unsolved) => {
            if seen.contains(unsolved) {
                return kind.clone();
            }
            let solution = kinds.find(kind);
            if solution == *kind {
                return solution;
            }
            seen.push(*unsolved);
            let result = substitute_kind_with(kinds, seen, &solution);
            seen.pop();
            result
        }
        Kind::Higher(higher) => {
            let HigherKind { args, result } = higher.as_ref();
            Kind::mk_higher(
                args.iter()
                    .map(|arg| substitute_kind_with(kinds, seen, arg))
                    .collect(),
                substitute_kind_with(kinds, seen, result),
            )
        }
    }
}

/**
Replace every solved unsolved kind with its solution.

# Laws

* Substitution is idempotent.

  `substitute_kind(kinds, &substitute_kind(kinds, kind)) == substitute_kind(kinds, kind)`

A solution that mentions its own variable is left unexpanded at the point of
recursion.
*/
pub fn substitute_kind(kinds: &mut UnionFind<Kind>, kind: &Kind) -> Kind {
    substitute_kind_with(kinds, &mut Vec::new(), kind)
}

fn substitute_var(kinds: &mut UnionFind<Kind>, var: &TypeVar) -> TypeVar {
    TypeVar {
        name: var.name.clone(),
        kind: substitute_kind(kinds, &var.kind),
    }
}

fn substitute_type_with(
    types: &mut UnionFind<Type>,
    kinds: &mut UnionFind<Kind>,
    seen: &mut Vec<UnsolvedTypeId>,
    ty: &Type,
) -> Type {
    match ty {
        Type::ForAllVar(var) => Type::ForAllVar(substitute_var(kinds, var)),
        Type::ExistsVar(var) => Type::ExistsVar(substitute_var(kinds, var)),
        Type::Unsolved(unsolved) => {
            let solution = if seen.contains(&unsolved.id) {
                ty.clone()
            } else {
                types.find(ty)
            };
            match &solution {
                Type::Unsolved(solved) => Type::Unsolved(UnsolvedType {
                    id: solved.id,
                    kind: substitute_kind(kinds, &solved.kind),
                }),
                _ => {
                    seen.push(unsolved.id);
                    let result = substitute_type_with(types, kinds, seen, &solution);
                    seen.pop();
                    result
                }
            }
        }
        Type::Constructor(name, kind) => {
            Type::Constructor(name.clone(), substitute_kind(kinds, kind))
        }
        Type::Apply(apply) => Type::mk_apply(
            substitute_type_with(types, kinds, seen, &apply.head),
            apply
                .args
                .iter()
                .map(|arg| substitute_type_with(types, kinds, seen, arg))
                .collect(),
            substitute_kind(kinds, &apply.kind),
        ),
        Type::Quantified(quantified) => Type::mk_quantified(
            quantified
                .args
                .iter()
                .map(|arg| substitute_type_with(types, kinds, seen, arg))
                .collect(),
            substitute_type_with(types, kinds, seen, &quantified.body),
            substitute_kind(kinds, &quantified.kind),
        ),
        Type::BuiltIn(builtin) => Type::BuiltIn(*builtin),
    }
}

/**
Replace every solved unsolved type with its solution, and substitute the kinds
carried by the result.
*/
pub fn substitute_type(
    types: &mut UnionFind<Type>,
    kinds: &mut UnionFind<Kind>,
    ty: &Type,
) -> Type {
    substitute_type_with(types, kinds, &mut Vec::new(), ty)
}

pub fn substitute_sort(
    types: &mut UnionFind<Type>,
    kinds: &mut UnionFind<Kind>,
    sort: &Sort,
) -> Sort {
    match sort {
        Sort::Kind(kind) => Sort::Kind(substitute_kind(kinds, kind)),
        Sort::Type(ty) => Sort::Type(substitute_type(types, kinds, ty)),
    }
}

/// Prefer the solved side; `*` is the only solution defaulting introduces.
fn prefer_solved(left: &Kind, right: &Kind) -> Kind {
    if left.is_unsolved() {
        right.clone()
    } else {
        left.clone()
    }
}

/**
Substitute `kind`, then solve every unsolved kind left in it to `*`.

# Laws

* The result contains no unsolved kinds.

  `default_kind(kinds, kind).iter_unsolved().next().is_none()`
*/
pub fn default_kind(kinds: &mut UnionFind<Kind>, kind: &Kind) -> Kind {
    let substituted = substitute_kind(kinds, kind);
    let unsolved: Vec<UnsolvedKind> = substituted.iter_unsolved().collect();
    if unsolved.is_empty() {
        return substituted;
    }
    for variable in unsolved {
        log::trace!("defaulting {} to *", variable.name());
        kinds.union(&Kind::Unsolved(variable), &Kind::Type, prefer_solved);
    }
    substitute_kind(kinds, &substituted)
}

fn unsolved_kinds_in(ty: &Type, found: &mut Vec<UnsolvedKind>) {
    found.extend(ty.kind().iter_unsolved());
    match ty {
        Type::Apply(apply) => {
            unsolved_kinds_in(&apply.head, found);
            for arg in &apply.args {
                unsolved_kinds_in(arg, found);
            }
        }
        Type::Quantified(quantified) => {
            for arg in &quantified.args {
                unsolved_kinds_in(arg, found);
            }
            unsolved_kinds_in(&quantified.body, found);
        }
        Type::ForAllVar(_)
        | Type::ExistsVar(_)
        | Type::Unsolved(_)
        | Type::Constructor(_, _)
        | Type::BuiltIn(_) => {}
    }
}

/// Like [`default_kind`], for every kind a sort mentions.
pub fn default_sort(
    types: &mut UnionFind<Type>,
    kinds: &mut UnionFind<Kind>,
    sort: &Sort,
) -> Sort {
    match sort {
        Sort::Kind(kind) => Sort::Kind(default_kind(kinds, kind)),
        Sort::Type(ty) => {
            let substituted = substitute_type(types, kinds, ty);
            let mut unsolved = Vec::new();
            unsolved_kinds_in(&substituted, &mut unsolved);
            for variable in unsolved {
                kinds.union(&Kind::Unsolved(variable), &Kind::Type, prefer_solved);
            }
            Sort::Type(substitute_type(types, kinds, &substituted))
        }
    }
}
