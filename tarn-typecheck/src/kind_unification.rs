//! Kind subsumption.
//!
//! Kinds have no subtyping of their own, so subsumption between kinds amounts
//! to unification, phrased the same way as type subsumption.

use crate::environment::TypeEnvironment;
use tarn_scope::{ScopeKind, ScopeTag};
use tarn_syntax::{kind::UnsolvedKind, Kind};

/**
Check that `sub` can be used where `sup` is expected, solving unsolved kinds
as needed.

Returns `false` on a mismatch. Solutions found before the mismatch are kept.
*/
pub fn check_sub_kind(environment: &mut TypeEnvironment, sub: &Kind, sup: &Kind) -> bool {
    let sub = environment.substitute_kind(sub);
    let sup = environment.substitute_kind(sup);
    log::trace!("check {} <: {}", sub.render(), sup.render());

    match (&sub, &sup) {
        (Kind::Type, Kind::Type) => true,
        (Kind::Unsolved(left), Kind::Unsolved(right)) if left == right => true,
        (Kind::Unsolved(unsolved), _) if !sup.occurs(*unsolved) => {
            instantiate_as_sub_kind(environment, *unsolved, &sup)
        }
        (_, Kind::Unsolved(unsolved)) if !sub.occurs(*unsolved) => {
            instantiate_as_super_kind(environment, *unsolved, &sub)
        }
        (Kind::Higher(sub_higher), Kind::Higher(sup_higher))
            if sub_higher.args.len() == sup_higher.args.len() =>
        {
            environment.push_scope(ScopeKind::CheckSubKind);
            let args_match = sub_higher
                .args
                .iter()
                .zip(sup_higher.args.iter())
                .all(|(sub_arg, sup_arg)| check_sub_kind(environment, sup_arg, sub_arg));
            let result =
                args_match && check_sub_kind(environment, &sub_higher.result, &sup_higher.result);
            environment.pop_scope(ScopeTag::CheckSubKind);
            result
        }
        _ => false,
    }
}

/**
Solve `unsolved` so that it can be used where `kind` is expected.

# Preconditions

* `unsolved` doesn't occur in `kind`.
*/
pub fn instantiate_as_sub_kind(
    environment: &mut TypeEnvironment,
    unsolved: UnsolvedKind,
    kind: &Kind,
) -> bool {
    match kind {
        Kind::Type | Kind::Unsolved(_) => {
            environment.solve_kind(unsolved, kind);
            true
        }
        Kind::Higher(higher) => {
            environment.push_scope(ScopeKind::InstantiateKind);
            let args: Vec<Kind> = higher
                .args
                .iter()
                .map(|_| environment.new_unsolved_kind())
                .collect();
            let result = environment.new_unsolved_kind();
            environment.solve_kind(unsolved, &Kind::mk_higher(args.clone(), result.clone()));

            let args_match = args
                .iter()
                .zip(higher.args.iter())
                .all(|(arg, expected)| check_sub_kind(environment, expected, arg));
            let matched = args_match && check_sub_kind(environment, &result, &higher.result);
            environment.pop_scope(ScopeTag::InstantiateKind);
            matched
        }
    }
}

/**
Solve `unsolved` so that `kind` can be used where it is expected.

# Preconditions

* `unsolved` doesn't occur in `kind`.
*/
pub fn instantiate_as_super_kind(
    environment: &mut TypeEnvironment,
    unsolved: UnsolvedKind,
    kind: &Kind,
) -> bool {
    match kind {
        Kind::Type | Kind::Unsolved(_) => {
            environment.solve_kind(unsolved, kind);
            true
        }
        Kind::Higher(higher) => {
            environment.push_scope(ScopeKind::InstantiateKind);
            let args: Vec<Kind> = higher
                .args
                .iter()
                .map(|_| environment.new_unsolved_kind())
                .collect();
            let result = environment.new_unsolved_kind();
            environment.solve_kind(unsolved, &Kind::mk_higher(args.clone(), result.clone()));

            let args_match = args
                .iter()
                .zip(higher.args.iter())
                .all(|(arg, actual)| check_sub_kind(environment, arg, actual));
            let matched = args_match && check_sub_kind(environment, &higher.result, &result);
            environment.pop_scope(ScopeTag::InstantiateKind);
            matched
        }
    }
}
