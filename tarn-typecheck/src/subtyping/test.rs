use crate::{
    environment::TypeEnvironment,
    subtyping::{check_sub_type, instantiate_as_sub_type},
};
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use tarn_scope::ScopeKind;
use tarn_syntax::{
    names::{NamespaceName, QualifiedName},
    r#type::{BuiltInType, TypeVar},
    Kind, Type,
};

fn environment() -> TypeEnvironment {
    let mut environment = TypeEnvironment::with_builtin_types();
    environment.push_scope(ScopeKind::Namespace(NamespaceName::new(
        &["Mina", "Test"],
        "Subtyping",
    )));
    environment
}

fn int() -> Type {
    Type::BuiltIn(BuiltInType::Int)
}

fn long() -> Type {
    Type::BuiltIn(BuiltInType::Long)
}

fn forall(name: &str) -> Type {
    Type::ForAllVar(TypeVar::new(name, Kind::Type))
}

fn list(arg: Type) -> Type {
    let name = QualifiedName::new(NamespaceName::new(&["Mina", "Test"], "Subtyping"), "List");
    Type::mk_apply(Type::Constructor(name, Kind::simple(1)), vec![arg], Kind::Type)
}

/// `[a] { a -> a }`
fn identity(name: &str) -> Type {
    Type::mk_quantified(
        vec![forall(name)],
        Type::mk_function(vec![forall(name)], forall(name)),
        Kind::Type,
    )
}

#[test]
fn builtin_widening_1() {
    let mut environment = environment();
    assert!(check_sub_type(&mut environment, &int(), &long()));
    assert!(!check_sub_type(&mut environment, &long(), &int()));
}

#[quickcheck]
fn prop_builtin_reflexive(ty: BuiltInType) -> bool {
    let mut environment = environment();
    check_sub_type(&mut environment, &Type::BuiltIn(ty), &Type::BuiltIn(ty))
}

#[test]
fn type_var_1() {
    let mut environment = environment();
    assert!(check_sub_type(&mut environment, &forall("a"), &forall("a")));
    assert!(!check_sub_type(&mut environment, &forall("a"), &forall("b")));
}

#[test]
fn solve_unsolved_1() {
    let mut environment = environment();
    let unsolved = environment.new_unsolved_type(Kind::Type);
    assert!(check_sub_type(&mut environment, &unsolved, &int()));
    assert_eq!(environment.substitute_type(&unsolved), int());
}

#[test]
fn solve_unsolved_kind_1() {
    let mut environment = environment();
    let kind = environment.new_unsolved_kind();
    let unsolved = environment.new_unsolved_type(kind.clone());
    assert!(check_sub_type(&mut environment, &long(), &unsolved));
    assert_eq!(environment.substitute_type(&unsolved), long());
    assert_eq!(environment.substitute_kind(&kind), Kind::Type);
}

#[test]
fn solve_unsolved_function_1() {
    let mut environment = environment();
    let unsolved = environment.new_unsolved_type(Kind::Type);
    let function = Type::mk_function(vec![int()], long());
    assert!(check_sub_type(&mut environment, &unsolved, &function));
    assert_eq!(
        environment.substitute_type(&unsolved).render(),
        "Int -> Long"
    );
}

#[test]
fn solve_unsolved_application_1() {
    let mut environment = environment();
    let unsolved = environment.new_unsolved_type(Kind::Type);
    assert!(check_sub_type(&mut environment, &list(int()), &unsolved));
    assert_eq!(environment.substitute_type(&unsolved).render(), "List[Int]");
}

#[test]
fn occurs_check_1() {
    let mut environment = environment();
    let unsolved = environment.new_unsolved_type(Kind::Type);
    let looping = Type::mk_function(vec![unsolved.clone()], int());
    assert!(!check_sub_type(&mut environment, &unsolved, &looping));
}

#[test]
fn kind_mismatch_1() {
    let mut environment = environment();
    let unsolved = environment.new_unsolved_type(Kind::simple(1));
    assert!(!check_sub_type(&mut environment, &unsolved, &int()));
}

#[test]
fn function_variance_1() {
    let mut environment = environment();
    let wide = Type::mk_function(vec![long()], int());
    let narrow = Type::mk_function(vec![int()], long());
    assert!(check_sub_type(&mut environment, &wide, &narrow));
    assert!(!check_sub_type(&mut environment, &narrow, &wide));
}

#[test]
fn function_arity_1() {
    let mut environment = environment();
    let unary = Type::mk_function(vec![int()], int());
    let binary = Type::mk_function(vec![int(), int()], int());
    assert!(!check_sub_type(&mut environment, &unary, &binary));
}

#[test]
fn application_1() {
    let mut environment = environment();
    assert!(check_sub_type(&mut environment, &list(int()), &list(long())));
    assert!(!check_sub_type(&mut environment, &list(long()), &list(int())));
    assert!(!check_sub_type(&mut environment, &list(int()), &int()));
}

#[test]
fn quantified_sub_1() {
    let mut environment = environment();
    let depth = environment.depth();
    let monomorphic = Type::mk_function(vec![int()], int());
    assert!(check_sub_type(&mut environment, &identity("a"), &monomorphic));
    assert_eq!(environment.depth(), depth);
}

#[test]
fn quantified_sub_2() {
    let mut environment = environment();
    let mismatched = Type::mk_function(vec![int()], Type::BuiltIn(BuiltInType::Boolean));
    assert!(!check_sub_type(&mut environment, &identity("a"), &mismatched));
}

#[test]
fn quantified_super_rigid_1() {
    let mut environment = environment();
    let monomorphic = Type::mk_function(vec![int()], int());
    assert!(!check_sub_type(&mut environment, &monomorphic, &identity("a")));
}

#[test]
fn quantified_both_1() {
    let mut environment = environment();
    assert!(check_sub_type(
        &mut environment,
        &identity("a"),
        &identity("b")
    ));
}

#[test]
fn instantiate_as_sub_type_quantified_1() {
    let mut environment = environment();
    let unsolved = environment.new_unsolved_type(Kind::Type);
    if let Type::Unsolved(variable) = &unsolved {
        instantiate_as_sub_type(&mut environment, variable, &identity("a"));
    }
    assert_eq!(environment.substitute_type(&unsolved).render(), "a -> a");
}
