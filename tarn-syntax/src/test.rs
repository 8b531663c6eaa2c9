use crate::{
    kind::{Kind, UnsolvedKind},
    names::{ConstructorName, DataName, LocalName, Name, NamespaceName, QualifiedName, SyntheticName},
    r#type::{BuiltInType, Type, TypeVar},
    Literal, NamespaceId, QualifiedId,
};
use fnv::FnvHashMap;
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use std::sync::Arc;
use tarn_diagnostic::Range;

fn test_namespace() -> NamespaceName {
    NamespaceName::new(&["Mina", "Test"], "Renamer")
}

#[quickcheck]
fn prop_builtin_subtype_reflexive(ty: BuiltInType) {
    assert!(ty.is_subtype_of(&ty), "{:?} is not a subtype of itself", ty)
}

#[quickcheck]
fn prop_builtin_subtype_transitive(a: BuiltInType, b: BuiltInType, c: BuiltInType) {
    if a.is_subtype_of(&b) && b.is_subtype_of(&c) {
        assert!(a.is_subtype_of(&c), "{:?} <: {:?} <: {:?}", a, b, c)
    }
}

#[quickcheck]
fn prop_builtin_subtype_antisymmetric(a: BuiltInType, b: BuiltInType) {
    if a.is_subtype_of(&b) && b.is_subtype_of(&a) {
        assert_eq!(a, b)
    }
}

#[test]
fn builtin_widening_1() {
    assert!(BuiltInType::Int.is_subtype_of(&BuiltInType::Long));
    assert!(!BuiltInType::Long.is_subtype_of(&BuiltInType::Int));
    assert!(BuiltInType::Float.is_subtype_of(&BuiltInType::Double));
    assert!(!BuiltInType::Int.is_subtype_of(&BuiltInType::Double));
}

#[test]
fn builtin_from_name_1() {
    assert_eq!(BuiltInType::from_name("Long"), Some(BuiltInType::Long));
    assert_eq!(BuiltInType::from_name("->"), None);
}

#[test]
fn canonical_names_1() {
    let ns = test_namespace();
    assert_eq!(ns.canonical_name(), "Mina/Test/Renamer");
    assert_eq!(ns.local_name(), "Renamer");

    let data = DataName(QualifiedName::new(ns.clone(), "List"));
    let cons = ConstructorName::new(data.clone(), "Cons");
    assert_eq!(
        Name::Constructor(cons).canonical_name(),
        "Mina/Test/Renamer.Cons"
    );
    assert_eq!(Name::Data(data).local_name(), "List");
    assert_eq!(
        Name::Namespace(NamespaceName::new(&[], "Main")).canonical_name(),
        "Main"
    );
}

#[test]
fn local_and_synthetic_names_1() {
    assert_eq!(Name::Local(LocalName::new("x", 3)).canonical_name(), "x");
    assert_eq!(
        Name::Synthetic(SyntheticName { index: 3 }).canonical_name(),
        "$3"
    );
    assert_ne!(
        Name::Local(LocalName::new("x", 0)),
        Name::Local(LocalName::new("x", 1))
    );
}

#[test]
fn qualified_id_canonical_1() {
    let id = QualifiedId {
        range: Range::EMPTY,
        ns: Some(NamespaceId::new(Range::EMPTY, &["Mina", "Test"], "Renamer")),
        name: Arc::from("x"),
    };
    assert_eq!(id.canonical_name(), "Mina/Test/Renamer.x");
    assert_eq!(QualifiedId::new(Range::EMPTY, "x").canonical_name(), "x");
}

#[test]
fn unsolved_kind_names_1() {
    assert_eq!(UnsolvedKind(0).name(), "?A1");
    assert_eq!(UnsolvedKind(25).name(), "?Z1");
    assert_eq!(UnsolvedKind(26).name(), "?A2");
}

#[test]
fn kind_render_1() {
    assert_eq!(Kind::Type.render(), "*");
    assert_eq!(Kind::simple(1).render(), "* -> *");
    assert_eq!(Kind::simple(2).render(), "(*, *) -> *");
    assert_eq!(
        Kind::mk_higher(vec![Kind::simple(1)], Kind::Type).render(),
        "(* -> *) -> *"
    );
}

#[test]
fn kind_iter_unsolved_1() {
    let kind = Kind::mk_higher(
        vec![Kind::Unsolved(UnsolvedKind(1)), Kind::Type],
        Kind::mk_higher(vec![Kind::Unsolved(UnsolvedKind(2))], Kind::Unsolved(UnsolvedKind(3))),
    );
    assert_eq!(
        kind.iter_unsolved().collect::<Vec<_>>(),
        vec![UnsolvedKind(1), UnsolvedKind(2), UnsolvedKind(3)]
    );
    assert!(kind.occurs(UnsolvedKind(2)));
    assert!(!kind.occurs(UnsolvedKind(0)));
}

#[test]
fn function_type_1() {
    let ty = Type::mk_function(
        vec![Type::BuiltIn(BuiltInType::Int)],
        Type::BuiltIn(BuiltInType::Boolean),
    );
    assert!(ty.is_function());
    assert_eq!(ty.kind(), Kind::Type);
    assert_eq!(ty.render(), "Int -> Boolean");
    assert_eq!(
        ty.unwrap_function(),
        Some((
            &[Type::BuiltIn(BuiltInType::Int)][..],
            &Type::BuiltIn(BuiltInType::Boolean)
        ))
    );
    assert_eq!(
        BuiltInType::Function { arity: 1 }.kind(),
        Kind::simple(2)
    );
}

#[test]
fn type_render_1() {
    let list = Type::Constructor(
        QualifiedName::new(test_namespace(), "List"),
        Kind::simple(1),
    );
    let a = Type::ForAllVar(TypeVar::new("A", Kind::Type));
    let ty = Type::mk_quantified(
        vec![a.clone()],
        Type::mk_function(
            vec![a.clone(), Type::mk_apply(list.clone(), vec![a.clone()], Kind::Type)],
            Type::mk_apply(list, vec![a], Kind::Type),
        ),
        Kind::Type,
    );
    assert_eq!(ty.render(), "[A] { (A, List[A]) -> List[A] }");
}

#[test]
fn type_iter_unsolved_1() {
    let ty = Type::mk_function(
        vec![Type::mk_unsolved(0, Kind::Type)],
        Type::mk_apply(
            Type::mk_unsolved(1, Kind::simple(1)),
            vec![Type::mk_unsolved(2, Kind::Type)],
            Kind::Type,
        ),
    );
    assert_eq!(
        ty.iter_unsolved().map(|unsolved| unsolved.id.0).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn type_instantiate_1() {
    let a = Type::ForAllVar(TypeVar::new("A", Kind::Type));
    let b = Type::ForAllVar(TypeVar::new("B", Kind::Type));
    let inner = Type::mk_quantified(vec![a.clone()], a.clone(), Kind::Type);
    let ty = Type::mk_function(vec![a.clone(), b.clone()], inner.clone());

    let substitution: FnvHashMap<Arc<str>, Type> = vec![
        (Arc::from("A"), Type::BuiltIn(BuiltInType::Int)),
        (Arc::from("B"), Type::BuiltIn(BuiltInType::Char)),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        ty.instantiate(&substitution),
        Type::mk_function(
            vec![
                Type::BuiltIn(BuiltInType::Int),
                Type::BuiltIn(BuiltInType::Char)
            ],
            inner
        )
    );
}

#[test]
fn literal_float_equality_1() {
    assert_eq!(Literal::Double(f64::NAN), Literal::Double(f64::NAN));
    assert_ne!(Literal::Double(0.0), Literal::Double(-0.0));
    assert_ne!(Literal::Int(1), Literal::Long(1));
}
