use super::Environment;
use crate::scope::{Scope, ScopeKind, ScopeTag};
use pretty_assertions::assert_eq;
use quickcheck::Arbitrary;
use quickcheck_macros::quickcheck;
use std::sync::Arc;
use tarn_syntax::names::{ConstructorName, DataName, DeclarationName, NamespaceName, QualifiedName};

fn namespace() -> NamespaceName {
    NamespaceName::new(&["Test"], "Environment")
}

#[test]
fn innermost_wins_1() {
    let mut env: Environment<u32> = Environment::new();
    env.push_scope(Scope::new(ScopeKind::Namespace(namespace())));
    assert!(env.populate_value("k", 1));
    env.push_scope(Scope::new(ScopeKind::Block));
    assert!(env.populate_value("k", 2));
    assert_eq!(env.lookup_value("k"), Some(&2));
    env.pop_scope(ScopeTag::Block);
    assert_eq!(env.lookup_value("k"), Some(&1));
}

#[test]
fn populate_only_touches_top_1() {
    let mut env: Environment<u32> = Environment::new();
    env.push_scope(Scope::new(ScopeKind::Block));
    assert!(env.populate_value("k", 1));
    env.push_scope(Scope::new(ScopeKind::Lambda));
    // Shadowing an outer binding is not a duplicate.
    assert!(env.populate_value("k", 2));
    assert!(!env.populate_value("k", 3));
    assert_eq!(env.lookup_value("k"), Some(&2));

    let lambda = env.pop_scope(ScopeTag::Lambda);
    assert_eq!(lambda.lookup_value("k"), Some(&2));
    let block = env.pop_scope(ScopeTag::Block);
    assert_eq!(block.lookup_value("k"), Some(&1));
}

#[test]
fn builtins_searched_last_1() {
    let mut builtins = Scope::new(ScopeKind::BuiltIn);
    builtins.populate_type("Int", 0);
    let mut env: Environment<u32> = Environment::with_builtins(Arc::new(builtins));
    assert_eq!(env.lookup_type("Int"), Some(&0));

    env.push_scope(Scope::new(ScopeKind::Block));
    env.populate_type("Int", 1);
    assert_eq!(env.lookup_type("Int"), Some(&1));
    assert_eq!(env.depth(), 1);
}

#[test]
fn lookup_or_else_1() {
    let env: Environment<u32> = Environment::new();
    let mut missing = Vec::new();
    assert_eq!(
        env.lookup_value_or_else("x", |key| missing.push(String::from(key))),
        None
    );
    assert_eq!(missing, vec![String::from("x")]);
}

#[test]
#[should_panic]
fn pop_wrong_scope_panics_1() {
    let mut env: Environment<u32> = Environment::new();
    env.push_scope(Scope::new(ScopeKind::Block));
    env.pop_scope(ScopeTag::Lambda);
}

#[test]
#[should_panic]
fn pop_empty_panics_1() {
    let mut env: Environment<u32> = Environment::new();
    env.pop_scope(ScopeTag::Block);
}

#[test]
fn enclosing_queries_1() {
    let data = DataName(QualifiedName::new(namespace(), "List"));
    let cons = ConstructorName::new(data.clone(), "Cons");

    let mut env: Environment<u32> = Environment::new();
    env.push_scope(Scope::new(ScopeKind::Namespace(namespace())));
    env.push_scope(Scope::new(ScopeKind::Data(data.clone())));
    env.push_scope(Scope::new(ScopeKind::Constructor(cons.clone())));

    assert_eq!(env.enclosing_namespace(), Some(&namespace()));
    assert_eq!(env.enclosing_data(), Some(&data));
    assert_eq!(env.enclosing_constructor(), Some(&cons));
    assert_eq!(
        env.enclosing_declaration(),
        Some(DeclarationName::Constructor(cons.clone()))
    );
    assert_eq!(env.enclosing_let(), None);
    assert!(env.enclosing_case().is_none());

    env.push_scope(Scope::new(ScopeKind::Case));
    env.push_scope(Scope::new(ScopeKind::ConstructorPattern(None)));
    assert_eq!(env.enclosing_constructor_pattern(), Some(None));

    // Bindings made through an enclosing scope land in that scope, not the top one.
    env.enclosing_case_mut().unwrap().populate_value("x", 7);
    assert_eq!(env.top_scope().unwrap().lookup_value("x"), None);
    assert_eq!(env.lookup_value("x"), Some(&7));
}

#[derive(Debug, Clone)]
struct Nesting(Vec<ScopeTag>);

impl Arbitrary for Nesting {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let tags = [
            ScopeTag::Block,
            ScopeTag::Lambda,
            ScopeTag::Case,
            ScopeTag::QuantifiedType,
        ];
        let len = usize::arbitrary(g) % 16;
        Nesting((0..len).map(|_| *g.choose(&tags).unwrap()).collect())
    }
}

fn scope_for(tag: ScopeTag) -> Scope<u32> {
    Scope::new(match tag {
        ScopeTag::Lambda => ScopeKind::Lambda,
        ScopeTag::Case => ScopeKind::Case,
        ScopeTag::QuantifiedType => ScopeKind::QuantifiedType,
        _ => ScopeKind::Block,
    })
}

#[quickcheck]
fn prop_push_pop_balanced(nesting: Nesting) {
    let mut env: Environment<u32> = Environment::new();
    for (depth, tag) in nesting.0.iter().enumerate() {
        assert_eq!(env.depth(), depth);
        env.push_scope(scope_for(*tag));
    }
    for tag in nesting.0.iter().rev() {
        assert_eq!(env.pop_scope(*tag).tag(), *tag);
    }
    assert_eq!(env.depth(), 0);
}
