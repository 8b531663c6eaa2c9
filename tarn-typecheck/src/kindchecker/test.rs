use crate::{
    environment::TypeEnvironment,
    kindchecker::{KindError, Kindchecker},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tarn_diagnostic::{Diagnostics, LocalDiagnosticReporter, Range};
use tarn_scope::ScopeKind;
use tarn_syntax::{
    kind::UnsolvedKind,
    names::{ConstructorName, DataName, FieldName, NamespaceName, QualifiedName},
    r#type::Sort,
    Constructor, ConstructorParam, Data, Kind, Meta, Name, QualifiedId, Quantifier, TypeNode,
    TypeVarNode,
};

fn ns() -> NamespaceName {
    NamespaceName::new(&["Mina", "Test"], "Kinds")
}

fn data_name(name: &str) -> DataName {
    DataName(QualifiedName::new(ns(), name))
}

fn at(column: u32, name: Name) -> Meta<Name> {
    Meta::new(Range::on_line(0, column, column + 1), name)
}

fn reference(column: u32, name: Name) -> TypeNode<Name> {
    TypeNode::Reference {
        id: QualifiedId::new(Range::on_line(0, column, column + 1), &name.local_name()),
        meta: at(column, name),
    }
}

fn builtin(column: u32, name: &str) -> TypeNode<Name> {
    reference(column, Name::BuiltIn(Arc::from(name)))
}

fn data_ref(column: u32, name: &str) -> TypeNode<Name> {
    reference(column, Name::Data(data_name(name)))
}

fn var(column: u32, name: &str) -> TypeVarNode<Name> {
    TypeVarNode {
        meta: at(column, Name::ForAllVar(Arc::from(name))),
        quantifier: Quantifier::ForAll,
        name: Arc::from(name),
    }
}

fn apply(column: u32, head: TypeNode<Name>, args: Vec<TypeNode<Name>>) -> TypeNode<Name> {
    TypeNode::Apply {
        meta: at(column, Name::Nameless),
        head: Box::new(head),
        args,
    }
}

fn fun(column: u32, args: Vec<TypeNode<Name>>, ret: TypeNode<Name>) -> TypeNode<Name> {
    TypeNode::Fun {
        meta: at(column, Name::Nameless),
        args,
        ret: Box::new(ret),
    }
}

fn quantified(column: u32, args: Vec<TypeVarNode<Name>>, body: TypeNode<Name>) -> TypeNode<Name> {
    TypeNode::Quantified {
        meta: at(column, Name::Nameless),
        args,
        body: Box::new(body),
    }
}

fn constructor(
    data: &str,
    name: &str,
    fields: Vec<(&str, TypeNode<Name>)>,
) -> Constructor<Name> {
    let constructor_name = ConstructorName::new(data_name(data), name);
    Constructor {
        meta: at(0, Name::Constructor(constructor_name.clone())),
        name: Arc::from(name),
        params: fields
            .into_iter()
            .map(|(field, type_annotation)| ConstructorParam {
                meta: at(
                    0,
                    Name::Field(FieldName {
                        constructor: constructor_name.clone(),
                        name: Arc::from(field),
                    }),
                ),
                name: Arc::from(field),
                type_annotation,
            })
            .collect(),
        return_type: None,
    }
}

fn data(name: &str, params: &[&str], constructors: Vec<Constructor<Name>>) -> Data<Name> {
    Data {
        meta: at(0, Name::Data(data_name(name))),
        name: Arc::from(name),
        type_params: params
            .iter()
            .enumerate()
            .map(|(index, param)| var(10 + index as u32, param))
            .collect(),
        constructors,
    }
}

fn with_kindchecker<A>(f: impl FnOnce(&mut Kindchecker) -> A) -> (A, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let result = {
        let mut kindchecker = Kindchecker::new(
            LocalDiagnosticReporter::new(Arc::from("test.mina"), &mut diagnostics),
            TypeEnvironment::with_builtin_types(),
        );
        kindchecker
            .environment_mut()
            .push_scope(ScopeKind::Namespace(ns()));
        let result = f(&mut kindchecker);
        assert_eq!(kindchecker.environment().depth(), 1);
        result
    };
    (result, diagnostics)
}

fn messages(diagnostics: &Diagnostics) -> Vec<&str> {
    diagnostics
        .items()
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect()
}

fn kind_of_node(node: &TypeNode<tarn_syntax::r#type::Attributes>) -> String {
    node.meta().meta.sort.render()
}

fn constructor_types(data: &Data<tarn_syntax::r#type::Attributes>) -> Vec<String> {
    data.constructors
        .iter()
        .map(|constructor| constructor.meta.meta.sort.render())
        .collect()
}

#[test]
fn infer_data_1() {
    let input = data(
        "Bool",
        &[],
        vec![
            constructor("Bool", "True", vec![]),
            constructor("Bool", "False", vec![]),
        ],
    );
    let (output, diagnostics) = with_kindchecker(|kindchecker| kindchecker.infer_data(&input));

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(output.meta.meta.sort, Sort::Kind(Kind::Type));
    assert_eq!(constructor_types(&output), vec!["Bool", "Bool"]);
}

#[test]
fn infer_data_2() {
    let input = data(
        "List",
        &["a"],
        vec![
            constructor("List", "Nil", vec![]),
            constructor(
                "List",
                "Cons",
                vec![
                    ("head", TypeNode::Var(var(20, "a"))),
                    (
                        "tail",
                        apply(30, data_ref(30, "List"), vec![TypeNode::Var(var(35, "a"))]),
                    ),
                ],
            ),
        ],
    );
    let ((output, bound_kind, field_sort), diagnostics) = with_kindchecker(|kindchecker| {
        let output = kindchecker.infer_data(&input);
        let environment = kindchecker.environment();
        let bound_kind = environment
            .lookup_type("Mina/Test/Kinds.List")
            .map(|meta| meta.meta.sort.render());
        let field_sort = environment
            .environment()
            .lookup_field(&ConstructorName::new(data_name("List"), "Cons"), "tail")
            .map(|meta| meta.meta.sort.render());
        (output, bound_kind, field_sort)
    });

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(output.meta.meta.sort.render(), "* -> *");
    assert_eq!(output.type_params[0].meta.meta.sort, Sort::Kind(Kind::Type));
    assert_eq!(
        constructor_types(&output),
        vec!["[a] { List[a] }", "[a] { (a, List[a]) -> List[a] }"]
    );
    assert_eq!(bound_kind.as_deref(), Some("* -> *"));
    assert_eq!(field_sort.as_deref(), Some("List[a]"));
}

#[test]
fn infer_data_higher_kinded_1() {
    let input = data(
        "Wrap",
        &["f"],
        vec![constructor(
            "Wrap",
            "Wrap",
            vec![(
                "unwrap",
                apply(20, TypeNode::Var(var(20, "f")), vec![builtin(22, "Int")]),
            )],
        )],
    );
    let (output, diagnostics) = with_kindchecker(|kindchecker| kindchecker.infer_data(&input));

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(output.meta.meta.sort.render(), "(* -> *) -> *");
    assert_eq!(output.type_params[0].meta.meta.sort.render(), "* -> *");
    assert_eq!(
        constructor_types(&output),
        vec!["[f] { f[Int] -> Wrap[f] }"]
    );
    assert_eq!(
        kind_of_node(&output.constructors[0].params[0].type_annotation),
        "*"
    );
}

#[test]
fn infer_data_unconstrained_1() {
    let input = data("Proxy", &["a"], vec![constructor("Proxy", "Proxy", vec![])]);
    let (output, diagnostics) = with_kindchecker(|kindchecker| kindchecker.infer_data(&input));

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(output.meta.meta.sort.render(), "* -> *");
}

#[test]
fn mismatched_application_1() {
    let input = data(
        "Bad",
        &[],
        vec![constructor(
            "Bad",
            "Bad",
            vec![("value", apply(20, builtin(20, "Int"), vec![builtin(24, "Int")]))],
        )],
    );
    let (_, diagnostics) = with_kindchecker(|kindchecker| kindchecker.infer_data(&input));

    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched type application! Expected: ?A1 -> ?B1, Actual: *"]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 20, 21)
    );
}

#[test]
fn kindcheck_type_1() {
    // [a] { a -> a }
    let input = quantified(
        0,
        vec![var(1, "a")],
        fun(5, vec![TypeNode::Var(var(5, "a"))], TypeNode::Var(var(10, "a"))),
    );
    let (output, diagnostics) =
        with_kindchecker(|kindchecker| kindchecker.kindcheck_type(&input));

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(kind_of_node(&output), "*");
    match &output {
        TypeNode::Quantified { args, .. } => {
            assert_eq!(args[0].meta.meta.sort, Sort::Kind(Kind::Type))
        }
        _ => panic!("expected a quantified type, got {:?}", output),
    }
}

#[test]
fn mismatched_kind_1() {
    // [f] { f[Int] -> f }
    let input = quantified(
        0,
        vec![var(1, "f")],
        fun(
            5,
            vec![apply(5, TypeNode::Var(var(5, "f")), vec![builtin(7, "Int")])],
            TypeNode::Var(var(15, "f")),
        ),
    );
    let (_, diagnostics) = with_kindchecker(|kindchecker| kindchecker.kindcheck_type(&input));

    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched kind! Expected: *, Actual: * -> *"]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 15, 16)
    );
}

#[test]
fn check_sub_kind_1() {
    let ((matched, left, right), diagnostics) = with_kindchecker(|kindchecker| {
        let x = kindchecker.environment_mut().new_unsolved_kind();
        let y = kindchecker.environment_mut().new_unsolved_kind();
        let sub = Kind::mk_higher(vec![x.clone()], Kind::Type);
        let sup = Kind::mk_higher(vec![Kind::Type], y.clone());
        let matched = kindchecker.check_sub_kind(&sub, &sup);
        let environment = kindchecker.environment_mut();
        (
            matched,
            environment.substitute_kind(&x),
            environment.substitute_kind(&y),
        )
    });

    assert!(diagnostics.is_empty());
    assert!(matched);
    assert_eq!(left, Kind::Type);
    assert_eq!(right, Kind::Type);
}

#[test]
fn check_sub_kind_occurs_1() {
    let (matched, _) = with_kindchecker(|kindchecker| {
        let x = kindchecker.environment_mut().new_unsolved_kind();
        let looping = Kind::mk_higher(vec![x.clone()], Kind::Type);
        kindchecker.check_sub_kind(&x, &looping)
    });
    assert!(!matched);
}

#[test]
fn instantiate_as_sub_kind_1() {
    let (solution, _) = with_kindchecker(|kindchecker| {
        let x = kindchecker.environment_mut().new_unsolved_kind();
        assert!(kindchecker.instantiate_as_sub_kind(UnsolvedKind(0), &Kind::simple(2)));
        kindchecker.environment_mut().substitute_kind(&x)
    });
    assert_eq!(solution, Kind::simple(2));
}

#[test]
fn kind_error_message_1() {
    let error = KindError::mismatch(Range::EMPTY, &Kind::Type, &Kind::simple(1));
    assert_eq!(
        error.to_string(),
        "Mismatched kind! Expected: *, Actual: * -> *"
    );
    assert_eq!(error.range(), Range::EMPTY);
}
