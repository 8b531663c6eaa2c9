use crate::{
    environment::TypeEnvironment,
    sorts::type_of,
    typechecker::{ExpectedOperand, TypeError, Typechecker},
    TypingScope,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tarn_diagnostic::{Diagnostics, LocalDiagnosticReporter, Range};
use tarn_scope::ScopeKind;
use tarn_syntax::{
    names::{
        ConstructorName, DataName, FieldName, LetName, LocalName, NamespaceName, QualifiedName,
    },
    r#type::{Attributes, BuiltInType},
    BinaryOp, Case, Constructor, ConstructorParam, Data, Declaration, Expr, FieldPattern, Let,
    LetFn, Literal, Meta, Name, Namespace, NamespaceId, Param, Pattern, QualifiedId, Quantifier,
    Type, TypeNode, TypeVarNode, UnaryOp,
};

fn ns() -> NamespaceName {
    NamespaceName::new(&["Mina", "Test"], "Typechecker")
}

fn at(column: u32, name: Name) -> Meta<Name> {
    Meta::new(Range::on_line(0, column, column + 1), name)
}

fn let_name(name: &str) -> Name {
    Name::Let(LetName(QualifiedName::new(ns(), name)))
}

fn local(name: &str) -> Name {
    Name::Local(LocalName::new(name, 0))
}

fn data_name(name: &str) -> DataName {
    DataName(QualifiedName::new(ns(), name))
}

fn constructor_name(data: &str, name: &str) -> ConstructorName {
    ConstructorName::new(data_name(data), name)
}

fn literal(column: u32, value: Literal) -> Expr<Name> {
    Expr::mk_literal(at(column, Name::Nameless), value)
}

fn int(column: u32, value: i32) -> Expr<Name> {
    literal(column, Literal::Int(value))
}

fn string(column: u32, value: &str) -> Expr<Name> {
    literal(column, Literal::String(Arc::from(value)))
}

fn reference(column: u32, name: Name) -> Expr<Name> {
    let id = QualifiedId::new(Range::on_line(0, column, column + 1), &name.local_name());
    Expr::Reference(tarn_syntax::Reference {
        meta: at(column, name),
        id,
    })
}

fn binary(column: u32, operator: BinaryOp, left: Expr<Name>, right: Expr<Name>) -> Expr<Name> {
    Expr::BinaryOp {
        meta: at(column, Name::Nameless),
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn if_(column: u32, condition: Expr<Name>, consequent: Expr<Name>, alternative: Expr<Name>) -> Expr<Name> {
    Expr::If {
        meta: at(column, Name::Nameless),
        condition: Box::new(condition),
        consequent: Box::new(consequent),
        alternative: Box::new(alternative),
    }
}

fn param(column: u32, name: &str, type_annotation: Option<TypeNode<Name>>) -> Param<Name> {
    Param {
        meta: at(column, local(name)),
        name: Arc::from(name),
        type_annotation,
    }
}

fn builtin(column: u32, name: &str) -> TypeNode<Name> {
    TypeNode::Reference {
        id: QualifiedId::new(Range::on_line(0, column, column + 1), name),
        meta: at(column, Name::BuiltIn(Arc::from(name))),
    }
}

fn var(column: u32, name: &str) -> TypeVarNode<Name> {
    TypeVarNode {
        meta: at(column, Name::ForAllVar(Arc::from(name))),
        quantifier: Quantifier::ForAll,
        name: Arc::from(name),
    }
}

fn data_ref(column: u32, name: &str) -> TypeNode<Name> {
    TypeNode::Reference {
        id: QualifiedId::new(Range::on_line(0, column, column + 1), name),
        meta: at(column, Name::Data(data_name(name))),
    }
}

fn let_(column: u32, name: &str, type_annotation: Option<TypeNode<Name>>, expr: Expr<Name>) -> Declaration<Name> {
    Declaration::Let(Let {
        meta: at(column, let_name(name)),
        name: Arc::from(name),
        type_annotation,
        expr,
    })
}

fn let_fn(
    name: &str,
    type_params: Vec<TypeVarNode<Name>>,
    value_params: Vec<Param<Name>>,
    return_type: Option<TypeNode<Name>>,
    expr: Expr<Name>,
) -> Declaration<Name> {
    Declaration::LetFn(LetFn {
        meta: at(0, let_name(name)),
        name: Arc::from(name),
        type_params,
        value_params,
        return_type,
        expr,
    })
}

fn constructor(
    data: &str,
    name: &str,
    fields: Vec<(&str, TypeNode<Name>)>,
    return_type: Option<TypeNode<Name>>,
) -> Constructor<Name> {
    let name_ = constructor_name(data, name);
    Constructor {
        meta: at(0, Name::Constructor(name_.clone())),
        name: Arc::from(name),
        params: fields
            .into_iter()
            .map(|(field, type_annotation)| ConstructorParam {
                meta: at(
                    0,
                    Name::Field(FieldName {
                        constructor: name_.clone(),
                        name: Arc::from(field),
                    }),
                ),
                name: Arc::from(field),
                type_annotation,
            })
            .collect(),
        return_type,
    }
}

fn data(name: &str, params: &[&str], constructors: Vec<Constructor<Name>>) -> Declaration<Name> {
    Declaration::Data(Data {
        meta: at(0, Name::Data(data_name(name))),
        name: Arc::from(name),
        type_params: params
            .iter()
            .enumerate()
            .map(|(index, param)| var(10 + index as u32, param))
            .collect(),
        constructors,
    })
}

/// `data List[a] { case Nil(); case Cons(head: a, tail: List[a]) }`
fn list() -> Declaration<Name> {
    data(
        "List",
        &["a"],
        vec![
            constructor("List", "Nil", vec![], None),
            constructor(
                "List",
                "Cons",
                vec![
                    ("head", TypeNode::Var(var(20, "a"))),
                    (
                        "tail",
                        TypeNode::Apply {
                            meta: at(30, Name::Nameless),
                            head: Box::new(data_ref(30, "List")),
                            args: vec![TypeNode::Var(var(35, "a"))],
                        },
                    ),
                ],
                None,
            ),
        ],
    )
}

fn constructor_pattern(column: u32, data: &str, name: &str, fields: Vec<FieldPattern<Name>>) -> Pattern<Name> {
    Pattern::Constructor {
        meta: at(column, Name::Constructor(constructor_name(data, name))),
        id: QualifiedId::new(Range::on_line(0, column, column + 1), name),
        fields,
    }
}

fn case(column: u32, pattern: Pattern<Name>, consequent: Expr<Name>) -> Case<Name> {
    Case {
        meta: at(column, Name::Nameless),
        pattern,
        consequent,
    }
}

fn namespace(declaration_groups: Vec<Vec<Declaration<Name>>>) -> Namespace<Name> {
    Namespace {
        meta: at(0, Name::Namespace(ns())),
        id: NamespaceId::new(Range::EMPTY, &["Mina", "Test"], "Typechecker"),
        imports: Vec::new(),
        declaration_groups,
    }
}

fn new_typechecker(diagnostics: &mut Diagnostics) -> Typechecker<'_> {
    Typechecker::new(
        LocalDiagnosticReporter::new(Arc::from("test.mina"), diagnostics),
        TypeEnvironment::with_builtin_types(),
    )
}

fn with_typechecker<A>(f: impl FnOnce(&mut Typechecker) -> A) -> (A, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let result = {
        let mut typechecker = new_typechecker(&mut diagnostics);
        typechecker
            .environment_mut()
            .push_scope(ScopeKind::Namespace(ns()));
        let result = f(&mut typechecker);
        assert_eq!(typechecker.environment().depth(), 1);
        result
    };
    (result, diagnostics)
}

/// The solved type of an expression.
fn infer(expr: &Expr<Name>) -> (String, Diagnostics) {
    with_typechecker(|typechecker| {
        let typed = typechecker.infer_expr(expr);
        let ty = type_of(typed.meta());
        typechecker.environment_mut().substitute_type(&ty).render()
    })
}

fn typecheck(input: &Namespace<Name>) -> ((Namespace<Attributes>, TypingScope), Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let result = {
        let mut typechecker = new_typechecker(&mut diagnostics);
        let result = typechecker.typecheck_namespace(input);
        assert_eq!(typechecker.environment().depth(), 0);
        result
    };
    (result, diagnostics)
}

fn declaration_type(namespace: &Namespace<Attributes>, name: &str) -> Option<String> {
    namespace
        .declarations()
        .find(|declaration| declaration.name().as_ref() == name)
        .map(|declaration| declaration.meta().meta.sort.render())
}

fn messages(diagnostics: &Diagnostics) -> Vec<&str> {
    diagnostics
        .items()
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect()
}

#[test]
fn infer_literal_1() {
    let (ty, diagnostics) = infer(&literal(0, Literal::Long(1)));
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Long");
}

#[test]
fn infer_if_1() {
    // if true then 1 else 2
    let input = if_(
        0,
        literal(3, Literal::Boolean(true)),
        int(13, 1),
        int(20, 2),
    );
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Int");
}

#[test]
fn infer_if_mismatch_1() {
    // if true then 1 else "a"
    let input = if_(
        0,
        literal(3, Literal::Boolean(true)),
        int(13, 1),
        string(20, "a"),
    );
    let (_, diagnostics) = infer(&input);
    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched type! Expected: Int, Actual: String"]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 20, 21)
    );
}

#[test]
fn infer_condition_1() {
    // if 1 then 2 else 3
    let input = if_(0, int(3, 1), int(10, 2), int(17, 3));
    let (ty, diagnostics) = infer(&input);
    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched type! Expected: Boolean, Actual: Int"]
    );
    assert_eq!(ty, "Int");
}

#[test]
fn infer_lambda_applied_1() {
    // (x -> x)(1)
    let input = Expr::mk_apply(
        at(0, Name::Nameless),
        Expr::mk_lambda(
            at(1, Name::Nameless),
            vec![param(1, "x", None)],
            reference(6, local("x")),
        ),
        vec![int(9, 1)],
    );
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Int");
}

#[test]
fn infer_lambda_1() {
    // (x: Int, y) -> x
    let input = Expr::mk_lambda(
        at(0, Name::Nameless),
        vec![param(1, "x", Some(builtin(4, "Int"))), param(9, "y", None)],
        reference(15, local("x")),
    );
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "(Int, ?A1) -> Int");
}

#[test]
fn mismatched_application_1() {
    // 1(2)
    let input = Expr::mk_apply(at(0, Name::Nameless), int(0, 1), vec![int(2, 2)]);
    let (ty, diagnostics) = infer(&input);
    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched application! Expected: ?A1 -> ?B1, Actual: Int"]
    );
    assert_eq!(ty, "?B1");
}

#[test]
fn block_without_result_1() {
    // { let a = 1 }
    let input = Expr::mk_block(
        at(0, Name::Nameless),
        vec![Let {
            meta: at(6, local("a")),
            name: Arc::from("a"),
            type_annotation: None,
            expr: int(10, 1),
        }],
        None,
    );
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Unit");
}

#[test]
fn block_result_1() {
    // { let a = 1L; a }
    let input = Expr::mk_block(
        at(0, Name::Nameless),
        vec![Let {
            meta: at(6, local("a")),
            name: Arc::from("a"),
            type_annotation: None,
            expr: literal(10, Literal::Long(1)),
        }],
        Some(reference(14, local("a"))),
    );
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Long");
}

#[test]
fn arithmetic_widening_1() {
    // 1L + 2
    let input = binary(
        3,
        BinaryOp::Add,
        literal(0, Literal::Long(1)),
        int(5, 2),
    );
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Long");
}

#[test]
fn arithmetic_operand_1() {
    // "a" * 2
    let input = binary(4, BinaryOp::Multiply, string(0, "a"), int(6, 2));
    let (ty, diagnostics) = infer(&input);
    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched operand type! Expected: A numeric type, Actual: String"]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 0, 1)
    );
    assert_eq!(ty, "Int");
}

#[test]
fn relational_1() {
    // 1.0 < 2.0
    let input = binary(
        4,
        BinaryOp::LessThan,
        literal(0, Literal::Double(1.0)),
        literal(6, Literal::Double(2.0)),
    );
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Boolean");
}

#[test]
fn bitwise_boolean_1() {
    // true & false
    let input = binary(
        5,
        BinaryOp::BitwiseAnd,
        literal(0, Literal::Boolean(true)),
        literal(7, Literal::Boolean(false)),
    );
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Boolean");
}

#[test]
fn shift_operand_1() {
    // 1 << 2L
    let input = binary(
        2,
        BinaryOp::ShiftLeft,
        int(0, 1),
        literal(5, Literal::Long(2)),
    );
    let (ty, diagnostics) = infer(&input);
    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched operand type! Expected: Int, Actual: Long"]
    );
    assert_eq!(ty, "Int");
}

#[test]
fn equality_operands_1() {
    // 1 == "a"
    let input = binary(2, BinaryOp::Equal, int(0, 1), string(5, "a"));
    let (ty, diagnostics) = infer(&input);
    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched operand types! Left: Int, Right: String"]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 2, 3)
    );
    assert_eq!(ty, "Boolean");
}

#[test]
fn equality_widening_1() {
    // 1 == 2L
    let input = binary(2, BinaryOp::Equal, int(0, 1), literal(5, Literal::Long(2)));
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Boolean");
}

#[test]
fn unary_operand_1() {
    // !1
    let input = Expr::UnaryOp {
        meta: at(0, Name::Nameless),
        operator: UnaryOp::BooleanNot,
        operand: Box::new(int(1, 1)),
    };
    let (ty, diagnostics) = infer(&input);
    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched operand type! Expected: Boolean, Actual: Int"]
    );
    assert_eq!(ty, "Boolean");
}

#[test]
fn negate_1() {
    // -1.0F
    let input = Expr::UnaryOp {
        meta: at(0, Name::Nameless),
        operator: UnaryOp::Negate,
        operand: Box::new(literal(1, Literal::Float(1.0))),
    };
    let (ty, diagnostics) = infer(&input);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(ty, "Float");
}

#[test]
fn check_literal_1() {
    let (_, diagnostics) = with_typechecker(|typechecker| {
        typechecker.check_expr(&int(0, 1), &Type::BuiltIn(BuiltInType::Long));
        typechecker.check_expr(&int(4, 1), &Type::BuiltIn(BuiltInType::Char));
    });
    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched type! Expected: Char, Actual: Int"]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 4, 5)
    );
}

#[test]
fn check_pattern_binds_1() {
    let ((pattern, bound), diagnostics) = with_typechecker(|typechecker| {
        typechecker.environment_mut().push_scope(ScopeKind::Case);
        // whole @ x
        let pattern = typechecker.check_pattern(
            &Pattern::Alias {
                meta: at(0, local("whole")),
                alias: Arc::from("whole"),
                pattern: Box::new(Pattern::Id {
                    meta: at(8, local("x")),
                    name: Arc::from("x"),
                }),
            },
            &Type::BuiltIn(BuiltInType::String),
        );
        let bound: Vec<Option<String>> = ["whole", "x"]
            .iter()
            .map(|name| {
                typechecker
                    .environment()
                    .lookup_value(name)
                    .map(|meta| meta.meta.sort.render())
            })
            .collect();
        typechecker
            .environment_mut()
            .pop_scope(tarn_scope::ScopeTag::Case);
        (pattern, bound)
    });
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(pattern.meta().meta.sort.render(), "String");
    assert_eq!(
        bound,
        vec![Some(String::from("String")), Some(String::from("String"))]
    );
}

#[test]
fn typecheck_namespace_scope_1() {
    // let x = 1
    let input = namespace(vec![vec![let_(0, "x", None, int(8, 1))]]);
    let ((output, scope), diagnostics) = typecheck(&input);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(output.meta.meta.sort.render(), "Unit");
    assert_eq!(declaration_type(&output, "x").as_deref(), Some("Int"));
    assert_eq!(
        scope.lookup_value("x").map(|meta| meta.meta.sort.render()),
        Some(String::from("Int"))
    );
    assert_eq!(
        scope
            .lookup_value("Mina/Test/Typechecker.x")
            .map(|meta| meta.meta.sort.render()),
        Some(String::from("Int"))
    );
}

#[test]
fn annotated_let_mismatch_1() {
    // let x: Boolean = 1
    let input = namespace(vec![vec![let_(
        0,
        "x",
        Some(builtin(7, "Boolean")),
        int(17, 1),
    )]]);
    let ((output, _), diagnostics) = typecheck(&input);

    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched type! Expected: Boolean, Actual: Int"]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 17, 18)
    );
    assert_eq!(declaration_type(&output, "x").as_deref(), Some("Boolean"));
}

#[test]
fn polymorphic_let_fn_1() {
    // let id[a](x: a): a = x
    // let one = id(1)
    let input = namespace(vec![
        vec![let_fn(
            "id",
            vec![var(7, "a")],
            vec![param(10, "x", Some(TypeNode::Var(var(13, "a"))))],
            Some(TypeNode::Var(var(17, "a"))),
            reference(21, local("x")),
        )],
        vec![let_(
            0,
            "one",
            None,
            Expr::mk_apply(
                at(10, Name::Nameless),
                reference(10, let_name("id")),
                vec![int(13, 1)],
            ),
        )],
    ]);
    let ((output, _), diagnostics) = typecheck(&input);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(
        declaration_type(&output, "id").as_deref(),
        Some("[a] { a -> a }")
    );
    assert_eq!(declaration_type(&output, "one").as_deref(), Some("Int"));
}

#[test]
fn check_quantified_1() {
    // let id: [a] { a -> a } = x -> x
    let annotation = TypeNode::Quantified {
        meta: at(8, Name::Nameless),
        args: vec![var(9, "a")],
        body: Box::new(TypeNode::Fun {
            meta: at(14, Name::Nameless),
            args: vec![TypeNode::Var(var(14, "a"))],
            ret: Box::new(TypeNode::Var(var(19, "a"))),
        }),
    };
    let input = namespace(vec![vec![let_(
        0,
        "id",
        Some(annotation),
        Expr::mk_lambda(
            at(25, Name::Nameless),
            vec![param(25, "x", None)],
            reference(30, local("x")),
        ),
    )]]);
    let ((output, _), diagnostics) = typecheck(&input);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(
        declaration_type(&output, "id").as_deref(),
        Some("[a] { a -> a }")
    );
    match output.declarations().next() {
        Some(Declaration::Let(let_)) => {
            assert_eq!(let_.expr.meta().meta.sort.render(), "a -> a")
        }
        other => panic!("expected a let, got {:?}", other),
    };
}

#[test]
fn check_quantified_rigid_1() {
    // let bad: [a] { a -> a } = x -> 1
    let annotation = TypeNode::Quantified {
        meta: at(9, Name::Nameless),
        args: vec![var(10, "a")],
        body: Box::new(TypeNode::Fun {
            meta: at(15, Name::Nameless),
            args: vec![TypeNode::Var(var(15, "a"))],
            ret: Box::new(TypeNode::Var(var(20, "a"))),
        }),
    };
    let input = namespace(vec![vec![let_(
        0,
        "bad",
        Some(annotation),
        Expr::mk_lambda(
            at(26, Name::Nameless),
            vec![param(26, "x", None)],
            int(31, 1),
        ),
    )]]);
    let (_, diagnostics) = typecheck(&input);

    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched type! Expected: a, Actual: Int"]
    );
}

#[test]
fn no_unique_type_1() {
    // let f(x) = x
    let input = namespace(vec![vec![let_fn(
        "f",
        vec![],
        vec![param(6, "x", None)],
        None,
        reference(11, local("x")),
    )]]);
    let ((output, _), diagnostics) = typecheck(&input);

    assert_eq!(
        messages(&diagnostics),
        vec!["Couldn't infer a unique type for f! Found: ?B1 -> ?B1, where ?B1 is an unsolved variable."]
    );
    assert_eq!(declaration_type(&output, "f").as_deref(), Some("?B1 -> ?B1"));
}

#[test]
fn match_constructor_1() {
    // data List[a] { case Nil(); case Cons(head: a, tail: List[a]) }
    // let head(list: List[Int]): Int = match list with {
    //   case Cons { head } -> head
    //   case Nil {} -> 0
    // }
    let list_of_int = TypeNode::Apply {
        meta: at(15, Name::Nameless),
        head: Box::new(data_ref(15, "List")),
        args: vec![builtin(20, "Int")],
    };
    let body = Expr::mk_match(
        at(33, Name::Nameless),
        reference(39, local("list")),
        vec![
            case(
                2,
                constructor_pattern(
                    7,
                    "List",
                    "Cons",
                    vec![FieldPattern {
                        meta: at(14, local("head")),
                        field: Arc::from("head"),
                        pattern: None,
                    }],
                ),
                reference(24, local("head")),
            ),
            case(
                2,
                constructor_pattern(7, "List", "Nil", vec![]),
                int(17, 0),
            ),
        ],
    );
    let input = namespace(vec![
        vec![list()],
        vec![let_fn(
            "head",
            vec![],
            vec![param(9, "list", Some(list_of_int))],
            Some(builtin(27, "Int")),
            body,
        )],
    ]);
    let ((output, _), diagnostics) = typecheck(&input);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(
        declaration_type(&output, "head").as_deref(),
        Some("List[Int] -> Int")
    );
    assert_eq!(
        declaration_type(&output, "List").as_deref(),
        Some("* -> *")
    );

    let cases = match output.declarations().nth(1) {
        Some(Declaration::LetFn(let_fn)) => match &let_fn.expr {
            Expr::Match { cases, .. } => cases.clone(),
            other => panic!("expected a match, got {:?}", other),
        },
        other => panic!("expected a let fn, got {:?}", other),
    };
    match &cases[0].pattern {
        Pattern::Constructor { meta, fields, .. } => {
            assert_eq!(meta.meta.sort.render(), "List[Int]");
            assert_eq!(fields[0].meta.meta.sort.render(), "Int");
        }
        other => panic!("expected a constructor pattern, got {:?}", other),
    }
}

#[test]
fn match_constructor_mismatch_1() {
    // match 1 with { case Nil {} -> 0 }
    let input = namespace(vec![
        vec![list()],
        vec![let_(
            0,
            "x",
            None,
            Expr::mk_match(
                at(8, Name::Nameless),
                int(14, 1),
                vec![case(
                    23,
                    constructor_pattern(28, "List", "Nil", vec![]),
                    int(38, 0),
                )],
            ),
        )],
    ]);
    let (_, diagnostics) = typecheck(&input);

    let messages = messages(&diagnostics);
    assert_eq!(messages.len(), 1, "{:?}", messages);
    assert!(
        messages[0].starts_with("Mismatched type! Expected: Int, Actual: List["),
        "{}",
        messages[0]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 28, 29)
    );
}

#[test]
fn constructor_return_type_1() {
    // data Foo { case Foo(): Int }
    let input = namespace(vec![vec![data(
        "Foo",
        &[],
        vec![constructor("Foo", "Foo", vec![], Some(builtin(23, "Int")))],
    )]]);
    let (_, diagnostics) = typecheck(&input);

    assert_eq!(
        messages(&diagnostics),
        vec!["Mismatched type! Expected: Foo, Actual: Int"]
    );
    assert_eq!(
        diagnostics.items()[0].location.range,
        Range::on_line(0, 23, 24)
    );
}

#[test]
fn select_1() {
    // let inc(x: Int): Int = x + 1
    // let f = 1.inc
    let input = namespace(vec![
        vec![let_fn(
            "inc",
            vec![],
            vec![param(8, "x", Some(builtin(11, "Int")))],
            Some(builtin(17, "Int")),
            binary(25, BinaryOp::Add, reference(23, local("x")), int(27, 1)),
        )],
        vec![let_(
            0,
            "f",
            None,
            Expr::Select {
                meta: at(8, Name::Nameless),
                receiver: Box::new(int(8, 1)),
                selection: tarn_syntax::Reference {
                    meta: at(10, let_name("inc")),
                    id: QualifiedId::new(Range::on_line(0, 10, 11), "inc"),
                },
            },
        )],
    ]);
    let ((output, _), diagnostics) = typecheck(&input);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    assert_eq!(declaration_type(&output, "f").as_deref(), Some("() -> Int"));
}

#[test]
fn type_error_message_1() {
    let error = TypeError::NoUniqueType {
        range: Range::EMPTY,
        name: Arc::from("f"),
        ty: Type::mk_function(
            vec![Type::mk_unsolved(0, tarn_syntax::Kind::Type)],
            Type::mk_unsolved(1, tarn_syntax::Kind::Type),
        ),
        unsolved: vec![String::from("?A1"), String::from("?B1")],
    };
    assert_eq!(
        error.to_string(),
        "Couldn't infer a unique type for f! Found: ?A1 -> ?B1, where ?A1, ?B1 are unsolved variables."
    );
    assert_eq!(error.range(), Range::EMPTY);

    let error = TypeError::MismatchedOperandType {
        range: Range::EMPTY,
        expected: ExpectedOperand::IntegralOrBoolean,
        actual: Type::BuiltIn(BuiltInType::Double),
    };
    assert_eq!(
        error.to_string(),
        "Mismatched operand type! Expected: An integral or boolean type, Actual: Double"
    );
}
