//! Rewriting the sorts carried by checked syntax trees.

use tarn_syntax::{
    r#type::{Attributes, Sort},
    Case, Constructor, ConstructorParam, Data, Declaration, Expr, FieldPattern, Let, LetFn, Meta,
    Param, Pattern, Reference, Type, TypeNode, TypeVarNode,
};

pub(crate) fn type_of(meta: &Meta<Attributes>) -> Type {
    match meta.meta.sort.unwrap_type() {
        Some(ty) => ty.clone(),
        None => panic!(
            "value has sort {} instead of a type",
            meta.meta.sort.render()
        ),
    }
}

pub(crate) fn map_meta(
    meta: &Meta<Attributes>,
    f: &mut impl FnMut(&Sort) -> Sort,
) -> Meta<Attributes> {
    Meta::new(
        meta.range,
        Attributes::new(meta.meta.name.clone(), f(&meta.meta.sort)),
    )
}

pub(crate) fn map_var(
    var: &TypeVarNode<Attributes>,
    f: &mut impl FnMut(&Sort) -> Sort,
) -> TypeVarNode<Attributes> {
    TypeVarNode {
        meta: map_meta(&var.meta, f),
        quantifier: var.quantifier,
        name: var.name.clone(),
    }
}

/// Rewrite the sort of every node in a type annotation.
pub(crate) fn map_type_node(
    node: &TypeNode<Attributes>,
    f: &mut impl FnMut(&Sort) -> Sort,
) -> TypeNode<Attributes> {
    match node {
        TypeNode::Quantified { meta, args, body } => TypeNode::Quantified {
            meta: map_meta(meta, f),
            args: args.iter().map(|arg| map_var(arg, f)).collect(),
            body: Box::new(map_type_node(body, f)),
        },
        TypeNode::Fun { meta, args, ret } => TypeNode::Fun {
            meta: map_meta(meta, f),
            args: args.iter().map(|arg| map_type_node(arg, f)).collect(),
            ret: Box::new(map_type_node(ret, f)),
        },
        TypeNode::Apply { meta, head, args } => TypeNode::Apply {
            meta: map_meta(meta, f),
            head: Box::new(map_type_node(head, f)),
            args: args.iter().map(|arg| map_type_node(arg, f)).collect(),
        },
        TypeNode::Reference { meta, id } => TypeNode::Reference {
            meta: map_meta(meta, f),
            id: id.clone(),
        },
        TypeNode::Var(var) => TypeNode::Var(map_var(var, f)),
    }
}

fn map_constructor(
    constructor: &Constructor<Attributes>,
    f: &mut impl FnMut(&Sort) -> Sort,
) -> Constructor<Attributes> {
    Constructor {
        meta: map_meta(&constructor.meta, f),
        name: constructor.name.clone(),
        params: constructor
            .params
            .iter()
            .map(|param| ConstructorParam {
                meta: map_meta(&param.meta, f),
                name: param.name.clone(),
                type_annotation: map_type_node(&param.type_annotation, f),
            })
            .collect(),
        return_type: constructor
            .return_type
            .as_ref()
            .map(|return_type| map_type_node(return_type, f)),
    }
}

fn map_data(data: &Data<Attributes>, f: &mut impl FnMut(&Sort) -> Sort) -> Data<Attributes> {
    Data {
        meta: map_meta(&data.meta, f),
        name: data.name.clone(),
        type_params: data.type_params.iter().map(|param| map_var(param, f)).collect(),
        constructors: data
            .constructors
            .iter()
            .map(|constructor| map_constructor(constructor, f))
            .collect(),
    }
}

fn map_let(let_: &Let<Attributes>, f: &mut impl FnMut(&Sort) -> Sort) -> Let<Attributes> {
    Let {
        meta: map_meta(&let_.meta, f),
        name: let_.name.clone(),
        type_annotation: let_
            .type_annotation
            .as_ref()
            .map(|annotation| map_type_node(annotation, f)),
        expr: map_expr(&let_.expr, f),
    }
}

fn map_let_fn(let_fn: &LetFn<Attributes>, f: &mut impl FnMut(&Sort) -> Sort) -> LetFn<Attributes> {
    LetFn {
        meta: map_meta(&let_fn.meta, f),
        name: let_fn.name.clone(),
        type_params: let_fn
            .type_params
            .iter()
            .map(|param| map_var(param, f))
            .collect(),
        value_params: let_fn
            .value_params
            .iter()
            .map(|param| map_param(param, f))
            .collect(),
        return_type: let_fn
            .return_type
            .as_ref()
            .map(|return_type| map_type_node(return_type, f)),
        expr: map_expr(&let_fn.expr, f),
    }
}

pub(crate) fn map_declaration(
    declaration: &Declaration<Attributes>,
    f: &mut impl FnMut(&Sort) -> Sort,
) -> Declaration<Attributes> {
    match declaration {
        Declaration::Data(data) => Declaration::Data(map_data(data, f)),
        Declaration::Let(let_) => Declaration::Let(map_let(let_, f)),
        Declaration::LetFn(let_fn) => Declaration::LetFn(map_let_fn(let_fn, f)),
    }
}

fn map_param(param: &Param<Attributes>, f: &mut impl FnMut(&Sort) -> Sort) -> Param<Attributes> {
    Param {
        meta: map_meta(&param.meta, f),
        name: param.name.clone(),
        type_annotation: param
            .type_annotation
            .as_ref()
            .map(|annotation| map_type_node(annotation, f)),
    }
}

fn map_reference(
    reference: &Reference<Attributes>,
    f: &mut impl FnMut(&Sort) -> Sort,
) -> Reference<Attributes> {
    Reference {
        meta: map_meta(&reference.meta, f),
        id: reference.id.clone(),
    }
}

fn map_case(case: &Case<Attributes>, f: &mut impl FnMut(&Sort) -> Sort) -> Case<Attributes> {
    Case {
        meta: map_meta(&case.meta, f),
        pattern: map_pattern(&case.pattern, f),
        consequent: map_expr(&case.consequent, f),
    }
}

fn map_pattern(pattern: &Pattern<Attributes>, f: &mut impl FnMut(&Sort) -> Sort) -> Pattern<Attributes> {
    match pattern {
        Pattern::Alias {
            meta,
            alias,
            pattern,
        } => Pattern::Alias {
            meta: map_meta(meta, f),
            alias: alias.clone(),
            pattern: Box::new(map_pattern(pattern, f)),
        },
        Pattern::Constructor { meta, id, fields } => Pattern::Constructor {
            meta: map_meta(meta, f),
            id: id.clone(),
            fields: fields
                .iter()
                .map(|field| FieldPattern {
                    meta: map_meta(&field.meta, f),
                    field: field.field.clone(),
                    pattern: field.pattern.as_ref().map(|pattern| map_pattern(pattern, f)),
                })
                .collect(),
        },
        Pattern::Id { meta, name } => Pattern::Id {
            meta: map_meta(meta, f),
            name: name.clone(),
        },
        Pattern::Literal { meta, value } => Pattern::Literal {
            meta: map_meta(meta, f),
            value: value.clone(),
        },
    }
}

/// Rewrite the sort of every node in an expression, including its patterns and annotations.
pub(crate) fn map_expr(expr: &Expr<Attributes>, f: &mut impl FnMut(&Sort) -> Sort) -> Expr<Attributes> {
    match expr {
        Expr::Block { meta, lets, result } => Expr::Block {
            meta: map_meta(meta, f),
            lets: lets.iter().map(|let_| map_let(let_, f)).collect(),
            result: result.as_ref().map(|result| Box::new(map_expr(result, f))),
        },
        Expr::If {
            meta,
            condition,
            consequent,
            alternative,
        } => Expr::If {
            meta: map_meta(meta, f),
            condition: Box::new(map_expr(condition, f)),
            consequent: Box::new(map_expr(consequent, f)),
            alternative: Box::new(map_expr(alternative, f)),
        },
        Expr::Lambda { meta, params, body } => Expr::Lambda {
            meta: map_meta(meta, f),
            params: params.iter().map(|param| map_param(param, f)).collect(),
            body: Box::new(map_expr(body, f)),
        },
        Expr::Match {
            meta,
            scrutinee,
            cases,
        } => Expr::Match {
            meta: map_meta(meta, f),
            scrutinee: Box::new(map_expr(scrutinee, f)),
            cases: cases.iter().map(|case| map_case(case, f)).collect(),
        },
        Expr::Apply {
            meta,
            function,
            args,
        } => Expr::Apply {
            meta: map_meta(meta, f),
            function: Box::new(map_expr(function, f)),
            args: args.iter().map(|arg| map_expr(arg, f)).collect(),
        },
        Expr::Select {
            meta,
            receiver,
            selection,
        } => Expr::Select {
            meta: map_meta(meta, f),
            receiver: Box::new(map_expr(receiver, f)),
            selection: map_reference(selection, f),
        },
        Expr::Reference(reference) => Expr::Reference(map_reference(reference, f)),
        Expr::BinaryOp {
            meta,
            operator,
            left,
            right,
        } => Expr::BinaryOp {
            meta: map_meta(meta, f),
            operator: *operator,
            left: Box::new(map_expr(left, f)),
            right: Box::new(map_expr(right, f)),
        },
        Expr::UnaryOp {
            meta,
            operator,
            operand,
        } => Expr::UnaryOp {
            meta: map_meta(meta, f),
            operator: *operator,
            operand: Box::new(map_expr(operand, f)),
        },
        Expr::Literal { meta, value } => Expr::Literal {
            meta: map_meta(meta, f),
            value: value.clone(),
        },
    }
}
