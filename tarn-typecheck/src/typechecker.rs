//! Type inference and checking for namespaces, declarations, expressions and patterns.

#[cfg(test)]
mod test;

use crate::{
    annotation::kind_of,
    environment::TypeEnvironment,
    kindchecker::{KindError, Kindchecker},
    sorts::{map_declaration, map_expr, type_of},
    subtyping, TypingScope,
};
use fnv::FnvHashMap;
use std::sync::Arc;
use tarn_diagnostic::{LocalDiagnosticReporter, Range};
use tarn_scope::{ScopeKind, ScopeTag};
use tarn_syntax::{
    names::ConstructorName,
    r#type::{Attributes, BuiltInType, Sort},
    BinaryOp, Case, Data, Declaration, Expr, FieldPattern, Kind, Let, LetFn, Meta, Name,
    Namespace, Param, Pattern, Reference, Type, TypeNode, TypeVarNode, UnaryOp,
};

/// What an operator accepts, for operand mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedOperand {
    Numeric,
    Integral,
    Int,
    Boolean,
    IntegralOrBoolean,
}

impl ExpectedOperand {
    pub fn render(&self) -> &'static str {
        match self {
            ExpectedOperand::Numeric => "A numeric type",
            ExpectedOperand::Integral => "An integral type",
            ExpectedOperand::Int => "Int",
            ExpectedOperand::Boolean => "Boolean",
            ExpectedOperand::IntegralOrBoolean => "An integral or boolean type",
        }
    }

    /// An operand is accepted when it is a subtype of any of these.
    fn candidates(&self) -> &'static [BuiltInType] {
        match self {
            ExpectedOperand::Numeric => &[BuiltInType::Long, BuiltInType::Double],
            ExpectedOperand::Integral => &[BuiltInType::Long],
            ExpectedOperand::Int => &[BuiltInType::Int],
            ExpectedOperand::Boolean => &[BuiltInType::Boolean],
            ExpectedOperand::IntegralOrBoolean => &[BuiltInType::Long, BuiltInType::Boolean],
        }
    }
}

fn describe_unsolved(unsolved: &[String]) -> String {
    if unsolved.len() > 1 {
        format!("{} are unsolved variables.", unsolved.join(", "))
    } else {
        format!("{} is an unsolved variable.", unsolved.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("Mismatched type! Expected: {}, Actual: {}", .expected.render(), .actual.render())]
    MismatchedType {
        range: Range,
        expected: Type,
        actual: Type,
    },
    #[error(
        "Mismatched operand type! Expected: {}, Actual: {}",
        .expected.render(),
        .actual.render()
    )]
    MismatchedOperandType {
        range: Range,
        expected: ExpectedOperand,
        actual: Type,
    },
    #[error("Mismatched operand types! Left: {}, Right: {}", .left.render(), .right.render())]
    MismatchedOperandTypes { range: Range, left: Type, right: Type },
    #[error(
        "Mismatched application! Expected: {}, Actual: {}",
        .expected.render(),
        .actual.render()
    )]
    MismatchedApplication {
        range: Range,
        expected: Type,
        actual: Type,
    },
    #[error(
        "Couldn't infer a unique type for {}! Found: {}, where {}",
        .name,
        .ty.render(),
        describe_unsolved(.unsolved)
    )]
    NoUniqueType {
        range: Range,
        name: Arc<str>,
        ty: Type,
        unsolved: Vec<String>,
    },
}

impl TypeError {
    pub fn range(&self) -> Range {
        match self {
            TypeError::MismatchedType { range, .. } => *range,
            TypeError::MismatchedOperandType { range, .. } => *range,
            TypeError::MismatchedOperandTypes { range, .. } => *range,
            TypeError::MismatchedApplication { range, .. } => *range,
            TypeError::NoUniqueType { range, .. } => *range,
        }
    }
}

/// How a binary operator relates its operands.
enum Operands {
    /// Both operands share a type, which must be accepted by the operator.
    Same(ExpectedOperand),
    /// An integral value shifted by an `Int`.
    Shift,
    /// Either operand may be a subtype of the other.
    Equality,
}

/// The operands an operator takes, and whether it returns `Boolean` instead of its operand type.
fn operands(operator: BinaryOp) -> (Operands, bool) {
    match operator {
        BinaryOp::Power
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulus
        | BinaryOp::Add
        | BinaryOp::Subtract => (Operands::Same(ExpectedOperand::Numeric), false),
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight | BinaryOp::UnsignedShiftRight => {
            (Operands::Shift, false)
        }
        BinaryOp::BitwiseAnd | BinaryOp::BitwiseOr | BinaryOp::BitwiseXor => {
            (Operands::Same(ExpectedOperand::IntegralOrBoolean), false)
        }
        BinaryOp::LessThan
        | BinaryOp::LessThanEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanEqual => (Operands::Same(ExpectedOperand::Numeric), true),
        BinaryOp::Equal | BinaryOp::NotEqual => (Operands::Equality, true),
        BinaryOp::BooleanAnd | BinaryOp::BooleanOr => {
            (Operands::Same(ExpectedOperand::Boolean), true)
        }
    }
}

fn boolean() -> Type {
    Type::BuiltIn(BuiltInType::Boolean)
}

fn typed(meta: &Meta<Name>, ty: Type) -> Meta<Attributes> {
    Meta::new(meta.range, Attributes::new(meta.meta.clone(), Sort::Type(ty)))
}

/**
Infers and checks the types of a renamed namespace.

Type errors are reported as diagnostics; checking carries on with fresh
unsolved types wherever an error leaves a type unknown.
*/
pub struct Typechecker<'a> {
    kindchecker: Kindchecker<'a>,
}

impl<'a> Typechecker<'a> {
    pub fn new(reporter: LocalDiagnosticReporter<'a>, environment: TypeEnvironment) -> Self {
        Typechecker {
            kindchecker: Kindchecker::new(reporter, environment),
        }
    }

    pub fn environment(&self) -> &TypeEnvironment {
        self.kindchecker.environment()
    }

    pub fn environment_mut(&mut self) -> &mut TypeEnvironment {
        self.kindchecker.environment_mut()
    }

    pub fn into_environment(self) -> TypeEnvironment {
        self.kindchecker.into_environment()
    }

    fn report(&mut self, error: TypeError) {
        log::debug!("type error: {}", error);
        self.kindchecker.report_error(error.range(), error.to_string());
    }

    fn mismatched_type(&mut self, range: Range, expected: &Type, actual: &Type) {
        let expected = self.substitute(expected);
        let actual = self.substitute(actual);
        self.report(TypeError::MismatchedType {
            range,
            expected,
            actual,
        });
    }

    fn mismatched_operand(&mut self, range: Range, expected: ExpectedOperand, actual: &Type) {
        let actual = self.substitute(actual);
        self.report(TypeError::MismatchedOperandType {
            range,
            expected,
            actual,
        });
    }

    fn fresh_type(&mut self) -> Type {
        self.environment_mut().new_unsolved_type(Kind::Type)
    }

    fn substitute(&mut self, ty: &Type) -> Type {
        self.environment_mut().substitute_type(ty)
    }

    pub fn check_sub_type(&mut self, sub: &Type, sup: &Type) -> bool {
        subtyping::check_sub_type(self.environment_mut(), sub, sup)
    }

    fn check_operand(&mut self, ty: &Type, expected: ExpectedOperand) -> bool {
        expected
            .candidates()
            .iter()
            .any(|candidate| self.check_sub_type(ty, &Type::BuiltIn(*candidate)))
    }

    /// Instantiate the universal binders of a polymorphic type, until it is no longer quantified.
    fn instantiate_polymorphic(&mut self, ty: &Type) -> Type {
        let mut ty = self.substitute(ty);
        while let Type::Quantified(quantified) = &ty {
            let quantified = quantified.clone();
            ty = subtyping::instantiate_sub(self.environment_mut(), &quantified);
        }
        ty
    }

    /// The type bound to a resolved name, or a fresh type when it has none.
    fn type_of_name(&mut self, name: &Name) -> Type {
        let bound = if name.is_nameless() {
            None
        } else {
            self.environment()
                .lookup_value(&name.canonical_name())
                .and_then(|meta| meta.meta.sort.unwrap_type())
                .cloned()
        };
        match bound {
            Some(ty) => self.substitute(&ty),
            None => self.fresh_type(),
        }
    }

    /// Solve the unsolved type a top-level name was populated with.
    fn settle_placeholder(&mut self, key: &str, ty: &Type) {
        let bound = match self
            .environment()
            .lookup_value(key)
            .and_then(|meta| meta.meta.sort.unwrap_type())
        {
            Some(bound) => bound.clone(),
            None => return,
        };
        let ty = self.substitute(ty);
        if let Type::Unsolved(placeholder) = self.substitute(&bound) {
            if !ty.occurs(&placeholder) {
                self.environment_mut().solve_type_for_name(key, &ty);
            }
        }
    }

    /// Bind a value under its local name, and under its canonical name when it is a top-level declaration.
    fn bind_value(&mut self, local_name: &str, meta: Meta<Attributes>) {
        if meta.meta.name.declaration_name().is_some() {
            let key = meta.meta.name.canonical_name();
            if let Some(ty) = meta.meta.sort.unwrap_type() {
                self.settle_placeholder(&key, ty);
            }
            self.environment_mut().put_value(&key, meta.clone());
        }
        self.environment_mut().put_value(local_name, meta);
    }

    /// Bind every top-level name to a fresh unsolved kind or type, so that declarations can refer to each other.
    fn populate_top_level(&mut self, namespace: &Namespace<Name>) {
        for declaration in namespace.declarations() {
            match declaration {
                Declaration::Data(data) => {
                    let kind = self.environment_mut().new_unsolved_kind();
                    let meta = Meta::new(
                        data.meta.range,
                        Attributes::new(data.meta.meta.clone(), Sort::Kind(kind)),
                    );
                    self.environment_mut().put_type(&data.name, meta.clone());
                    self.environment_mut()
                        .put_type(&data.meta.meta.canonical_name(), meta);

                    for constructor in &data.constructors {
                        let ty = self.fresh_type();
                        let meta = typed(&constructor.meta, ty);
                        self.environment_mut()
                            .put_value(&constructor.name, meta.clone());
                        self.environment_mut()
                            .put_value(&constructor.meta.meta.canonical_name(), meta);

                        if let Name::Constructor(constructor_name) = &constructor.meta.meta {
                            for param in &constructor.params {
                                let ty = self.fresh_type();
                                self.environment_mut().put_field(
                                    constructor_name,
                                    &param.name,
                                    typed(&param.meta, ty),
                                );
                            }
                        }
                    }
                }
                Declaration::Let(_) | Declaration::LetFn(_) => {
                    let ty = self.fresh_type();
                    let meta = typed(declaration.meta(), ty);
                    self.environment_mut()
                        .put_value(declaration.name(), meta.clone());
                    self.environment_mut()
                        .put_value(&declaration.meta().meta.canonical_name(), meta);
                }
            }
        }
    }

    /**
    Infer the types of every declaration in a namespace.

    Declaration groups are checked in order. Once a group is done, its types
    are substituted, unsolved kinds default to `*`, and any declaration whose
    type still mentions unsolved types is reported.

    Returns the typed namespace, and the scope holding its top-level bindings.
    */
    pub fn typecheck_namespace(
        &mut self,
        namespace: &Namespace<Name>,
    ) -> (Namespace<Attributes>, TypingScope) {
        self.environment_mut()
            .push_scope(ScopeKind::Namespace(namespace.id.to_name()));
        self.populate_top_level(namespace);

        let meta = typed(&namespace.meta, Type::BuiltIn(BuiltInType::Unit));
        let declaration_groups = namespace
            .declaration_groups
            .iter()
            .map(|group| self.infer_declaration_group(group))
            .collect();

        let scope = self.environment_mut().pop_scope(ScopeTag::Namespace);
        (
            Namespace {
                meta,
                id: namespace.id.clone(),
                imports: namespace.imports.clone(),
                declaration_groups,
            },
            scope,
        )
    }

    fn infer_declaration_group(&mut self, group: &[Declaration<Name>]) -> Vec<Declaration<Attributes>> {
        let inferred: Vec<Declaration<Attributes>> = group
            .iter()
            .map(|declaration| self.infer_declaration(declaration))
            .collect();

        inferred
            .iter()
            .map(|declaration| {
                let declaration = {
                    let environment = self.environment_mut();
                    map_declaration(declaration, &mut |sort| environment.default_sort(sort))
                };
                self.check_principal_type(&declaration);
                self.update_top_level(&declaration);
                declaration
            })
            .collect()
    }

    fn check_principal_type(&mut self, declaration: &Declaration<Attributes>) {
        if let Declaration::Data(_) = declaration {
            return;
        }

        let meta = declaration.meta();
        let ty = type_of(meta);
        let mut unsolved: Vec<String> = Vec::new();
        for variable in ty.iter_unsolved() {
            let name = variable.name();
            if !unsolved.contains(&name) {
                unsolved.push(name);
            }
        }
        if !unsolved.is_empty() {
            self.report(TypeError::NoUniqueType {
                range: meta.range,
                name: declaration.name().clone(),
                ty,
                unsolved,
            });
        }
    }

    fn update_top_level(&mut self, declaration: &Declaration<Attributes>) {
        if let Declaration::Data(_) = declaration {
            return;
        }

        let meta = declaration.meta();
        log::debug!(
            "{} : {}",
            meta.meta.name.canonical_name(),
            meta.meta.sort.render()
        );
        self.environment_mut()
            .put_value(declaration.name(), meta.clone());
        self.environment_mut()
            .put_value(&meta.meta.name.canonical_name(), meta.clone());
    }

    /**
    Infer the type of a single declaration, binding it in the innermost scope.

    # Panics

    When the declaration hasn't been renamed.
    */
    pub fn infer_declaration(&mut self, declaration: &Declaration<Name>) -> Declaration<Attributes> {
        match declaration {
            Declaration::Data(data) => Declaration::Data(self.infer_data(data)),
            Declaration::Let(let_) => Declaration::Let(self.infer_let(let_)),
            Declaration::LetFn(let_fn) => Declaration::LetFn(self.infer_let_fn(let_fn)),
        }
    }

    fn infer_data(&mut self, data: &Data<Name>) -> Data<Attributes> {
        let placeholder = self
            .environment()
            .lookup_type(&data.meta.meta.canonical_name())
            .and_then(|meta| meta.meta.sort.unwrap_kind())
            .cloned();

        let data = self.kindchecker.infer_data(data);

        if let Some(placeholder) = placeholder {
            let kind = kind_of(&data.meta);
            if !self.kindchecker.check_sub_kind(&kind, &placeholder) {
                let placeholder = self.environment_mut().substitute_kind(&placeholder);
                self.kindchecker
                    .report(KindError::mismatch(data.meta.range, &placeholder, &kind));
            }
        }
        self.check_constructor_return_types(&data);
        data
    }

    /// An explicit constructor return type must be an instance of its data type.
    fn check_constructor_return_types(&mut self, data: &Data<Attributes>) {
        let data_name = match &data.meta.meta.name {
            Name::Data(name) => name.clone(),
            _ => return,
        };

        for constructor in &data.constructors {
            let (constructor_name, return_type) =
                match (&constructor.meta.meta.name, &constructor.return_type) {
                    (Name::Constructor(name), Some(return_type)) => (name.clone(), return_type),
                    _ => continue,
                };

            self.environment_mut()
                .push_scope(ScopeKind::Constructor(constructor_name));
            let params: Vec<Type> = data
                .type_params
                .iter()
                .map(|param| {
                    let kind = kind_of(&param.meta);
                    self.environment_mut().new_unsolved_type(kind)
                })
                .collect();
            let head = Type::Constructor(data_name.0.clone(), kind_of(&data.meta));
            let data_type = if params.is_empty() {
                head
            } else {
                Type::mk_apply(head, params, Kind::Type)
            };
            let actual = self.kindchecker.to_type(return_type);
            if !self.check_sub_type(&data_type, &actual) {
                self.mismatched_type(return_type.meta().range, &data_type, &actual);
            }
            self.environment_mut().pop_scope(ScopeTag::Constructor);
        }
    }

    fn infer_annotation(&mut self, annotation: &TypeNode<Name>) -> (TypeNode<Attributes>, Type) {
        let node = self.kindchecker.kindcheck_type(annotation);
        let ty = self.kindchecker.to_type(&node);
        (node, ty)
    }

    /// Top-level lets are bound before their body is checked, so that they can refer to themselves.
    fn infer_let(&mut self, let_: &Let<Name>) -> Let<Attributes> {
        let top_level = let_.meta.meta.declaration_name().is_some();
        match &let_.type_annotation {
            Some(annotation) => {
                let (annotation, expected) = self.infer_annotation(annotation);
                let meta = typed(&let_.meta, expected.clone());
                if top_level {
                    self.bind_value(&let_.name, meta.clone());
                }
                let expr = self.check_expr(&let_.expr, &expected);
                if !top_level {
                    self.bind_value(&let_.name, meta.clone());
                }
                Let {
                    meta,
                    name: let_.name.clone(),
                    type_annotation: Some(annotation),
                    expr,
                }
            }
            None => {
                let expr = self.infer_expr(&let_.expr);
                let meta = typed(&let_.meta, type_of(expr.meta()));
                self.bind_value(&let_.name, meta.clone());
                Let {
                    meta,
                    name: let_.name.clone(),
                    type_annotation: None,
                    expr,
                }
            }
        }
    }

    /// `[type_params] { (value_params) -> return_type }`
    fn let_fn_type(
        &mut self,
        type_params: &[TypeVarNode<Attributes>],
        value_params: &[Param<Attributes>],
        return_type: Type,
    ) -> Type {
        let function = Type::mk_function(
            value_params
                .iter()
                .map(|param| type_of(&param.meta))
                .collect(),
            return_type,
        );
        if type_params.is_empty() {
            function
        } else {
            let args = type_params
                .iter()
                .map(|param| self.kindchecker.to_type(&TypeNode::Var(param.clone())))
                .collect();
            Type::mk_quantified(args, function, Kind::Type)
        }
    }

    fn infer_let_fn(&mut self, let_fn: &LetFn<Name>) -> LetFn<Attributes> {
        let let_name = match &let_fn.meta.meta {
            Name::Let(name) => name.clone(),
            other => panic!("{:?} is not a top-level let", other),
        };

        self.environment_mut().push_scope(ScopeKind::Let(let_name));
        let type_params: Vec<TypeVarNode<Attributes>> = let_fn
            .type_params
            .iter()
            .map(|param| self.kindchecker.infer_type_var(param))
            .collect();

        self.environment_mut().push_scope(ScopeKind::Lambda);
        let value_params: Vec<Param<Attributes>> = let_fn
            .value_params
            .iter()
            .map(|param| self.infer_param(param))
            .collect();
        let (return_type, expected_return) = match &let_fn.return_type {
            Some(return_type) => {
                let (node, ty) = self.infer_annotation(return_type);
                (Some(node), ty)
            }
            None => (None, self.fresh_type()),
        };

        let expected = self.let_fn_type(&type_params, &value_params, expected_return.clone());
        self.bind_value(&let_fn.name, typed(&let_fn.meta, expected));

        let expr = match &return_type {
            Some(_) => self.check_expr(&let_fn.expr, &expected_return),
            None => {
                let expr = self.infer_expr(&let_fn.expr);
                self.check_sub_type(&type_of(expr.meta()), &expected_return);
                expr
            }
        };
        let ty = self.let_fn_type(&type_params, &value_params, type_of(expr.meta()));
        self.environment_mut().pop_scope(ScopeTag::Lambda);
        self.environment_mut().pop_scope(ScopeTag::Let);

        let meta = typed(&let_fn.meta, ty);
        self.bind_value(&let_fn.name, meta.clone());
        LetFn {
            meta,
            name: let_fn.name.clone(),
            type_params,
            value_params,
            return_type,
            expr,
        }
    }

    fn infer_param(&mut self, param: &Param<Name>) -> Param<Attributes> {
        let (type_annotation, ty) = match &param.type_annotation {
            Some(annotation) => {
                let (node, ty) = self.infer_annotation(annotation);
                (Some(node), ty)
            }
            None => (None, self.fresh_type()),
        };
        let meta = typed(&param.meta, ty);
        self.environment_mut().put_value(&param.name, meta.clone());
        Param {
            meta,
            name: param.name.clone(),
            type_annotation,
        }
    }

    fn check_param(&mut self, param: &Param<Name>, expected: &Type) -> Param<Attributes> {
        let (type_annotation, ty) = match &param.type_annotation {
            Some(annotation) => {
                let (node, ty) = self.infer_annotation(annotation);
                if !self.check_sub_type(expected, &ty) {
                    self.mismatched_type(param.meta.range, expected, &ty);
                }
                (Some(node), ty)
            }
            None => (None, expected.clone()),
        };
        let meta = typed(&param.meta, ty);
        self.environment_mut().put_value(&param.name, meta.clone());
        Param {
            meta,
            name: param.name.clone(),
            type_annotation,
        }
    }

    fn infer_reference(&mut self, reference: &Reference<Name>) -> Reference<Attributes> {
        let ty = self.type_of_name(&reference.meta.meta);
        Reference {
            meta: typed(&reference.meta, ty),
            id: reference.id.clone(),
        }
    }

    /// Infer the type of an expression. Every node of the result carries its type.
    pub fn infer_expr(&mut self, expr: &Expr<Name>) -> Expr<Attributes> {
        match expr {
            Expr::Block { meta, lets, result } => {
                self.environment_mut().push_scope(ScopeKind::Block);
                let lets: Vec<Let<Attributes>> =
                    lets.iter().map(|let_| self.infer_let(let_)).collect();
                let result = result
                    .as_ref()
                    .map(|result| Box::new(self.infer_expr(result)));
                let ty = match &result {
                    Some(result) => type_of(result.meta()),
                    None => Type::BuiltIn(BuiltInType::Unit),
                };
                self.environment_mut().pop_scope(ScopeTag::Block);
                Expr::Block {
                    meta: typed(meta, ty),
                    lets,
                    result,
                }
            }
            Expr::If {
                meta,
                condition,
                consequent,
                alternative,
            } => {
                let condition = self.check_expr(condition, &boolean());
                let ty = self.fresh_type();
                let consequent = self.check_expr(consequent, &ty);
                let alternative = self.check_expr(alternative, &ty);
                Expr::If {
                    meta: typed(meta, ty),
                    condition: Box::new(condition),
                    consequent: Box::new(consequent),
                    alternative: Box::new(alternative),
                }
            }
            Expr::Lambda { meta, params, body } => {
                self.environment_mut().push_scope(ScopeKind::Lambda);
                let params: Vec<Param<Attributes>> =
                    params.iter().map(|param| self.infer_param(param)).collect();
                let body = self.infer_expr(body);
                let ty = Type::mk_function(
                    params.iter().map(|param| type_of(&param.meta)).collect(),
                    type_of(body.meta()),
                );
                self.environment_mut().pop_scope(ScopeTag::Lambda);
                Expr::Lambda {
                    meta: typed(meta, ty),
                    params,
                    body: Box::new(body),
                }
            }
            Expr::Match {
                meta,
                scrutinee,
                cases,
            } => {
                let scrutinee = self.infer_expr(scrutinee);
                let scrutinee_type = type_of(scrutinee.meta());
                let ty = self.fresh_type();
                let cases = cases
                    .iter()
                    .map(|case| self.check_case(case, &scrutinee_type, &ty))
                    .collect();
                Expr::Match {
                    meta: typed(meta, ty),
                    scrutinee: Box::new(scrutinee),
                    cases,
                }
            }
            Expr::Apply {
                meta,
                function,
                args,
            } => self.infer_apply(meta, function, args),
            Expr::Select {
                meta,
                receiver,
                selection,
            } => {
                let selection = self.infer_reference(selection);
                let selection_type = self.instantiate_polymorphic(&type_of(&selection.meta));
                let (receiver, ty) = match selection_type.unwrap_function() {
                    Some((params, ret)) if !params.is_empty() => {
                        let first = params[0].clone();
                        let rest = Type::mk_function(params[1..].to_vec(), ret.clone());
                        (self.check_expr(receiver, &first), rest)
                    }
                    _ => {
                        let receiver = self.infer_expr(receiver);
                        (receiver, self.fresh_type())
                    }
                };
                Expr::Select {
                    meta: typed(meta, ty),
                    receiver: Box::new(receiver),
                    selection,
                }
            }
            Expr::Reference(reference) => Expr::Reference(self.infer_reference(reference)),
            Expr::BinaryOp {
                meta,
                operator,
                left,
                right,
            } => self.infer_binary_op(meta, *operator, left, right),
            Expr::UnaryOp {
                meta,
                operator,
                operand,
            } => self.infer_unary_op(meta, *operator, operand),
            Expr::Literal { meta, value } => Expr::Literal {
                meta: typed(meta, Type::BuiltIn(value.builtin_type())),
                value: value.clone(),
            },
        }
    }

    fn infer_apply(
        &mut self,
        meta: &Meta<Name>,
        function: &Expr<Name>,
        args: &[Expr<Name>],
    ) -> Expr<Attributes> {
        let function = self.infer_expr(function);
        let function_type = self.instantiate_polymorphic(&type_of(function.meta()));

        let (param_types, return_type) = match function_type.unwrap_function() {
            Some((params, ret)) if params.len() == args.len() => (params.to_vec(), ret.clone()),
            _ => {
                let param_types: Vec<Type> = args.iter().map(|_| self.fresh_type()).collect();
                let return_type = self.fresh_type();
                let expected = Type::mk_function(param_types.clone(), return_type.clone());
                let applied =
                    function_type.is_unsolved() && self.check_sub_type(&function_type, &expected);
                if !applied {
                    self.report(TypeError::MismatchedApplication {
                        range: meta.range,
                        expected,
                        actual: function_type.clone(),
                    });
                }
                (param_types, return_type)
            }
        };

        let args = args
            .iter()
            .zip(param_types.iter())
            .map(|(arg, ty)| self.check_expr(arg, ty))
            .collect();
        Expr::Apply {
            meta: typed(meta, return_type),
            function: Box::new(function),
            args,
        }
    }

    fn infer_unary_op(
        &mut self,
        meta: &Meta<Name>,
        operator: UnaryOp,
        operand: &Expr<Name>,
    ) -> Expr<Attributes> {
        let operand = self.infer_expr(operand);
        let operand_type = type_of(operand.meta());
        let expected = match operator {
            UnaryOp::BooleanNot => ExpectedOperand::Boolean,
            UnaryOp::BitwiseNot => ExpectedOperand::Integral,
            UnaryOp::Negate => ExpectedOperand::Numeric,
        };

        let valid = self.check_operand(&operand_type, expected);
        if !valid {
            self.mismatched_operand(operand.meta().range, expected, &operand_type);
        }
        let ty = match operator {
            UnaryOp::BooleanNot => boolean(),
            _ if valid => operand_type,
            _ => self.fresh_type(),
        };

        Expr::UnaryOp {
            meta: typed(meta, ty),
            operator,
            operand: Box::new(operand),
        }
    }

    fn infer_binary_op(
        &mut self,
        meta: &Meta<Name>,
        operator: BinaryOp,
        left: &Expr<Name>,
        right: &Expr<Name>,
    ) -> Expr<Attributes> {
        let left = self.infer_expr(left);
        let left_type = type_of(left.meta());
        let (operands, returns_boolean) = operands(operator);

        let (right, operand_type) = match operands {
            Operands::Same(expected) => {
                if self.check_operand(&left_type, expected) {
                    (self.check_expr(right, &left_type), left_type)
                } else {
                    self.mismatched_operand(left.meta().range, expected, &left_type);
                    let right = self.infer_expr(right);
                    let right_type = type_of(right.meta());
                    let operand_type = if self.check_operand(&right_type, expected) {
                        right_type
                    } else {
                        self.mismatched_operand(right.meta().range, expected, &right_type);
                        self.fresh_type()
                    };
                    (right, operand_type)
                }
            }
            Operands::Shift => {
                let left_valid = self.check_operand(&left_type, ExpectedOperand::Integral);
                if !left_valid {
                    self.mismatched_operand(left.meta().range, ExpectedOperand::Integral, &left_type);
                }
                let right = self.infer_expr(right);
                let right_type = type_of(right.meta());
                if !self.check_operand(&right_type, ExpectedOperand::Int) {
                    self.mismatched_operand(right.meta().range, ExpectedOperand::Int, &right_type);
                }
                let operand_type = if left_valid {
                    left_type
                } else {
                    self.fresh_type()
                };
                (right, operand_type)
            }
            Operands::Equality => {
                let right = self.infer_expr(right);
                let right_type = type_of(right.meta());
                if !self.check_sub_type(&left_type, &right_type)
                    && !self.check_sub_type(&right_type, &left_type)
                {
                    let left_solved = self.substitute(&left_type);
                    let right_solved = self.substitute(&right_type);
                    self.report(TypeError::MismatchedOperandTypes {
                        range: meta.range,
                        left: left_solved,
                        right: right_solved,
                    });
                }
                (right, left_type)
            }
        };

        let ty = if returns_boolean {
            boolean()
        } else {
            operand_type
        };
        Expr::BinaryOp {
            meta: typed(meta, ty),
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Infer `expr`, then check that its type can be used where `expected` is.
    fn subsume(&mut self, expr: &Expr<Name>, expected: &Type) -> Expr<Attributes> {
        let inferred = self.infer_expr(expr);
        let actual = type_of(inferred.meta());
        if !self.check_sub_type(&actual, expected) {
            self.mismatched_type(expr.meta().range, expected, &actual);
        }
        inferred
    }

    /**
    Check an expression against an expected type, reporting a mismatch.

    Checking against a quantified type makes its universal binders rigid for
    the duration of the check.
    */
    pub fn check_expr(&mut self, expr: &Expr<Name>, expected: &Type) -> Expr<Attributes> {
        let expected = self.substitute(expected);
        if let Type::Quantified(quantified) = &expected {
            let quantified = quantified.clone();
            self.environment_mut().push_scope(ScopeKind::InstantiateType);
            let body = subtyping::instantiate_super(self.environment_mut(), &quantified);
            let checked = self.check_expr(expr, &body);
            let checked = {
                let environment = self.environment_mut();
                map_expr(&checked, &mut |sort| environment.substitute_sort(sort))
            };
            self.environment_mut().pop_scope(ScopeTag::InstantiateType);
            return checked;
        }

        match expr {
            Expr::Block { meta, lets, result } => {
                self.environment_mut().push_scope(ScopeKind::Block);
                let lets: Vec<Let<Attributes>> =
                    lets.iter().map(|let_| self.infer_let(let_)).collect();
                let result = match result {
                    Some(result) => Some(Box::new(self.check_expr(result, &expected))),
                    None => {
                        let unit = Type::BuiltIn(BuiltInType::Unit);
                        if !self.check_sub_type(&unit, &expected) {
                            self.mismatched_type(meta.range, &expected, &unit);
                        }
                        None
                    }
                };
                self.environment_mut().pop_scope(ScopeTag::Block);
                Expr::Block {
                    meta: typed(meta, expected),
                    lets,
                    result,
                }
            }
            Expr::Lambda { meta, params, body } => match expected.unwrap_function() {
                Some((param_types, return_type)) if param_types.len() == params.len() => {
                    let param_types = param_types.to_vec();
                    let return_type = return_type.clone();
                    self.environment_mut().push_scope(ScopeKind::Lambda);
                    let params = params
                        .iter()
                        .zip(param_types.iter())
                        .map(|(param, ty)| self.check_param(param, ty))
                        .collect();
                    let body = self.check_expr(body, &return_type);
                    self.environment_mut().pop_scope(ScopeTag::Lambda);
                    Expr::Lambda {
                        meta: typed(meta, expected.clone()),
                        params,
                        body: Box::new(body),
                    }
                }
                _ => self.subsume(expr, &expected),
            },
            Expr::If {
                meta,
                condition,
                consequent,
                alternative,
            } => {
                let condition = self.check_expr(condition, &boolean());
                let consequent = self.check_expr(consequent, &expected);
                let alternative = self.check_expr(alternative, &expected);
                Expr::If {
                    meta: typed(meta, expected),
                    condition: Box::new(condition),
                    consequent: Box::new(consequent),
                    alternative: Box::new(alternative),
                }
            }
            Expr::Match {
                meta,
                scrutinee,
                cases,
            } => {
                let scrutinee = self.infer_expr(scrutinee);
                let scrutinee_type = type_of(scrutinee.meta());
                let cases = cases
                    .iter()
                    .map(|case| self.check_case(case, &scrutinee_type, &expected))
                    .collect();
                Expr::Match {
                    meta: typed(meta, expected),
                    scrutinee: Box::new(scrutinee),
                    cases,
                }
            }
            Expr::Literal { meta, value } => {
                let actual = Type::BuiltIn(value.builtin_type());
                if !self.check_sub_type(&actual, &expected) {
                    self.mismatched_type(meta.range, &expected, &actual);
                }
                Expr::Literal {
                    meta: typed(meta, expected),
                    value: value.clone(),
                }
            }
            _ => self.subsume(expr, &expected),
        }
    }

    fn check_case(
        &mut self,
        case: &Case<Name>,
        scrutinee_type: &Type,
        expected: &Type,
    ) -> Case<Attributes> {
        self.environment_mut().push_scope(ScopeKind::Case);
        let pattern = self.check_pattern(&case.pattern, scrutinee_type);
        let consequent = self.check_expr(&case.consequent, expected);
        self.environment_mut().pop_scope(ScopeTag::Case);
        Case {
            meta: typed(&case.meta, expected.clone()),
            pattern,
            consequent,
        }
    }

    /// Instantiate a constructor's type parameters. The instantiation is returned for its fields.
    fn instantiate_constructor(&mut self, ty: &Type) -> (Type, FnvHashMap<Arc<str>, Type>) {
        let mut substitution = FnvHashMap::default();
        match ty {
            Type::Quantified(quantified) => {
                for arg in &quantified.args {
                    if let Type::ForAllVar(var) | Type::ExistsVar(var) = arg {
                        let kind = self.environment_mut().substitute_kind(&var.kind);
                        let fresh = self.environment_mut().new_unsolved_type(kind);
                        substitution.insert(var.name.clone(), fresh);
                    }
                }
                (quantified.body.instantiate(&substitution), substitution)
            }
            _ => (ty.clone(), substitution),
        }
    }

    fn check_field_pattern(
        &mut self,
        constructor: Option<&ConstructorName>,
        field: &FieldPattern<Name>,
        substitution: &FnvHashMap<Arc<str>, Type>,
    ) -> FieldPattern<Attributes> {
        let field_type = constructor
            .and_then(|constructor| self.environment().lookup_field(constructor, &field.field))
            .and_then(|meta| meta.meta.sort.unwrap_type())
            .map(|ty| ty.instantiate(substitution));
        let field_type = match field_type {
            Some(ty) => ty,
            None => self.fresh_type(),
        };

        let pattern = match &field.pattern {
            Some(pattern) => Some(self.check_pattern(pattern, &field_type)),
            None => {
                self.environment_mut()
                    .put_value(&field.field, typed(&field.meta, field_type.clone()));
                None
            }
        };
        FieldPattern {
            meta: typed(&field.meta, field_type),
            field: field.field.clone(),
            pattern,
        }
    }

    /**
    Check a pattern against the type of the value it matches, binding the
    names it introduces in the innermost scope.
    */
    pub fn check_pattern(&mut self, pattern: &Pattern<Name>, expected: &Type) -> Pattern<Attributes> {
        match pattern {
            Pattern::Id { meta, name } => {
                let meta = typed(meta, expected.clone());
                self.environment_mut().put_value(name, meta.clone());
                Pattern::Id {
                    meta,
                    name: name.clone(),
                }
            }
            Pattern::Alias {
                meta,
                alias,
                pattern,
            } => {
                let pattern = self.check_pattern(pattern, expected);
                let meta = typed(meta, expected.clone());
                self.environment_mut().put_value(alias, meta.clone());
                Pattern::Alias {
                    meta,
                    alias: alias.clone(),
                    pattern: Box::new(pattern),
                }
            }
            Pattern::Literal { meta, value } => {
                let actual = Type::BuiltIn(value.builtin_type());
                if !self.check_sub_type(&actual, expected) {
                    self.mismatched_type(meta.range, expected, &actual);
                }
                Pattern::Literal {
                    meta: typed(meta, expected.clone()),
                    value: value.clone(),
                }
            }
            Pattern::Constructor { meta, id, fields } => {
                let constructor_type = self.type_of_name(&meta.meta);
                let (constructor_type, substitution) =
                    self.instantiate_constructor(&constructor_type);
                let pattern_type = match constructor_type.unwrap_function() {
                    Some((_, ret)) => ret.clone(),
                    None => constructor_type.clone(),
                };
                if !self.check_sub_type(&pattern_type, expected) {
                    self.mismatched_type(meta.range, expected, &pattern_type);
                }

                let constructor_name = match &meta.meta {
                    Name::Constructor(name) => Some(name.clone()),
                    _ => None,
                };
                let fields = fields
                    .iter()
                    .map(|field| {
                        self.check_field_pattern(constructor_name.as_ref(), field, &substitution)
                    })
                    .collect();
                Pattern::Constructor {
                    meta: typed(meta, pattern_type),
                    id: id.clone(),
                    fields,
                }
            }
        }
    }
}
