//! Sparse constant propagation over a namespace, and the rewrite that uses it.
//!
//! Every name starts out [`Lattice::Unassigned`] and only ever moves up the
//! lattice. Top-level declarations are analysed from a worklist: when the
//! result of a declaration grows, every declaration that refers to it is
//! analysed again. Blocks are analysed until their bindings stop growing.


use crate::{
    fold::{fold_binary, fold_unary},
    ir::{
        is_function_type, Case, Declaration, Expr, Let, LocalBinding, Namespace, Pattern, Value,
    },
    lattice::{Comparison, Lattice},
};
use fnv::{FnvHashMap, FnvHashSet};
use std::collections::VecDeque;
use tarn_syntax::{BinaryOp, Literal, Name};
use tarn_util::fnv_hash_multi_map::FnvHashMultimap;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum PatternMatch {
    Always,
    Maybe,
    Never,
}

fn is_irrefutable(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Id(_) => true,
        Pattern::Alias { pattern, .. } => is_irrefutable(pattern),
        Pattern::Literal(_) | Pattern::Constructor { .. } => false,
    }
}

fn match_pattern(pattern: &Pattern, scrutinee: &Lattice) -> PatternMatch {
    match pattern {
        Pattern::Id(_) => PatternMatch::Always,
        Pattern::Alias { pattern, .. } => match_pattern(pattern, scrutinee),
        Pattern::Literal(literal) => match scrutinee {
            Lattice::Constant(value) if value == literal => PatternMatch::Always,
            Lattice::Constant(_) => PatternMatch::Never,
            _ => PatternMatch::Maybe,
        },
        Pattern::Constructor { name, fields } => match scrutinee.unwrap_constructor() {
            Some(constructor) if constructor == name => {
                if fields.iter().all(|field| is_irrefutable(&field.pattern)) {
                    PatternMatch::Always
                } else {
                    PatternMatch::Maybe
                }
            }
            Some(_) => PatternMatch::Never,
            None => PatternMatch::Maybe,
        },
    }
}

/**
The cases that could be taken for a scrutinee, in order. The list stops at
the first case that is certain to match.
*/
fn candidate_cases<'a>(cases: &'a [Case], scrutinee: &Lattice) -> Vec<(&'a Case, PatternMatch)> {
    let mut candidates = Vec::new();
    for case in cases {
        match match_pattern(&case.pattern, scrutinee) {
            PatternMatch::Never => {}
            PatternMatch::Maybe => candidates.push((case, PatternMatch::Maybe)),
            PatternMatch::Always => {
                candidates.push((case, PatternMatch::Always));
                break;
            }
        }
    }
    candidates
}

/// The expression a top-level let analyses to: a function's result, or a value.
fn let_body(decl: &Let) -> &Expr {
    match &decl.body {
        Expr::Value(Value::Lambda(lambda)) => &lambda.body,
        body => body,
    }
}

#[derive(Debug, Default)]
pub struct ConstantPropagation {
    environment: FnvHashMap<Name, Lattice>,
    worklist: VecDeque<Name>,
    /// Top-level lets, by their index in the namespace.
    let_bodies: FnvHashMap<Name, usize>,
    /// For each name, the top-level declarations that refer to it.
    occurrences: FnvHashMultimap<Name, Name>,
    /// Functions that are called directly, with their parameters.
    function_params: FnvHashMap<Name, Vec<Name>>,
    /// Names bound in the code under analysis. References to anything else are unknown.
    bound: FnvHashSet<Name>,
    /// Counts the changes made to `environment`.
    state: u64,
}

impl ConstantPropagation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(&self) -> &FnvHashMap<Name, Lattice> {
        &self.environment
    }

    pub fn lookup(&self, name: &Name) -> Lattice {
        self.environment
            .get(name)
            .cloned()
            .unwrap_or(Lattice::Unassigned)
    }

    /// Join `value` into what is known about `name`, returning the joined value.
    fn put_result(&mut self, name: &Name, value: Lattice) -> Lattice {
        match self.environment.get_mut(name) {
            None => {
                self.state += 1;
                self.environment.insert(name.clone(), value.clone());
                value
            }
            Some(existing) => {
                let joined = existing.least_upper_bound(&value);
                if joined != *existing {
                    self.state += 1;
                    *existing = joined.clone();
                }
                joined
            }
        }
    }

    fn lookup_reference(&self, name: &Name) -> Lattice {
        match self.environment.get(name) {
            Some(value) => value.clone(),
            None if self.bound.contains(name) => Lattice::Unassigned,
            None => Lattice::NonConstant,
        }
    }

    /// What is known about a value, without analysing it.
    fn lookup_value(&self, value: &Value) -> Lattice {
        match value {
            Value::Literal(literal) => Lattice::Constant(literal.clone()),
            Value::Reference { name, ty } => {
                if is_function_type(ty) {
                    Lattice::NonConstant
                } else {
                    self.lookup_reference(name)
                }
            }
            Value::Lambda(_) | Value::Box(_) | Value::Unbox(_) => Lattice::NonConstant,
        }
    }

    pub fn analyse_declarations(&mut self, declarations: &[Declaration]) {
        for declaration in declarations {
            match declaration {
                Declaration::Data(data) => {
                    for constructor in &data.constructors {
                        let name = Name::Constructor(constructor.name.clone());
                        let value = if constructor.fields.is_empty() {
                            Lattice::ConstantConstructor(constructor.name.clone())
                        } else {
                            Lattice::KnownConstructor(constructor.name.clone())
                        };
                        self.bound.insert(name.clone());
                        self.put_result(&name, value);
                    }
                }
                Declaration::Let(decl) => {
                    self.bound.insert(Name::Let(decl.name.clone()));
                }
            }
        }

        for (index, declaration) in declarations.iter().enumerate() {
            if let Declaration::Let(decl) = declaration {
                let name = Name::Let(decl.name.clone());

                for free_variable in decl.free_variables() {
                    self.occurrences.insert(free_variable, name.clone());
                }
                decl.body.bound_names(&mut self.bound);

                if let Expr::Value(Value::Lambda(lambda)) = &decl.body {
                    // Top-level functions can be called with anything.
                    for param in &lambda.params {
                        self.bound.insert(param.name.clone());
                        self.put_result(&param.name, Lattice::NonConstant);
                    }
                    self.function_params.insert(
                        name.clone(),
                        lambda
                            .params
                            .iter()
                            .map(|param| param.name.clone())
                            .collect(),
                    );
                }

                self.let_bodies.insert(name.clone(), index);
                self.worklist.push_back(name);
            }
        }

        let mut iterations: usize = 0;
        while let Some(name) = self.worklist.pop_front() {
            iterations += 1;
            let index = match self.let_bodies.get(&name) {
                Some(index) => *index,
                None => continue,
            };
            let body = match &declarations[index] {
                Declaration::Let(decl) => let_body(decl),
                Declaration::Data(_) => continue,
            };

            let initial = self.lookup(&name);
            let value = self.analyse(body);
            let result = self.put_result(&name, value);
            log::trace!(
                "analysed {}: {:?} (was {:?})",
                name.canonical_name(),
                result,
                initial
            );

            if result.compare(&initial) == Comparison::Greater {
                let callers: Vec<Name> = self.occurrences.get(&name).to_vec();
                self.worklist.extend(callers);
            }
        }
        log::debug!(
            "constant propagation finished after {} iterations",
            iterations
        );
    }

    /// Analyse a single expression, treating every name it binds as local.
    pub fn analyse_expr(&mut self, expr: &Expr) -> Lattice {
        expr.bound_names(&mut self.bound);
        self.analyse(expr)
    }

    fn analyse_value(&mut self, value: &Value) -> Lattice {
        match value {
            Value::Literal(literal) => Lattice::Constant(literal.clone()),
            Value::Reference { name, ty } => {
                if is_function_type(ty) {
                    // The function escapes, so it may be called with anything.
                    if let Some(params) = self.function_params.get(name).cloned() {
                        for param in &params {
                            self.put_result(param, Lattice::NonConstant);
                        }
                    }
                    Lattice::NonConstant
                } else {
                    self.lookup_reference(name)
                }
            }
            Value::Lambda(lambda) => {
                for param in &lambda.params {
                    self.put_result(&param.name, Lattice::NonConstant);
                }
                self.analyse(&lambda.body);
                Lattice::NonConstant
            }
            Value::Box(value) | Value::Unbox(value) => {
                self.analyse_value(value);
                Lattice::NonConstant
            }
        }
    }

    fn analyse_args(&mut self, params: &[Name], args: &[Value]) {
        for (param, arg) in params.iter().zip(args.iter()) {
            let value = self.analyse_value(arg);
            self.put_result(param, value);
        }
    }

    fn bind_pattern(&mut self, pattern: &Pattern, value: &Lattice) {
        match pattern {
            Pattern::Id(name) => {
                self.put_result(name, value.clone());
            }
            Pattern::Alias { alias, pattern } => {
                self.put_result(alias, value.clone());
                self.bind_pattern(pattern, value);
            }
            Pattern::Literal(_) => {}
            Pattern::Constructor { fields, .. } => {
                for field in fields {
                    self.bind_pattern(&field.pattern, &Lattice::NonConstant);
                }
            }
        }
    }

    fn analyse_binding(&mut self, binding: &LocalBinding) {
        match binding {
            LocalBinding::Join {
                name, params, body, ..
            } => {
                self.function_params
                    .entry(name.clone())
                    .or_insert_with(|| params.iter().map(|param| param.name.clone()).collect());
                let value = self.analyse(body);
                self.put_result(name, value);
            }
            LocalBinding::Assign {
                name,
                body: Expr::Value(Value::Lambda(lambda)),
                ..
            } => {
                self.function_params.entry(name.clone()).or_insert_with(|| {
                    lambda
                        .params
                        .iter()
                        .map(|param| param.name.clone())
                        .collect()
                });
                let value = self.analyse(&lambda.body);
                self.put_result(name, value);
            }
            LocalBinding::Assign { name, body, .. } => {
                let value = self.analyse(body);
                self.put_result(name, value);
            }
        }
    }

    fn analyse(&mut self, expr: &Expr) -> Lattice {
        match expr {
            Expr::Value(value) => self.analyse_value(value),
            Expr::Apply { function, args, .. } => match function {
                Value::Lambda(lambda) => {
                    let params: Vec<Name> =
                        lambda.params.iter().map(|param| param.name.clone()).collect();
                    self.analyse_args(&params, args);
                    self.analyse(&lambda.body)
                }
                Value::Reference { name, .. } => match self.function_params.get(name).cloned() {
                    Some(params) => {
                        self.put_result(name, Lattice::Unassigned);
                        let initial_state = self.state;
                        self.analyse_args(&params, args);
                        if self.state > initial_state && self.let_bodies.contains_key(name) {
                            self.worklist.push_back(name.clone());
                        }
                        self.lookup(name)
                    }
                    None => {
                        for arg in args {
                            self.analyse_value(arg);
                        }
                        self.lookup_reference(name)
                    }
                },
                Value::Literal(_) | Value::Box(_) | Value::Unbox(_) => {
                    for arg in args {
                        self.analyse_value(arg);
                    }
                    self.analyse_value(function);
                    Lattice::NonConstant
                }
            },
            Expr::Unary { op, operand } => match self.analyse_value(operand) {
                Lattice::Constant(literal) => fold_unary(*op, &literal),
                Lattice::Unassigned => Lattice::Unassigned,
                _ => Lattice::NonConstant,
            },
            Expr::Binary { left, op, right } => {
                let left = self.analyse_value(left);
                let right = self.analyse_value(right);
                analyse_binary(&left, *op, &right)
            }
            Expr::If {
                condition,
                consequent,
                alternative,
            } => match self.analyse_value(condition) {
                Lattice::Unassigned => Lattice::Unassigned,
                Lattice::Constant(Literal::Boolean(true)) => self.analyse(consequent),
                Lattice::Constant(Literal::Boolean(false)) => self.analyse(alternative),
                _ => {
                    let consequent = self.analyse(consequent);
                    let alternative = self.analyse(alternative);
                    consequent.least_upper_bound(&alternative)
                }
            },
            Expr::Match { scrutinee, cases } => {
                let scrutinee = self.analyse_value(scrutinee);
                if scrutinee == Lattice::Unassigned {
                    return Lattice::Unassigned;
                }
                candidate_cases(cases, &scrutinee).into_iter().fold(
                    Lattice::Unassigned,
                    |result, (case, _)| {
                        self.bind_pattern(&case.pattern, &scrutinee);
                        let value = self.analyse(&case.consequent);
                        result.least_upper_bound(&value)
                    },
                )
            }
            Expr::Block { bindings, result } => {
                let mut previous_state = self.state;
                loop {
                    for binding in bindings {
                        self.analyse_binding(binding);
                    }
                    let value = self.analyse(result);

                    if self.state > previous_state {
                        previous_state = self.state;
                    } else {
                        break value;
                    }
                }
            }
        }
    }

    /// Analyse `namespace`, then rewrite it using what was learned.
    pub fn optimise_namespace(&mut self, namespace: &Namespace) -> Namespace {
        self.analyse_declarations(&namespace.declarations);
        Namespace {
            name: namespace.name.clone(),
            declarations: namespace
                .declarations
                .iter()
                .map(|declaration| match declaration {
                    Declaration::Data(data) => Declaration::Data(data.clone()),
                    Declaration::Let(decl) => Declaration::Let(Let {
                        name: decl.name.clone(),
                        ty: decl.ty.clone(),
                        body: self.optimise_expr(&decl.body),
                    }),
                })
                .collect(),
        }
    }

    fn optimise_value(&self, value: &Value) -> Value {
        match value {
            Value::Literal(_) => value.clone(),
            Value::Reference { name, ty } => match self.environment.get(name) {
                Some(Lattice::Constant(literal)) if !is_function_type(ty) => {
                    Value::Literal(literal.clone())
                }
                _ => value.clone(),
            },
            Value::Lambda(lambda) => {
                Value::mk_lambda(lambda.params.clone(), self.optimise_expr(&lambda.body))
            }
            Value::Box(value) => Value::Box(Box::new(self.optimise_value(value))),
            Value::Unbox(value) => Value::Unbox(Box::new(self.optimise_value(value))),
        }
    }

    /// A constant binding can be dropped once every reference to it is inlined.
    fn is_inlined(&self, binding: &LocalBinding) -> bool {
        match binding {
            LocalBinding::Assign { name, ty, .. } => {
                !is_function_type(ty)
                    && !self.function_params.contains_key(name)
                    && matches!(self.environment.get(name), Some(Lattice::Constant(_)))
            }
            LocalBinding::Join { .. } => false,
        }
    }

    fn optimise_binding(&self, binding: &LocalBinding) -> LocalBinding {
        match binding {
            LocalBinding::Assign { name, ty, body } => LocalBinding::Assign {
                name: name.clone(),
                ty: ty.clone(),
                body: self.optimise_expr(body),
            },
            LocalBinding::Join {
                name,
                ty,
                params,
                body,
            } => LocalBinding::Join {
                name: name.clone(),
                ty: ty.clone(),
                params: params.clone(),
                body: self.optimise_expr(body),
            },
        }
    }

    /// The single case a match is certain to take, if every name it binds is inlined.
    fn selected_case<'a>(&self, cases: &'a [Case], scrutinee: &Lattice) -> Option<&'a Case> {
        match candidate_cases(cases, scrutinee).as_slice() {
            [(case, PatternMatch::Always)] => {
                let inlined = case.pattern.bound_names().iter().all(|name| {
                    matches!(self.environment.get(name), Some(Lattice::Constant(_)))
                });
                if inlined {
                    Some(*case)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn optimise_expr(&self, expr: &Expr) -> Expr {
        match expr {
            Expr::Value(value) => Expr::Value(self.optimise_value(value)),
            Expr::Apply { ty, function, args } => {
                if let Value::Reference { name, .. } = function {
                    if self.function_params.contains_key(name) {
                        match self.environment.get(name) {
                            Some(Lattice::Constant(literal)) => {
                                return Expr::literal(literal.clone())
                            }
                            Some(Lattice::ConstantConstructor(constructor)) => {
                                return Expr::Apply {
                                    ty: ty.clone(),
                                    function: Value::reference(
                                        Name::Constructor(constructor.clone()),
                                        ty.clone(),
                                    ),
                                    args: Vec::new(),
                                };
                            }
                            _ => {}
                        }
                    }
                }
                Expr::Apply {
                    ty: ty.clone(),
                    function: self.optimise_value(function),
                    args: args.iter().map(|arg| self.optimise_value(arg)).collect(),
                }
            }
            Expr::Unary { op, operand } => {
                if let Lattice::Constant(literal) = self.lookup_value(operand) {
                    if let Lattice::Constant(result) = fold_unary(*op, &literal) {
                        return Expr::literal(result);
                    }
                }
                Expr::Unary {
                    op: *op,
                    operand: self.optimise_value(operand),
                }
            }
            Expr::Binary { left, op, right } => {
                let left_value = self.lookup_value(left);
                let right_value = self.lookup_value(right);
                if let Lattice::Constant(result) = analyse_binary(&left_value, *op, &right_value)
                {
                    return Expr::literal(result);
                }
                Expr::Binary {
                    left: self.optimise_value(left),
                    op: *op,
                    right: self.optimise_value(right),
                }
            }
            Expr::If {
                condition,
                consequent,
                alternative,
            } => match self.lookup_value(condition) {
                Lattice::Constant(Literal::Boolean(true)) => self.optimise_expr(consequent),
                Lattice::Constant(Literal::Boolean(false)) => self.optimise_expr(alternative),
                _ => Expr::mk_if(
                    self.optimise_value(condition),
                    self.optimise_expr(consequent),
                    self.optimise_expr(alternative),
                ),
            },
            Expr::Match { scrutinee, cases } => {
                let value = self.lookup_value(scrutinee);
                match self.selected_case(cases, &value) {
                    Some(case) => self.optimise_expr(&case.consequent),
                    None => Expr::Match {
                        scrutinee: self.optimise_value(scrutinee),
                        cases: cases
                            .iter()
                            .map(|case| Case {
                                pattern: case.pattern.clone(),
                                consequent: self.optimise_expr(&case.consequent),
                            })
                            .collect(),
                    },
                }
            }
            Expr::Block { bindings, result } => {
                let bindings: Vec<LocalBinding> = bindings
                    .iter()
                    .filter(|binding| !self.is_inlined(binding))
                    .map(|binding| self.optimise_binding(binding))
                    .collect();
                let result = self.optimise_expr(result);
                if bindings.is_empty() {
                    result
                } else {
                    Expr::mk_block(bindings, result)
                }
            }
        }
    }
}

/**
The result of a binary operator.

`false && _` and `true || _` are decided by their left operand alone.
Otherwise both operands must be constant for the result to be.
*/
fn analyse_binary(left: &Lattice, op: BinaryOp, right: &Lattice) -> Lattice {
    match (left, op, right) {
        (Lattice::Constant(Literal::Boolean(false)), BinaryOp::BooleanAnd, _) => {
            Lattice::Constant(Literal::Boolean(false))
        }
        (Lattice::Constant(Literal::Boolean(true)), BinaryOp::BooleanOr, _) => {
            Lattice::Constant(Literal::Boolean(true))
        }
        (Lattice::Constant(left), _, Lattice::Constant(right)) => fold_binary(left, op, right),
        (Lattice::Unassigned, _, _) | (_, _, Lattice::Unassigned) => Lattice::Unassigned,
        _ => Lattice::NonConstant,
    }
}
