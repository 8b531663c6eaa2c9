//! The lowered representation the optimiser works on.
//!
//! Every operand is a [`Value`]: compound expressions only appear as the body
//! of a binding, a branch or a function.


use fnv::FnvHashSet;
use tarn_syntax::{
    names::{ConstructorName, DataName, FieldName, LetName, NamespaceName},
    BinaryOp, Literal, Name, Type, UnaryOp,
};

/// Is `ty` a function type once its quantifiers are stripped?
pub fn is_function_type(ty: &Type) -> bool {
    let mut ty = ty;
    while let Type::Quantified(quantified) = ty {
        ty = &quantified.body;
    }
    ty.is_function()
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Namespace {
    pub name: NamespaceName,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Declaration {
    Data(Data),
    Let(Let),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Data {
    pub name: DataName,
    pub constructors: Vec<Constructor>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Constructor {
    pub name: ConstructorName,
    pub fields: Vec<Field>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Field {
    pub name: FieldName,
    pub ty: Type,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Let {
    pub name: LetName,
    pub ty: Type,
    pub body: Expr,
}

impl Let {
    /**
    Every name the body refers to that isn't bound inside the declaration,
    in order of first occurrence.
    */
    pub fn free_variables(&self) -> Vec<Name> {
        let mut bound = FnvHashSet::default();
        self.body.bound_names(&mut bound);

        let mut seen = FnvHashSet::default();
        let mut free = Vec::new();
        self.body.references(&mut |name| {
            if !bound.contains(name) && seen.insert(name.clone()) {
                free.push(name.clone());
            }
        });
        free
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Param {
    pub name: Name,
    pub ty: Type,
}

impl Param {
    pub fn new(name: Name, ty: Type) -> Self {
        Param { name, ty }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LocalBinding {
    Assign {
        name: Name,
        ty: Type,
        body: Expr,
    },
    /// A local function that is only ever called directly.
    Join {
        name: Name,
        ty: Type,
        params: Vec<Param>,
        body: Expr,
    },
}

impl LocalBinding {
    pub fn name(&self) -> &Name {
        match self {
            LocalBinding::Assign { name, .. } => name,
            LocalBinding::Join { name, .. } => name,
        }
    }

    pub fn body(&self) -> &Expr {
        match self {
            LocalBinding::Assign { body, .. } => body,
            LocalBinding::Join { body, .. } => body,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Lambda {
    pub params: Vec<Param>,
    pub body: Box<Expr>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Value {
    Literal(Literal),
    Reference { name: Name, ty: Type },
    Lambda(Lambda),
    Box(Box<Value>),
    Unbox(Box<Value>),
}

impl Value {
    pub fn reference(name: Name, ty: Type) -> Self {
        Value::Reference { name, ty }
    }

    pub fn mk_lambda(params: Vec<Param>, body: Expr) -> Self {
        Value::Lambda(Lambda {
            params,
            body: Box::new(body),
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expr {
    Value(Value),
    Apply {
        ty: Type,
        function: Value,
        args: Vec<Value>,
    },
    Unary {
        op: UnaryOp,
        operand: Value,
    },
    Binary {
        left: Value,
        op: BinaryOp,
        right: Value,
    },
    If {
        condition: Value,
        consequent: Box<Expr>,
        alternative: Box<Expr>,
    },
    Match {
        scrutinee: Value,
        cases: Vec<Case>,
    },
    Block {
        bindings: Vec<LocalBinding>,
        result: Box<Expr>,
    },
}

impl Expr {
    pub fn literal(literal: Literal) -> Self {
        Expr::Value(Value::Literal(literal))
    }

    pub fn mk_if(condition: Value, consequent: Expr, alternative: Expr) -> Self {
        Expr::If {
            condition,
            consequent: Box::new(consequent),
            alternative: Box::new(alternative),
        }
    }

    pub fn mk_block(bindings: Vec<LocalBinding>, result: Expr) -> Self {
        Expr::Block {
            bindings,
            result: Box::new(result),
        }
    }

    /// Call `f` on every name referenced by a [`Value::Reference`].
    pub fn references(&self, f: &mut impl FnMut(&Name)) {
        match self {
            Expr::Value(value) => value.references(f),
            Expr::Apply { function, args, .. } => {
                function.references(f);
                args.iter().for_each(|arg| arg.references(f));
            }
            Expr::Unary { operand, .. } => operand.references(f),
            Expr::Binary { left, right, .. } => {
                left.references(f);
                right.references(f);
            }
            Expr::If {
                condition,
                consequent,
                alternative,
            } => {
                condition.references(f);
                consequent.references(f);
                alternative.references(f);
            }
            Expr::Match { scrutinee, cases } => {
                scrutinee.references(f);
                cases.iter().for_each(|case| case.consequent.references(f));
            }
            Expr::Block { bindings, result } => {
                bindings
                    .iter()
                    .for_each(|binding| binding.body().references(f));
                result.references(f);
            }
        }
    }

    /// Add every name bound inside this expression to `bound`.
    pub fn bound_names(&self, bound: &mut FnvHashSet<Name>) {
        match self {
            Expr::Value(value) => value.bound_names(bound),
            Expr::Apply { function, args, .. } => {
                function.bound_names(bound);
                args.iter().for_each(|arg| arg.bound_names(bound));
            }
            Expr::Unary { operand, .. } => operand.bound_names(bound),
            Expr::Binary { left, right, .. } => {
                left.bound_names(bound);
                right.bound_names(bound);
            }
            Expr::If {
                condition,
                consequent,
                alternative,
            } => {
                condition.bound_names(bound);
                consequent.bound_names(bound);
                alternative.bound_names(bound);
            }
            Expr::Match { scrutinee, cases } => {
                scrutinee.bound_names(bound);
                for case in cases {
                    bound.extend(case.pattern.bound_names());
                    case.consequent.bound_names(bound);
                }
            }
            Expr::Block { bindings, result } => {
                for binding in bindings {
                    bound.insert(binding.name().clone());
                    if let LocalBinding::Join { params, .. } = binding {
                        bound.extend(params.iter().map(|param| param.name.clone()));
                    }
                    binding.body().bound_names(bound);
                }
                result.bound_names(bound);
            }
        }
    }
}

impl Value {
    fn references(&self, f: &mut impl FnMut(&Name)) {
        match self {
            Value::Literal(_) => {}
            Value::Reference { name, .. } => f(name),
            Value::Lambda(lambda) => lambda.body.references(f),
            Value::Box(value) | Value::Unbox(value) => value.references(f),
        }
    }

    fn bound_names(&self, bound: &mut FnvHashSet<Name>) {
        match self {
            Value::Literal(_) | Value::Reference { .. } => {}
            Value::Lambda(lambda) => {
                bound.extend(lambda.params.iter().map(|param| param.name.clone()));
                lambda.body.bound_names(bound);
            }
            Value::Box(value) | Value::Unbox(value) => value.bound_names(bound),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Case {
    pub pattern: Pattern,
    pub consequent: Expr,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Pattern {
    Id(Name),
    Alias {
        alias: Name,
        pattern: Box<Pattern>,
    },
    Literal(Literal),
    Constructor {
        name: ConstructorName,
        fields: Vec<FieldPattern>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FieldPattern {
    pub name: FieldName,
    pub pattern: Pattern,
}

impl Pattern {
    /// The variables a successful match binds, left to right.
    pub fn bound_names(&self) -> Vec<Name> {
        fn go(pattern: &Pattern, names: &mut Vec<Name>) {
            match pattern {
                Pattern::Id(name) => names.push(name.clone()),
                Pattern::Alias { alias, pattern } => {
                    names.push(alias.clone());
                    go(pattern, names);
                }
                Pattern::Literal(_) => {}
                Pattern::Constructor { fields, .. } => {
                    fields.iter().for_each(|field| go(&field.pattern, names))
                }
            }
        }

        let mut names = Vec::new();
        go(self, &mut names);
        names
    }
}
