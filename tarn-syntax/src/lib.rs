#![deny(unused_crate_dependencies)]

#[cfg(test)]
mod test;

pub mod kind;
pub mod literal;
pub mod names;
pub mod r#type;

pub use kind::Kind;
pub use literal::Literal;
pub use names::Name;
pub use r#type::Type;

use names::NamespaceName;
use std::sync::Arc;
use tarn_diagnostic::Range;

/// A syntax node's source range, and whatever a pass has attached to it.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Meta<A> {
    pub range: Range,
    pub meta: A,
}

impl<A> Meta<A> {
    pub fn new(range: Range, meta: A) -> Self {
        Meta { range, meta }
    }

    pub fn empty(meta: A) -> Self {
        Meta {
            range: Range::EMPTY,
            meta,
        }
    }

    pub fn with_range(&self, range: Range) -> Self
    where
        A: Clone,
    {
        Meta {
            range,
            meta: self.meta.clone(),
        }
    }

    pub fn map<B>(&self, f: impl FnOnce(&A) -> B) -> Meta<B> {
        Meta {
            range: self.range,
            meta: f(&self.meta),
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum BinaryOp {
    Power,
    Multiply,
    Divide,
    Modulus,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Equal,
    NotEqual,
    BooleanAnd,
    BooleanOr,
}

impl BinaryOp {
    pub fn render(&self) -> &'static str {
        match self {
            BinaryOp::Power => "**",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulus => "%",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::UnsignedShiftRight => ">>>",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::BitwiseXor => "^",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::BooleanAnd => "&&",
            BinaryOp::BooleanOr => "||",
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum UnaryOp {
    Negate,
    BooleanNot,
    BitwiseNot,
}

impl UnaryOp {
    pub fn render(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::BooleanNot => "!",
            UnaryOp::BitwiseNot => "~",
        }
    }
}

/// e.g. `Mina/Test/Renamer`
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct NamespaceId {
    pub range: Range,
    pub pkg: Vec<Arc<str>>,
    pub name: Arc<str>,
}

impl NamespaceId {
    pub fn new(range: Range, pkg: &[&str], name: &str) -> Self {
        NamespaceId {
            range,
            pkg: pkg.iter().map(|segment| Arc::from(*segment)).collect(),
            name: Arc::from(name),
        }
    }

    pub fn to_name(&self) -> NamespaceName {
        NamespaceName {
            pkg: self.pkg.clone(),
            name: self.name.clone(),
        }
    }
}

/// A possibly qualified reference, e.g. `x` or `Mina/Test/Renamer.x`.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct QualifiedId {
    pub range: Range,
    pub ns: Option<NamespaceId>,
    pub name: Arc<str>,
}

impl QualifiedId {
    pub fn new(range: Range, name: &str) -> Self {
        QualifiedId {
            range,
            ns: None,
            name: Arc::from(name),
        }
    }

    pub fn canonical_name(&self) -> String {
        match &self.ns {
            None => String::from(self.name.as_ref()),
            Some(ns) => format!("{}.{}", ns.to_name().canonical_name(), self.name),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ImportSymbol {
    pub range: Range,
    pub name: Arc<str>,
    pub alias: Option<Arc<str>>,
}

/**
An import.

Imports are carried through each pass unchanged; resolving them belongs to
the driver.
*/
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Import {
    pub range: Range,
    pub namespace: NamespaceId,
    pub symbols: Vec<ImportSymbol>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Namespace<A> {
    pub meta: Meta<A>,
    pub id: NamespaceId,
    pub imports: Vec<Import>,
    /**
    Declarations, grouped so that each group only depends on itself and the
    groups before it.

    A freshly parsed namespace has a single group in source order.
    */
    pub declaration_groups: Vec<Vec<Declaration<A>>>,
}

impl<A> Namespace<A> {
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration<A>> {
        self.declaration_groups.iter().flatten()
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Declaration<A> {
    Data(Data<A>),
    Let(Let<A>),
    LetFn(LetFn<A>),
}

impl<A> Declaration<A> {
    pub fn meta(&self) -> &Meta<A> {
        match self {
            Declaration::Data(data) => &data.meta,
            Declaration::Let(let_) => &let_.meta,
            Declaration::LetFn(let_fn) => &let_fn.meta,
        }
    }

    pub fn name(&self) -> &Arc<str> {
        match self {
            Declaration::Data(data) => &data.name,
            Declaration::Let(let_) => &let_.name,
            Declaration::LetFn(let_fn) => &let_fn.name,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Data<A> {
    pub meta: Meta<A>,
    pub name: Arc<str>,
    pub type_params: Vec<TypeVarNode<A>>,
    pub constructors: Vec<Constructor<A>>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Constructor<A> {
    pub meta: Meta<A>,
    pub name: Arc<str>,
    pub params: Vec<ConstructorParam<A>>,
    /// An explicit return type, for constructors that refine the data type's parameters.
    pub return_type: Option<TypeNode<A>>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ConstructorParam<A> {
    pub meta: Meta<A>,
    pub name: Arc<str>,
    pub type_annotation: TypeNode<A>,
}

/// `let name: type = expr`, at the top level or inside a block.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Let<A> {
    pub meta: Meta<A>,
    pub name: Arc<str>,
    pub type_annotation: Option<TypeNode<A>>,
    pub expr: Expr<A>,
}

/// `let name[type_params](value_params): return_type = expr`
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LetFn<A> {
    pub meta: Meta<A>,
    pub name: Arc<str>,
    pub type_params: Vec<TypeVarNode<A>>,
    pub value_params: Vec<Param<A>>,
    pub return_type: Option<TypeNode<A>>,
    pub expr: Expr<A>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Param<A> {
    pub meta: Meta<A>,
    pub name: Arc<str>,
    pub type_annotation: Option<TypeNode<A>>,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Quantifier {
    ForAll,
    /// Written with a leading `?`.
    Exists,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TypeVarNode<A> {
    pub meta: Meta<A>,
    pub quantifier: Quantifier,
    pub name: Arc<str>,
}

impl<A> TypeVarNode<A> {
    /// The name this variable is bound to where it is introduced.
    pub fn binder_name(&self) -> Name {
        match self.quantifier {
            Quantifier::ForAll => Name::ForAllVar(self.name.clone()),
            Quantifier::Exists => Name::ExistsVar(self.name.clone()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TypeNode<A> {
    Quantified {
        meta: Meta<A>,
        args: Vec<TypeVarNode<A>>,
        body: Box<TypeNode<A>>,
    },
    Fun {
        meta: Meta<A>,
        args: Vec<TypeNode<A>>,
        ret: Box<TypeNode<A>>,
    },
    Apply {
        meta: Meta<A>,
        head: Box<TypeNode<A>>,
        args: Vec<TypeNode<A>>,
    },
    Reference {
        meta: Meta<A>,
        id: QualifiedId,
    },
    Var(TypeVarNode<A>),
}

impl<A> TypeNode<A> {
    pub fn meta(&self) -> &Meta<A> {
        match self {
            TypeNode::Quantified { meta, .. } => meta,
            TypeNode::Fun { meta, .. } => meta,
            TypeNode::Apply { meta, .. } => meta,
            TypeNode::Reference { meta, .. } => meta,
            TypeNode::Var(var) => &var.meta,
        }
    }

    pub fn mk_reference(meta: Meta<A>, name: &str) -> Self {
        TypeNode::Reference {
            id: QualifiedId::new(meta.range, name),
            meta,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Reference<A> {
    pub meta: Meta<A>,
    pub id: QualifiedId,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Case<A> {
    pub meta: Meta<A>,
    pub pattern: Pattern<A>,
    pub consequent: Expr<A>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expr<A> {
    Block {
        meta: Meta<A>,
        lets: Vec<Let<A>>,
        result: Option<Box<Expr<A>>>,
    },
    If {
        meta: Meta<A>,
        condition: Box<Expr<A>>,
        consequent: Box<Expr<A>>,
        alternative: Box<Expr<A>>,
    },
    Lambda {
        meta: Meta<A>,
        params: Vec<Param<A>>,
        body: Box<Expr<A>>,
    },
    Match {
        meta: Meta<A>,
        scrutinee: Box<Expr<A>>,
        cases: Vec<Case<A>>,
    },
    Apply {
        meta: Meta<A>,
        function: Box<Expr<A>>,
        args: Vec<Expr<A>>,
    },
    Select {
        meta: Meta<A>,
        receiver: Box<Expr<A>>,
        selection: Reference<A>,
    },
    Reference(Reference<A>),
    BinaryOp {
        meta: Meta<A>,
        operator: BinaryOp,
        left: Box<Expr<A>>,
        right: Box<Expr<A>>,
    },
    UnaryOp {
        meta: Meta<A>,
        operator: UnaryOp,
        operand: Box<Expr<A>>,
    },
    Literal {
        meta: Meta<A>,
        value: Literal,
    },
}

impl<A> Expr<A> {
    pub fn meta(&self) -> &Meta<A> {
        match self {
            Expr::Block { meta, .. } => meta,
            Expr::If { meta, .. } => meta,
            Expr::Lambda { meta, .. } => meta,
            Expr::Match { meta, .. } => meta,
            Expr::Apply { meta, .. } => meta,
            Expr::Select { meta, .. } => meta,
            Expr::Reference(reference) => &reference.meta,
            Expr::BinaryOp { meta, .. } => meta,
            Expr::UnaryOp { meta, .. } => meta,
            Expr::Literal { meta, .. } => meta,
        }
    }

    pub fn mk_reference(meta: Meta<A>, name: &str) -> Self {
        Expr::Reference(Reference {
            id: QualifiedId::new(meta.range, name),
            meta,
        })
    }

    pub fn mk_apply(meta: Meta<A>, function: Expr<A>, args: Vec<Expr<A>>) -> Self {
        Expr::Apply {
            meta,
            function: Box::new(function),
            args,
        }
    }

    pub fn mk_lambda(meta: Meta<A>, params: Vec<Param<A>>, body: Expr<A>) -> Self {
        Expr::Lambda {
            meta,
            params,
            body: Box::new(body),
        }
    }

    pub fn mk_block(meta: Meta<A>, lets: Vec<Let<A>>, result: Option<Expr<A>>) -> Self {
        Expr::Block {
            meta,
            lets,
            result: result.map(Box::new),
        }
    }

    pub fn mk_match(meta: Meta<A>, scrutinee: Expr<A>, cases: Vec<Case<A>>) -> Self {
        Expr::Match {
            meta,
            scrutinee: Box::new(scrutinee),
            cases,
        }
    }

    pub fn mk_literal(meta: Meta<A>, value: Literal) -> Self {
        Expr::Literal { meta, value }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FieldPattern<A> {
    pub meta: Meta<A>,
    pub field: Arc<str>,
    /// Without a nested pattern, the field's value is bound to the field's name.
    pub pattern: Option<Pattern<A>>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Pattern<A> {
    Alias {
        meta: Meta<A>,
        alias: Arc<str>,
        pattern: Box<Pattern<A>>,
    },
    Constructor {
        meta: Meta<A>,
        id: QualifiedId,
        fields: Vec<FieldPattern<A>>,
    },
    Id {
        meta: Meta<A>,
        name: Arc<str>,
    },
    Literal {
        meta: Meta<A>,
        value: Literal,
    },
}

impl<A> Pattern<A> {
    pub fn meta(&self) -> &Meta<A> {
        match self {
            Pattern::Alias { meta, .. } => meta,
            Pattern::Constructor { meta, .. } => meta,
            Pattern::Id { meta, .. } => meta,
            Pattern::Literal { meta, .. } => meta,
        }
    }
}
