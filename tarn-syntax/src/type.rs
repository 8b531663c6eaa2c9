use crate::{
    kind::{unsolved_name, Kind},
    names::{Name, QualifiedName},
};
use fnv::{FnvHashMap, FnvHashSet};
use lazy_static::lazy_static;
use quickcheck::Arbitrary;
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};
use tarn_util::iter::{Step, Walk};

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum BuiltInType {
    Unit,
    Boolean,
    Char,
    String,
    Int,
    Long,
    Float,
    Double,
    /// `->`, applied to `arity` argument types and a return type.
    Function { arity: usize },
}

/// Numeric widenings. Everything else about subtyping follows from these.
const WIDENINGS: &[(BuiltInType, BuiltInType)] = &[
    (BuiltInType::Int, BuiltInType::Long),
    (BuiltInType::Float, BuiltInType::Double),
];

pub const GROUND_BUILT_INS: &[BuiltInType] = &[
    BuiltInType::Unit,
    BuiltInType::Boolean,
    BuiltInType::Char,
    BuiltInType::String,
    BuiltInType::Int,
    BuiltInType::Long,
    BuiltInType::Float,
    BuiltInType::Double,
];

lazy_static! {
    /// Each ground built-in mapped to every type it is a subtype of, itself included.
    static ref SUPERTYPES: FnvHashMap<BuiltInType, FnvHashSet<BuiltInType>> = {
        let mut supertypes: FnvHashMap<BuiltInType, FnvHashSet<BuiltInType>> = GROUND_BUILT_INS
            .iter()
            .map(|ty| (*ty, std::iter::once(*ty).collect()))
            .collect();

        let mut changed = true;
        while changed {
            changed = false;
            for (sub, sup) in WIDENINGS {
                let inherited: Vec<BuiltInType> = supertypes[sup].iter().copied().collect();
                for ty in GROUND_BUILT_INS {
                    if supertypes[ty].contains(sub) {
                        for inherited_ty in &inherited {
                            if let Some(set) = supertypes.get_mut(ty) {
                                changed |= set.insert(*inherited_ty);
                            }
                        }
                    }
                }
            }
        }

        supertypes
    };
}

impl BuiltInType {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltInType::Unit => "Unit",
            BuiltInType::Boolean => "Boolean",
            BuiltInType::Char => "Char",
            BuiltInType::String => "String",
            BuiltInType::Int => "Int",
            BuiltInType::Long => "Long",
            BuiltInType::Float => "Float",
            BuiltInType::Double => "Double",
            BuiltInType::Function { .. } => "->",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        GROUND_BUILT_INS.iter().find(|ty| ty.name() == name).copied()
    }

    pub fn kind(&self) -> Kind {
        match self {
            BuiltInType::Function { arity } => Kind::simple(arity + 1),
            _ => Kind::Type,
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            BuiltInType::Unit | BuiltInType::String | BuiltInType::Function { .. }
        )
    }

    pub fn is_subtype_of(&self, other: &BuiltInType) -> bool {
        match SUPERTYPES.get(self) {
            Some(supertypes) => supertypes.contains(other),
            None => self == other,
        }
    }
}

impl Arbitrary for BuiltInType {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(GROUND_BUILT_INS).unwrap()
    }
}

/// A named type variable.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct TypeVar {
    pub name: Arc<str>,
    pub kind: Kind,
}

impl TypeVar {
    pub fn new(name: &str, kind: Kind) -> Self {
        TypeVar {
            name: Arc::from(name),
            kind,
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct UnsolvedTypeId(pub usize);

/// Identified by `id` alone, so that refining its kind doesn't make it a different variable.
#[derive(Clone, Debug)]
pub struct UnsolvedType {
    pub id: UnsolvedTypeId,
    pub kind: Kind,
}

impl PartialEq for UnsolvedType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UnsolvedType {}

impl Hash for UnsolvedType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl UnsolvedType {
    pub fn name(&self) -> String {
        unsolved_name(self.id.0)
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct TypeApply {
    pub head: Type,
    pub args: Vec<Type>,
    pub kind: Kind,
}

/// `args` only contains [`Type::ForAllVar`] and [`Type::ExistsVar`].
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct QuantifiedType {
    pub args: Vec<Type>,
    pub body: Type,
    pub kind: Kind,
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Type {
    ForAllVar(TypeVar),
    ExistsVar(TypeVar),
    Unsolved(UnsolvedType),
    Constructor(QualifiedName, Kind),
    Apply(Arc<TypeApply>),
    Quantified(Arc<QuantifiedType>),
    BuiltIn(BuiltInType),
}

impl Type {
    pub fn mk_apply(head: Type, args: Vec<Type>, kind: Kind) -> Self {
        Type::Apply(Arc::new(TypeApply { head, args, kind }))
    }

    pub fn mk_quantified(args: Vec<Type>, body: Type, kind: Kind) -> Self {
        Type::Quantified(Arc::new(QuantifiedType { args, body, kind }))
    }

    /// `(args) -> ret`
    pub fn mk_function(args: Vec<Type>, ret: Type) -> Self {
        let arity = args.len();
        let mut applied = args;
        applied.push(ret);
        Type::mk_apply(
            Type::BuiltIn(BuiltInType::Function { arity }),
            applied,
            Kind::Type,
        )
    }

    pub fn mk_unsolved(id: usize, kind: Kind) -> Self {
        Type::Unsolved(UnsolvedType {
            id: UnsolvedTypeId(id),
            kind,
        })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Type::ForAllVar(var) => var.kind.clone(),
            Type::ExistsVar(var) => var.kind.clone(),
            Type::Unsolved(unsolved) => unsolved.kind.clone(),
            Type::Constructor(_, kind) => kind.clone(),
            Type::Apply(apply) => apply.kind.clone(),
            Type::Quantified(quantified) => quantified.kind.clone(),
            Type::BuiltIn(builtin) => builtin.kind(),
        }
    }

    pub fn is_unsolved(&self) -> bool {
        matches!(self, Type::Unsolved(_))
    }

    pub fn is_function(&self) -> bool {
        self.unwrap_function().is_some()
    }

    /// The argument types and return type of a function type.
    pub fn unwrap_function(&self) -> Option<(&[Type], &Type)> {
        match self {
            Type::Apply(apply) => match apply.head {
                Type::BuiltIn(BuiltInType::Function { .. }) => apply
                    .args
                    .split_last()
                    .map(|(ret, args)| (args, ret)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Unsolved types in the order they appear, including those under binders.
    pub fn iter_unsolved(&self) -> Walk<'_, Type, &UnsolvedType> {
        fn step_type(ty: &Type) -> Step<Type, &UnsolvedType> {
            match ty {
                Type::Unsolved(unsolved) => Step::Yield(unsolved),
                Type::Apply(apply) => {
                    let mut items = vec![&apply.head];
                    items.extend(apply.args.iter());
                    Step::Continue(items)
                }
                Type::Quantified(quantified) => Step::Continue1(&quantified.body),
                Type::ForAllVar(_)
                | Type::ExistsVar(_)
                | Type::Constructor(_, _)
                | Type::BuiltIn(_) => Step::Skip,
            }
        }

        Walk::new(self, step_type)
    }

    /// Does `unsolved` occur in this type?
    pub fn occurs(&self, unsolved: &UnsolvedType) -> bool {
        self.iter_unsolved().any(|other| other.id == unsolved.id)
    }

    /// Replace type variables by name. Variables bound by an inner quantifier are left alone.
    pub fn instantiate(&self, substitution: &FnvHashMap<Arc<str>, Type>) -> Type {
        match self {
            Type::ForAllVar(var) | Type::ExistsVar(var) => substitution
                .get(&var.name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Type::Apply(apply) => Type::mk_apply(
                apply.head.instantiate(substitution),
                apply
                    .args
                    .iter()
                    .map(|arg| arg.instantiate(substitution))
                    .collect(),
                apply.kind.clone(),
            ),
            Type::Quantified(quantified) => {
                let mut inner = substitution.clone();
                for arg in &quantified.args {
                    if let Type::ForAllVar(var) | Type::ExistsVar(var) = arg {
                        inner.remove(&var.name);
                    }
                }
                Type::mk_quantified(
                    quantified.args.clone(),
                    quantified.body.instantiate(&inner),
                    quantified.kind.clone(),
                )
            }
            Type::Unsolved(_) | Type::Constructor(_, _) | Type::BuiltIn(_) => self.clone(),
        }
    }

    pub fn render(&self) -> String {
        if let Some((args, ret)) = self.unwrap_function() {
            let mut s = String::new();
            match args {
                [arg] if !arg.is_function() => s.push_str(arg.render().as_str()),
                args => {
                    s.push('(');
                    s.push_str(
                        args.iter()
                            .map(|arg| arg.render())
                            .collect::<Vec<_>>()
                            .join(", ")
                            .as_str(),
                    );
                    s.push(')');
                }
            }
            s.push_str(" -> ");
            s.push_str(ret.render().as_str());
            return s;
        }

        match self {
            Type::ForAllVar(var) | Type::ExistsVar(var) => String::from(var.name.as_ref()),
            Type::Unsolved(unsolved) => unsolved.name(),
            Type::Constructor(name, _) => String::from(name.local_name()),
            Type::BuiltIn(builtin) => String::from(builtin.name()),
            Type::Apply(apply) => format!(
                "{}[{}]",
                apply.head.render(),
                apply
                    .args
                    .iter()
                    .map(|arg| arg.render())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Type::Quantified(quantified) => format!(
                "[{}] {{ {} }}",
                quantified
                    .args
                    .iter()
                    .map(|arg| arg.render())
                    .collect::<Vec<_>>()
                    .join(", "),
                quantified.body.render()
            ),
        }
    }
}

/// Either a kind, for things in type position, or a type, for things in value position.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Sort {
    Kind(Kind),
    Type(Type),
}

impl Sort {
    pub fn unwrap_kind(&self) -> Option<&Kind> {
        match self {
            Sort::Kind(kind) => Some(kind),
            Sort::Type(_) => None,
        }
    }

    pub fn unwrap_type(&self) -> Option<&Type> {
        match self {
            Sort::Type(ty) => Some(ty),
            Sort::Kind(_) => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Sort::Kind(kind) => kind.render(),
            Sort::Type(ty) => ty.render(),
        }
    }
}

/// The metadata carried by checked nodes.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Attributes {
    pub name: Name,
    pub sort: Sort,
}

impl Attributes {
    pub fn new(name: Name, sort: Sort) -> Self {
        Attributes { name, sort }
    }
}
