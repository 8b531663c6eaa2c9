use quickcheck::Arbitrary;
use std::sync::Arc;
use tarn_util::iter::{Step, Walk};

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct UnsolvedKind(pub usize);

impl UnsolvedKind {
    /// `?A1`, `?B1`, ... `?Z1`, `?A2`, ...
    pub fn name(&self) -> String {
        unsolved_name(self.0)
    }
}

pub(crate) fn unsolved_name(id: usize) -> String {
    let prefix = (b'A' + (id % 26) as u8) as char;
    format!("?{}{}", prefix, id / 26 + 1)
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct HigherKind {
    pub args: Vec<Kind>,
    pub result: Kind,
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Kind {
    /// `*`
    Type,
    Unsolved(UnsolvedKind),
    Higher(Arc<HigherKind>),
}

impl Kind {
    pub fn mk_higher(args: Vec<Kind>, result: Kind) -> Self {
        Kind::Higher(Arc::new(HigherKind { args, result }))
    }

    /// The kind of a type constructor that takes `arity` arguments of kind `*`.
    pub fn simple(arity: usize) -> Self {
        if arity == 0 {
            Kind::Type
        } else {
            Kind::mk_higher(vec![Kind::Type; arity], Kind::Type)
        }
    }

    pub fn is_unsolved(&self) -> bool {
        matches!(self, Kind::Unsolved(_))
    }

    pub fn is_higher(&self) -> bool {
        matches!(self, Kind::Higher(_))
    }

    pub fn unwrap_higher(&self) -> Option<&HigherKind> {
        match self {
            Kind::Higher(higher) => Some(higher),
            _ => None,
        }
    }

    /// Unsolved kinds in the order they appear.
    pub fn iter_unsolved(&self) -> Walk<'_, Kind, UnsolvedKind> {
        fn step_kind(kind: &Kind) -> Step<Kind, UnsolvedKind> {
            match kind {
                Kind::Type => Step::Skip,
                Kind::Unsolved(unsolved) => Step::Yield(*unsolved),
                Kind::Higher(higher) => {
                    let mut items: Vec<&Kind> = higher.args.iter().collect();
                    items.push(&higher.result);
                    Step::Continue(items)
                }
            }
        }

        Walk::new(self, step_kind)
    }

    pub fn occurs(&self, unsolved: UnsolvedKind) -> bool {
        self.iter_unsolved().any(|other| other == unsolved)
    }

    pub fn render(&self) -> String {
        match self {
            Kind::Type => String::from("*"),
            Kind::Unsolved(unsolved) => unsolved.name(),
            Kind::Higher(higher) => {
                let mut val = String::new();
                match higher.args.as_slice() {
                    [arg] => {
                        if arg.is_higher() {
                            val.push('(');
                        }
                        val.push_str(arg.render().as_str());
                        if arg.is_higher() {
                            val.push(')');
                        }
                    }
                    args => {
                        val.push('(');
                        val.push_str(
                            args.iter()
                                .map(|arg| arg.render())
                                .collect::<Vec<_>>()
                                .join(", ")
                                .as_str(),
                        );
                        val.push(')');
                    }
                }
                val.push_str(" -> ");
                val.push_str(higher.result.render().as_str());
                val
            }
        }
    }
}

impl Arbitrary for Kind {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        fn go(g: &mut quickcheck::Gen, depth: usize) -> Kind {
            let choice = if depth == 0 {
                u8::arbitrary(g) % 2
            } else {
                u8::arbitrary(g) % 3
            };
            match choice {
                0 => Kind::Type,
                1 => Kind::Unsolved(UnsolvedKind(usize::arbitrary(g) % 8)),
                _ => {
                    let arity = usize::arbitrary(g) % 3 + 1;
                    let args = (0..arity).map(|_| go(g, depth - 1)).collect();
                    Kind::mk_higher(args, go(g, depth - 1))
                }
            }
        }

        go(g, 2)
    }
}
