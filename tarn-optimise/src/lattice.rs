
use tarn_syntax::{names::ConstructorName, Literal};

/**
What the analysis knows about the value of a name.

```text
                 NonConstant
        /        |          |          \
  Constant(..)  ...  ConstantConstructor(c)  ...
                              |
                     KnownConstructor(c)
        \        |          |          /
                 Unassigned
```
*/
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Lattice {
    /// Nothing is known yet, or the value is never produced.
    Unassigned,
    Constant(Literal),
    /// Built by constructor `c`, with unknown fields.
    KnownConstructor(ConstructorName),
    /// Always the field-less constructor `c`.
    ConstantConstructor(ConstructorName),
    NonConstant,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Comparison {
    Less,
    Equal,
    Greater,
    Incomparable,
}

impl Comparison {
    /// `-1`, `0` or `1`, or `None` when the two values are incomparable.
    pub fn sign(self) -> Option<i8> {
        match self {
            Comparison::Less => Some(-1),
            Comparison::Equal => Some(0),
            Comparison::Greater => Some(1),
            Comparison::Incomparable => None,
        }
    }

    fn flip(self) -> Self {
        match self {
            Comparison::Less => Comparison::Greater,
            Comparison::Greater => Comparison::Less,
            other => other,
        }
    }
}

impl Lattice {
    pub fn compare(&self, other: &Lattice) -> Comparison {
        if self == other {
            return Comparison::Equal;
        }
        match (self, other) {
            (Lattice::Unassigned, _) | (_, Lattice::NonConstant) => Comparison::Less,
            (_, Lattice::Unassigned) | (Lattice::NonConstant, _) => Comparison::Greater,
            (Lattice::KnownConstructor(left), Lattice::ConstantConstructor(right))
                if left == right =>
            {
                Comparison::Less
            }
            (Lattice::ConstantConstructor(_), Lattice::KnownConstructor(_)) => {
                other.compare(self).flip()
            }
            _ => Comparison::Incomparable,
        }
    }

    pub fn least_upper_bound(&self, other: &Lattice) -> Lattice {
        match self.compare(other) {
            Comparison::Incomparable => Lattice::NonConstant,
            Comparison::Less => other.clone(),
            Comparison::Equal | Comparison::Greater => self.clone(),
        }
    }

    pub fn unwrap_constant(&self) -> Option<&Literal> {
        match self {
            Lattice::Constant(literal) => Some(literal),
            _ => None,
        }
    }

    /// The constructor every value of this name is built with, if there is one.
    pub fn unwrap_constructor(&self) -> Option<&ConstructorName> {
        match self {
            Lattice::KnownConstructor(name) | Lattice::ConstantConstructor(name) => Some(name),
            _ => None,
        }
    }
}
