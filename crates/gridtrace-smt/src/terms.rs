/// Quantifier-free linear integer term, independent of any backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SmtTerm {
    Var(String),
    IntLit(i64),
    BoolLit(bool),

    Add(Box<SmtTerm>, Box<SmtTerm>),
    Sub(Box<SmtTerm>, Box<SmtTerm>),

    Eq(Box<SmtTerm>, Box<SmtTerm>),
    Lt(Box<SmtTerm>, Box<SmtTerm>),
    Le(Box<SmtTerm>, Box<SmtTerm>),
    Gt(Box<SmtTerm>, Box<SmtTerm>),
    Ge(Box<SmtTerm>, Box<SmtTerm>),

    And(Vec<SmtTerm>),
    Or(Vec<SmtTerm>),
    Not(Box<SmtTerm>),
    Implies(Box<SmtTerm>, Box<SmtTerm>),

    Ite(Box<SmtTerm>, Box<SmtTerm>, Box<SmtTerm>),
}

macro_rules! binary_builders {
    ($($(#[$meta:meta])* $name:ident => $variant:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(self, rhs: SmtTerm) -> Self {
                SmtTerm::$variant(Box::new(self), Box::new(rhs))
            }
        )*
    };
}

#[allow(clippy::should_implement_trait)]
impl SmtTerm {
    pub fn var(name: impl Into<String>) -> Self {
        SmtTerm::Var(name.into())
    }

    pub fn int(n: i64) -> Self {
        SmtTerm::IntLit(n)
    }

    pub fn bool(b: bool) -> Self {
        SmtTerm::BoolLit(b)
    }

    binary_builders! {
        add => Add;
        sub => Sub;
        /// Equality over either sort; both sides must agree.
        eq => Eq;
        lt => Lt;
        le => Le;
        gt => Gt;
        ge => Ge;
        implies => Implies;
    }

    /// Conjunction; empty means `true`.
    pub fn and(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::And(terms)
    }

    /// Disjunction; empty means `false`.
    pub fn or(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::Or(terms)
    }

    pub fn not(self) -> Self {
        SmtTerm::Not(Box::new(self))
    }

    pub fn ite(cond: SmtTerm, then: SmtTerm, els: SmtTerm) -> Self {
        SmtTerm::Ite(Box::new(cond), Box::new(then), Box::new(els))
    }

    /// Integer absolute value as `ite(x >= 0, x, 0 - x)`.
    pub fn abs(self) -> Self {
        SmtTerm::ite(
            self.clone().ge(SmtTerm::int(0)),
            self.clone(),
            SmtTerm::int(0).sub(self),
        )
    }
}
