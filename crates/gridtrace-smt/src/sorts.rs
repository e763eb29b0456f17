/// SMT sorts used by run encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmtSort {
    Bool,
    Int,
}

impl SmtSort {
    /// SMT-LIB2 sort name.
    pub const fn smtlib_name(self) -> &'static str {
        match self {
            SmtSort::Bool => "Bool",
            SmtSort::Int => "Int",
        }
    }
}

impl std::fmt::Display for SmtSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.smtlib_name())
    }
}
