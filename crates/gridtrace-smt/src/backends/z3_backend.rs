use std::collections::HashMap;

use thiserror::Error;
use z3::ast::{Bool, Int};
use z3::SatResult as Z3SatResult;

use crate::solver::{SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

#[derive(Debug, Error)]
pub enum Z3Error {
    #[error("undeclared variable `{0}`")]
    Undeclared(String),
    #[error("ill-sorted term: {0}")]
    IllSorted(String),
}

/// A lowered term, tagged with its sort.
#[derive(Clone)]
enum Value {
    Int(Int),
    Bool(Bool),
}

impl Value {
    fn into_int(self, context: &str) -> Result<Int, Z3Error> {
        match self {
            Value::Int(i) => Ok(i),
            Value::Bool(_) => Err(Z3Error::IllSorted(format!("{context} expects Int, got Bool"))),
        }
    }

    fn into_bool(self, context: &str) -> Result<Bool, Z3Error> {
        match self {
            Value::Bool(b) => Ok(b),
            Value::Int(_) => Err(Z3Error::IllSorted(format!("{context} expects Bool, got Int"))),
        }
    }
}

/// Z3 backend.
///
/// The `z3` crate keeps its context per thread, so a `Z3Solver` must stay on
/// the thread that built it. Concurrent checks each build their own.
pub struct Z3Solver {
    solver: z3::Solver,
    symbols: HashMap<String, Value>,
    /// Assumptions of the last `check_sat_assuming`, for core lookup.
    assumed: Vec<(String, Bool)>,
    timeout_ms: Option<u32>,
}

impl Z3Solver {
    pub fn new() -> Self {
        Self::with_timeout_secs(0)
    }

    /// Solver whose checks answer `unknown` after `timeout_secs`; 0 means
    /// no limit.
    pub fn with_timeout_secs(timeout_secs: u64) -> Self {
        let timeout_ms = (timeout_secs > 0)
            .then(|| timeout_secs.saturating_mul(1000).min(u64::from(u32::MAX)) as u32);
        let solver = Self {
            solver: z3::Solver::new(),
            symbols: HashMap::new(),
            assumed: Vec::new(),
            timeout_ms,
        };
        solver.apply_timeout();
        solver
    }

    pub fn timeout_ms(&self) -> Option<u32> {
        self.timeout_ms
    }

    fn apply_timeout(&self) {
        if let Some(ms) = self.timeout_ms {
            let mut params = z3::Params::new();
            params.set_u32("timeout", ms);
            self.solver.set_params(&params);
        }
    }

    fn lower(&self, term: &SmtTerm) -> Result<Value, Z3Error> {
        use SmtTerm as T;
        let value = match term {
            T::Var(name) => self
                .symbols
                .get(name)
                .cloned()
                .ok_or_else(|| Z3Error::Undeclared(name.clone()))?,
            T::IntLit(n) => Value::Int(Int::from_i64(*n)),
            T::BoolLit(b) => Value::Bool(Bool::from_bool(*b)),
            T::Add(l, r) => {
                let (l, r) = self.lower_ints("+", l, r)?;
                Value::Int(&l + &r)
            }
            T::Sub(l, r) => {
                let (l, r) = self.lower_ints("-", l, r)?;
                Value::Int(&l - &r)
            }
            T::Lt(l, r) => {
                let (l, r) = self.lower_ints("<", l, r)?;
                Value::Bool(l.lt(&r))
            }
            T::Le(l, r) => {
                let (l, r) = self.lower_ints("<=", l, r)?;
                Value::Bool(l.le(&r))
            }
            T::Gt(l, r) => {
                let (l, r) = self.lower_ints(">", l, r)?;
                Value::Bool(l.gt(&r))
            }
            T::Ge(l, r) => {
                let (l, r) = self.lower_ints(">=", l, r)?;
                Value::Bool(l.ge(&r))
            }
            T::Eq(l, r) => match (self.lower(l)?, self.lower(r)?) {
                (Value::Int(l), Value::Int(r)) => Value::Bool(l.eq(&r)),
                (Value::Bool(l), Value::Bool(r)) => Value::Bool(l.eq(&r)),
                _ => return Err(Z3Error::IllSorted("= between Int and Bool".into())),
            },
            T::And(terms) => {
                let parts = self.lower_bools("and", terms)?;
                let refs: Vec<&Bool> = parts.iter().collect();
                Value::Bool(Bool::and(&refs))
            }
            T::Or(terms) => {
                let parts = self.lower_bools("or", terms)?;
                let refs: Vec<&Bool> = parts.iter().collect();
                Value::Bool(Bool::or(&refs))
            }
            T::Not(inner) => Value::Bool(self.lower(inner)?.into_bool("not")?.not()),
            T::Implies(l, r) => {
                let l = self.lower(l)?.into_bool("=>")?;
                let r = self.lower(r)?.into_bool("=>")?;
                Value::Bool(l.implies(&r))
            }
            T::Ite(cond, then, els) => {
                let cond = self.lower(cond)?.into_bool("ite condition")?;
                match (self.lower(then)?, self.lower(els)?) {
                    (Value::Int(t), Value::Int(e)) => Value::Int(cond.ite(&t, &e)),
                    (Value::Bool(t), Value::Bool(e)) => Value::Bool(cond.ite(&t, &e)),
                    _ => return Err(Z3Error::IllSorted("ite branches differ in sort".into())),
                }
            }
        };
        Ok(value)
    }

    fn lower_ints(&self, op: &str, l: &SmtTerm, r: &SmtTerm) -> Result<(Int, Int), Z3Error> {
        Ok((self.lower(l)?.into_int(op)?, self.lower(r)?.into_int(op)?))
    }

    fn lower_bools(&self, op: &str, terms: &[SmtTerm]) -> Result<Vec<Bool>, Z3Error> {
        terms
            .iter()
            .map(|t| self.lower(t).and_then(|v| v.into_bool(op)))
            .collect()
    }

    fn answer(&self, result: Z3SatResult) -> SatResult {
        match result {
            Z3SatResult::Sat => SatResult::Sat,
            Z3SatResult::Unsat => SatResult::Unsat,
            Z3SatResult::Unknown => SatResult::Unknown(
                self.solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "z3 gave no reason".into()),
            ),
        }
    }
}

impl Default for Z3Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl SmtSolver for Z3Solver {
    type Error = Z3Error;

    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Z3Error> {
        let value = match sort {
            SmtSort::Int => Value::Int(Int::new_const(name)),
            SmtSort::Bool => Value::Bool(Bool::new_const(name)),
        };
        self.symbols.insert(name.to_string(), value);
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), Z3Error> {
        let formula = self.lower(term)?.into_bool("assertion")?;
        self.solver.assert(&formula);
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, Z3Error> {
        let result = self.solver.check();
        Ok(self.answer(result))
    }

    fn supports_assumption_unsat_core(&self) -> bool {
        true
    }

    fn check_sat_assuming(&mut self, assumptions: &[String]) -> Result<SatResult, Z3Error> {
        self.assumed = assumptions
            .iter()
            .map(|name| match self.symbols.get(name) {
                Some(Value::Bool(b)) => Ok((name.clone(), b.clone())),
                Some(Value::Int(_)) => Err(Z3Error::IllSorted(format!(
                    "assumption `{name}` is not Bool"
                ))),
                None => Err(Z3Error::Undeclared(name.clone())),
            })
            .collect::<Result<_, _>>()?;
        let literals: Vec<Bool> = self.assumed.iter().map(|(_, b)| b.clone()).collect();
        let result = self.solver.check_assumptions(&literals);
        Ok(self.answer(result))
    }

    fn get_unsat_core_assumptions(&mut self) -> Result<Vec<String>, Z3Error> {
        Ok(self
            .solver
            .get_unsat_core()
            .into_iter()
            .filter_map(|lit| {
                self.assumed
                    .iter()
                    .find(|(_, assumed)| *assumed == lit)
                    .map(|(name, _)| name.clone())
            })
            .collect())
    }

    fn reset(&mut self) -> Result<(), Z3Error> {
        self.solver.reset();
        self.symbols.clear();
        self.assumed.clear();
        // Parameters do not survive a Z3 reset.
        self.apply_timeout();
        Ok(())
    }
}
