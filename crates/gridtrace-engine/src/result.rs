use serde::{Deserialize, Serialize};
use std::fmt;

use gridtrace_smt::solver::SatResult;

/// Ternary answer of one property check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Satisfiability {
    Satisfiable,
    Unsatisfiable,
    /// The solver could not decide within its limits.
    Unknown { reason: String },
}

impl Satisfiability {
    /// Stable machine-readable name of the variant.
    pub fn verdict_class(&self) -> &'static str {
        match self {
            Satisfiability::Satisfiable => "satisfiable",
            Satisfiability::Unsatisfiable => "unsatisfiable",
            Satisfiability::Unknown { .. } => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Satisfiability::Unknown { .. })
    }
}

impl From<SatResult> for Satisfiability {
    fn from(result: SatResult) -> Self {
        match result {
            SatResult::Sat => Satisfiability::Satisfiable,
            SatResult::Unsat => Satisfiability::Unsatisfiable,
            SatResult::Unknown(reason) => Satisfiability::Unknown { reason },
        }
    }
}

impl fmt::Display for Satisfiability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Satisfiability::Unknown { reason } => write!(f, "unknown ({reason})"),
            other => f.write_str(other.verdict_class()),
        }
    }
}

/// The behavioral properties a run can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceProperty {
    Validity,
    LoopFreedom,
    PathEfficiency,
    NearestGoalSelection,
}

impl TraceProperty {
    /// Every property, in reporting order.
    pub const ALL: [TraceProperty; 4] = [
        TraceProperty::Validity,
        TraceProperty::LoopFreedom,
        TraceProperty::PathEfficiency,
        TraceProperty::NearestGoalSelection,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TraceProperty::Validity => "validity",
            TraceProperty::LoopFreedom => "loop_freedom",
            TraceProperty::PathEfficiency => "path_efficiency",
            TraceProperty::NearestGoalSelection => "nearest_goal_selection",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TraceProperty::Validity => "recorded run obeys the grid world rules",
            TraceProperty::LoopFreedom => "no immediate reversal without a capture",
            TraceProperty::PathEfficiency => "every move approaches the pursued goal",
            TraceProperty::NearestGoalSelection => "each newly pursued goal was the nearest",
        }
    }

    /// Driver-facing wording for a verdict on this property.
    pub fn verdict_message(self, outcome: &Satisfiability) -> &'static str {
        use Satisfiability::*;
        match (self, outcome) {
            (_, Unknown { .. }) => "could not be decided",
            (TraceProperty::Validity, Satisfiable) => "validity passed",
            (TraceProperty::Validity, Unsatisfiable) => "validity failed",
            (TraceProperty::LoopFreedom, Satisfiable) => "no loop found",
            (TraceProperty::LoopFreedom, Unsatisfiable) => "loop found",
            (TraceProperty::PathEfficiency, Satisfiable) => "efficient path",
            (TraceProperty::PathEfficiency, Unsatisfiable) => "inefficient path",
            (TraceProperty::NearestGoalSelection, Satisfiable) => "nearest goal chosen",
            (TraceProperty::NearestGoalSelection, Unsatisfiable) => "nearest goal not chosen",
        }
    }
}

impl fmt::Display for TraceProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of checking one property against one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyReport {
    pub property: TraceProperty,
    pub outcome: Satisfiability,
    /// Timesteps named by the unsat core; empty unless `outcome` is
    /// `Unsatisfiable`.
    pub implicated_steps: Vec<usize>,
    pub horizon: usize,
    /// SHA-256 of the checked run, see `RunTrace::fingerprint`.
    pub trace_fingerprint: String,
    pub elapsed_ms: u64,
}

impl PropertyReport {
    /// `Some(true)` when the property holds, `Some(false)` when it is
    /// violated, `None` when the solver could not decide.
    pub fn holds(&self) -> Option<bool> {
        match self.outcome {
            Satisfiability::Satisfiable => Some(true),
            Satisfiability::Unsatisfiable => Some(false),
            Satisfiability::Unknown { .. } => None,
        }
    }
}

impl fmt::Display for PropertyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}, T={}]",
            self.property,
            self.property.verdict_message(&self.outcome),
            self.outcome,
            self.horizon
        )?;
        if !self.implicated_steps.is_empty() {
            let steps: Vec<String> = self.implicated_steps.iter().map(usize::to_string).collect();
            write!(f, " at steps {}", steps.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: Satisfiability, implicated_steps: Vec<usize>) -> PropertyReport {
        PropertyReport {
            property: TraceProperty::LoopFreedom,
            outcome,
            implicated_steps,
            horizon: 6,
            trace_fingerprint: "00".repeat(32),
            elapsed_ms: 3,
        }
    }

    #[test]
    fn holds_maps_ternary_outcome() {
        assert_eq!(report(Satisfiability::Satisfiable, vec![]).holds(), Some(true));
        assert_eq!(report(Satisfiability::Unsatisfiable, vec![2]).holds(), Some(false));
        let unknown = Satisfiability::Unknown {
            reason: "timeout".into(),
        };
        assert_eq!(report(unknown, vec![]).holds(), None);
    }

    #[test]
    fn sat_results_convert() {
        assert_eq!(Satisfiability::from(SatResult::Sat), Satisfiability::Satisfiable);
        assert_eq!(
            Satisfiability::from(SatResult::Unknown("canceled".into())),
            Satisfiability::Unknown {
                reason: "canceled".into()
            }
        );
    }

    #[test]
    fn report_display_names_steps() {
        let text = report(Satisfiability::Unsatisfiable, vec![2, 3]).to_string();
        assert_eq!(
            text,
            "loop_freedom: loop found [unsatisfiable, T=6] at steps 2, 3"
        );
    }

    #[test]
    fn report_json_uses_snake_case_names() {
        let json = serde_json::to_value(report(Satisfiability::Satisfiable, vec![]))
            .expect("report serializes");
        assert_eq!(json["property"], "loop_freedom");
        assert_eq!(json["outcome"]["verdict"], "satisfiable");
        let back: PropertyReport = serde_json::from_value(json).expect("report deserializes");
        assert_eq!(back.horizon, 6);
    }

    #[test]
    fn property_names_are_distinct() {
        for (i, a) in TraceProperty::ALL.iter().enumerate() {
            for b in &TraceProperty::ALL[..i] {
                assert_ne!(a.name(), b.name());
            }
            assert!(!a.description().is_empty());
        }
    }
}
