use serde::{Deserialize, Serialize};

/// Categorical decision for one candidate answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    // Ordering matters: derived Ord makes Block the most severe.
    Allow,
    Warn,
    Block,
}

/// What a safety check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Imperative numeric dosing language without an attributed source.
    DosingInstruction,
    /// UI interaction attributed to a software algorithm, not its hardware.
    DeviceHallucination,
    /// Too few source markers in a partially generated answer.
    InsufficientCitations,
    /// Emergency-severity language without an escalation instruction.
    MissingEmergencyEscalation,
    /// Operational instructions for a device absent from all retrieval.
    UnknownDeviceInstruction,
}

impl ViolationKind {
    /// Baseline severity of this violation kind.
    pub fn severity(self) -> Verdict {
        match self {
            ViolationKind::DosingInstruction => Verdict::Block,
            ViolationKind::DeviceHallucination => Verdict::Warn,
            ViolationKind::InsufficientCitations => Verdict::Warn,
            ViolationKind::MissingEmergencyEscalation => Verdict::Block,
            ViolationKind::UnknownDeviceInstruction => Verdict::Block,
        }
    }
}

/// One finding from one check, with the offending excerpt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub detail: String,
    /// A check may raise or lower the baseline severity from context.
    pub severity: Verdict,
}

impl Violation {
    pub fn new(kind: ViolationKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            severity: kind.severity(),
        }
    }

    pub fn with_severity(mut self, severity: Verdict) -> Self {
        self.severity = severity;
        self
    }
}

/// Outcome of auditing one candidate answer. Computed fresh per answer;
/// never cached, since query and retrieval context affect interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyAuditResult {
    pub verdict: Verdict,
    pub violations: Vec<Violation>,
    pub required_disclaimer: Option<String>,
}

impl SafetyAuditResult {
    /// A clean pass.
    pub fn allow() -> Self {
        Self {
            verdict: Verdict::Allow,
            violations: Vec::new(),
            required_disclaimer: None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.verdict == Verdict::Block
    }
}
