//! The ordered check battery. Each check is independent and pattern-driven;
//! a check that errors internally abstains rather than aborting the audit.

mod citation;
mod device_hallucination;
mod dosing;
mod emergency;
mod unknown_device;

pub use citation::CitationSufficiencyCheck;
pub use device_hallucination::DeviceHallucinationCheck;
pub use dosing::DosingInstructionCheck;
pub use emergency::EmergencySeverityCheck;
pub use unknown_device::UnknownDeviceCheck;

use glyco_core::errors::GlycoResult;
use glyco_core::models::Violation;

use crate::context::AuditContext;

/// One safety check. `run` returns zero or more findings.
pub trait SafetyCheck: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &AuditContext<'_>) -> GlycoResult<Vec<Violation>>;
}

/// The default battery, in audit order.
pub fn default_battery() -> Vec<Box<dyn SafetyCheck>> {
    vec![
        Box::new(DosingInstructionCheck),
        Box::new(DeviceHallucinationCheck),
        Box::new(CitationSufficiencyCheck),
        Box::new(EmergencySeverityCheck),
        Box::new(UnknownDeviceCheck),
    ]
}
