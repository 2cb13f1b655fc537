//! Unknown-device instruction check.
//!
//! If the query names a specific device and none of the retrieved chunks
//! mention that device, any operational instructions in the answer are
//! necessarily fabricated and the answer is blocked. General education
//! about the device class is still fine.

use regex::Regex;
use std::sync::LazyLock;

use glyco_core::errors::GlycoResult;
use glyco_core::models::{Violation, ViolationKind};

use crate::context::AuditContext;

macro_rules! check_regex {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// Known product names, plus the "my <Brand> pump/CGM/sensor" shape for
// anything outside the catalog.
check_regex!(
    RE_DEVICE_NAME,
    r"(?i)\b(t:slim(\s*x2)?|tandem\s+mobi|omnipod(\s*(5|dash))?|minimed(\s*780g?)?|ypsopump|dexcom(\s*g[67])?|libre\s*[23]?|guardian(\s*4)?)\b"
);

check_regex!(
    RE_POSSESSIVE_DEVICE,
    r"(?i)\bmy\s+([A-Za-z][\w:\-]+(?:\s+[A-Za-z0-9][\w:\-]*)?)\s+(pump|cgm|sensor|pod|meter)\b"
);

check_regex!(
    RE_OPERATIONAL,
    r"(?i)\b(press(\s+and\s+hold)?|hold\s+the|tap(\s+on)?|navigate\s+to|go\s+to\s+the|open\s+the|select|insert\s+the|remove\s+the|replace\s+the|fill\s+the|prime|rewind|calibrate\s+by)\b"
);

pub struct UnknownDeviceCheck;

impl super::SafetyCheck for UnknownDeviceCheck {
    fn name(&self) -> &'static str {
        "unknown_device"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> GlycoResult<Vec<Violation>> {
        let devices = query_devices(ctx.query);
        if devices.is_empty() {
            return Ok(Vec::new());
        }
        if !RE_OPERATIONAL
            .as_ref()
            .map(|re| re.is_match(ctx.answer))
            .unwrap_or(false)
        {
            return Ok(Vec::new());
        }
        let mut violations = Vec::new();
        for device in devices {
            let grounded = ctx
                .retrieval_texts
                .iter()
                .any(|text| normalize(text).contains(&device));
            if !grounded {
                violations.push(Violation::new(
                    ViolationKind::UnknownDeviceInstruction,
                    format!("operational instructions for \"{device}\" with no supporting retrieval"),
                ));
            }
        }
        Ok(violations)
    }
}

/// Normalized device names the query asks about.
fn query_devices(query: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(re) = RE_DEVICE_NAME.as_ref() {
        out.extend(re.find_iter(query).map(|m| normalize(m.as_str())));
    }
    if let Some(re) = RE_POSSESSIVE_DEVICE.as_ref() {
        out.extend(
            re.captures_iter(query)
                .filter_map(|c| c.get(1))
                .map(|m| normalize(m.as_str()))
                // "my insulin pump" names a class, not a product
                .filter(|name| !matches!(name.as_str(), "insulin" | "glucose" | "new" | "old")),
        );
    }
    out.sort();
    out.dedup();
    out
}

fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}
