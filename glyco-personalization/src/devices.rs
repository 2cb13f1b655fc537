//! Known device catalog and detection patterns.
//!
//! Detection order is most-specific first: algorithm and model names before
//! brand names, so "t:slim X2 with Control-IQ" resolves to the model rather
//! than just the brand.

use regex::Regex;
use std::sync::LazyLock;

/// Pump or CGM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Pump,
    Cgm,
}

macro_rules! device_regex {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

device_regex!(RE_TSLIM_X2, r"(?i)\bt:?slim\s*x2\b|\bcontrol[-\s]?iq\b|\bbasal[-\s]?iq\b");
device_regex!(RE_TANDEM_MOBI, r"(?i)\btandem\s+mobi\b|\bmobi\s+pump\b");
device_regex!(RE_OMNIPOD_5, r"(?i)\bomnipod\s*5\b");
device_regex!(RE_OMNIPOD_DASH, r"(?i)\bomnipod\s*(dash|eros)?\b");
device_regex!(RE_MINIMED_780G, r"(?i)\bminimed\s*780g?\b|\bsmartguard\b");
device_regex!(RE_MINIMED, r"(?i)\bminimed\b|\bmedtronic\s+pump\b");
device_regex!(RE_YPSOPUMP, r"(?i)\bypsopump\b|\bcamaps\b");
device_regex!(RE_DEXCOM_G7, r"(?i)\bdexcom\s*g7\b|\bg7\s+sensor\b");
device_regex!(RE_DEXCOM_G6, r"(?i)\bdexcom\s*g6\b|\bg6\s+sensor\b|\bdexcom\b");
device_regex!(RE_LIBRE_3, r"(?i)\b(freestyle\s+)?libre\s*3\b");
device_regex!(RE_LIBRE_2, r"(?i)\b(freestyle\s+)?libre\s*2?\b");
device_regex!(RE_GUARDIAN_4, r"(?i)\bguardian\s*(4|sensor)\b");

/// One catalog entry.
pub struct KnownDevice {
    /// Canonical display name stored in profiles.
    pub canonical: &'static str,
    /// Key matched against collection identifiers (substring, normalized).
    pub collection_key: &'static str,
    pub kind: DeviceKind,
    regex: &'static LazyLock<Option<Regex>>,
    /// Detection confidence when the pattern matches once.
    pub base_confidence: f64,
}

impl KnownDevice {
    fn matches(&self, text: &str) -> usize {
        self.regex
            .as_ref()
            .map(|re| re.find_iter(text).count())
            .unwrap_or(0)
    }
}

/// Catalog, most-specific first.
pub fn catalog() -> &'static [KnownDevice] {
    static CATALOG: &[KnownDevice] = &[
        KnownDevice {
            canonical: "Tandem t:slim X2",
            collection_key: "tslim_x2",
            kind: DeviceKind::Pump,
            regex: &RE_TSLIM_X2,
            base_confidence: 0.9,
        },
        KnownDevice {
            canonical: "Tandem Mobi",
            collection_key: "tandem_mobi",
            kind: DeviceKind::Pump,
            regex: &RE_TANDEM_MOBI,
            base_confidence: 0.9,
        },
        KnownDevice {
            canonical: "Omnipod 5",
            collection_key: "omnipod_5",
            kind: DeviceKind::Pump,
            regex: &RE_OMNIPOD_5,
            base_confidence: 0.9,
        },
        KnownDevice {
            canonical: "Omnipod DASH",
            collection_key: "omnipod_dash",
            kind: DeviceKind::Pump,
            regex: &RE_OMNIPOD_DASH,
            base_confidence: 0.7,
        },
        KnownDevice {
            canonical: "Medtronic MiniMed 780G",
            collection_key: "minimed_780g",
            kind: DeviceKind::Pump,
            regex: &RE_MINIMED_780G,
            base_confidence: 0.9,
        },
        KnownDevice {
            canonical: "Medtronic MiniMed",
            collection_key: "minimed",
            kind: DeviceKind::Pump,
            regex: &RE_MINIMED,
            base_confidence: 0.65,
        },
        KnownDevice {
            canonical: "Ypsomed YpsoPump",
            collection_key: "ypsopump",
            kind: DeviceKind::Pump,
            regex: &RE_YPSOPUMP,
            base_confidence: 0.9,
        },
        KnownDevice {
            canonical: "Dexcom G7",
            collection_key: "dexcom_g7",
            kind: DeviceKind::Cgm,
            regex: &RE_DEXCOM_G7,
            base_confidence: 0.9,
        },
        KnownDevice {
            canonical: "Dexcom G6",
            collection_key: "dexcom_g6",
            kind: DeviceKind::Cgm,
            regex: &RE_DEXCOM_G6,
            base_confidence: 0.7,
        },
        KnownDevice {
            canonical: "FreeStyle Libre 3",
            collection_key: "libre_3",
            kind: DeviceKind::Cgm,
            regex: &RE_LIBRE_3,
            base_confidence: 0.9,
        },
        KnownDevice {
            canonical: "FreeStyle Libre 2",
            collection_key: "libre_2",
            kind: DeviceKind::Cgm,
            regex: &RE_LIBRE_2,
            base_confidence: 0.7,
        },
        KnownDevice {
            canonical: "Medtronic Guardian 4",
            collection_key: "guardian_4",
            kind: DeviceKind::Cgm,
            regex: &RE_GUARDIAN_4,
            base_confidence: 0.8,
        },
    ];
    CATALOG
}

/// A detection hit from one document.
#[derive(Debug, Clone)]
pub struct DeviceDetection {
    pub canonical: String,
    pub collection_key: String,
    pub kind: DeviceKind,
    pub confidence: f64,
}

/// Scan document text for known devices. Returns at most one pump and one
/// CGM: the highest-confidence hit of each kind, catalog order breaking ties.
pub fn detect(text: &str) -> Vec<DeviceDetection> {
    let mut best_pump: Option<DeviceDetection> = None;
    let mut best_cgm: Option<DeviceDetection> = None;

    for device in catalog() {
        let hits = device.matches(text);
        if hits == 0 {
            continue;
        }
        // Repeated mentions raise confidence, saturating well below 1.0.
        let confidence = (device.base_confidence + 0.02 * (hits as f64 - 1.0)).min(0.98);
        let detection = DeviceDetection {
            canonical: device.canonical.to_string(),
            collection_key: device.collection_key.to_string(),
            kind: device.kind,
            confidence,
        };
        let slot = match device.kind {
            DeviceKind::Pump => &mut best_pump,
            DeviceKind::Cgm => &mut best_cgm,
        };
        let better = slot
            .as_ref()
            .map(|current| detection.confidence > current.confidence)
            .unwrap_or(true);
        if better {
            *slot = Some(detection);
        }
    }

    best_pump.into_iter().chain(best_cgm).collect()
}

/// Does a collection identifier refer to this canonical device?
/// Normalized substring match: "device_tslim_x2_manual" → "Tandem t:slim X2".
pub fn collection_matches(collection_id: &str, collection_key: &str) -> bool {
    let normalized: String = collection_id
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    normalized.contains(collection_key)
}
