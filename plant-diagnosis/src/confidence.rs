//! Confidence normalisation and the composite confidence shown to users.
//!
//! Upstream sources disagree on scale: some answer with a fraction in `[0, 1]`,
//! others with a percentage. Every raw value passes through [`Percent::normalize`]
//! exactly once; after that the [`Percent`] type carries the guarantee, so two
//! differently-scaled numbers can never be combined by accident.

use serde::Serialize;
use std::fmt;

/// Method reported when the overall confidence is computed here
pub const DEFAULT_CALCULATION_METHOD: &str = "adaptive_weighted";

const CLASSIFICATION_WEIGHT: f64 = 0.3;
const DISEASE_DETECTION_WEIGHT: f64 = 0.5;
const KNOWLEDGE_BASE_WEIGHT: f64 = 0.2;

/// A confidence on the canonical 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Percent(f64);

impl Percent {
    pub const ZERO: Percent = Percent(0.0);

    /// Scale a raw confidence: values up to `1.0` are fractions, anything larger
    /// is already a percentage. A raw `0.01` is 1%, a raw `100` stays 100%.
    pub fn normalize(raw: f64) -> Self {
        let scaled = if raw <= 1.0 { raw * 100.0 } else { raw };
        Self::clamped(scaled)
    }

    fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Percent(value.clamp(0.0, 100.0))
        } else {
            Percent::ZERO
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 <= 0.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Scale a raw confidence onto 0-100. See [`Percent::normalize`].
pub fn normalize(raw: f64) -> f64 {
    Percent::normalize(raw).value()
}

/// Raw per-source confidences, in whatever scale each source used
#[derive(Debug, Clone, Default)]
pub struct ConfidenceInputs {
    pub classification: Option<f64>,
    pub disease_detection: Option<f64>,
    pub knowledge_base: Option<f64>,
    /// Overall confidence already computed by the upstream pipeline
    pub upstream_overall: Option<f64>,
    pub calculation_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceEntry {
    pub label: String,
    pub percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceSet {
    pub classification: Percent,
    pub disease_detection: Percent,
    pub kb_confidence: Percent,
    pub overall: Percent,
    pub calculation_method: String,
    pub method_label: String,
    /// Non-zero sub-confidences only
    pub breakdown: Vec<ConfidenceEntry>,
}

impl Default for ConfidenceSet {
    fn default() -> Self {
        calculate(&ConfidenceInputs::default())
    }
}

pub fn calculate(inputs: &ConfidenceInputs) -> ConfidenceSet {
    let classification = scaled(inputs.classification);
    let disease_detection = scaled(inputs.disease_detection);
    let kb_confidence = scaled(inputs.knowledge_base);

    let upstream = scaled(inputs.upstream_overall);
    let (overall, calculation_method) = if upstream.is_zero() {
        (
            weighted_overall(&[
                (classification, CLASSIFICATION_WEIGHT),
                (disease_detection, DISEASE_DETECTION_WEIGHT),
                (kb_confidence, KNOWLEDGE_BASE_WEIGHT),
            ]),
            DEFAULT_CALCULATION_METHOD.to_string(),
        )
    } else {
        let method = inputs
            .calculation_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_CALCULATION_METHOD)
            .to_string();
        (upstream, method)
    };

    let breakdown = [
        ("Plant Classification", classification),
        ("Disease Detection", disease_detection),
        ("Knowledge Base Match", kb_confidence),
    ]
    .into_iter()
    .filter(|(_, percent)| !percent.is_zero())
    .map(|(label, percent)| ConfidenceEntry {
        label: label.to_string(),
        percent,
    })
    .collect();

    ConfidenceSet {
        classification,
        disease_detection,
        kb_confidence,
        overall,
        method_label: humanize_method(&calculation_method),
        calculation_method,
        breakdown,
    }
}

fn scaled(raw: Option<f64>) -> Percent {
    raw.map(Percent::normalize).unwrap_or_default()
}

/// Weighted mean over the sub-confidences that are present; absent ones do not drag it down.
fn weighted_overall(parts: &[(Percent, f64)]) -> Percent {
    let (sum, weight) = parts
        .iter()
        .filter(|(percent, _)| !percent.is_zero())
        .fold((0.0, 0.0), |(sum, weight), (percent, w)| {
            (sum + percent.value() * w, weight + w)
        });

    if weight > 0.0 {
        Percent::clamped(sum / weight)
    } else {
        Percent::ZERO
    }
}

/// `adaptive_weighted` -> `Adaptive Weighted`
pub fn humanize_method(method: &str) -> String {
    method
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
