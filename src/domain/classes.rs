//! The closed surface-defect class set and probability distributions over it.
//!
//! Class identity and order are fixed system-wide constants. The order is
//! load-bearing: argmax ties resolve to the earlier-declared class, and the
//! six-way output of any classifier is interpreted positionally against
//! [`DefectClass::ALL`].

use crate::core::constants::NUM_CLASSES;
use crate::core::errors::{InspectError, InspectResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Tolerance used when checking that a distribution sums to 1.0.
const SUM_TOLERANCE: f32 = 1e-6;

/// The six surface-defect categories, in the fixed system-wide order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DefectClass {
    /// Network of fine surface cracks.
    #[serde(rename = "crazing")]
    Crazing,
    /// Embedded foreign material.
    #[serde(rename = "inclusion")]
    Inclusion,
    /// Irregular surface patches.
    #[serde(rename = "patches")]
    Patches,
    /// Localized pitting.
    #[serde(rename = "pitted_surface")]
    PittedSurface,
    /// Oxide scale rolled into the surface.
    #[serde(rename = "rolled-in_scale")]
    RolledInScale,
    /// Linear scratches.
    #[serde(rename = "scratches")]
    Scratches,
}

impl DefectClass {
    /// All classes in the fixed ordering. Earlier entries win argmax ties.
    pub const ALL: [DefectClass; NUM_CLASSES] = [
        DefectClass::Crazing,
        DefectClass::Inclusion,
        DefectClass::Patches,
        DefectClass::PittedSurface,
        DefectClass::RolledInScale,
        DefectClass::Scratches,
    ];

    /// Returns the canonical label for this class.
    pub fn label(&self) -> &'static str {
        match self {
            DefectClass::Crazing => "crazing",
            DefectClass::Inclusion => "inclusion",
            DefectClass::Patches => "patches",
            DefectClass::PittedSurface => "pitted_surface",
            DefectClass::RolledInScale => "rolled-in_scale",
            DefectClass::Scratches => "scratches",
        }
    }

    /// Returns the position of this class in the fixed ordering.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the class at the given position in the fixed ordering.
    pub fn from_index(index: usize) -> Option<DefectClass> {
        DefectClass::ALL.get(index).copied()
    }
}

impl std::fmt::Display for DefectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A probability distribution over the six defect classes.
///
/// Values are indexed positionally by [`DefectClass::ALL`]; each value lies
/// in [0, 1] and the six values sum to 1.0 within tolerance. Instances are
/// only constructed through the validating or normalizing constructors, so
/// downstream code can rely on the invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities([f32; NUM_CLASSES]);

impl ClassProbabilities {
    /// Creates a distribution from already-normalized probabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is outside [0, 1] or not finite, or if
    /// the values do not sum to 1.0 within tolerance.
    pub fn new(probs: [f32; NUM_CLASSES]) -> InspectResult<Self> {
        for (i, &p) in probs.iter().enumerate() {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(InspectError::config_error(format!(
                    "probability for class '{}' out of range: {p}",
                    DefectClass::ALL[i]
                )));
            }
        }
        let sum: f32 = probs.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(InspectError::config_error(format!(
                "class probabilities sum to {sum}, expected 1.0"
            )));
        }
        Ok(Self(probs))
    }

    /// Creates the uniform distribution (1/6 per class).
    pub fn uniform() -> Self {
        Self([1.0 / NUM_CLASSES as f32; NUM_CLASSES])
    }

    /// Creates a distribution by normalizing non-negative weights.
    ///
    /// Weights are accumulated in f64 and divided by their sum. A zero sum
    /// (degenerate input) yields the uniform distribution rather than a
    /// division by zero.
    pub fn from_weights(weights: [f64; NUM_CLASSES]) -> Self {
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Self::uniform();
        }
        let mut probs = [0.0f32; NUM_CLASSES];
        for (p, w) in probs.iter_mut().zip(weights.iter()) {
            *p = (w / sum) as f32;
        }
        Self(probs)
    }

    /// Creates a distribution from raw classifier scores.
    ///
    /// Scores are clamped to be non-negative and renormalized, so a model
    /// whose softmax output drifted slightly from summing to 1.0 still
    /// yields a valid distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice does not hold exactly six finite values.
    pub fn from_scores(scores: &[f32]) -> InspectResult<Self> {
        if scores.len() != NUM_CLASSES {
            return Err(InspectError::config_error(format!(
                "expected {NUM_CLASSES} class scores, got {}",
                scores.len()
            )));
        }
        let mut weights = [0.0f64; NUM_CLASSES];
        for (w, &s) in weights.iter_mut().zip(scores.iter()) {
            if !s.is_finite() {
                return Err(InspectError::config_error(format!(
                    "non-finite class score: {s}"
                )));
            }
            *w = f64::from(s).max(0.0);
        }
        Ok(Self::from_weights(weights))
    }

    /// Returns the probability for a class.
    pub fn get(&self, class: DefectClass) -> f32 {
        self.0[class.index()]
    }

    /// Returns the probabilities as an array in the fixed class ordering.
    pub fn as_array(&self) -> &[f32; NUM_CLASSES] {
        &self.0
    }

    /// Iterates over (class, probability) pairs in the fixed ordering.
    pub fn iter(&self) -> impl Iterator<Item = (DefectClass, f32)> + '_ {
        DefectClass::ALL.iter().map(move |&c| (c, self.0[c.index()]))
    }

    /// Returns the most probable class and its probability.
    ///
    /// Ties are broken by the fixed class ordering: the comparison is
    /// strictly greater-than, so the earlier-declared class wins.
    pub fn top_class(&self) -> (DefectClass, f32) {
        let mut best = DefectClass::ALL[0];
        let mut best_p = self.0[0];
        for (class, p) in self.iter().skip(1) {
            if p > best_p {
                best = class;
                best_p = p;
            }
        }
        (best, best_p)
    }
}

impl Serialize for ClassProbabilities {
    /// Serializes as an ordered label-to-probability map.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUM_CLASSES))?;
        for (class, p) in self.iter() {
            map.serialize_entry(class.label(), &p)?;
        }
        map.end()
    }
}
