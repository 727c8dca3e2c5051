use serde::{Deserialize, Serialize};

/// One `(label, score)` pair returned by the image model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A non-empty list of predictions, highest score first.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    predictions: Vec<Prediction>,
}

impl Classification {
    /// Returns `None` for an empty list.
    pub fn from_predictions(mut predictions: Vec<Prediction>) -> Option<Self> {
        if predictions.is_empty() {
            return None;
        }
        predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
        Some(Self { predictions })
    }

    pub fn top(&self) -> &Prediction {
        &self.predictions[0]
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn into_predictions(self) -> Vec<Prediction> {
        self.predictions
    }
}
