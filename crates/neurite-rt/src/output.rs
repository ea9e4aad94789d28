//! Output decoding: raw output-neuron values to a task-level result.
//!
//! Classification trusts the graph's distribution — no softmax pass,
//! just an arg-max over what the model emitted. Regression inverts the
//! min-max scaling per slot. Anomaly scores the distance between the
//! output embedding and the stored average embedding, normalized by the
//! trained score bounds.

/// Class probabilities in the domain the model emitted (or float after
/// dequantization).
#[derive(Debug, Clone, PartialEq)]
pub enum Probabilities {
    /// Dequantized or native float probabilities.
    F32(Vec<f32>),
    /// Raw 8-bit quantized outputs.
    Q8(Vec<u8>),
    /// Raw 16-bit quantized outputs.
    Q16(Vec<u16>),
}

/// Decoded classification result.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutput {
    /// Arg-max class index.
    pub predicted_class: u16,
    /// Number of classes the model distinguishes.
    pub num_classes: u16,
    /// Per-class probabilities, unchanged apart from dequantization.
    pub probabilities: Probabilities,
}

/// Decoded regression result.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionOutput {
    /// Descaled output values, one per trained target.
    pub values: Vec<f32>,
}

/// Decoded anomaly result.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyOutput {
    /// Normalized anomaly score; 0 at the trained typical distance.
    pub score: f32,
}

/// Result of one inference, tagged by the model task.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedOutput {
    /// Classification (multi-class or binary).
    Classification(ClassificationOutput),
    /// Regression.
    Regression(RegressionOutput),
    /// Anomaly detection.
    Anomaly(AnomalyOutput),
}

/// Arg-max over float outputs; single-output binary models threshold at
/// 0.5. Returns `(predicted_class, num_classes)`.
pub(crate) fn predict_class(outputs: &[f32], binary: bool) -> (u16, u16) {
    if binary && outputs.len() == 1 {
        return ((outputs[0] >= 0.5) as u16, 2);
    }
    let mut best = 0usize;
    for (i, &p) in outputs.iter().enumerate() {
        if p > outputs[best] {
            best = i;
        }
    }
    (best as u16, outputs.len() as u16)
}

/// Per-slot inverse min-max into a preallocated buffer:
/// `y = x * (max - min) + min`.
pub(crate) fn descale_regression(outputs: &[f32], min: &[f32], max: &[f32], into: &mut [f32]) {
    for (i, (slot, &x)) in into.iter_mut().zip(outputs.iter()).enumerate() {
        *slot = x * (max[i] - min[i]) + min[i];
    }
}

/// Distance-to-embedding score, min-max normalized and floored at zero.
pub(crate) fn anomaly_score(outputs: &[f32], embedding: &[f32], min: f32, max: f32) -> f32 {
    let mut acc = 0.0f32;
    for (&o, &e) in outputs.iter().zip(embedding.iter()) {
        let d = o - e;
        acc += d * d;
    }
    let distance = acc.sqrt();
    if max == min {
        distance
    } else {
        ((distance - min) / (max - min)).max(0.0)
    }
}

/// Arg-max decode over float outputs.
pub(crate) fn decode_classification(
    outputs: &[f32],
    probabilities: Probabilities,
    binary: bool,
) -> ClassificationOutput {
    let (predicted_class, num_classes) = predict_class(outputs, binary);
    ClassificationOutput {
        predicted_class,
        num_classes,
        probabilities,
    }
}

/// Per-slot inverse min-max: `y = x * (max - min) + min`.
pub(crate) fn decode_regression(outputs: &[f32], min: &[f32], max: &[f32]) -> RegressionOutput {
    let mut values = vec![0.0; outputs.len()];
    descale_regression(outputs, min, max, &mut values);
    RegressionOutput { values }
}

/// Distance-to-embedding score decode.
pub(crate) fn decode_anomaly(
    outputs: &[f32],
    embedding: &[f32],
    min: f32,
    max: f32,
) -> AnomalyOutput {
    AnomalyOutput {
        score: anomaly_score(outputs, embedding, min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_argmax() {
        let outputs = [0.1f32, 0.7, 0.2];
        let decoded = decode_classification(&outputs, Probabilities::F32(outputs.to_vec()), false);
        assert_eq!(decoded.predicted_class, 1);
        assert_eq!(decoded.num_classes, 3);
        assert_eq!(decoded.probabilities, Probabilities::F32(vec![0.1, 0.7, 0.2]));
    }

    #[test]
    fn test_classification_ties_pick_first() {
        let outputs = [0.4f32, 0.4, 0.2];
        let decoded = decode_classification(&outputs, Probabilities::F32(outputs.to_vec()), false);
        assert_eq!(decoded.predicted_class, 0);
    }

    #[test]
    fn test_binary_threshold() {
        let decoded = decode_classification(&[0.61], Probabilities::F32(vec![0.61]), true);
        assert_eq!(decoded.predicted_class, 1);
        assert_eq!(decoded.num_classes, 2);
        let decoded = decode_classification(&[0.39], Probabilities::F32(vec![0.39]), true);
        assert_eq!(decoded.predicted_class, 0);
    }

    #[test]
    fn test_regression_descale() {
        let decoded = decode_regression(&[0.5, 1.0], &[0.0, -5.0], &[10.0, 5.0]);
        assert_eq!(decoded.values, vec![5.0, 5.0]);
    }

    #[test]
    fn test_anomaly_distance_and_normalization() {
        // outputs [3, 4] against origin: distance 5
        let decoded = decode_anomaly(&[3.0, 4.0], &[0.0, 0.0], 1.0, 9.0);
        assert!((decoded.score - 0.5).abs() < 1e-6);
        // below the trained minimum floors at zero
        let decoded = decode_anomaly(&[0.1, 0.0], &[0.0, 0.0], 1.0, 9.0);
        assert_eq!(decoded.score, 0.0);
    }
}
