//! Compiled-solution description: the model compiler's output as one
//! deserializable value.
//!
//! Everything here is read-only after load. Validation is deliberately
//! shallow — array-length consistency and variant agreement — trusting
//! the compiler for the rest, exactly as the on-device runtime trusts
//! its generated tables. The packed wire blobs (activation mask, axis
//! usage mask) stay packed in the descriptor and are decoded by the
//! consuming stage at load time.

use serde::{Deserialize, Serialize};

use neurite_nn::GraphTopology;

use crate::error::{Error, Result};
use crate::features::{ArgProvider, FeatureArgs, FeatureMask, TableArgs};
use crate::version::RtVersion;

/// Raw sample domain of the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputDomain {
    /// 8-bit signed samples.
    I8,
    /// 16-bit signed samples.
    I16,
    /// 32-bit float samples.
    F32,
}

/// Windowing strategy of the ingestion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowKind {
    /// One sample vector per inference; a discrete window of size 1.
    Vector,
    /// Non-overlapping windows.
    Discrete,
    /// Overlapping windows shifted by `window_shift` when full.
    Sliding,
}

/// Task the model was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTask {
    /// Multi-class classification.
    MultiClass,
    /// Binary classification.
    BinaryClass,
    /// Regression.
    Regression,
    /// Anomaly detection against a reference embedding.
    AnomalyDetection,
}

/// Per-axis min/max scaling bounds, typed by the input domain.
///
/// A single-entry table is shared across all axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScaleTable {
    /// Bounds for 8-bit input.
    I8 {
        /// Per-axis minima.
        min: Vec<i8>,
        /// Per-axis maxima.
        max: Vec<i8>,
    },
    /// Bounds for 16-bit input.
    I16 {
        /// Per-axis minima.
        min: Vec<i16>,
        /// Per-axis maxima.
        max: Vec<i16>,
    },
    /// Bounds for float input.
    F32 {
        /// Per-axis minima.
        min: Vec<f32>,
        /// Per-axis maxima.
        max: Vec<f32>,
    },
}

impl ScaleTable {
    /// Number of entries (shared table = 1).
    pub fn len(&self) -> usize {
        match self {
            ScaleTable::I8 { min, .. } => min.len(),
            ScaleTable::I16 { min, .. } => min.len(),
            ScaleTable::F32 { min, .. } => min.len(),
        }
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn domain(&self) -> InputDomain {
        match self {
            ScaleTable::I8 { .. } => InputDomain::I8,
            ScaleTable::I16 { .. } => InputDomain::I16,
            ScaleTable::F32 { .. } => InputDomain::F32,
        }
    }

    fn lengths_agree(&self) -> bool {
        match self {
            ScaleTable::I8 { min, max } => min.len() == max.len(),
            ScaleTable::I16 { min, max } => min.len() == max.len(),
            ScaleTable::F32 { min, max } => min.len() == max.len(),
        }
    }
}

/// Ingestion-stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDescriptor {
    /// Raw sample domain.
    pub domain: InputDomain,
    /// Unique axes interleaved in the incoming stream.
    pub unique_axes: u16,
    /// Window capacity in sample groups.
    pub window_size: u16,
    /// Shift per refill round (sliding windows only).
    #[serde(default)]
    pub window_shift: u16,
    /// Subwindow count for feature extraction; 0 or 1 = whole window.
    #[serde(default)]
    pub subwindows: u8,
    /// Windowing strategy.
    pub window_kind: WindowKind,
    /// 1-bit-per-axis usage mask, LSB-first; absent = all axes used.
    #[serde(default)]
    pub usage_mask: Option<Vec<u8>>,
    /// Per-axis raw scaling bounds.
    pub scale: ScaleTable,
}

impl InputDescriptor {
    /// Number of axes actually collected into the window.
    pub fn used_axes(&self) -> usize {
        match &self.usage_mask {
            Some(mask) => neurite_dsp::window::used_axes(mask, self.unique_axes as usize),
            None => self.unique_axes as usize,
        }
    }

    /// Effective subwindow count.
    pub fn subwindow_count(&self) -> usize {
        (self.subwindows as usize).max(1)
    }
}

/// Per-feature min/max scaling bounds, typed by the extraction output
/// domain of the input samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeatureScaleTable {
    /// Bounds for features extracted from 8-bit input.
    I16 {
        /// Per-feature minima.
        min: Vec<i16>,
        /// Per-feature maxima.
        max: Vec<i16>,
    },
    /// Bounds for features extracted from 16-bit input.
    I32 {
        /// Per-feature minima.
        min: Vec<i32>,
        /// Per-feature maxima.
        max: Vec<i32>,
    },
    /// Bounds for features extracted from float input.
    F32 {
        /// Per-feature minima.
        min: Vec<f32>,
        /// Per-feature maxima.
        max: Vec<f32>,
    },
}

impl FeatureScaleTable {
    /// Number of feature entries.
    pub fn len(&self) -> usize {
        match self {
            FeatureScaleTable::I16 { min, .. } => min.len(),
            FeatureScaleTable::I32 { min, .. } => min.len(),
            FeatureScaleTable::F32 { min, .. } => min.len(),
        }
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Feature-extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DspDescriptor {
    /// One feature mask per collected axis.
    pub masks: Vec<FeatureMask>,
    /// Real-FFT length for the frequency path (power of two). Required
    /// when any mask selects a frequency-domain kind.
    #[serde(default)]
    pub fft_length: Option<u16>,
    /// Per-axis kernel arguments; empty = defaults.
    #[serde(default)]
    pub args: Vec<FeatureArgs>,
    /// Per-feature scaling bounds, in extraction order.
    pub feature_scale: FeatureScaleTable,
}

impl DspDescriptor {
    /// Argument provider backed by the descriptor table.
    pub fn arg_table(&self) -> TableArgs {
        TableArgs {
            table: self.args.clone(),
        }
    }
}

/// Weight tables at the model's trained precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelParams {
    /// 8-bit quantized weights.
    Q8 {
        /// Link weights, Q7.
        weights: Vec<i8>,
        /// Activation slopes, Q4.
        act_weights: Vec<u8>,
    },
    /// 16-bit quantized weights.
    Q16 {
        /// Link weights, Q15.
        weights: Vec<i16>,
        /// Activation slopes, Q12.
        act_weights: Vec<u16>,
    },
    /// Float weights.
    F32 {
        /// Link weights.
        weights: Vec<f32>,
        /// Activation slopes.
        act_weights: Vec<f32>,
    },
}

fn default_true() -> bool {
    true
}

/// Model-stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Trained task.
    pub task: ModelTask,
    /// Whether the scaled raw window feeds the graph.
    #[serde(default)]
    pub uses_raw_input: bool,
    /// Whether extracted features feed the graph.
    #[serde(default = "default_true")]
    pub uses_extracted: bool,
    /// Graph topology tables.
    pub topology: GraphTopology,
    /// Weight tables.
    pub params: ModelParams,
    /// Per-output descale minima (regression; anomaly uses entry 0).
    #[serde(default)]
    pub output_scale_min: Option<Vec<f32>>,
    /// Per-output descale maxima.
    #[serde(default)]
    pub output_scale_max: Option<Vec<f32>>,
    /// Reference embedding for anomaly scoring.
    #[serde(default)]
    pub average_embedding: Option<Vec<f32>>,
    /// Dequantize classification probabilities to float.
    #[serde(default = "default_true")]
    pub dequantize_outputs: bool,
}

/// One compiled solution: everything the runtime needs to execute it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionDescriptor {
    /// Solution identifier string.
    pub solution_id: String,
    /// Runtime version the solution was compiled for.
    pub version: RtVersion,
    /// Ingestion configuration.
    pub input: InputDescriptor,
    /// Feature-extraction configuration; absent for raw-input models.
    #[serde(default)]
    pub dsp: Option<DspDescriptor>,
    /// Model configuration.
    pub model: ModelDescriptor,
}

impl SolutionDescriptor {
    /// Cheap consistency validation of the loaded tables.
    pub fn validate(&self) -> Result<()> {
        let input = &self.input;
        if input.unique_axes == 0 {
            return Err(Error::InvalidArgument("unique_axes must be positive".into()));
        }
        if input.window_size == 0 {
            return Err(Error::InvalidArgument("window_size must be positive".into()));
        }
        if input.window_kind == WindowKind::Vector && input.window_size != 1 {
            return Err(Error::InvalidArgument(
                "vector ingestion requires window_size == 1".into(),
            ));
        }
        if input.scale.domain() != input.domain {
            return Err(Error::InvalidArgument(
                "input scale table domain differs from input domain".into(),
            ));
        }
        if !input.scale.lengths_agree() {
            return Err(Error::InvalidArgument(
                "input scale min/max lengths differ".into(),
            ));
        }
        let scales = input.scale.len();
        if scales != 1 && scales != input.used_axes() {
            return Err(Error::InvalidArgument(format!(
                "input scale table holds {scales} entries for {} used axes",
                input.used_axes()
            )));
        }
        if let Some(mask) = &input.usage_mask {
            let need = (input.unique_axes as usize + 7) / 8;
            if mask.len() < need {
                return Err(Error::InvalidArgument(format!(
                    "usage mask holds {} bytes, {need} required",
                    mask.len()
                )));
            }
            if input.used_axes() == 0 {
                return Err(Error::InvalidArgument("usage mask selects no axes".into()));
            }
        }

        if self.model.uses_extracted && self.dsp.is_none() {
            return Err(Error::MissingArgument(
                "model consumes extracted features but no dsp descriptor is present".into(),
            ));
        }
        if !self.model.uses_extracted && !self.model.uses_raw_input {
            return Err(Error::InvalidArgument(
                "model consumes neither raw input nor extracted features".into(),
            ));
        }

        if let Some(dsp) = &self.dsp {
            if dsp.masks.len() != input.used_axes() {
                return Err(Error::InvalidArgument(format!(
                    "{} feature masks for {} used axes",
                    dsp.masks.len(),
                    input.used_axes()
                )));
            }
            let any_freq = dsp.masks.iter().any(|m| m.any_freq());
            if any_freq && dsp.fft_length.is_none() {
                return Err(Error::MissingArgument(
                    "frequency features selected but fft_length is absent".into(),
                ));
            }
            let expected = self.total_features();
            if dsp.feature_scale.len() != expected {
                return Err(Error::InvalidArgument(format!(
                    "feature scale table holds {} entries, extraction produces {expected}",
                    dsp.feature_scale.len()
                )));
            }
            let feature_domain_ok = matches!(
                (&dsp.feature_scale, input.domain),
                (FeatureScaleTable::I16 { .. }, InputDomain::I8)
                    | (FeatureScaleTable::I32 { .. }, InputDomain::I16)
                    | (FeatureScaleTable::F32 { .. }, InputDomain::F32)
            );
            if !feature_domain_ok {
                return Err(Error::InvalidArgument(
                    "feature scale table domain differs from extraction domain".into(),
                ));
            }
        }

        let outputs = self.model.topology.output_indices.len();
        match self.model.task {
            ModelTask::Regression => {
                let min = self.model.output_scale_min.as_deref().unwrap_or(&[]);
                let max = self.model.output_scale_max.as_deref().unwrap_or(&[]);
                if min.len() != outputs || max.len() != outputs {
                    return Err(Error::MissingArgument(
                        "regression requires per-output descale bounds".into(),
                    ));
                }
            }
            ModelTask::AnomalyDetection => {
                let emb = self.model.average_embedding.as_deref().unwrap_or(&[]);
                if emb.len() != outputs {
                    return Err(Error::MissingArgument(
                        "anomaly detection requires an average embedding per output".into(),
                    ));
                }
                if self.model.output_scale_min.as_deref().map_or(true, |v| v.is_empty())
                    || self.model.output_scale_max.as_deref().map_or(true, |v| v.is_empty())
                {
                    return Err(Error::MissingArgument(
                        "anomaly detection requires score descale bounds".into(),
                    ));
                }
            }
            ModelTask::MultiClass | ModelTask::BinaryClass => {}
        }
        Ok(())
    }

    /// Total extracted-feature count over all axes and subwindows.
    pub fn total_features(&self) -> usize {
        match &self.dsp {
            Some(dsp) => {
                let provider = dsp.arg_table();
                crate::features::total_features(
                    &dsp.masks,
                    &provider as &dyn ArgProvider,
                    self.input.subwindow_count(),
                )
            }
            None => 0,
        }
    }

    /// Number of values the graph receives per inference.
    pub fn nn_input_count(&self) -> usize {
        let mut count = 0;
        if self.model.uses_raw_input {
            count += self.input.window_size as usize * self.input.used_axes();
        }
        if self.model.uses_extracted {
            count += self.total_features();
        }
        count
    }
}
