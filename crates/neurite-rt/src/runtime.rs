//! The runtime object: one compiled solution wired end to end.
//!
//! [`NeuriteRuntime`] owns every working buffer — window, extracted
//! features, graph input vector, output vector, decoded result — all
//! sized at construction and never reallocated. The fixed 5-stage cycle
//! is feed → extract/scale → infer → propagate → decode; each stage's
//! concrete behavior (window flavor, sample domain, model precision,
//! task decode) was selected once at load from the solution descriptor
//! and lives in an enum, not behind a function-pointer table.
//!
//! The runtime is single-owner and synchronous: `&mut self` on every
//! mutating operation is the whole concurrency story.

use tracing::{debug, trace};

use neurite_dsp::scale::{minmax_float, minmax_float_q, minmax_int_q};
use neurite_dsp::window::{DiscreteWindow, SlidingWindow};
use neurite_dsp::DspError;
use neurite_nn::{SparseEngine, F32, Q16, Q8};

use crate::error::{Error, FeedProgress, Result};
use crate::features::{
    extract_freq_f32, extract_freq_fixed, extract_time_f32, extract_time_fixed, ArgProvider,
    FeatureMask, SpectralScratchF32, SpectralScratchQ15, TableArgs,
};
use crate::output::{
    anomaly_score, descale_regression, predict_class, DecodedOutput, Probabilities,
};
use crate::solution::{
    FeatureScaleTable, InputDomain, ModelParams, ModelTask, ScaleTable, SolutionDescriptor,
    WindowKind,
};
use crate::version::{runtime_version, RtVersion};

/// One block of raw interleaved samples, typed by the input domain.
#[derive(Debug, Clone, Copy)]
pub enum SampleBlock<'a> {
    /// 8-bit samples.
    I8(&'a [i8]),
    /// 16-bit samples.
    I16(&'a [i16]),
    /// Float samples.
    F32(&'a [f32]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuntimeState {
    Created,
    Ready,
}

enum AnyWindow<T> {
    Discrete(DiscreteWindow<T>),
    Sliding(SlidingWindow<T>),
}

impl<T: Copy + Default> AnyWindow<T> {
    fn feed(&mut self, input: &[T], mask: Option<&[u8]>) -> std::result::Result<usize, DspError> {
        match (self, mask) {
            (AnyWindow::Discrete(w), None) => w.feed(input),
            (AnyWindow::Discrete(w), Some(m)) => w.feed_masked(input, m),
            (AnyWindow::Sliding(w), None) => w.feed(input),
            (AnyWindow::Sliding(w), Some(m)) => w.feed_masked(input, m),
        }
    }

    fn is_ready(&self) -> bool {
        match self {
            AnyWindow::Discrete(w) => w.is_ready(),
            AnyWindow::Sliding(w) => w.is_ready(),
        }
    }

    fn collected_axes(&self) -> usize {
        match self {
            AnyWindow::Discrete(w) => w.collected_axes(),
            AnyWindow::Sliding(w) => w.collected_axes(),
        }
    }

    fn axis(&self, idx: usize) -> &[T] {
        match self {
            AnyWindow::Discrete(w) => w.axis(idx),
            AnyWindow::Sliding(w) => w.axis(idx),
        }
    }
}

enum InputWindow {
    I8(AnyWindow<i8>),
    I16(AnyWindow<i16>),
    F32(AnyWindow<f32>),
}

enum Lane {
    Q8(SparseEngine<Q8>),
    Q16(SparseEngine<Q16>),
    F32(SparseEngine<F32>),
}

enum NnInputs {
    Q8(Vec<u8>),
    Q16(Vec<u16>),
    F32(Vec<f32>),
}

impl NnInputs {
    fn len(&self) -> usize {
        match self {
            NnInputs::Q8(v) => v.len(),
            NnInputs::Q16(v) => v.len(),
            NnInputs::F32(v) => v.len(),
        }
    }
}

enum FeatureBuf {
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
}

enum Scratch {
    F32(SpectralScratchF32),
    Q15(SpectralScratchQ15),
}

/// Raw-window scaling bounds, decoded per collected axis at load.
enum RawBounds {
    Int(Vec<(i64, i64)>),
    F32(Vec<(f32, f32)>),
}

/// Extracted-feature scaling bounds, decoded per feature at load.
enum FeatBounds {
    Int(Vec<(i64, i64)>),
    F32(Vec<(f32, f32)>),
}

#[inline]
fn store_scaled_int(nn: &mut NnInputs, idx: usize, x: i64, min: i64, max: i64) {
    match nn {
        NnInputs::Q8(v) => v[idx] = minmax_int_q(x, min, max, 127) as u8,
        NnInputs::Q16(v) => v[idx] = minmax_int_q(x, min, max, 32767) as u16,
        NnInputs::F32(v) => {
            v[idx] = if max == min {
                0.0
            } else {
                (x - min) as f32 / (max - min) as f32
            }
        }
    }
}

#[inline]
fn store_scaled_f32(nn: &mut NnInputs, idx: usize, x: f32, min: f32, max: f32) {
    match nn {
        NnInputs::Q8(v) => v[idx] = minmax_float_q(x, min, max, 127) as u8,
        NnInputs::Q16(v) => v[idx] = minmax_float_q(x, min, max, 32767) as u16,
        NnInputs::F32(v) => v[idx] = minmax_float(x, min, max),
    }
}

fn subwindow_slices<T>(col: &[T], count: usize) -> impl Iterator<Item = &[T]> {
    let n = count.max(1);
    let base = col.len() / n;
    (0..n).map(move |i| {
        if i == n - 1 {
            &col[i * base..]
        } else {
            &col[i * base..(i + 1) * base]
        }
    })
}

/// A compiled solution, loaded and executable.
pub struct NeuriteRuntime {
    desc: SolutionDescriptor,
    state: RuntimeState,
    window: InputWindow,
    masks: Vec<FeatureMask>,
    args: TableArgs,
    subwindows: usize,
    raw_bounds: RawBounds,
    feat_bounds: FeatBounds,
    features: FeatureBuf,
    scratch: Option<Scratch>,
    engine: Lane,
    nn_inputs: NnInputs,
    outputs_f32: Vec<f32>,
    decoded: DecodedOutput,
    has_result: bool,
}

impl NeuriteRuntime {
    /// Load a solution: validate its tables, decode the packed metadata
    /// and size every working buffer. No further allocation happens
    /// after this returns.
    pub fn from_descriptor(desc: SolutionDescriptor) -> Result<Self> {
        desc.validate()?;

        let input = &desc.input;
        let used = input.used_axes();
        let size = input.window_size as usize;
        let axes = input.unique_axes as usize;

        let window = match (input.domain, input.window_kind) {
            (InputDomain::I8, WindowKind::Sliding) => InputWindow::I8(AnyWindow::Sliding(
                SlidingWindow::with_collected(size, axes, used, input.window_shift as usize)?,
            )),
            (InputDomain::I8, _) => InputWindow::I8(AnyWindow::Discrete(
                DiscreteWindow::with_collected(size, axes, used)?,
            )),
            (InputDomain::I16, WindowKind::Sliding) => InputWindow::I16(AnyWindow::Sliding(
                SlidingWindow::with_collected(size, axes, used, input.window_shift as usize)?,
            )),
            (InputDomain::I16, _) => InputWindow::I16(AnyWindow::Discrete(
                DiscreteWindow::with_collected(size, axes, used)?,
            )),
            (InputDomain::F32, WindowKind::Sliding) => InputWindow::F32(AnyWindow::Sliding(
                SlidingWindow::with_collected(size, axes, used, input.window_shift as usize)?,
            )),
            (InputDomain::F32, _) => InputWindow::F32(AnyWindow::Discrete(
                DiscreteWindow::with_collected(size, axes, used)?,
            )),
        };

        let raw_bounds = match &input.scale {
            ScaleTable::I8 { min, max } => RawBounds::Int(
                (0..used)
                    .map(|a| {
                        let i = if min.len() == 1 { 0 } else { a };
                        (min[i] as i64, max[i] as i64)
                    })
                    .collect(),
            ),
            ScaleTable::I16 { min, max } => RawBounds::Int(
                (0..used)
                    .map(|a| {
                        let i = if min.len() == 1 { 0 } else { a };
                        (min[i] as i64, max[i] as i64)
                    })
                    .collect(),
            ),
            ScaleTable::F32 { min, max } => RawBounds::F32(
                (0..used)
                    .map(|a| {
                        let i = if min.len() == 1 { 0 } else { a };
                        (min[i], max[i])
                    })
                    .collect(),
            ),
        };

        let (masks, args, feat_bounds) = match &desc.dsp {
            Some(dsp) => {
                let bounds = match &dsp.feature_scale {
                    FeatureScaleTable::I16 { min, max } => FeatBounds::Int(
                        min.iter()
                            .zip(max.iter())
                            .map(|(&a, &b)| (a as i64, b as i64))
                            .collect(),
                    ),
                    FeatureScaleTable::I32 { min, max } => FeatBounds::Int(
                        min.iter()
                            .zip(max.iter())
                            .map(|(&a, &b)| (a as i64, b as i64))
                            .collect(),
                    ),
                    FeatureScaleTable::F32 { min, max } => FeatBounds::F32(
                        min.iter().zip(max.iter()).map(|(&a, &b)| (a, b)).collect(),
                    ),
                };
                (dsp.masks.clone(), dsp.arg_table(), bounds)
            }
            None => (Vec::new(), TableArgs::default(), FeatBounds::F32(Vec::new())),
        };

        let feature_total = desc.total_features();
        let features = match input.domain {
            InputDomain::I8 => FeatureBuf::I16(vec![0; feature_total]),
            InputDomain::I16 => FeatureBuf::I32(vec![0; feature_total]),
            InputDomain::F32 => FeatureBuf::F32(vec![0.0; feature_total]),
        };

        let scratch = match &desc.dsp {
            Some(dsp) if dsp.masks.iter().any(|m| m.any_freq()) => {
                let fft_len = dsp.fft_length.unwrap_or(0) as usize;
                let max_peaks = (0..used)
                    .map(|a| args.args(a).peaks as usize)
                    .max()
                    .unwrap_or(1);
                Some(match input.domain {
                    InputDomain::F32 => Scratch::F32(SpectralScratchF32::new(fft_len, max_peaks)?),
                    _ => Scratch::Q15(SpectralScratchQ15::new(fft_len, max_peaks)?),
                })
            }
            _ => None,
        };

        let engine = match &desc.model.params {
            ModelParams::Q8 { weights, act_weights } => Lane::Q8(SparseEngine::new(
                &desc.model.topology,
                weights.clone(),
                act_weights.clone(),
            )?),
            ModelParams::Q16 { weights, act_weights } => Lane::Q16(SparseEngine::new(
                &desc.model.topology,
                weights.clone(),
                act_weights.clone(),
            )?),
            ModelParams::F32 { weights, act_weights } => Lane::F32(SparseEngine::new(
                &desc.model.topology,
                weights.clone(),
                act_weights.clone(),
            )?),
        };

        let nn_len = desc.nn_input_count();
        let nn_inputs = match &engine {
            Lane::Q8(_) => NnInputs::Q8(vec![0; nn_len]),
            Lane::Q16(_) => NnInputs::Q16(vec![0; nn_len]),
            Lane::F32(_) => NnInputs::F32(vec![0.0; nn_len]),
        };

        let outputs = desc.model.topology.output_indices.len();
        let decoded = match desc.model.task {
            ModelTask::MultiClass | ModelTask::BinaryClass => {
                let probabilities = if desc.model.dequantize_outputs {
                    Probabilities::F32(vec![0.0; outputs])
                } else {
                    match &engine {
                        Lane::Q8(_) => Probabilities::Q8(vec![0; outputs]),
                        Lane::Q16(_) => Probabilities::Q16(vec![0; outputs]),
                        Lane::F32(_) => Probabilities::F32(vec![0.0; outputs]),
                    }
                };
                DecodedOutput::Classification(crate::output::ClassificationOutput {
                    predicted_class: 0,
                    num_classes: if desc.model.task == ModelTask::BinaryClass && outputs == 1 {
                        2
                    } else {
                        outputs as u16
                    },
                    probabilities,
                })
            }
            ModelTask::Regression => DecodedOutput::Regression(crate::output::RegressionOutput {
                values: vec![0.0; outputs],
            }),
            ModelTask::AnomalyDetection => {
                DecodedOutput::Anomaly(crate::output::AnomalyOutput { score: 0.0 })
            }
        };

        debug!(
            solution = %desc.solution_id,
            axes = used,
            window = size,
            features = feature_total,
            nn_inputs = nn_len,
            "solution loaded"
        );

        let subwindows = input.subwindow_count();
        Ok(Self {
            desc,
            state: RuntimeState::Created,
            window,
            masks,
            args,
            subwindows,
            raw_bounds,
            feat_bounds,
            features,
            scratch,
            engine,
            nn_inputs,
            outputs_f32: vec![0.0; outputs],
            decoded,
            has_result: false,
        })
    }

    /// Validate version compatibility and arm the runtime. Must be
    /// called exactly once before feeding or inference.
    pub fn init(&mut self) -> Result<()> {
        if self.state != RuntimeState::Created {
            return Err(Error::InvalidArgument("init called twice".into()));
        }
        let rt = runtime_version();
        if !self.desc.version.is_compatible_with(rt) {
            return Err(Error::Incompatible {
                runtime: rt.to_string(),
                solution: self.desc.version.to_string(),
            });
        }
        self.state = RuntimeState::Ready;
        Ok(())
    }

    /// Append raw interleaved samples to the input window.
    ///
    /// The sample count must be a multiple of [`unique_inputs`] and the
    /// block domain must match [`input_domain`]. Returns
    /// [`FeedProgress::WindowReady`] when a full window became available.
    ///
    /// [`unique_inputs`]: NeuriteRuntime::unique_inputs
    /// [`input_domain`]: NeuriteRuntime::input_domain
    pub fn feed_inputs(&mut self, samples: SampleBlock<'_>) -> Result<FeedProgress> {
        self.ensure_armed()?;
        let mask = self.desc.input.usage_mask.as_deref();
        let remaining = match (&mut self.window, samples) {
            (InputWindow::I8(w), SampleBlock::I8(s)) => w.feed(s, mask)?,
            (InputWindow::I16(w), SampleBlock::I16(s)) => w.feed(s, mask)?,
            (InputWindow::F32(w), SampleBlock::F32(s)) => w.feed(s, mask)?,
            _ => {
                return Err(Error::InvalidArgument(
                    "sample block domain differs from the solution input domain".into(),
                ))
            }
        };
        trace!(remaining, "inputs fed");
        if remaining == 0 {
            Ok(FeedProgress::WindowReady)
        } else {
            Ok(FeedProgress::Collecting { remaining })
        }
    }

    /// Run extraction/scaling, graph evaluation, output propagation and
    /// decode over the current window.
    pub fn run_inference(&mut self) -> Result<&DecodedOutput> {
        self.ensure_armed()?;
        let ready = match &self.window {
            InputWindow::I8(w) => w.is_ready(),
            InputWindow::I16(w) => w.is_ready(),
            InputWindow::F32(w) => w.is_ready(),
        };
        if !ready {
            return Err(Error::Unavailable("input window is not ready".into()));
        }

        let mut idx = 0usize;
        if self.desc.model.uses_raw_input {
            self.scale_raw_window(&mut idx)?;
        }
        if self.desc.model.uses_extracted {
            self.extract_features()?;
            self.scale_features(&mut idx)?;
        }
        debug_assert_eq!(idx, self.nn_inputs.len());

        match (&mut self.engine, &self.nn_inputs) {
            (Lane::Q8(e), NnInputs::Q8(v)) => e.infer(v)?,
            (Lane::Q16(e), NnInputs::Q16(v)) => e.infer(v)?,
            (Lane::F32(e), NnInputs::F32(v)) => e.infer(v)?,
            _ => return Err(Error::Unspecified("engine/input lane mismatch".into())),
        }

        self.propagate_and_decode()?;
        self.has_result = true;
        trace!(solution = %self.desc.solution_id, "inference complete");
        Ok(&self.decoded)
    }

    /// Result of the last completed inference.
    pub fn decoded(&self) -> Option<&DecodedOutput> {
        self.has_result.then_some(&self.decoded)
    }

    fn ensure_armed(&self) -> Result<()> {
        if self.state != RuntimeState::Ready {
            return Err(Error::Unavailable("runtime not initialized".into()));
        }
        Ok(())
    }

    fn scale_raw_window(&mut self, idx: &mut usize) -> Result<()> {
        let Self {
            window,
            nn_inputs,
            raw_bounds,
            ..
        } = self;
        match (window, raw_bounds) {
            (InputWindow::I8(w), RawBounds::Int(bounds)) => {
                for a in 0..w.collected_axes() {
                    let (mn, mx) = bounds[a];
                    for &x in w.axis(a) {
                        store_scaled_int(nn_inputs, *idx, x as i64, mn, mx);
                        *idx += 1;
                    }
                }
            }
            (InputWindow::I16(w), RawBounds::Int(bounds)) => {
                for a in 0..w.collected_axes() {
                    let (mn, mx) = bounds[a];
                    for &x in w.axis(a) {
                        store_scaled_int(nn_inputs, *idx, x as i64, mn, mx);
                        *idx += 1;
                    }
                }
            }
            (InputWindow::F32(w), RawBounds::F32(bounds)) => {
                for a in 0..w.collected_axes() {
                    let (mn, mx) = bounds[a];
                    for &x in w.axis(a) {
                        store_scaled_f32(nn_inputs, *idx, x, mn, mx);
                        *idx += 1;
                    }
                }
            }
            _ => return Err(Error::Unspecified("window/scale domain mismatch".into())),
        }
        Ok(())
    }

    fn extract_features(&mut self) -> Result<()> {
        let Self {
            window,
            features,
            scratch,
            masks,
            args,
            subwindows,
            ..
        } = self;
        match (window, features) {
            (InputWindow::I8(w), FeatureBuf::I16(buf)) => {
                let mut c = 0usize;
                for a in 0..w.collected_axes() {
                    let mask = masks[a];
                    let kernel_args = args.args(a);
                    for sub in subwindow_slices(w.axis(a), *subwindows) {
                        let mut emit = |v: i16| {
                            buf[c] = v;
                            c += 1;
                        };
                        extract_time_fixed::<i8>(sub, mask, &kernel_args, &mut emit);
                        if mask.any_freq() {
                            match scratch {
                                Some(Scratch::Q15(s)) => {
                                    extract_freq_fixed::<i8>(sub, mask, &kernel_args, s, &mut emit)
                                }
                                _ => {
                                    return Err(Error::Unspecified(
                                        "missing fixed-point spectral scratch".into(),
                                    ))
                                }
                            }
                        }
                    }
                }
            }
            (InputWindow::I16(w), FeatureBuf::I32(buf)) => {
                let mut c = 0usize;
                for a in 0..w.collected_axes() {
                    let mask = masks[a];
                    let kernel_args = args.args(a);
                    for sub in subwindow_slices(w.axis(a), *subwindows) {
                        let mut emit = |v: i32| {
                            buf[c] = v;
                            c += 1;
                        };
                        extract_time_fixed::<i16>(sub, mask, &kernel_args, &mut emit);
                        if mask.any_freq() {
                            match scratch {
                                Some(Scratch::Q15(s)) => {
                                    extract_freq_fixed::<i16>(sub, mask, &kernel_args, s, &mut emit)
                                }
                                _ => {
                                    return Err(Error::Unspecified(
                                        "missing fixed-point spectral scratch".into(),
                                    ))
                                }
                            }
                        }
                    }
                }
            }
            (InputWindow::F32(w), FeatureBuf::F32(buf)) => {
                let mut c = 0usize;
                for a in 0..w.collected_axes() {
                    let mask = masks[a];
                    let kernel_args = args.args(a);
                    for sub in subwindow_slices(w.axis(a), *subwindows) {
                        let mut emit = |v: f32| {
                            buf[c] = v;
                            c += 1;
                        };
                        extract_time_f32(sub, mask, &kernel_args, &mut emit);
                        if mask.any_freq() {
                            match scratch {
                                Some(Scratch::F32(s)) => {
                                    extract_freq_f32(sub, mask, &kernel_args, s, &mut emit)
                                }
                                _ => {
                                    return Err(Error::Unspecified(
                                        "missing float spectral scratch".into(),
                                    ))
                                }
                            }
                        }
                    }
                }
            }
            _ => return Err(Error::Unspecified("window/feature domain mismatch".into())),
        }
        Ok(())
    }

    fn scale_features(&mut self, idx: &mut usize) -> Result<()> {
        let Self {
            features,
            feat_bounds,
            nn_inputs,
            ..
        } = self;
        match (features, feat_bounds) {
            (FeatureBuf::I16(buf), FeatBounds::Int(bounds)) => {
                for (j, &x) in buf.iter().enumerate() {
                    let (mn, mx) = bounds[j];
                    store_scaled_int(nn_inputs, *idx, x as i64, mn, mx);
                    *idx += 1;
                }
            }
            (FeatureBuf::I32(buf), FeatBounds::Int(bounds)) => {
                for (j, &x) in buf.iter().enumerate() {
                    let (mn, mx) = bounds[j];
                    store_scaled_int(nn_inputs, *idx, x as i64, mn, mx);
                    *idx += 1;
                }
            }
            (FeatureBuf::F32(buf), FeatBounds::F32(bounds)) => {
                for (j, &x) in buf.iter().enumerate() {
                    let (mn, mx) = bounds[j];
                    store_scaled_f32(nn_inputs, *idx, x, mn, mx);
                    *idx += 1;
                }
            }
            _ => return Err(Error::Unspecified("feature/scale domain mismatch".into())),
        }
        Ok(())
    }

    fn propagate_and_decode(&mut self) -> Result<()> {
        match &self.engine {
            Lane::Q8(e) => e.propagate_f32(&mut self.outputs_f32)?,
            Lane::Q16(e) => e.propagate_f32(&mut self.outputs_f32)?,
            Lane::F32(e) => e.propagate_f32(&mut self.outputs_f32)?,
        }

        let binary = self.desc.model.task == ModelTask::BinaryClass;
        match &mut self.decoded {
            DecodedOutput::Classification(c) => {
                match &mut c.probabilities {
                    Probabilities::F32(p) => p.copy_from_slice(&self.outputs_f32),
                    Probabilities::Q8(p) => match &self.engine {
                        Lane::Q8(e) => e.propagate(p)?,
                        _ => return Err(Error::Unspecified("probability lane mismatch".into())),
                    },
                    Probabilities::Q16(p) => match &self.engine {
                        Lane::Q16(e) => e.propagate(p)?,
                        _ => return Err(Error::Unspecified("probability lane mismatch".into())),
                    },
                }
                let (class, num) = predict_class(&self.outputs_f32, binary);
                c.predicted_class = class;
                c.num_classes = num;
            }
            DecodedOutput::Regression(r) => {
                let min = self.desc.model.output_scale_min.as_deref().unwrap_or(&[]);
                let max = self.desc.model.output_scale_max.as_deref().unwrap_or(&[]);
                descale_regression(&self.outputs_f32, min, max, &mut r.values);
            }
            DecodedOutput::Anomaly(a) => {
                let embedding = self.desc.model.average_embedding.as_deref().unwrap_or(&[]);
                let min = self
                    .desc
                    .model
                    .output_scale_min
                    .as_deref()
                    .and_then(|v| v.first().copied())
                    .unwrap_or(0.0);
                let max = self
                    .desc
                    .model
                    .output_scale_max
                    .as_deref()
                    .and_then(|v| v.first().copied())
                    .unwrap_or(0.0);
                a.score = anomaly_score(&self.outputs_f32, embedding, min, max);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read-only accessors
    // ------------------------------------------------------------------

    /// Raw sample domain of the input stream.
    pub fn input_domain(&self) -> InputDomain {
        self.desc.input.domain
    }

    /// Number of unique input axes the model was trained on.
    pub fn unique_inputs(&self) -> u16 {
        self.desc.input.unique_axes
    }

    /// Input window size in sample groups.
    pub fn window_size(&self) -> u16 {
        self.desc.input.window_size
    }

    /// Number of subwindows in the input window.
    pub fn subwindows(&self) -> u8 {
        self.desc.input.subwindows
    }

    /// Number of model neurons.
    pub fn neurons_count(&self) -> usize {
        match &self.engine {
            Lane::Q8(e) => e.neurons_count(),
            Lane::Q16(e) => e.neurons_count(),
            Lane::F32(e) => e.neurons_count(),
        }
    }

    /// Number of model weights.
    pub fn weights_count(&self) -> usize {
        match &self.engine {
            Lane::Q8(e) => e.weights_count(),
            Lane::Q16(e) => e.weights_count(),
            Lane::F32(e) => e.weights_count(),
        }
    }

    /// Number of model outputs.
    pub fn outputs_count(&self) -> usize {
        self.outputs_f32.len()
    }

    /// Trained task of the model.
    pub fn task(&self) -> ModelTask {
        self.desc.model.task
    }

    /// Solution identifier string.
    pub fn solution_id(&self) -> &str {
        &self.desc.solution_id
    }

    /// Runtime version the solution was compiled for.
    pub fn solution_version(&self) -> RtVersion {
        self.desc.version
    }

    /// Whether this runtime build can execute the loaded solution.
    pub fn is_runtime_compatible(&self) -> bool {
        self.desc.version.is_compatible_with(runtime_version())
    }
}
