//! End-to-end runtime tests over hand-built solutions.

use neurite_nn::GraphTopology;
use neurite_rt::{
    DecodedOutput, DspDescriptor, Error, FeatureMask, FeatureScaleTable, FeedProgress,
    InputDescriptor, InputDomain, ModelDescriptor, ModelParams, ModelTask, NeuriteRuntime,
    Probabilities, RtVersion, SampleBlock, ScaleTable, SolutionDescriptor, TimeFeature,
    WindowKind,
};

/// Graph of `n` neurons where neuron `i` forwards input `i` unchanged.
fn passthrough_topology(n: u16) -> GraphTopology {
    GraphTopology {
        neurons: n,
        external_links: vec![1; n as usize],
        internal_links: vec![0; n as usize],
        links: (0..n).collect(),
        activation_mask: vec![0x00; (n as usize + 3) / 4],
        output_indices: (0..n).collect(),
    }
}

fn raw_f32_solution(window_size: u16, task: ModelTask, topology: GraphTopology) -> SolutionDescriptor {
    let params_len = topology.links.len();
    let neurons = topology.neurons as usize;
    SolutionDescriptor {
        solution_id: "73114".into(),
        version: neurite_rt::runtime_version(),
        input: InputDescriptor {
            domain: InputDomain::F32,
            unique_axes: 1,
            window_size,
            window_shift: 0,
            subwindows: 0,
            window_kind: if window_size == 1 {
                WindowKind::Vector
            } else {
                WindowKind::Discrete
            },
            usage_mask: None,
            scale: ScaleTable::F32 {
                min: vec![0.0],
                max: vec![1.0],
            },
        },
        dsp: None,
        model: ModelDescriptor {
            task,
            uses_raw_input: true,
            uses_extracted: false,
            topology,
            params: ModelParams::F32 {
                weights: vec![1.0; params_len],
                act_weights: vec![0.0; neurons],
            },
            output_scale_min: None,
            output_scale_max: None,
            average_embedding: None,
            dequantize_outputs: true,
        },
    }
}

#[test]
fn test_regression_pipeline_descales() {
    // one neuron summing both window samples, identity activation
    let topology = GraphTopology {
        neurons: 1,
        external_links: vec![2],
        internal_links: vec![0],
        links: vec![0, 1],
        activation_mask: vec![0x00],
        output_indices: vec![0],
    };
    let mut desc = raw_f32_solution(2, ModelTask::Regression, topology);
    desc.model.output_scale_min = Some(vec![0.0]);
    desc.model.output_scale_max = Some(vec![10.0]);

    let mut rt = NeuriteRuntime::from_descriptor(desc).unwrap();
    rt.init().unwrap();

    assert_eq!(
        rt.feed_inputs(SampleBlock::F32(&[0.2])).unwrap(),
        FeedProgress::Collecting { remaining: 1 }
    );
    assert!(rt.feed_inputs(SampleBlock::F32(&[0.3])).unwrap().is_ready());

    match rt.run_inference().unwrap() {
        DecodedOutput::Regression(r) => {
            assert!((r.values[0] - 5.0).abs() < 1e-6, "got {}", r.values[0]);
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn test_classification_pipeline_argmax() {
    let mut rt = NeuriteRuntime::from_descriptor(raw_f32_solution(
        3,
        ModelTask::MultiClass,
        passthrough_topology(3),
    ))
    .unwrap();
    rt.init().unwrap();

    rt.feed_inputs(SampleBlock::F32(&[0.1, 0.7, 0.2])).unwrap();
    match rt.run_inference().unwrap() {
        DecodedOutput::Classification(c) => {
            assert_eq!(c.predicted_class, 1);
            assert_eq!(c.num_classes, 3);
            match &c.probabilities {
                Probabilities::F32(p) => {
                    assert!((p[0] - 0.1).abs() < 1e-6);
                    assert!((p[1] - 0.7).abs() < 1e-6);
                    assert!((p[2] - 0.2).abs() < 1e-6);
                }
                other => panic!("unexpected probabilities: {other:?}"),
            }
        }
        other => panic!("unexpected decode: {other:?}"),
    }
    assert!(rt.decoded().is_some());
}

#[test]
fn test_anomaly_pipeline_scores_distance() {
    let mut desc = raw_f32_solution(2, ModelTask::AnomalyDetection, passthrough_topology(2));
    desc.model.average_embedding = Some(vec![0.0, 0.0]);
    desc.model.output_scale_min = Some(vec![1.0]);
    desc.model.output_scale_max = Some(vec![9.0]);

    let mut rt = NeuriteRuntime::from_descriptor(desc).unwrap();
    rt.init().unwrap();
    // min-max scaling over [0, 1] leaves the values as-is
    rt.feed_inputs(SampleBlock::F32(&[3.0, 4.0])).unwrap();
    match rt.run_inference().unwrap() {
        DecodedOutput::Anomaly(a) => {
            // |(3,4)| = 5, normalized by (1, 9)
            assert!((a.score - 0.5).abs() < 1e-6, "score {}", a.score);
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn test_lifecycle_enforced() {
    let mut rt = NeuriteRuntime::from_descriptor(raw_f32_solution(
        2,
        ModelTask::MultiClass,
        passthrough_topology(2),
    ))
    .unwrap();

    // operations before init are unavailable
    assert!(matches!(
        rt.feed_inputs(SampleBlock::F32(&[0.0])),
        Err(Error::Unavailable(_))
    ));
    assert!(matches!(rt.run_inference(), Err(Error::Unavailable(_))));

    rt.init().unwrap();
    assert!(matches!(rt.init(), Err(Error::InvalidArgument(_))));

    // window not ready yet
    rt.feed_inputs(SampleBlock::F32(&[0.5])).unwrap();
    assert!(matches!(rt.run_inference(), Err(Error::Unavailable(_))));
}

#[test]
fn test_incompatible_solution_rejected_at_init() {
    let mut desc = raw_f32_solution(2, ModelTask::MultiClass, passthrough_topology(2));
    desc.version = RtVersion::new(neurite_rt::runtime_version().major + 1, 0, 0);
    let mut rt = NeuriteRuntime::from_descriptor(desc).unwrap();
    assert!(!rt.is_runtime_compatible());
    assert!(matches!(rt.init(), Err(Error::Incompatible { .. })));
}

#[test]
fn test_sample_domain_mismatch_rejected() {
    let mut rt = NeuriteRuntime::from_descriptor(raw_f32_solution(
        2,
        ModelTask::MultiClass,
        passthrough_topology(2),
    ))
    .unwrap();
    rt.init().unwrap();
    assert!(matches!(
        rt.feed_inputs(SampleBlock::I16(&[1, 2])),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_axis_misaligned_feed_fails_fast() {
    // two interleaved axes; feeding an odd count is a contract violation
    let topology = passthrough_topology(4);
    let mut desc = raw_f32_solution(2, ModelTask::MultiClass, topology);
    desc.input.unique_axes = 2;
    let mut rt = NeuriteRuntime::from_descriptor(desc).unwrap();
    rt.init().unwrap();
    assert!(rt.feed_inputs(SampleBlock::F32(&[1.0])).is_err());
}

#[test]
fn test_masked_axes_skip_unused_data() {
    // three axes in hardware, model trained on axes 0 and 2 only
    let mut desc = raw_f32_solution(2, ModelTask::MultiClass, passthrough_topology(4));
    desc.input.unique_axes = 3;
    desc.input.usage_mask = Some(vec![0b0000_0101]);

    let mut rt = NeuriteRuntime::from_descriptor(desc).unwrap();
    rt.init().unwrap();

    // axis 1 carries garbage that must never reach the model
    rt.feed_inputs(SampleBlock::F32(&[0.9, 555.0, 0.1])).unwrap();
    let ready = rt.feed_inputs(SampleBlock::F32(&[0.8, 444.0, 0.2])).unwrap();
    assert!(ready.is_ready());

    match rt.run_inference().unwrap() {
        DecodedOutput::Classification(c) => match &c.probabilities {
            Probabilities::F32(p) => {
                // axis-major: [0.9, 0.8] then [0.1, 0.2]
                assert_eq!(p.as_slice(), &[0.9, 0.8, 0.1, 0.2]);
            }
            other => panic!("unexpected probabilities: {other:?}"),
        },
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn test_sliding_window_cadence() {
    // window 4, shift 2: first result after 4 groups, then every 2
    let mut desc = raw_f32_solution(4, ModelTask::MultiClass, passthrough_topology(4));
    desc.input.window_kind = WindowKind::Sliding;
    desc.input.window_shift = 2;

    let mut rt = NeuriteRuntime::from_descriptor(desc).unwrap();
    rt.init().unwrap();

    let mut ready_at = Vec::new();
    for i in 0..8 {
        let p = rt
            .feed_inputs(SampleBlock::F32(&[i as f32 / 10.0]))
            .unwrap();
        if p.is_ready() {
            ready_at.push(i);
        }
    }
    assert_eq!(ready_at, vec![3, 5, 7]);

    // after the last feed the window holds samples 4..8
    match rt.run_inference().unwrap() {
        DecodedOutput::Classification(c) => match &c.probabilities {
            Probabilities::F32(p) => {
                assert_eq!(p.as_slice(), &[0.4, 0.5, 0.6, 0.7]);
            }
            other => panic!("unexpected probabilities: {other:?}"),
        },
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn test_dsp_feature_pipeline_f32() {
    // one axis, window of 4, extract mean and rms, pass them through two
    // neurons; feature scaling 0..1 keeps the values readable
    let desc = SolutionDescriptor {
        solution_id: "90210".into(),
        version: neurite_rt::runtime_version(),
        input: InputDescriptor {
            domain: InputDomain::F32,
            unique_axes: 1,
            window_size: 4,
            window_shift: 0,
            subwindows: 0,
            window_kind: WindowKind::Discrete,
            usage_mask: None,
            scale: ScaleTable::F32 {
                min: vec![0.0],
                max: vec![1.0],
            },
        },
        dsp: Some(DspDescriptor {
            masks: vec![FeatureMask::EMPTY
                .with_time(TimeFeature::Mean)
                .with_time(TimeFeature::Rms)],
            fft_length: None,
            args: Vec::new(),
            feature_scale: FeatureScaleTable::F32 {
                min: vec![0.0, 0.0],
                max: vec![1.0, 1.0],
            },
        }),
        model: ModelDescriptor {
            task: ModelTask::MultiClass,
            uses_raw_input: false,
            uses_extracted: true,
            topology: passthrough_topology(2),
            params: ModelParams::F32 {
                weights: vec![1.0, 1.0],
                act_weights: vec![0.0, 0.0],
            },
            output_scale_min: None,
            output_scale_max: None,
            average_embedding: None,
            dequantize_outputs: true,
        },
    };

    let mut rt = NeuriteRuntime::from_descriptor(desc).unwrap();
    rt.init().unwrap();
    rt.feed_inputs(SampleBlock::F32(&[0.3, 0.3, 0.3, 0.3])).unwrap();
    match rt.run_inference().unwrap() {
        DecodedOutput::Classification(c) => match &c.probabilities {
            Probabilities::F32(p) => {
                // constant signal: mean == rms == 0.3
                assert!((p[0] - 0.3).abs() < 1e-6, "mean {}", p[0]);
                assert!((p[1] - 0.3).abs() < 1e-6, "rms {}", p[1]);
            }
            other => panic!("unexpected probabilities: {other:?}"),
        },
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn test_i16_q16_quantized_pipeline() {
    // i16 stream scaled into the q16 lane; a passthrough neuron exposes
    // the scaled input, dequantized for decode
    let desc = SolutionDescriptor {
        solution_id: "55001".into(),
        version: neurite_rt::runtime_version(),
        input: InputDescriptor {
            domain: InputDomain::I16,
            unique_axes: 1,
            window_size: 2,
            window_shift: 0,
            subwindows: 0,
            window_kind: WindowKind::Discrete,
            usage_mask: None,
            scale: ScaleTable::I16 {
                min: vec![0],
                max: vec![1000],
            },
        },
        dsp: None,
        model: ModelDescriptor {
            task: ModelTask::BinaryClass,
            uses_raw_input: true,
            uses_extracted: false,
            topology: GraphTopology {
                neurons: 1,
                external_links: vec![1],
                internal_links: vec![0],
                links: vec![0],
                activation_mask: vec![0x00],
                output_indices: vec![0],
            },
            params: ModelParams::Q16 {
                weights: vec![32767],
                act_weights: vec![0],
            },
            output_scale_min: None,
            output_scale_max: None,
            average_embedding: None,
            dequantize_outputs: true,
        },
    };

    let mut rt = NeuriteRuntime::from_descriptor(desc).unwrap();
    rt.init().unwrap();
    rt.feed_inputs(SampleBlock::I16(&[750, 250])).unwrap();
    match rt.run_inference().unwrap() {
        DecodedOutput::Classification(c) => {
            // first window sample scaled to 0.75 drives the binary class
            assert_eq!(c.num_classes, 2);
            assert_eq!(c.predicted_class, 1);
            match &c.probabilities {
                Probabilities::F32(p) => {
                    assert!((p[0] - 0.75).abs() < 0.01, "p = {}", p[0]);
                }
                other => panic!("unexpected probabilities: {other:?}"),
            }
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn test_descriptor_roundtrip_preserves_behavior() {
    let desc = raw_f32_solution(3, ModelTask::MultiClass, passthrough_topology(3));
    let json = serde_json::to_string(&desc).unwrap();
    let back: SolutionDescriptor = serde_json::from_str(&json).unwrap();

    let mut rt = NeuriteRuntime::from_descriptor(back).unwrap();
    rt.init().unwrap();
    rt.feed_inputs(SampleBlock::F32(&[0.2, 0.9, 0.4])).unwrap();
    match rt.run_inference().unwrap() {
        DecodedOutput::Classification(c) => assert_eq!(c.predicted_class, 1),
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn test_accessors_report_solution_shape() {
    let rt = NeuriteRuntime::from_descriptor(raw_f32_solution(
        3,
        ModelTask::MultiClass,
        passthrough_topology(3),
    ))
    .unwrap();
    assert_eq!(rt.input_domain(), InputDomain::F32);
    assert_eq!(rt.unique_inputs(), 1);
    assert_eq!(rt.window_size(), 3);
    assert_eq!(rt.subwindows(), 0);
    assert_eq!(rt.neurons_count(), 3);
    assert_eq!(rt.weights_count(), 3);
    assert_eq!(rt.outputs_count(), 3);
    assert_eq!(rt.task(), ModelTask::MultiClass);
    assert_eq!(rt.solution_id(), "73114");
    assert!(rt.is_runtime_compatible());
    assert!(rt.decoded().is_none());
}
