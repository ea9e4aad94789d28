//! The sparse graph evaluator.
//!
//! One inference call walks neurons `0..N-1` in index order. Each neuron
//! zeroes a widened accumulator, consumes its external links (feature
//! inputs, bias at index `inputs.len()`), then its internal links
//! (earlier neuron outputs), one weight per link in link order, applies
//! its activation and stores the result in the neuron buffer. After the
//! walk, output propagation copies the configured output neurons out, in
//! configured order, optionally dequantizing to float.

use tracing::trace;

use crate::error::{NnError, Result};
use crate::graph::{GraphTopology, NeuronGraph};
use crate::precision::Precision;

/// Evaluator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Metadata validated; no inference has run yet.
    Ready,
    /// At least one inference completed; outputs are valid.
    Done,
}

/// Sparse neuron-graph evaluator at one numeric precision.
///
/// Owns the graph, the read-only weight tables and the working neuron
/// buffer; everything is sized at construction and never reallocated.
pub struct SparseEngine<P: Precision> {
    graph: NeuronGraph,
    weights: Vec<P::Weight>,
    act_weights: Vec<P::ActWeight>,
    neurons: Vec<P::Neuron>,
    state: EngineState,
}

impl<P: Precision> SparseEngine<P> {
    /// Build an evaluator from a topology and its weight tables.
    pub fn new(
        topology: &GraphTopology,
        weights: Vec<P::Weight>,
        act_weights: Vec<P::ActWeight>,
    ) -> Result<Self> {
        let graph = NeuronGraph::decode(topology)?;
        if weights.len() != graph.link_count() {
            return Err(NnError::LengthMismatch {
                what: "weights",
                got: weights.len(),
                expected: graph.link_count(),
            });
        }
        if act_weights.len() != graph.neurons() {
            return Err(NnError::LengthMismatch {
                what: "activation weights",
                got: act_weights.len(),
                expected: graph.neurons(),
            });
        }
        let neurons = vec![P::Neuron::default(); graph.neurons()];
        Ok(Self {
            graph,
            weights,
            act_weights,
            neurons,
            state: EngineState::Ready,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of neurons.
    pub fn neurons_count(&self) -> usize {
        self.graph.neurons()
    }

    /// Number of weights.
    pub fn weights_count(&self) -> usize {
        self.weights.len()
    }

    /// Number of output neurons.
    pub fn outputs_count(&self) -> usize {
        self.graph.outputs().len()
    }

    /// All neuron outputs of the last inference.
    pub fn neuron_values(&self) -> &[P::Neuron] {
        &self.neurons
    }

    /// Evaluate the graph over one input vector.
    ///
    /// `inputs` is the external feature vector; link index
    /// `inputs.len()` selects the constant bias input. The call either
    /// completes fully or reports a model inconsistency; there is no
    /// partial state to resume.
    pub fn infer(&mut self, inputs: &[P::Neuron]) -> Result<()> {
        #[cfg(feature = "runtime-checks")]
        self.check_external_bounds(inputs.len())?;

        for n in 0..self.graph.neurons() {
            let span = self.graph.span(n);
            let mut acc = P::Acc::default();
            for l in span.start..span.split {
                let idx = self.graph.link(l) as usize;
                let value = if idx == inputs.len() {
                    P::bias()
                } else {
                    inputs[idx]
                };
                acc = P::madd(acc, value, self.weights[l]);
            }
            for l in span.split..span.end {
                let idx = self.graph.link(l) as usize;
                acc = P::madd(acc, self.neurons[idx], self.weights[l]);
            }
            self.neurons[n] = P::activate(self.graph.kinds()[n], acc, self.act_weights[n]);
        }
        self.state = EngineState::Done;
        trace!(
            lane = P::NAME,
            neurons = self.graph.neurons(),
            inputs = inputs.len(),
            "graph evaluated"
        );
        Ok(())
    }

    /// Copy output-neuron values into `out`, in configured order.
    pub fn propagate(&self, out: &mut [P::Neuron]) -> Result<()> {
        if self.state != EngineState::Done {
            return Err(NnError::NotEvaluated);
        }
        let outputs = self.graph.outputs();
        if out.len() < outputs.len() {
            return Err(NnError::BufferTooSmall {
                need: outputs.len(),
                have: out.len(),
            });
        }
        for (slot, &idx) in out.iter_mut().zip(outputs.iter()) {
            *slot = self.neurons[idx as usize];
        }
        Ok(())
    }

    /// Copy output-neuron values into `out` dequantized to float, in
    /// configured order.
    pub fn propagate_f32(&self, out: &mut [f32]) -> Result<()> {
        if self.state != EngineState::Done {
            return Err(NnError::NotEvaluated);
        }
        let outputs = self.graph.outputs();
        if out.len() < outputs.len() {
            return Err(NnError::BufferTooSmall {
                need: outputs.len(),
                have: out.len(),
            });
        }
        for (slot, &idx) in out.iter_mut().zip(outputs.iter()) {
            *slot = P::to_f32(self.neurons[idx as usize]);
        }
        Ok(())
    }

    #[cfg(feature = "runtime-checks")]
    fn check_external_bounds(&self, inputs: usize) -> Result<()> {
        for n in 0..self.graph.neurons() {
            let span = self.graph.span(n);
            for l in span.start..span.split {
                let idx = self.graph.link(l);
                if idx as usize > inputs {
                    return Err(NnError::ExternalIndexOutOfRange {
                        neuron: n,
                        index: idx,
                        inputs,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::{F32, Q16, Q8};

    fn toy_topology() -> GraphTopology {
        // neuron 0: one external link to input 0
        // neuron 1: one external link to input 1
        // neuron 2: internal links to neurons 0 and 1
        GraphTopology {
            neurons: 3,
            external_links: vec![1, 1, 0],
            internal_links: vec![0, 0, 2],
            links: vec![0, 1, 0, 1],
            activation_mask: vec![0x00], // identity everywhere
            output_indices: vec![2],
        }
    }

    #[test]
    fn test_toy_graph_sums_inputs() {
        let topo = toy_topology();
        let mut engine =
            SparseEngine::<F32>::new(&topo, vec![1.0, 1.0, 1.0, 1.0], vec![0.0; 3]).unwrap();
        assert_eq!(engine.state(), EngineState::Ready);

        engine.infer(&[2.0, 3.0]).unwrap();
        assert_eq!(engine.state(), EngineState::Done);

        let mut out = [0.0f32; 1];
        engine.propagate(&mut out).unwrap();
        assert_eq!(out[0], 5.0);
    }

    #[test]
    fn test_propagate_before_infer_rejected() {
        let topo = toy_topology();
        let engine =
            SparseEngine::<F32>::new(&topo, vec![1.0; 4], vec![0.0; 3]).unwrap();
        let mut out = [0.0f32; 1];
        assert_eq!(engine.propagate(&mut out), Err(NnError::NotEvaluated));
    }

    #[test]
    fn test_bias_link() {
        // single neuron: external links to input 0 and to the bias slot
        let topo = GraphTopology {
            neurons: 1,
            external_links: vec![2],
            internal_links: vec![0],
            links: vec![0, 1], // inputs.len() == 1, so index 1 is bias
            activation_mask: vec![0x00],
            output_indices: vec![0],
        };
        let mut engine =
            SparseEngine::<F32>::new(&topo, vec![2.0, 0.5], vec![0.0]).unwrap();
        engine.infer(&[3.0]).unwrap();
        let mut out = [0.0f32; 1];
        engine.propagate(&mut out).unwrap();
        assert_eq!(out[0], 6.5); // 3*2 + 1*0.5
    }

    #[test]
    fn test_weight_count_validation() {
        let topo = toy_topology();
        assert!(matches!(
            SparseEngine::<F32>::new(&topo, vec![1.0; 3], vec![0.0; 3]),
            Err(NnError::LengthMismatch { what: "weights", .. })
        ));
        assert!(matches!(
            SparseEngine::<F32>::new(&topo, vec![1.0; 4], vec![0.0; 2]),
            Err(NnError::LengthMismatch { what: "activation weights", .. })
        ));
    }

    #[test]
    fn test_q16_toy_graph() {
        let topo = toy_topology();
        // unit weights in Q15
        let mut engine =
            SparseEngine::<Q16>::new(&topo, vec![32767; 4], vec![0; 3]).unwrap();
        // inputs 0.25 and 0.5 in Q15
        engine.infer(&[8192, 16384]).unwrap();
        let mut out = [0u16; 1];
        engine.propagate(&mut out).unwrap();
        // ~0.75 in Q15, within a couple of quantization steps
        assert!((out[0] as i32 - 24575).abs() <= 3, "out = {}", out[0]);

        let mut f = [0.0f32; 1];
        engine.propagate_f32(&mut f).unwrap();
        assert!((f[0] - 0.75).abs() < 1e-3);
    }

    #[test]
    fn test_q8_saturation_at_unit() {
        // two full-scale inputs through unit weights saturate at 1.0
        let topo = GraphTopology {
            neurons: 1,
            external_links: vec![2],
            internal_links: vec![0],
            links: vec![0, 1],
            activation_mask: vec![0x00],
            output_indices: vec![0],
        };
        let mut engine = SparseEngine::<Q8>::new(&topo, vec![127, 127], vec![0]).unwrap();
        engine.infer(&[127, 127]).unwrap();
        let mut out = [0u8; 1];
        engine.propagate(&mut out).unwrap();
        assert_eq!(out[0], 127);
    }

    #[test]
    fn test_output_order_follows_configuration() {
        let topo = GraphTopology {
            neurons: 2,
            external_links: vec![1, 1],
            internal_links: vec![0, 0],
            links: vec![0, 1],
            activation_mask: vec![0x00],
            output_indices: vec![1, 0], // reversed on purpose
        };
        let mut engine =
            SparseEngine::<F32>::new(&topo, vec![1.0, 1.0], vec![0.0; 2]).unwrap();
        engine.infer(&[10.0, 20.0]).unwrap();
        let mut out = [0.0f32; 2];
        engine.propagate(&mut out).unwrap();
        assert_eq!(out, [20.0, 10.0]);
    }

    #[cfg(feature = "runtime-checks")]
    #[test]
    fn test_external_bounds_checked() {
        let topo = toy_topology();
        let mut engine =
            SparseEngine::<F32>::new(&topo, vec![1.0; 4], vec![0.0; 3]).unwrap();
        // only one input provided, neuron 1 pulls input 1 (the bias slot)
        // and that is legal; shrink further to surface the error
        assert!(engine.infer(&[]).is_err());
    }
}
