//! Neuron-graph topology: the wire tables and their decoded form.
//!
//! [`GraphTopology`] mirrors the model compiler's output: flat link
//! array, per-neuron link counts, 2-bit-packed activation mask, output
//! indices. [`NeuronGraph`] is the decoded in-memory form the evaluator
//! walks — link spans and activation kinds are resolved once at load so
//! the hot loop never re-derives bit offsets or offsets-of-offsets.

use serde::{Deserialize, Serialize};

use crate::activation::{unpack_mask, ActivationKind};
use crate::error::{NnError, Result};

/// Model-compiler output describing one trained graph.
///
/// All arrays are read-only once loaded. Validation here is the cheap,
/// length-based kind; the deeper DAG-ordering invariant is the model
/// producer's responsibility (checked under the `runtime-checks`
/// feature).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphTopology {
    /// Number of neurons.
    pub neurons: u16,
    /// Per-neuron count of external (feature-input) links.
    pub external_links: Vec<u16>,
    /// Per-neuron count of internal (earlier-neuron) links.
    pub internal_links: Vec<u16>,
    /// Flat link array: for each neuron, its external link targets then
    /// its internal link targets.
    pub links: Vec<u16>,
    /// 2-bit activation codes, packed four per byte, low bits first.
    pub activation_mask: Vec<u8>,
    /// Output neuron indices, in output-vector order.
    pub output_indices: Vec<u16>,
}

/// One neuron's slice of the link/weight arrays.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NeuronSpan {
    /// First link index (also first weight index).
    pub start: usize,
    /// First internal link index; links before it are external.
    pub split: usize,
    /// One past the last link index.
    pub end: usize,
}

/// Decoded, evaluation-ready graph.
#[derive(Debug, Clone)]
pub struct NeuronGraph {
    links: Vec<u16>,
    spans: Vec<NeuronSpan>,
    kinds: Vec<ActivationKind>,
    outputs: Vec<u16>,
}

impl NeuronGraph {
    /// Decode and validate a topology.
    pub fn decode(topo: &GraphTopology) -> Result<Self> {
        let n = topo.neurons as usize;
        if topo.external_links.len() != n {
            return Err(NnError::LengthMismatch {
                what: "external link counts",
                got: topo.external_links.len(),
                expected: n,
            });
        }
        if topo.internal_links.len() != n {
            return Err(NnError::LengthMismatch {
                what: "internal link counts",
                got: topo.internal_links.len(),
                expected: n,
            });
        }
        let total: usize = topo
            .external_links
            .iter()
            .zip(&topo.internal_links)
            .map(|(&e, &i)| e as usize + i as usize)
            .sum();
        if topo.links.len() != total {
            return Err(NnError::LengthMismatch {
                what: "link array",
                got: topo.links.len(),
                expected: total,
            });
        }
        let mask_bytes = (n + 3) / 4;
        if topo.activation_mask.len() < mask_bytes {
            return Err(NnError::LengthMismatch {
                what: "activation mask",
                got: topo.activation_mask.len(),
                expected: mask_bytes,
            });
        }
        for &idx in &topo.output_indices {
            if idx as usize >= n {
                return Err(NnError::OutputIndexOutOfRange { index: idx, neurons: n });
            }
        }

        let mut spans = Vec::with_capacity(n);
        let mut cursor = 0usize;
        for i in 0..n {
            let ext = topo.external_links[i] as usize;
            let int = topo.internal_links[i] as usize;
            spans.push(NeuronSpan {
                start: cursor,
                split: cursor + ext,
                end: cursor + ext + int,
            });
            cursor += ext + int;
        }

        let graph = Self {
            links: topo.links.clone(),
            spans,
            kinds: unpack_mask(&topo.activation_mask, n),
            outputs: topo.output_indices.clone(),
        };

        #[cfg(feature = "runtime-checks")]
        graph.check_link_ordering()?;

        Ok(graph)
    }

    /// Number of neurons.
    pub fn neurons(&self) -> usize {
        self.spans.len()
    }

    /// Total number of links (and so of weights the graph consumes).
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Output neuron indices, in output-vector order.
    pub fn outputs(&self) -> &[u16] {
        &self.outputs
    }

    /// Activation kind of each neuron.
    pub fn kinds(&self) -> &[ActivationKind] {
        &self.kinds
    }

    pub(crate) fn span(&self, neuron: usize) -> NeuronSpan {
        self.spans[neuron]
    }

    pub(crate) fn link(&self, idx: usize) -> u16 {
        self.links[idx]
    }

    /// Verify that every internal link points strictly backwards.
    #[cfg(feature = "runtime-checks")]
    fn check_link_ordering(&self) -> Result<()> {
        for (i, span) in self.spans.iter().enumerate() {
            for l in span.split..span.end {
                let target = self.links[l];
                if target as usize >= i {
                    return Err(NnError::LinkOrdering { neuron: i, target });
                }
            }
        }
        Ok(())
    }
}
