//! Stand-alone RF calculators. None of these depend on the pattern pipeline.
pub mod knife_edge;
pub mod lines;
pub mod microstrip;
pub mod sparams;
pub mod waveguide;

pub use knife_edge::{compute_knife_edge, ClearanceGuidance, KnifeEdgeResult};
pub use lines::{electrical_length, length_from_phase, TransmissionLineResult};
pub use microstrip::{width_for_impedance, MicrostripResult};
pub use sparams::{reflection_summary, ReflectionInput, ReflectionSummary, SParameterResult};
pub use waveguide::{cutoff_frequency_hz, cutoff_summary, propagation_parameters, WaveguideMode};
