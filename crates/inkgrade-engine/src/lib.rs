// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// inkgrade-engine — Orchestration layer of the Inkgrade scoring engine.
//
// Ties the vision pipeline and the stores together: weighted similarity
// scoring against reference profiles (with the threshold-gated artistic
// blend), the cache-wrapped processing pipeline, the parallel reference-set
// builder, and the static character-code table.

pub mod builder;
pub mod charmap;
pub mod pipeline;
pub mod scoring;

// Re-export the primary types so callers can use `inkgrade_engine::Evaluator` etc.
pub use builder::{BuildFailure, BuildReport, ReferenceSetBuilder};
pub use pipeline::{ProcessedImage, ProcessingPipeline};
pub use scoring::{Evaluator, evaluate_submission};
