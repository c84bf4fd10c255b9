// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// inkgrade-store — Persistence for the Inkgrade scoring engine.
//
// Provides the SQLite-backed reference-profile store, the append-only
// submission log, and the content-addressed feature cache.

pub mod cache;
pub mod reference;
pub mod submissions;

// Re-export the primary structs so callers can use `inkgrade_store::ReferenceStore` etc.
pub use cache::{CacheEntry, FeatureCache, content_hash};
pub use reference::ReferenceStore;
pub use submissions::{SubmissionEntry, SubmissionLog};
