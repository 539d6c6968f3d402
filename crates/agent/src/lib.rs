//! Fit-assistant runtime - retrieval-grounded advice generation
//!
//! This crate is the "voice" of the fitnexus system - the layer that turns a
//! deterministic retrieval result into shopper-facing fit advice:
//! - Composes the generation context (profile + target + alternatives)
//! - Delegates prose generation to a pluggable `LlmClient`
//! - Classifies the returned text into good-fit vs. pivot for UI branching
//! - Exposes the `FitAssistant` facade, the single entry point for callers
//!
//! # Architecture
//!
//! Each request runs one constrained pass:
//! 1. **Normalization & retrieval** (`fitnexus-core`) - query → ranked candidates
//! 2. **Selection** (`assistant`) - target + category-aware alternatives
//! 3. **Composition** (`composer`) - structured context blocks + system rules
//! 4. **Generation** (`llm`/`providers`) - one bounded completion call
//! 5. **Classification** (`composer`) - pivot-phrase verdict on the result
//!
//! # Safety Principle
//!
//! The LLM only phrases advice. It never picks the target, the alternatives,
//! or the fallback path - those are deterministic decisions made before the
//! generation call, and every generation failure degrades to a deterministic
//! canned result at the facade boundary.

pub mod assistant;
pub mod composer;
pub mod llm;
pub mod providers;

pub use assistant::{FitAssistant, FitResult};
pub use composer::FitVerdict;
pub use llm::LlmClient;
