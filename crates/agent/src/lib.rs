//! Dialogue Runtime - oracle-backed slot filling and turn orchestration
//!
//! This crate is the conversational "brain" of the maitred system:
//! - Classifies each utterance into a closed per-stage action set
//! - Extracts structured slot values (location, venue, date, time, guests)
//! - Drives the booking state machine, one handler per stage
//! - Gates every oracle-bound path behind the process-wide budget ledger
//!
//! # Architecture
//!
//! One inbound message flows through a single linear pipeline:
//! 1. **Admission** (`runtime`) - word ceiling, then budget check-and-charge
//! 2. **Classification** (`classifiers`) - prompt → oracle → pure label scan
//! 3. **Resolution** (`resolvers`) - free text → validated typed slot value
//! 4. **Dialogue** (`engine`) - stage dispatch, reply and transition
//!
//! # Safety Principle
//!
//! The oracle is strictly a translator. It never writes a slot directly:
//! every reply is validated against the catalog or a parse bound before it
//! can touch the booking, and a failed validation leaves booking and stage
//! byte-identical.

pub mod classifiers;
pub mod engine;
pub mod oracle;
pub mod resolvers;
pub mod runtime;

pub use engine::{DialogueEngine, SessionDisposition, TurnOutcome, MAX_GUESTS};
pub use oracle::{Oracle, OracleGateway};
pub use runtime::{AgentRuntime, ChatRequest, ChatResponse};
