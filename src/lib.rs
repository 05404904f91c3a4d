//! StudyVoice - derive study topics from your material and practise
//! explaining them to an AI tutor
//!
//! Uploaded text, PDFs and images are turned into plain text, condensed into
//! a handful of topics, and each spoken (or typed) explanation is scored by a
//! completion service. Scores accumulate into a per-topic mastery percentage
//! that is persisted per identity.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Topics, mastery, capture state machine, prompts and reply parsing
//! - **Application**: The study pipeline use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (Anthropic, companion server, files, terminal)
//! - **CLI**: Command-line interface, argument parsing, and presentation

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
