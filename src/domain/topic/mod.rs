//! Topic domain module

mod entity;
mod mastery;
mod prompt;

pub use entity::{DuplicateTopic, Topic, TopicSet};
pub use mastery::{clamp_percent, Mastery, MasteryBand, MasteryPolicy, MAX_PERCENT};
pub use prompt::{TopicCount, TopicPrompt};
