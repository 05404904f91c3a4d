//! Speech recognizer adapters

mod console;
mod scripted;

pub use console::{ConsoleInput, ConsoleRecognizer};
pub use scripted::ScriptedRecognizer;
