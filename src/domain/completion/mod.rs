//! Completion domain module: request model and reply recovery

mod reply;
mod request;

pub use reply::{parse_list, parse_object, strip_fences, MalformedReply};
pub use request::{CompletionRequest, ContentBlock, Message, Role};
