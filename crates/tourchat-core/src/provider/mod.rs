mod completion_stream;
mod conversation;

pub use completion_stream::CompletionStreamProvider;
pub use conversation::ConversationProvider;
