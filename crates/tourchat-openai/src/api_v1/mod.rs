mod common;
mod runs;
mod stream_events;
mod threads;

pub use common::*;
pub use runs::*;
pub use stream_events::*;
pub use threads::*;
