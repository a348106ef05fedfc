//! Provider-agnostic core of the tour assistant chat.
//!
//! | Module        | What it provides                                                        |
//! |---------------|-------------------------------------------------------------------------|
//! | [`generic`]   | `Role`, `Turn`, `ConversationId`, raw `StreamEvent`s                    |
//! | [`session`]   | `ChatSession`: transcript + streaming flag, the state a renderer draws |
//! | [`decoder`]   | `DeltaDecoder`: raw events ▶ ordered, non-empty fragments              |
//! | [`driver`]    | `TurnDriver`: one user submission ▶ one streamed assistant reply       |
//! | [`provider`]  | Traits a backend implements to plug in                                 |
//! | [`render`]    | `Renderer` seam invoked after every session mutation                    |
pub mod decoder;
pub mod driver;
pub mod error;
pub mod generic;
pub mod model;
pub mod provider;
pub mod render;
pub mod session;

pub use driver::{TurnDriver, TurnOptions, TurnOutcome};
pub use session::ChatSession;
