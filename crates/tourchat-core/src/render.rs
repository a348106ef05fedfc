//! Seam between session state and whatever draws it.
//!
//! The [`TurnDriver`](crate::driver::TurnDriver) calls [`Renderer::render`]
//! after every mutating session operation. Implementations must treat the
//! call as a pure projection: being invoked twice with the same state must
//! produce the same view.
use crate::session::ChatSession;

pub trait Renderer {
    fn render(&mut self, session: &ChatSession);
}

/// Closures work as ad-hoc renderers.
impl<F> Renderer for F
where
    F: FnMut(&ChatSession),
{
    fn render(&mut self, session: &ChatSession) {
        self(session)
    }
}

/// Renderer that draws nothing, for headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&mut self, _session: &ChatSession) {}
}
