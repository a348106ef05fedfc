//! Append-only terminal view of a [`ChatSession`].
//!
//! A terminal cannot redraw what it already printed, so the renderer
//! remembers how far into the transcript it got and writes only what came
//! after. Rendering the same state twice writes nothing the second time.
//! A reset session, or a different session, starts the view over.
use std::io::{self, Stdout, Write};

use tourchat_core::{
    generic::{ConversationId, Role},
    render::Renderer,
    session::ChatSession,
};

pub struct TerminalRenderer<W: Write> {
    out: W,
    echo_user: bool,
    /// Turns printed in full, including the trailing blank line.
    closed: usize,
    /// Bytes already printed of the turn at index `closed`, once its label
    /// is out.
    open: Option<usize>,
    /// Session and reset generation the counters above refer to.
    drawn: Option<(ConversationId, u64)>,
}

impl TerminalRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            echo_user: true,
            closed: 0,
            open: None,
            drawn: None,
        }
    }

    /// Skip user turns, for interactive use where the terminal already
    /// shows what was typed.
    pub fn with_user_echo(mut self, echo: bool) -> Self {
        self.echo_user = echo;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, session: &ChatSession) -> io::Result<()> {
        let transcript = session.transcript();

        let same_view = self.drawn.as_ref().is_some_and(|(id, generation)| {
            id == session.conversation_id() && *generation == session.generation()
        });
        if !same_view {
            self.closed = 0;
            self.open = None;
            self.drawn = Some((session.conversation_id().clone(), session.generation()));
        }

        while let Some(turn) = transcript.get(self.closed) {
            let growing = session.is_streaming() && self.closed + 1 == transcript.len();
            let shown = self.echo_user || turn.role() == Role::Assistant;

            if shown {
                let printed = match self.open {
                    Some(printed) => printed,
                    None => {
                        write!(self.out, "{}: ", turn.role())?;
                        0
                    }
                };
                let content = turn.content();
                self.out
                    .write_all(content.get(printed..).unwrap_or_default().as_bytes())?;
                self.open = Some(content.len());
            }

            if growing {
                break;
            }
            if shown {
                self.out.write_all(b"\n\n")?;
            }
            self.closed += 1;
            self.open = None;
        }

        self.out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, session: &ChatSession) {
        if let Err(err) = self.draw(session) {
            tracing::warn!(error = %err, "could not write chat output");
        }
    }
}
