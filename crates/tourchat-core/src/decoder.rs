//! Delta decoder: turns raw [`StreamEvent`]s into displayable fragments.
//!
//! ```text
//!  source ── TextDelta("The ") ──► Text("The ")
//!         ── Marker(RunCreated) ─► (dropped)
//!         ── TextDelta("") ──────► (dropped)
//!         ── Error("timeout") ───► Fault("timeout")   ─► end
//!         ── End ────────────────► end
//! ```
//!
//! Every input event yields at most one output fragment, in arrival order.
//! Failures never escape as `Err`: they become a single terminal
//! [`DecodedFragment::Fault`] so the caller can show them in the transcript.
use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures_core::{ready, stream::Stream, FusedStream};

use crate::{
    error::Result,
    generic::StreamEvent,
    session::StreamCursor,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFragment {
    /// Non-empty content to append to the assistant turn.
    Text(String),
    /// Terminal failure description; nothing follows it.
    Fault(String),
}

/// Lazy adapter over a completion event stream.
pub struct DeltaDecoder<S> {
    source: S,
    cursor: StreamCursor,
    finished: bool,
}

impl<S> DeltaDecoder<S>
where
    S: Stream<Item = Result<StreamEvent>> + Unpin,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            cursor: StreamCursor::default(),
            finished: false,
        }
    }

    pub fn cursor(&self) -> StreamCursor {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

impl<S> Stream for DeltaDecoder<S>
where
    S: Stream<Item = Result<StreamEvent>> + Unpin,
{
    type Item = DecodedFragment;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.finished {
                return Poll::Ready(None);
            }

            let Some(item) = ready!(Pin::new(&mut this.source).poll_next(cx)) else {
                this.finish();
                return Poll::Ready(None);
            };
            this.cursor.events += 1;

            match item {
                Ok(StreamEvent::TextDelta(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    this.cursor.fragments += 1;
                    return Poll::Ready(Some(DecodedFragment::Text(text)));
                }
                Ok(StreamEvent::Marker(marker)) => {
                    tracing::trace!(?marker, "dropping control marker");
                }
                Ok(StreamEvent::End) => {
                    this.finish();
                    return Poll::Ready(None);
                }
                Ok(StreamEvent::Error(description)) => {
                    this.finish();
                    this.cursor.fragments += 1;
                    return Poll::Ready(Some(DecodedFragment::Fault(description)));
                }
                Err(err) => {
                    this.finish();
                    this.cursor.fragments += 1;
                    return Poll::Ready(Some(DecodedFragment::Fault(err.to_string())));
                }
            }
        }
    }
}

impl<S> FusedStream for DeltaDecoder<S>
where
    S: Stream<Item = Result<StreamEvent>> + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{stream, StreamExt};

    use super::*;
    use crate::{error::ChatError, generic::StreamMarker};

    fn text(s: &str) -> Result<StreamEvent> {
        Ok(StreamEvent::TextDelta(s.to_string()))
    }

    async fn decode_all(events: Vec<Result<StreamEvent>>) -> Vec<DecodedFragment> {
        DeltaDecoder::new(stream::iter(events)).collect().await
    }

    #[tokio::test]
    async fn preserves_order_and_boundaries() {
        let out = decode_all(vec![text("The "), text("weather "), text("is mild.")]).await;
        assert_eq!(
            out,
            vec![
                DecodedFragment::Text("The ".into()),
                DecodedFragment::Text("weather ".into()),
                DecodedFragment::Text("is mild.".into()),
            ]
        );
    }

    #[tokio::test]
    async fn drops_markers_and_empty_deltas() {
        let out = decode_all(vec![
            Ok(StreamEvent::Marker(StreamMarker::RunCreated)),
            Ok(StreamEvent::Marker(StreamMarker::MessageCreated)),
            text(""),
            text("hi"),
            Ok(StreamEvent::Marker(StreamMarker::ToolCallCreated {
                kind: "file_search".into(),
            })),
            Ok(StreamEvent::Marker(StreamMarker::Stop)),
            Ok(StreamEvent::End),
        ])
        .await;
        assert_eq!(out, vec![DecodedFragment::Text("hi".into())]);
    }

    #[tokio::test]
    async fn end_stops_consumption() {
        let out = decode_all(vec![text("a"), Ok(StreamEvent::End), text("ignored")]).await;
        assert_eq!(out, vec![DecodedFragment::Text("a".into())]);
    }

    #[tokio::test]
    async fn error_event_becomes_terminal_fault() {
        let out = decode_all(vec![
            text("Reykjavik is"),
            Ok(StreamEvent::Error("rate limited".into())),
            text("never seen"),
        ])
        .await;
        assert_eq!(
            out,
            vec![
                DecodedFragment::Text("Reykjavik is".into()),
                DecodedFragment::Fault("rate limited".into()),
            ]
        );
    }

    #[tokio::test]
    async fn err_item_becomes_terminal_fault() {
        let out = decode_all(vec![
            text("x"),
            Err(ChatError::Invalid("broken frame".into())),
            Ok(StreamEvent::End),
        ])
        .await;
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[1],
            DecodedFragment::Fault("invalid: broken frame".into())
        );
    }

    #[tokio::test]
    async fn cursor_counts_events_and_fragments() {
        let mut decoder = DeltaDecoder::new(stream::iter(vec![
            Ok(StreamEvent::Marker(StreamMarker::RunCreated)),
            text("a"),
            text(""),
            text("b"),
            Ok(StreamEvent::End),
        ]));

        assert_eq!(decoder.next().await, Some(DecodedFragment::Text("a".into())));
        assert_eq!(
            decoder.cursor(),
            StreamCursor {
                events: 2,
                fragments: 1
            }
        );

        assert_eq!(decoder.next().await, Some(DecodedFragment::Text("b".into())));
        assert_eq!(decoder.next().await, None);
        assert!(decoder.is_finished());
        assert_eq!(decoder.cursor().events, 5);
        assert_eq!(decoder.cursor().fragments, 2);
        assert_eq!(decoder.next().await, None);
    }
}
