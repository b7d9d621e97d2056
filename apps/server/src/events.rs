use std::convert::Infallible;

use axum::response::sse::Event as SseEvent;
use futures::stream::BoxStream;
use futures_core::stream::Stream;
use goalpost_core::goals::GoalRecord;

use crate::models::Goal;

/// SSE event name carrying a goal snapshot.
pub const GOAL_UPDATED: &str = "goal";

pub fn goal_event(snapshot: GoalRecord) -> Result<SseEvent, axum::Error> {
    SseEvent::default()
        .event(GOAL_UPDATED)
        .json_data(Goal::from(snapshot))
}

/// Maps a snapshot stream onto SSE frames. Snapshots that fail to serialize
/// are logged and skipped.
pub fn goal_event_stream(
    snapshots: BoxStream<'static, GoalRecord>,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    tokio_stream::StreamExt::filter_map(snapshots, |snapshot| match goal_event(snapshot) {
        Ok(event) => Some(Ok(event)),
        Err(err) => {
            tracing::error!("Failed to serialize SSE payload for {}: {}", GOAL_UPDATED, err);
            None
        }
    })
}
