use crate::{executor::ExecutorError, traits::RecordKind};
use futures::Stream;
use std::{
    pin::Pin,
    task::{Context, Poll},
};

///
/// Response
///
/// Typed rows materialized from an executor answer. Decoding is strict:
/// one row that fails to deserialize fails the whole response, rather
/// than silently dropping records.
///

#[derive(Debug)]
pub struct Response<R: RecordKind> {
    rows: Vec<R>,
}

impl<R: RecordKind> Response<R> {
    pub(crate) fn from_rows(rows: Vec<serde_json::Value>) -> Result<Self, ExecutorError> {
        let rows = rows
            .into_iter()
            .map(|row| {
                serde_json::from_value::<R>(row).map_err(|err| {
                    ExecutorError::malformed(format!(
                        "row does not decode as {}: {err}",
                        R::MODEL.record_name
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<R> {
        self.rows
    }

    /// Re-surface the already-fetched rows as a pull-based stream.
    #[must_use]
    pub fn into_stream(self) -> RecordStream<R> {
        RecordStream {
            rows: self.rows.into_iter(),
        }
    }
}

impl<R: RecordKind> IntoIterator for Response<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

///
/// RecordStream
///
/// One-shot stream over a materialized result set. The fetch has already
/// happened by the time this exists; polling never touches the executor
/// again.
///

#[derive(Debug)]
pub struct RecordStream<R: RecordKind> {
    rows: std::vec::IntoIter<R>,
}

// Records are plain owned data, so the Unpin bound costs callers nothing
// and lets poll_next reach the iterator without projection.
impl<R: RecordKind + Unpin> Stream for RecordStream<R> {
    type Item = R;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.get_mut().rows.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}
