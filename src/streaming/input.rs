use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::pipeline::Pipeline;
use crate::engine::PipelineError;
use crate::step::{Arg, Steps};

/// Items fed into a pipeline: a finite collection or a live queue
#[derive(Debug)]
pub enum Input<T> {
    Items(Vec<T>),
    Queue(mpsc::Receiver<T>),
}

impl<T: Arg> Input<T> {
    pub fn items(items: impl IntoIterator<Item = T>) -> Self {
        Self::Items(items.into_iter().collect())
    }

    pub fn queue(receiver: mpsc::Receiver<T>) -> Self {
        Self::Queue(receiver)
    }

    /// Bounded queue input plus the sender that feeds it
    pub fn channel(capacity: usize) -> (mpsc::Sender<T>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (sender, Self::Queue(receiver))
    }

    pub fn is_queue(&self) -> bool {
        matches!(self, Self::Queue(_))
    }

    /// Attach a step list, validating it against `T`
    pub fn with(self, steps: Steps) -> Pipeline<T> {
        Pipeline::new(self, steps)
    }
}

impl<T> From<Vec<T>> for Input<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Items(items)
    }
}

impl<T> From<mpsc::Receiver<T>> for Input<T> {
    fn from(receiver: mpsc::Receiver<T>) -> Self {
        Self::Queue(receiver)
    }
}

/// One pass over an input, reporting whether each item is the last one
///
/// Queues hold one item back and read the next before releasing it, so the
/// end of the queue is known when the pending item is handed out.
pub(crate) enum Cursor<'a, T> {
    Items {
        items: &'a mut Vec<T>,
        position: usize,
    },
    Queue {
        receiver: &'a mut mpsc::Receiver<T>,
        pending: Option<T>,
    },
}

impl<'a, T: Clone> Cursor<'a, T> {
    pub(crate) fn new(input: &'a mut Input<T>) -> Self {
        match input {
            Input::Items(items) => Self::Items { items, position: 0 },
            Input::Queue(receiver) => Self::Queue {
                receiver,
                pending: None,
            },
        }
    }

    fn next_item(items: &[T], position: &mut usize) -> Option<(T, bool)> {
        let item = items.get(*position)?.clone();
        *position += 1;
        Some((item, *position == items.len()))
    }

    /// Blocking variant; must not be called from within an async runtime
    pub(crate) fn next_blocking(&mut self) -> Option<(T, bool)> {
        match self {
            Self::Items { items, position } => Self::next_item(items, position),
            Self::Queue { receiver, pending } => {
                let current = match pending.take() {
                    Some(item) => item,
                    None => receiver.blocking_recv()?,
                };
                *pending = receiver.blocking_recv();
                Some((current, pending.is_none()))
            }
        }
    }

    /// Async variant; queue receives race against cancellation
    pub(crate) async fn next(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<(T, bool)>, PipelineError> {
        match self {
            Self::Items { items, position } => Ok(Self::next_item(items, position)),
            Self::Queue { receiver, pending } => {
                let current = match pending.take() {
                    Some(item) => item,
                    None => match recv_or_cancel(receiver, cancel).await? {
                        Some(item) => item,
                        None => return Ok(None),
                    },
                };
                *pending = recv_or_cancel(receiver, cancel).await?;
                Ok(Some((current, pending.is_none())))
            }
        }
    }
}

async fn recv_or_cancel<T>(
    receiver: &mut mpsc::Receiver<T>,
    cancel: &CancellationToken,
) -> Result<Option<T>, PipelineError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        item = receiver.recv() => Ok(item),
    }
}
