//! Notice delivery to the operator-facing surface.
//!
//! The rendering layer is outside this crate. The orchestrator hands every
//! notice to a [`NoticeSink`]; an embedding UI typically uses
//! [`ChannelNotices`], the command-line runner uses [`CollectingNotices`].

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use super::types::{Notice, NoticeLevel};

/// Receives operator notices. Must not block.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Forwards notices over an unbounded channel.
pub struct ChannelNotices {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotices {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NoticeSink for ChannelNotices {
    fn notify(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("notice receiver dropped");
        }
    }
}

/// Writes notices to the log only.
#[derive(Debug, Default)]
pub struct LogNotices;

impl NoticeSink for LogNotices {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::info!(message = %notice.message, "notice"),
            NoticeLevel::Success => tracing::info!(message = %notice.message, "notice: success"),
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "notice: error"),
        }
    }
}

/// Keeps every notice in memory, in order.
#[derive(Debug, Default)]
pub struct CollectingNotices {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notices of one level, messages only.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

impl NoticeSink for CollectingNotices {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notices_delivers_in_order() {
        let (sink, mut rx) = ChannelNotices::new();
        sink.notify(Notice::new(NoticeLevel::Info, "a"));
        sink.notify(Notice::new(NoticeLevel::Success, "b"));
        assert_eq!(rx.recv().await.unwrap().message, "a");
        assert_eq!(rx.recv().await.unwrap().level, NoticeLevel::Success);
    }

    #[test]
    fn test_channel_notices_survives_dropped_receiver() {
        let (sink, rx) = ChannelNotices::new();
        drop(rx);
        sink.notify(Notice::new(NoticeLevel::Error, "nobody listening"));
    }

    #[test]
    fn test_collecting_notices_filters_by_level() {
        let sink = CollectingNotices::new();
        sink.notify(Notice::new(NoticeLevel::Info, "start"));
        sink.notify(Notice::new(NoticeLevel::Error, "boom"));
        assert_eq!(sink.notices().len(), 2);
        assert_eq!(sink.messages(NoticeLevel::Error), vec!["boom".to_string()]);
    }
}
