//! Pass/fail reporting to the host flashcard application.
//!
//! The host exposes a single command hook. Each session answers at most
//! once: the first delivered message closes the latch and every later
//! trigger, of either kind, is ignored.

use tracing::{info, warn};

use crate::error::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMessage {
    SequenceFailed,
    SequenceCompleted,
}

impl HostMessage {
    pub fn command(&self) -> &'static str {
        match self {
            HostMessage::SequenceFailed => "fail_line",
            HostMessage::SequenceCompleted => "pass_line",
        }
    }
}

/// The host's command hook.
pub trait HostChannel {
    fn send(&mut self, command: &'static str) -> Result<(), BridgeError>;
}

/// One-shot latch; once closed it stays closed.
#[derive(Debug, Default)]
pub struct AnswerLatch {
    closed: bool,
}

impl AnswerLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the latch. Returns true only for the call that closed it.
    pub fn trip(&mut self) -> bool {
        !std::mem::replace(&mut self.closed, true)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

pub struct HostBridge<C> {
    channel: Option<C>,
    auto_answer: bool,
    latch: AnswerLatch,
}

impl<C: HostChannel> HostBridge<C> {
    /// `channel` is `None` when the host has no command hook.
    pub fn new(channel: Option<C>, auto_answer: bool) -> Self {
        Self {
            channel,
            auto_answer,
            latch: AnswerLatch::new(),
        }
    }

    /// Report a failed sequence. Returns whether the host accepted the
    /// command; the latch closes even when delivery fails.
    pub fn fail(&mut self) -> bool {
        self.deliver(HostMessage::SequenceFailed)
    }

    pub fn pass(&mut self) -> bool {
        self.deliver(HostMessage::SequenceCompleted)
    }

    pub fn answered(&self) -> bool {
        self.latch.is_closed()
    }

    /// Same channel and settings, fresh latch.
    pub fn renew(&mut self) {
        self.latch = AnswerLatch::new();
    }

    pub fn channel(&self) -> Option<&C> {
        self.channel.as_ref()
    }

    fn deliver(&mut self, message: HostMessage) -> bool {
        if !self.auto_answer {
            return false;
        }
        let Some(channel) = self.channel.as_mut() else {
            return false;
        };
        if !self.latch.trip() {
            return false;
        }
        match channel.send(message.command()) {
            Ok(()) => {
                info!(command = message.command(), "Answered host");
                true
            }
            Err(e) => {
                warn!("Host command failed: {e}");
                false
            }
        }
    }
}
