//! Queued UI text channels
//!
//! Messages are queued as frames are processed; each tick shows at most one
//! new message per channel. Backlogs are capped, oldest dropped first.

use std::collections::VecDeque;

const MAX_BACKLOG: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextChannel {
    /// General status ("Hand 1 has 2 finger(s) up.")
    Status,
    Finger,
    Hand,
    Blink,
}

impl TextChannel {
    pub const ALL: [TextChannel; 4] = [
        TextChannel::Status,
        TextChannel::Finger,
        TextChannel::Hand,
        TextChannel::Blink,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "status" => Some(TextChannel::Status),
            "finger" => Some(TextChannel::Finger),
            "hand" => Some(TextChannel::Hand),
            "blink" => Some(TextChannel::Blink),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Channel {
    pending: VecDeque<String>,
    shown: String,
}

#[derive(Clone, Debug, Default)]
pub struct DebugText {
    channels: [Channel; 4],
}

impl DebugText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, channel: TextChannel, message: impl Into<String>) {
        let pending = &mut self.channels[channel.slot()].pending;
        if pending.len() >= MAX_BACKLOG {
            pending.pop_front();
        }
        pending.push_back(message.into());
    }

    /// Show the next queued message on every channel that has one
    pub fn advance(&mut self) {
        for channel in self.channels.iter_mut() {
            if let Some(next) = channel.pending.pop_front() {
                channel.shown = next;
            }
        }
    }

    /// Currently displayed text (empty until the first message)
    pub fn text(&self, channel: TextChannel) -> &str {
        &self.channels[channel.slot()].shown
    }

    pub fn pending(&self, channel: TextChannel) -> usize {
        self.channels[channel.slot()].pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_message_per_tick() {
        let mut text = DebugText::new();
        text.push(TextChannel::Status, "Hand 1 has 1 finger(s) up.");
        text.push(TextChannel::Status, "Hand 2 has 3 finger(s) up.");
        text.push(TextChannel::Blink, "Eyes Blinked");
        assert_eq!(text.text(TextChannel::Status), "");

        text.advance();
        assert_eq!(text.text(TextChannel::Status), "Hand 1 has 1 finger(s) up.");
        assert_eq!(text.text(TextChannel::Blink), "Eyes Blinked");

        text.advance();
        assert_eq!(text.text(TextChannel::Status), "Hand 2 has 3 finger(s) up.");

        // Empty queue keeps the last text
        text.advance();
        assert_eq!(text.text(TextChannel::Status), "Hand 2 has 3 finger(s) up.");
        assert_eq!(text.text(TextChannel::Finger), "");
    }

    #[test]
    fn test_backlog_capped() {
        let mut text = DebugText::new();
        for i in 0..40 {
            text.push(TextChannel::Hand, format!("{}", i));
        }
        assert_eq!(text.pending(TextChannel::Hand), MAX_BACKLOG);
        text.advance();
        assert_eq!(text.text(TextChannel::Hand), "24");
    }

    #[test]
    fn test_channel_names() {
        for channel in TextChannel::ALL {
            let name = format!("{:?}", channel).to_lowercase();
            assert_eq!(TextChannel::from_name(&name), Some(channel));
        }
    }
}
