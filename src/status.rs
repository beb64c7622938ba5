use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};

use crate::eventlog::TriggerSink;
use crate::evaluator::TriggerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Error,
    Warning,
    Info,
    Priority,
    Status,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            MessageType::Error => "Error",
            MessageType::Warning => "Warning",
            MessageType::Info => "Info",
            MessageType::Priority => "Priority",
            MessageType::Status => "Status",
        })
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub timestamp: DateTime<Local>,
    pub message_type: MessageType,
    pub content: String,
}

impl StatusMessage {
    pub fn new(message_type: MessageType, content: String) -> Self {
        StatusMessage {
            timestamp: Local::now(),
            message_type,
            content,
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} | {:<8} | {}",
            self.timestamp.format("%H:%M:%S"),
            self.message_type,
            self.content
        )
    }
}

/// Console-facing message history. Headless logs print each message as it
/// arrives; the oldest messages are dropped past `max_size`.
pub struct MessageLog {
    messages: VecDeque<StatusMessage>,
    headless: bool,
    max_size: Option<usize>,
}

impl MessageLog {
    pub fn new(headless: bool, max_size: Option<usize>) -> Self {
        MessageLog {
            messages: VecDeque::new(),
            headless,
            max_size,
        }
    }

    pub fn add_message(&mut self, message: StatusMessage) {
        if self.headless {
            println!("{}", message);
        }
        self.messages.push_back(message);
        if let Some(max) = self.max_size {
            while self.messages.len() > max {
                self.messages.pop_front();
            }
        }
    }

    pub fn get_all_messages(&self) -> Vec<StatusMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn get_recent(&self, count: usize) -> Vec<StatusMessage> {
        let skip = self.messages.len().saturating_sub(count);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.messages.len()
    }
}

impl TriggerSink for MessageLog {
    fn deliver(&mut self, event: &TriggerEvent) {
        self.add_message(StatusMessage::new(
            MessageType::Priority,
            format!("🚨 Geo-alert triggered! {}", event.message()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_log_caps_size() {
        let mut log = MessageLog::new(false, Some(3));
        for i in 0..5 {
            log.add_message(StatusMessage::new(MessageType::Info, format!("m{i}")));
        }
        assert_eq!(log.size(), 3);
        let contents: Vec<String> = log
            .get_all_messages()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn test_get_recent() {
        let mut log = MessageLog::new(false, None);
        log.add_message(StatusMessage::new(MessageType::Info, "a".to_string()));
        log.add_message(StatusMessage::new(MessageType::Warning, "b".to_string()));
        let recent = log.get_recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].message_type, MessageType::Warning);
        assert_eq!(log.get_recent(10).len(), 2);
    }
}
