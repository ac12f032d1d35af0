//! Per-chat route dialogue
//!
//! `/weather` opens a dialogue that collects the start point, the end point
//! and the forecast duration, in that order. Each chat has at most one open
//! dialogue; finishing or cancelling it removes the entry.

use std::collections::HashMap;

use tokio::sync::Mutex;

pub type ChatId = i64;

/// Forecast durations offered on the inline keyboard
pub const DURATION_CHOICES: [usize; 2] = [3, 5];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDialogue {
    AwaitingStart,
    AwaitingEnd { start: String },
    AwaitingDuration { start: String, end: String },
}

/// What the bot does next in a dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    AskStart,
    AskEnd,
    /// Offer the duration keyboard; also sent again after an invalid choice
    AskDuration,
    /// All answers collected; the dialogue is closed
    Evaluate {
        start: String,
        end: String,
        days: usize,
    },
}

/// Accepts "3" or "5", whether typed or sent as callback data
#[must_use]
pub fn parse_duration(input: &str) -> Option<usize> {
    let days = input.trim().parse().ok()?;
    DURATION_CHOICES.contains(&days).then_some(days)
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<ChatId, RouteDialogue>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh dialogue, replacing any unfinished one
    pub async fn begin(&self, chat: ChatId) -> Step {
        self.sessions
            .lock()
            .await
            .insert(chat, RouteDialogue::AwaitingStart);
        Step::AskStart
    }

    /// Drop the chat's dialogue; `true` if one was open
    pub async fn cancel(&self, chat: ChatId) -> bool {
        self.sessions.lock().await.remove(&chat).is_some()
    }

    #[cfg(test)]
    pub(crate) async fn state(&self, chat: ChatId) -> Option<RouteDialogue> {
        self.sessions.lock().await.get(&chat).cloned()
    }

    /// Feed one answer into the chat's dialogue. `None` when no dialogue is open.
    pub async fn advance(&self, chat: ChatId, input: &str) -> Option<Step> {
        let mut sessions = self.sessions.lock().await;
        let dialogue = sessions.remove(&chat)?;
        let answer = input.trim();

        let (next, step) = match dialogue {
            RouteDialogue::AwaitingStart if answer.is_empty() => {
                (Some(RouteDialogue::AwaitingStart), Step::AskStart)
            }
            RouteDialogue::AwaitingStart => (
                Some(RouteDialogue::AwaitingEnd {
                    start: answer.to_string(),
                }),
                Step::AskEnd,
            ),
            RouteDialogue::AwaitingEnd { start } if answer.is_empty() => {
                (Some(RouteDialogue::AwaitingEnd { start }), Step::AskEnd)
            }
            RouteDialogue::AwaitingEnd { start } => (
                Some(RouteDialogue::AwaitingDuration {
                    start,
                    end: answer.to_string(),
                }),
                Step::AskDuration,
            ),
            RouteDialogue::AwaitingDuration { start, end } => match parse_duration(answer) {
                Some(days) => (None, Step::Evaluate { start, end, days }),
                None => (
                    Some(RouteDialogue::AwaitingDuration { start, end }),
                    Step::AskDuration,
                ),
            },
        };

        if let Some(next) = next {
            sessions.insert(chat, next);
        }
        Some(step)
    }
}
