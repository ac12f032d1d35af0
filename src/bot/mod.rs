//! Telegram bot: route forecasts through a short dialogue
//!
//! Updates are handled one at a time by the polling loop. Dialogue state lives
//! in the [`SessionStore`]; replies are computed by [`Bot::respond`] and sent
//! by the loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::RouteWeatherConfig;
use crate::report;
use crate::route_evaluator::{EvaluationMode, RouteEvaluator};
use crate::weather::{AccuWeatherClient, WeatherApi};

pub mod session;
pub mod telegram;

pub use session::{ChatId, RouteDialogue, SessionStore, Step};
use telegram::{TelegramClient, Update};

const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

const WELCOME_TEXT: &str = "Hi! I am a weather bot.\n\
    I can give you the weather forecast for your route.\n\
    Type /help to see what I can do.";

const HELP_TEXT: &str = "Available commands:\n\
    /start - Welcome message\n\
    /help - Show this message\n\
    /weather - Get the weather forecast for a route\n\
    /cancel - Abort the current request\n\n\
    Use /weather, enter the start and end points of your route \
    and choose the forecast duration.";

const ASK_START_TEXT: &str = "Enter the start point of your route:";
const ASK_END_TEXT: &str = "Enter the end point of your route:";
const ASK_DURATION_TEXT: &str = "Choose the forecast duration:";
const CANCELLED_TEXT: &str = "Request cancelled.";
const NOTHING_TO_CANCEL_TEXT: &str = "There is nothing to cancel.";
const IDLE_TEXT: &str = "Type /weather to get a route forecast.";

/// A message to send back to the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Attach the 3/5-day inline keyboard
    pub duration_keyboard: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration_keyboard: false,
        }
    }

    fn ask_duration() -> Self {
        Self {
            text: ASK_DURATION_TEXT.to_string(),
            duration_keyboard: true,
        }
    }
}

/// Incoming chat event, reduced to what the dialogue needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text(String),
    /// Inline keyboard press with its callback data
    Choice(String),
}

pub struct Bot {
    evaluator: RouteEvaluator,
    sessions: SessionStore,
}

impl Bot {
    #[must_use]
    pub fn new(evaluator: RouteEvaluator) -> Self {
        Self {
            evaluator,
            sessions: SessionStore::new(),
        }
    }

    /// Compute the reply to one incoming event
    pub async fn respond(&self, chat: ChatId, incoming: Incoming) -> Reply {
        match incoming {
            Incoming::Text(text) => match command(&text) {
                Some("start") => Reply::text(WELCOME_TEXT),
                Some("help") => Reply::text(HELP_TEXT),
                Some("weather") => self.reply_for(self.sessions.begin(chat).await).await,
                Some("cancel") => {
                    if self.sessions.cancel(chat).await {
                        Reply::text(CANCELLED_TEXT)
                    } else {
                        Reply::text(NOTHING_TO_CANCEL_TEXT)
                    }
                }
                Some(_) => Reply::text(HELP_TEXT),
                None => self.advance(chat, &text).await,
            },
            Incoming::Choice(data) => self.advance(chat, &data).await,
        }
    }

    async fn advance(&self, chat: ChatId, input: &str) -> Reply {
        match self.sessions.advance(chat, input).await {
            Some(step) => self.reply_for(step).await,
            None => Reply::text(IDLE_TEXT),
        }
    }

    async fn reply_for(&self, step: Step) -> Reply {
        match step {
            Step::AskStart => Reply::text(ASK_START_TEXT),
            Step::AskEnd => Reply::text(ASK_END_TEXT),
            Step::AskDuration => Reply::ask_duration(),
            Step::Evaluate { start, end, days } => {
                info!("Bot forecast request: {} -> {} ({} days)", start, end, days);
                let outcome = self
                    .evaluator
                    .evaluate(&start, &end, EvaluationMode::Forecast { days })
                    .await;
                Reply::text(report::route_text(&start, &end, &outcome))
            }
        }
    }
}

/// Command name without the leading slash or a `@botname` suffix
fn command(text: &str) -> Option<&str> {
    let word = text.split_whitespace().next()?;
    let name = word.strip_prefix('/')?;
    Some(name.split('@').next().unwrap_or(name))
}

/// Run the long-polling loop until the process is stopped
pub async fn run(config: &RouteWeatherConfig) -> Result<()> {
    let token = config.require_bot_token()?;
    let telegram = TelegramClient::new(&config.bot, token)?;

    let api: Arc<dyn WeatherApi> = Arc::new(AccuWeatherClient::new(&config.provider)?);
    let bot = Bot::new(RouteEvaluator::new(api, config.assessment.clone()));

    info!("Bot started, polling for updates");
    let mut offset = 0;
    loop {
        let updates = match telegram.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Polling failed: {:#}", e);
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Err(e) = handle_update(&bot, &telegram, update).await {
                warn!("Failed to handle update: {:#}", e);
            }
        }
    }
}

async fn handle_update(bot: &Bot, telegram: &TelegramClient, update: Update) -> Result<()> {
    if let Some(callback) = update.callback_query {
        if let Err(e) = telegram.answer_callback_query(&callback.id).await {
            warn!("Failed to acknowledge callback: {:#}", e);
        }
        let (Some(message), Some(data)) = (callback.message, callback.data) else {
            return Ok(());
        };
        let reply = bot.respond(message.chat.id, Incoming::Choice(data)).await;
        return send(telegram, message.chat.id, &reply).await;
    }

    if let Some(message) = update.message {
        let Some(text) = message.text else {
            debug!("Ignoring non-text message");
            return Ok(());
        };
        let reply = bot.respond(message.chat.id, Incoming::Text(text)).await;
        return send(telegram, message.chat.id, &reply).await;
    }

    Ok(())
}

async fn send(telegram: &TelegramClient, chat: ChatId, reply: &Reply) -> Result<()> {
    telegram
        .send_message(chat, &reply.text, reply.duration_keyboard)
        .await
}
