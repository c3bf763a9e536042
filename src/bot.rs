use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::command::{classify, Command};
use crate::config::Config;
use crate::image::ImagePicker;
use crate::messages;
use crate::platform::{InboundUpdate, IncomingMessage, OutboundReply, ReplySink};
use crate::schedule::{day_index, ScheduleResolver};
use crate::weather::WeatherCache;

/// Values the dispatch loop needs from the configuration.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub bot_mention: String,
    pub weather_api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub weather_max_age: Duration,
    pub utc_offset: FixedOffset,
}

impl BotSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let offset_hours = config.schedule.utc_offset_hours;
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600)
            .with_context(|| format!("Invalid UTC offset: {} hours", offset_hours))?;
        Ok(Self {
            bot_mention: config.telegram.bot_name.clone(),
            weather_api_key: config.weather.api_key.clone(),
            latitude: config.weather.latitude,
            longitude: config.weather.longitude,
            weather_max_age: config.weather.max_age(),
            utc_offset,
        })
    }
}

/// Counters kept by the dispatch loop. They only feed the logs.
#[derive(Debug, Default)]
pub struct DispatchStats {
    updates: AtomicU64,
    replies: AtomicU64,
    send_failures: AtomicU64,
    weather_failures: AtomicU64,
    unrecognized: AtomicU64,
}

impl DispatchStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> String {
        format!(
            "updates={} replies={} send_failures={} weather_failures={} unrecognized={}",
            self.updates.load(Ordering::Relaxed),
            self.replies.load(Ordering::Relaxed),
            self.send_failures.load(Ordering::Relaxed),
            self.weather_failures.load(Ordering::Relaxed),
            self.unrecognized.load(Ordering::Relaxed),
        )
    }
}

/// The update dispatch loop and its collaborators.
pub struct StudentBot {
    settings: BotSettings,
    schedule: Arc<dyn ScheduleResolver>,
    weather: WeatherCache,
    images: Arc<dyn ImagePicker>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ReplySink>,
    stats: Arc<DispatchStats>,
}

impl StudentBot {
    pub fn new(
        settings: BotSettings,
        schedule: Arc<dyn ScheduleResolver>,
        weather: WeatherCache,
        images: Arc<dyn ImagePicker>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            settings,
            schedule,
            weather,
            images,
            clock,
            sink,
            stats: Arc::new(DispatchStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        self.stats.clone()
    }

    /// Process updates one at a time until the feed is closed.
    pub async fn run(&self, mut feed: mpsc::Receiver<InboundUpdate>) {
        info!("Bot is up, waiting for updates");
        while let Some(update) = feed.recv().await {
            self.handle_update(update).await;
        }
        info!("Update feed closed ({})", self.stats.summary());
    }

    async fn handle_update(&self, update: InboundUpdate) {
        DispatchStats::bump(&self.stats.updates);

        let Some(message) = update.message else {
            debug!("Update {} has no text message, skipping", update.id);
            return;
        };

        let command = classify(&message.text, &self.settings.bot_mention);
        debug!(
            "Update {} from {} in chat {}: {:?}",
            update.id, message.sender_first_name, message.chat_id, command
        );

        let Some(reply) = self.reply_for(command, &message).await else {
            return;
        };

        match self.sink.send(reply).await {
            Ok(()) => DispatchStats::bump(&self.stats.replies),
            Err(e) => {
                warn!("Failed to deliver reply to chat {}: {:#}", message.chat_id, e);
                DispatchStats::bump(&self.stats.send_failures);
            }
        }
    }

    fn today(&self) -> i64 {
        day_index(self.clock.now(), self.settings.utc_offset)
    }

    async fn reply_for(&self, command: Command, message: &IncomingMessage) -> Option<OutboundReply> {
        let chat_id = message.chat_id;
        let name = &message.sender_first_name;

        match command {
            Command::Start => Some(OutboundReply::text(chat_id, messages::start_text())),
            Command::Help => Some(OutboundReply::text(chat_id, messages::help_text())),
            Command::Ping => Some(OutboundReply::text(chat_id, messages::pong_text())),
            Command::TodayLessons => {
                let lessons = self.schedule.resolve_day(self.today());
                Some(OutboundReply::text(
                    chat_id,
                    messages::lessons_text(
                        &lessons,
                        &messages::today_header(name),
                        messages::TODAY_EMPTY,
                    ),
                ))
            }
            Command::TomorrowLessons => {
                let lessons = self.schedule.resolve_day(self.today() + 1);
                Some(OutboundReply::text(
                    chat_id,
                    messages::lessons_text(
                        &lessons,
                        &messages::tomorrow_header(name),
                        messages::TOMORROW_EMPTY,
                    ),
                ))
            }
            Command::Weather => {
                match self
                    .weather
                    .get_weather(
                        &self.settings.weather_api_key,
                        self.settings.latitude,
                        self.settings.longitude,
                        self.settings.weather_max_age,
                    )
                    .await
                {
                    Ok(snapshot) => Some(OutboundReply::text(
                        chat_id,
                        messages::weather_text(&snapshot),
                    )),
                    Err(e) => {
                        // No reply on failure; the user simply sees nothing.
                        warn!("Weather lookup failed: {:#}", e);
                        DispatchStats::bump(&self.stats.weather_failures);
                        None
                    }
                }
            }
            Command::NewYear => Some(OutboundReply::photo(
                chat_id,
                self.images.pick_image(),
                messages::new_year_caption(),
            )),
            Command::Unrecognized => {
                DispatchStats::bump(&self.stats.unrecognized);
                None
            }
        }
    }
}
