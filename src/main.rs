mod bot;
mod clock;
mod command;
mod config;
mod image;
mod messages;
mod platform;
mod schedule;
mod scheduler;
mod weather;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::{BotSettings, StudentBot};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::image::ImagePool;
use crate::platform::telegram::{self, TelegramSink};
use crate::schedule::Timetable;
use crate::scheduler::Scheduler;
use crate::weather::yandex::YandexWeatherClient;
use crate::weather::WeatherCache;

const FEED_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,studentbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Bot name: {}", config.telegram.bot_name);
    info!(
        "  Weather: ({}, {}), max age {}s",
        config.weather.latitude, config.weather.longitude, config.weather.max_age_secs
    );
    info!("  Timetable: {}", config.schedule.path.display());

    // Collaborators; any failure here stops the process before the loop starts
    let timetable = Timetable::load(&config.schedule.path)?;
    let images = ImagePool::new(config.images.urls.clone())?;
    let settings = BotSettings::from_config(&config)?;
    let tg = telegram::connect(&config.telegram.bot_token).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let weather = WeatherCache::new(
        Arc::new(YandexWeatherClient::new(config.weather.base_url.clone())),
        clock.clone(),
    );

    let bot = StudentBot::new(
        settings,
        Arc::new(timetable),
        weather,
        Arc::new(images),
        clock,
        Arc::new(TelegramSink::new(tg.clone())),
    );

    let mut scheduler = Scheduler::new().await?;
    crate::scheduler::tasks::register_heartbeat(&scheduler, bot.stats()).await?;
    scheduler.start().await?;

    let (feed_task, feed) =
        telegram::spawn_feed(tg, config.telegram.poll_timeout_secs, FEED_CAPACITY);

    // Stopping the feed closes the channel, which ends the dispatch loop.
    let feed_abort = feed_task.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            feed_abort.abort();
        }
    });

    bot.run(feed).await;

    scheduler.shutdown().await?;
    info!("Bot stopped");
    Ok(())
}
