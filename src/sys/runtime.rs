use crate::config::{self, Config, ConfigError};
use crate::events::{AppEvent, CarouselEvent};
use crate::ring::{Carousel, Subscription, Viewport};
use crate::sys::SharedFrame;
use async_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::{Instant, MissedTickBehavior};

const EVENT_QUEUE: usize = 64;

/// Runs the daemon until Ctrl-C.
pub fn run(config: Config) -> anyhow::Result<()> {
    let carousel = Carousel::new(
        config.items(),
        config.settings()?,
        Some(config.viewport_width),
    )?;
    log::info!(
        "Mounted carousel with {} items ({} layout)",
        carousel.items().len(),
        if carousel.is_small() { "small" } else { "large" }
    );

    let viewport = Viewport::new(config.viewport_width);
    let frame: SharedFrame = Arc::new(RwLock::new(carousel.frame()));
    let (tx, rx) = async_channel::bounded(EVENT_QUEUE);

    let rt = Runtime::new()?;
    rt.block_on(async {
        start_background_services(&config, tx.clone(), viewport.clone(), frame.clone());

        let subscription = forward_viewport_changes(&viewport, tx.clone());

        tokio::select! {
            _ = drive(carousel, rx, frame, config.frame_rate) => {}
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                }
                log::info!("Shutting down");
            }
        }

        drop(subscription);
    });

    if let Err(e) = fs_err::remove_file(&config.socket) {
        log::debug!("Socket cleanup: {}", e);
    }
    Ok(())
}

pub fn start_background_services(
    config: &Config,
    tx: Sender<AppEvent>,
    viewport: Viewport,
    frame: SharedFrame,
) {
    {
        let tx = tx.clone();
        let socket = config.socket.clone();
        tokio::spawn(async move {
            crate::sys::server::run_server(&socket, tx, viewport, frame).await;
        });
    }

    {
        let tx = tx.clone();
        tokio::spawn(async move {
            crate::config::run_async_watcher(tx).await;
        });
    }
}

/// Queues every viewport change for the driver. Listeners run synchronously
/// inside [`Viewport::resize`], so they hand off to an unbounded bridge and a
/// task waits for room in the event queue.
pub fn forward_viewport_changes(viewport: &Viewport, tx: Sender<AppEvent>) -> Subscription {
    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let subscription = viewport.subscribe(move |width| {
        let _ = bridge_tx.try_send(width);
    });

    tokio::spawn(async move {
        while let Ok(width) = bridge_rx.recv().await {
            let event = AppEvent::from(CarouselEvent::ViewportChanged { width });
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });
    subscription
}

/// Owns the carousel: applies events in arrival order and ticks animations
/// once per frame. Returns the carousel when the event channel closes.
pub async fn drive(
    mut carousel: Carousel,
    rx: Receiver<AppEvent>,
    frame: SharedFrame,
    frame_rate: u32,
) -> Carousel {
    let period = Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            biased;

            event = rx.recv() => {
                let changed = match event {
                    Ok(AppEvent::Input(event)) => carousel.handle(event),
                    Ok(AppEvent::ConfigReload) => reload(&mut carousel, config::load_config()),
                    Err(_) => break,
                };
                if changed {
                    *frame.write() = carousel.frame();
                }
            }
            now = interval.tick() => {
                let dt = (now - last).as_secs_f64();
                last = now;
                if carousel.is_animating() {
                    carousel.tick(dt);
                    *frame.write() = carousel.frame();
                }
            }
        }
    }

    carousel
}

fn reload(carousel: &mut Carousel, loaded: Result<Config, ConfigError>) -> bool {
    let loaded = loaded.and_then(|config| Ok((config.items(), config.settings()?)));
    match loaded {
        Ok((items, settings)) => {
            if items != carousel.items() {
                log::warn!("Item changes take effect after a restart");
            }
            carousel.retune(settings);
            log::info!("Configuration reloaded");
            true
        }
        Err(e) => {
            log::error!("Failed to reload config: {}", e);
            false
        }
    }
}
