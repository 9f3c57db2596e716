use crate::events::AppEvent;
use crate::ring::{
    ImageRef, Item, LayoutMetrics, MediaQuery, MediaQueryOptions, Settings, SpringConfig,
    DRAG_SENSITIVITY,
};
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/orrery.sock";
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_FRAME_RATE: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ItemConfig {
    pub image: ImageRef,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BreakpointConfig {
    #[serde(default)]
    pub query: MediaQuery,
    #[serde(default)]
    pub default_value: bool,
    #[serde(default = "default_true")]
    pub initialize_with_value: bool,
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self {
            query: MediaQuery::default(),
            default_value: false,
            initialize_with_value: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DragConfig {
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            sensitivity: DRAG_SENSITIVITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_socket")]
    pub socket: PathBuf,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    #[serde(default)]
    pub breakpoint: BreakpointConfig,
    #[serde(default)]
    pub metrics: LayoutMetrics,
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub spring: SpringConfig,
    #[serde(default = "default_items")]
    pub items: Vec<ItemConfig>,
}

fn default_true() -> bool {
    true
}

fn default_sensitivity() -> f64 {
    DRAG_SENSITIVITY
}

fn default_socket() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET_PATH)
}

fn default_viewport_width() -> f64 {
    DEFAULT_VIEWPORT_WIDTH
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

fn default_items() -> Vec<ItemConfig> {
    [
        "exoplaneta01.webp",
        "exoplaneta002.jpg",
        "exoplaneta003.jpg",
        "exoplaneta004.webp",
    ]
    .iter()
    .enumerate()
    .map(|(i, image)| ItemConfig {
        image: ImageRef::new(*image),
        alt: Some(format!("exoplaneta-{i}")),
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: default_socket(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            frame_rate: DEFAULT_FRAME_RATE,
            breakpoint: BreakpointConfig::default(),
            metrics: LayoutMetrics::default(),
            drag: DragConfig::default(),
            spring: SpringConfig::default(),
            items: default_items(),
        }
    }
}

impl Config {
    /// Carousel tunables, rejecting values that would poison the rotation.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        finite("viewport_width", self.viewport_width)?;
        finite("drag.sensitivity", self.drag.sensitivity)?;
        positive("metrics.small_width", self.metrics.small_width)?;
        positive("metrics.large_width", self.metrics.large_width)?;
        positive("spring.stiffness", self.spring.stiffness)?;
        positive("spring.mass", self.spring.mass)?;
        positive("spring.rest_delta", self.spring.rest_delta)?;
        positive("spring.rest_speed", self.spring.rest_speed)?;
        if self.spring.damping < 0.0 {
            return Err(ConfigError::Invalid {
                field: "spring.damping",
                value: self.spring.damping,
            });
        }
        finite("spring.damping", self.spring.damping)?;

        Ok(Settings {
            query: self.breakpoint.query,
            query_options: MediaQueryOptions {
                default_value: self.breakpoint.default_value,
                initialize_with_value: self.breakpoint.initialize_with_value,
            },
            metrics: self.metrics,
            sensitivity: self.drag.sensitivity,
            spring: self.spring,
        })
    }

    pub fn items(&self) -> Vec<Item> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, cfg)| Item::new(i, cfg.image.clone(), cfg.alt.clone()))
            .collect()
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    match finite(field, value)? {
        v if v > 0.0 => Ok(v),
        _ => Err(ConfigError::Invalid { field, value }),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Invalid value {value} for {field}")]
    Invalid { field: &'static str, value: f64 },
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "orrery", "orrery").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("ORRERY"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    match get_config_path() {
        Ok(path) => watch_config_file(path, tx).await,
        Err(e) => log::error!("Config watcher error: {}", e),
    }
}

/// Sends [`AppEvent::ConfigReload`] whenever `config_path` is written, created
/// or removed. Returns once the receiver is gone.
pub async fn watch_config_file(config_path: PathBuf, tx: Sender<AppEvent>) {
    let Some(config_dir) = config_path.parent().map(|p| p.to_path_buf()) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch {}: {}", config_dir.display(), e);
        return;
    }
    log::debug!("Watching {}", config_path.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let touches_config = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) && event.paths.iter().any(|p| p == &config_path);

                if touches_config && tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
