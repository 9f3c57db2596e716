use crate::events::CarouselEvent;
use crate::ring::drag::DragController;
use crate::ring::layout::{LayoutMetrics, RingLayout};
use crate::ring::overlay::OverlayPresence;
use crate::ring::responsive::{Breakpoint, MediaQuery, MediaQueryOptions};
use crate::ring::selection::Selection;
use crate::ring::spring::SpringConfig;
use crate::ring::DRAG_SENSITIVITY;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Deref, From, Into)]
pub struct ItemIndex(usize);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ImageRef(String);

crate::impl_string_newtype!(ImageRef);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub index: ItemIndex,
    pub image: ImageRef,
    pub alt: String,
}

impl Item {
    pub fn new(index: usize, image: ImageRef, alt: Option<String>) -> Self {
        Self {
            index: ItemIndex(index),
            alt: alt.unwrap_or_else(|| format!("item-{index}")),
            image,
        }
    }
}

/// Tunables that can change while the carousel is mounted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub query: MediaQuery,
    pub query_options: MediaQueryOptions,
    pub metrics: LayoutMetrics,
    pub sensitivity: f64,
    pub spring: SpringConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query: MediaQuery::default(),
            query_options: MediaQueryOptions::default(),
            metrics: LayoutMetrics::default(),
            sensitivity: DRAG_SENSITIVITY,
            spring: SpringConfig::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarouselError {
    #[error("A carousel needs at least one item")]
    NoItems,
}

/// The carousel interaction controller.
///
/// Owns rotation and selection exclusively. Input arrives through
/// [`Carousel::handle`] in host order; animation advances only in
/// [`Carousel::tick`].
#[derive(Debug, Clone)]
pub struct Carousel {
    items: Vec<Item>,
    settings: Settings,
    viewport_width: Option<f64>,
    breakpoint: Breakpoint,
    layout: RingLayout,
    drag: DragController,
    selection: Selection,
    overlay: OverlayPresence,
}

impl Carousel {
    pub fn new(
        items: Vec<Item>,
        settings: Settings,
        viewport_width: Option<f64>,
    ) -> Result<Self, CarouselError> {
        if items.is_empty() {
            return Err(CarouselError::NoItems);
        }

        let breakpoint = Breakpoint::new(settings.query, viewport_width, settings.query_options);
        let layout = RingLayout::compute(
            items.len(),
            settings.metrics.cylinder_width(breakpoint.matches()),
        );

        Ok(Self {
            items,
            settings,
            viewport_width,
            breakpoint,
            layout,
            drag: DragController::new(settings.sensitivity, settings.spring),
            selection: Selection::Idle,
            overlay: OverlayPresence::Hidden,
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, index: ItemIndex) -> Option<&Item> {
        self.items.get(*index)
    }

    pub fn rotation(&self) -> f64 {
        self.drag.rotation()
    }

    pub fn settle_target(&self) -> Option<f64> {
        self.drag.settle_target()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_small(&self) -> bool {
        self.breakpoint.matches()
    }

    pub fn layout(&self) -> &RingLayout {
        &self.layout
    }

    pub fn overlay(&self) -> OverlayPresence {
        self.overlay
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies one input event; returns whether any state changed.
    pub fn handle(&mut self, event: CarouselEvent) -> bool {
        match event {
            CarouselEvent::DragStart => self.drag.on_drag_start(),
            CarouselEvent::DragMove { delta_x } => self.drag.on_drag_move(delta_x),
            CarouselEvent::DragEnd { velocity_x } => self.drag.on_drag_end(velocity_x),
            CarouselEvent::Select { index } => self.select(index),
            CarouselEvent::Dismiss => self.dismiss(),
            CarouselEvent::ViewportChanged { width } => self.viewport_changed(width),
        }
    }

    pub fn select(&mut self, index: ItemIndex) -> bool {
        if *index >= self.items.len() {
            log::warn!(
                "Ignoring select of item {} (carousel has {})",
                index,
                self.items.len()
            );
            return false;
        }
        if !self.selection.select(index) {
            return false;
        }

        self.drag.set_enabled(false);
        self.drag.halt();
        self.overlay.open(index);
        log::info!("Focused item {} ({})", index, self.items[*index].image);
        true
    }

    pub fn dismiss(&mut self) -> bool {
        let Some(index) = self.selection.dismiss() else {
            return false;
        };

        self.drag.set_enabled(true);
        self.overlay.close();
        log::info!("Dismissed item {}", index);
        true
    }

    pub fn viewport_changed(&mut self, width: f64) -> bool {
        if !width.is_finite() || width < 0.0 {
            log::debug!("Ignoring viewport width {}", width);
            return false;
        }

        self.viewport_width = Some(width);
        if !self.breakpoint.observe(width) {
            return false;
        }

        log::debug!(
            "Breakpoint {} is now {}",
            self.breakpoint.query(),
            self.breakpoint.matches()
        );
        self.relayout();
        true
    }

    /// Advances settle and overlay animations; returns true while either moves.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !dt.is_finite() {
            log::debug!("Ignoring frame dt {}", dt);
            return self.is_animating();
        }
        let rotating = self.drag.tick(dt);
        let fading = self.overlay.tick(dt);
        rotating || fading
    }

    pub fn is_animating(&self) -> bool {
        self.drag.is_settling() || self.overlay.is_animating()
    }

    /// Swaps tunables in place. Items, rotation and selection are kept.
    pub fn retune(&mut self, settings: Settings) {
        self.settings = settings;
        self.drag.retune(settings.sensitivity, settings.spring);
        self.breakpoint = Breakpoint::new(
            settings.query,
            self.viewport_width,
            settings.query_options,
        );
        self.relayout();
    }

    fn relayout(&mut self) {
        let width = self.settings.metrics.cylinder_width(self.breakpoint.matches());
        self.layout = RingLayout::compute(self.items.len(), width);
    }

    pub fn frame(&self) -> Frame {
        Frame {
            rotation: self.drag.rotation(),
            settling: self.drag.is_settling(),
            selection: self.selection,
            small: self.breakpoint.matches(),
            front: ItemIndex(self.layout.front_face(self.drag.rotation())),
            layout: self.layout.clone(),
            overlay: self.overlay,
            overlay_opacity: self.overlay.opacity(),
            overlay_scale: self.overlay.scale(),
        }
    }
}

/// Snapshot of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rotation: f64,
    pub settling: bool,
    pub selection: Selection,
    pub small: bool,
    pub front: ItemIndex,
    pub layout: RingLayout,
    pub overlay: OverlayPresence,
    pub overlay_opacity: f64,
    pub overlay_scale: f64,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rotation={:.2} settling={} selection={} breakpoint={} width={} front={} overlay={:.2}",
            self.rotation,
            self.settling,
            self.selection,
            if self.small { "small" } else { "large" },
            self.layout.width,
            self.front,
            self.overlay_opacity,
        )
    }
}
