pub mod drag;
pub mod layout;
pub mod model;
pub mod overlay;
pub mod responsive;
pub mod selection;
pub mod spring;

pub use drag::DragController;
pub use layout::{FacePlacement, LayoutMetrics, RingLayout};
pub use model::{Carousel, CarouselError, Frame, ImageRef, Item, ItemIndex, Settings};
pub use overlay::OverlayPresence;
pub use responsive::{Breakpoint, MediaQuery, MediaQueryOptions, Subscription, Viewport};
pub use selection::Selection;
pub use spring::{Spring, SpringConfig};

pub const FULL_TURN: f64 = 360.0;
pub const DEFAULT_BREAKPOINT: f64 = 640.0; // max-width of the small layout
pub const SMALL_CYLINDER_WIDTH: f64 = 600.0;
pub const LARGE_CYLINDER_WIDTH: f64 = 1000.0;
pub const DRAG_SENSITIVITY: f64 = 0.05; // degrees per pixel
pub const SPRING_STIFFNESS: f64 = 100.0;
pub const SPRING_DAMPING: f64 = 30.0;
pub const SPRING_MASS: f64 = 0.1;
pub const REST_DELTA: f64 = 0.01; // degrees
pub const REST_SPEED: f64 = 0.01; // degrees per second
pub const SPRING_SUBSTEP: f64 = 0.001; // seconds
pub const MAX_FRAME_DT: f64 = 0.05;
pub const OVERLAY_DURATION: f64 = 0.5; // seconds
pub const OVERLAY_EASE: [f64; 4] = [0.32, 0.72, 0.0, 1.0];
