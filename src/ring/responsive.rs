use crate::ring::DEFAULT_BREAKPOINT;
use derive_more::Display;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};
use thiserror::Error;

/// A width media query, written the CSS way: `(max-width: 640px)`.
#[derive(Debug, Clone, Copy, PartialEq, Display, SerializeDisplay, DeserializeFromStr)]
pub enum MediaQuery {
    #[display("(max-width: {_0}px)")]
    MaxWidth(f64),
    #[display("(min-width: {_0}px)")]
    MinWidth(f64),
}

impl Default for MediaQuery {
    fn default() -> Self {
        Self::MaxWidth(DEFAULT_BREAKPOINT)
    }
}

impl MediaQuery {
    pub fn matches(&self, width: f64) -> bool {
        match *self {
            Self::MaxWidth(max) => width <= max,
            Self::MinWidth(min) => width >= min,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaQueryError {
    #[error("Malformed media query '{0}'")]
    Malformed(String),
    #[error("Unsupported media feature '{0}'")]
    UnknownFeature(String),
    #[error("Invalid width '{0}'")]
    InvalidWidth(String),
}

impl FromStr for MediaQuery {
    type Err = MediaQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('(')
            .and_then(|b| b.strip_suffix(')'))
            .unwrap_or(trimmed);

        let (feature, value) = body
            .split_once(':')
            .ok_or_else(|| MediaQueryError::Malformed(s.to_string()))?;

        let value = value.trim();
        let width: f64 = value
            .strip_suffix("px")
            .unwrap_or(value)
            .trim()
            .parse()
            .ok()
            .filter(|w: &f64| w.is_finite() && *w >= 0.0)
            .ok_or_else(|| MediaQueryError::InvalidWidth(value.to_string()))?;

        match feature.trim().to_ascii_lowercase().as_str() {
            "max-width" => Ok(Self::MaxWidth(width)),
            "min-width" => Ok(Self::MinWidth(width)),
            other => Err(MediaQueryError::UnknownFeature(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MediaQueryOptions {
    /// Value reported when the query is not evaluated against a live viewport.
    #[serde(default)]
    pub default_value: bool,
    #[serde(default = "default_true")]
    pub initialize_with_value: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MediaQueryOptions {
    fn default() -> Self {
        Self {
            default_value: false,
            initialize_with_value: true,
        }
    }
}

/// Boolean view of a media query over the viewport width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    query: MediaQuery,
    matches: bool,
}

impl Breakpoint {
    /// Evaluates the query once so the first layout already uses the right metrics.
    pub fn new(query: MediaQuery, width: Option<f64>, options: MediaQueryOptions) -> Self {
        let matches = match width {
            Some(w) if options.initialize_with_value => query.matches(w),
            _ => options.default_value,
        };
        Self { query, matches }
    }

    pub fn query(&self) -> MediaQuery {
        self.query
    }

    pub fn matches(&self) -> bool {
        self.matches
    }

    /// Re-evaluates against a new width; returns whether the truth value flipped.
    pub fn observe(&mut self, width: f64) -> bool {
        let matches = self.query.matches(width);
        let changed = matches != self.matches;
        self.matches = matches;
        changed
    }
}

type Listener = Box<dyn FnMut(f64) + Send>;

struct Listeners {
    width: f64,
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Source of viewport-width change notifications.
///
/// Listeners run while the viewport is locked and must not call back into it.
#[derive(Clone)]
pub struct Viewport {
    inner: Arc<Mutex<Listeners>>,
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Viewport")
            .field("width", &inner.width)
            .field("listeners", &inner.entries.len())
            .finish()
    }
}

impl Viewport {
    pub fn new(width: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Listeners {
                width,
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn width(&self) -> f64 {
        self.inner.lock().width
    }

    /// Sets the width and notifies every listener if it changed.
    pub fn resize(&self, width: f64) -> bool {
        let mut inner = self.inner.lock();
        if inner.width == width {
            return false;
        }
        inner.width = width;
        for (_, listener) in inner.entries.iter_mut() {
            listener(width);
        }
        true
    }

    /// Registers `listener` until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, listener: impl FnMut(f64) + Send + 'static) -> Subscription {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Box::new(listener)));
        Subscription {
            id,
            source: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

/// Keeps a viewport listener registered; unsubscribes on drop.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    source: Weak<Mutex<Listeners>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(source) = self.source.upgrade() {
            source.lock().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_media_query_parsing() {
        let cases = vec![
            ("(max-width: 640px)", MediaQuery::MaxWidth(640.0)),
            ("max-width:640", MediaQuery::MaxWidth(640.0)),
            ("  (MIN-WIDTH : 1024px) ", MediaQuery::MinWidth(1024.0)),
            ("(max-width: 40.5px)", MediaQuery::MaxWidth(40.5)),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<MediaQuery>().unwrap(), expected);
        }
    }

    #[test]
    fn test_media_query_rejects_garbage() {
        assert!(matches!(
            "640px".parse::<MediaQuery>(),
            Err(MediaQueryError::Malformed(_))
        ));
        assert!(matches!(
            "(max-height: 640px)".parse::<MediaQuery>(),
            Err(MediaQueryError::UnknownFeature(_))
        ));
        assert!(matches!(
            "(max-width: wide)".parse::<MediaQuery>(),
            Err(MediaQueryError::InvalidWidth(_))
        ));
    }

    #[test]
    fn test_media_query_display_roundtrips_through_serde() {
        let json = serde_json::to_string(&MediaQuery::MaxWidth(640.0)).unwrap();
        assert_eq!(json, "\"(max-width: 640px)\"");
        let back: MediaQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MediaQuery::MaxWidth(640.0));
    }

    #[test]
    fn test_breakpoint_flips_when_crossing_threshold() {
        let mut bp = Breakpoint::new(MediaQuery::default(), Some(800.0), Default::default());
        assert!(!bp.matches());

        assert!(bp.observe(600.0));
        assert!(bp.matches());

        assert!(!bp.observe(500.0));
        assert!(bp.observe(641.0));
        assert!(!bp.matches());
    }

    #[test]
    fn test_breakpoint_threshold_is_inclusive() {
        let bp = Breakpoint::new(MediaQuery::default(), Some(640.0), Default::default());
        assert!(bp.matches());
    }

    #[test]
    fn test_breakpoint_default_value_without_initialization() {
        let options = MediaQueryOptions {
            default_value: true,
            initialize_with_value: false,
        };
        let bp = Breakpoint::new(MediaQuery::default(), Some(1920.0), options);
        assert!(bp.matches());

        let bp = Breakpoint::new(MediaQuery::default(), None, Default::default());
        assert!(!bp.matches());
    }

    #[test]
    fn test_viewport_notifies_until_unsubscribed() {
        let viewport = Viewport::new(800.0);
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let subscription = viewport.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(viewport.resize(600.0));
        assert!(!viewport.resize(600.0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(viewport.listener_count(), 1);

        drop(subscription);
        assert_eq!(viewport.listener_count(), 0);

        assert!(viewport.resize(1200.0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(viewport.width(), 1200.0);
    }

    #[test]
    fn test_subscription_outliving_viewport() {
        let viewport = Viewport::new(800.0);
        let subscription = viewport.subscribe(|_| {});
        drop(viewport);
        drop(subscription);
    }
}
