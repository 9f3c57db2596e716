use crate::ring::model::ItemIndex;
use derive_more::Display;

/// Which item, if any, is expanded into the overlay.
///
/// At most one item is focused at a time; `select` while focused and
/// `dismiss` while idle are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Selection {
    #[default]
    #[display("idle")]
    Idle,
    #[display("focused({_0})")]
    Focused(ItemIndex),
}

impl Selection {
    pub fn select(&mut self, index: ItemIndex) -> bool {
        match self {
            Self::Idle => {
                *self = Self::Focused(index);
                true
            }
            Self::Focused(_) => false,
        }
    }

    pub fn dismiss(&mut self) -> Option<ItemIndex> {
        match std::mem::take(self) {
            Self::Focused(index) => Some(index),
            Self::Idle => None,
        }
    }

    pub fn focused(&self) -> Option<ItemIndex> {
        match self {
            Self::Focused(index) => Some(*index),
            Self::Idle => None,
        }
    }

    pub fn is_focused(&self) -> bool {
        matches!(self, Self::Focused(_))
    }
}
