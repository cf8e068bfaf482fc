//! Comment-box surfaces: the write side of an attached comment box.
//!
//! Each platform's composer takes text differently (contenteditable div,
//! plain textarea, or an editor that only honors insert-text commands), so
//! insertion picks a strategy by platform and the surface applies it.

use crate::platform::PlatformId;

/// How text is pushed into a platform's comment composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMethod {
    /// Set the inner text of a contenteditable element and fire an input
    /// event (LinkedIn, Facebook).
    SetInnerText,
    /// Set a textarea's value and fire an input event (X, Instagram).
    SetValue,
    /// Focus and issue an insert-text editing command (fallback).
    InsertTextCommand,
}

impl InsertMethod {
    pub fn for_platform(platform: PlatformId) -> Self {
        match platform {
            PlatformId::Linkedin | PlatformId::Facebook => Self::SetInnerText,
            PlatformId::X | PlatformId::Instagram => Self::SetValue,
            PlatformId::Reddit => Self::InsertTextCommand,
        }
    }
}

/// A live comment box the attacher can write into.
///
/// Identity is stable for the lifetime of the element; the attacher uses it
/// to guarantee at-most-one trigger control per box.
pub trait CommentSurface: Send {
    fn id(&self) -> u64;

    fn focus(&mut self) {}

    /// Apply `text` to the composer using the given strategy.
    fn apply(&mut self, method: InsertMethod, text: &str);
}
