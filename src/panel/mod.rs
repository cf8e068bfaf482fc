pub mod attacher;
pub mod observer;
pub mod surface;

pub use attacher::{Attacher, PanelEffect, PanelState};
pub use observer::{CommentBoxObserver, PageEvent};
pub use surface::{CommentSurface, InsertMethod};
