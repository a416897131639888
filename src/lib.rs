//! Popup overlays.
//!
//! A [`Popup`] puts a content view on top of a dimming [`BackgroundLayer`] inside a container
//! view, and animates it in and out with a [`PopupAnimator`](animator::PopupAnimator).
//!
//! ```no_run
//! use cgmath::Vector2;
//! use perch::animator::ZoomAnimator;
//! use perch::Popup;
//! use perch_core::{Host, NativeType, Rect};
//!
//! let host = Host::new(Vector2::new(320., 480.));
//! let content = host
//!     .ui()
//!     .tree()
//!     .add_view(NativeType::Layer, Rect::from_xywh(60., 190., 200., 100.));
//!
//! let popup = Popup::new(host.ui(), host.window(), content, ZoomAnimator::new()).unwrap();
//! popup.set_dismissible(true);
//! popup.display(true, None);
//! ```

pub mod animator;
mod background;
mod config;
mod error;
mod popup;

pub use background::{BackgroundLayer, BackgroundStyle};
pub use config::PopupConfig;
pub use error::PopupError;
pub use popup::{Callback, Popup, PopupPhase};
