//! Minimal native-view toolkit.
//!
//! # Conceptual overview
//! This crate models the small slice of a UI toolkit that overlays like popups need: a tree of
//! native views with frames, opacity and transforms, hit-testing, pointer events, and property
//! animations. It does not draw anything; a platform backend mirrors the tree onto real views.
//!
//! ## View tree
//! The [`ViewTree`] is an arena of views addressed by [`ViewId`]. Every view has a frame in its
//! superview’s coordinate system, an opacity, and an affine transform applied about the frame’s
//! center. Subviews are ordered back to front. The root view is the window; its coordinate space
//! is called window coordinates.
//!
//! ## Hit-testing
//! When a pointer goes down, the tree is asked which view is under it. The default algorithm
//! skips hidden, non-interactive and transparent views, asks subviews front to back and falls
//! back to the view itself. Any view may replace the algorithm with a [`HitTest`] override, which
//! can still call the default through its context.
//!
//! ## Events
//! Events arrive at the [`Host`] through a channel. Views with an activation handler act as
//! controls: a pointer that goes down on a control (or inside it) and comes back up within its
//! bounds activates it once.
//!
//! ## Animations
//! Animations interpolate a view’s [`Visual`] from its current value to a target, either along
//! an easing curve or with a damped spring. Time is driven by [`Host::advance`]; once an
//! animation ends its exact target values are written and its completion runs. Nothing is ever
//! called back while the tree is locked.
//!
//! ## Coordinate System
//! The origin is at the top left corner; positive y points down.

pub mod animation;
pub mod color;
mod error;
pub mod events;
mod host;
mod rect;
mod transform;
mod view;
mod view_tree;

pub use error::TreeError;
pub use host::{Host, Ui};
pub use rect::Rect;
pub use transform::Transform;
pub use view::{BlurStyle, Layout, NativeType, ViewId, Visual};
pub use view_tree::{HitTest, HitTestContext, ViewTree, MIN_HIT_OPACITY};
