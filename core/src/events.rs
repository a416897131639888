//! Events.

use crate::view::ViewId;
use crate::view_tree::ViewTree;
use cgmath::Point2;
use core::fmt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Phases of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Moved,
    Up,
    /// The system took the pointer away (e.g. a gesture recognizer or an incoming call).
    Cancelled,
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Unique ID of the pointer, e.g. one per finger. Stays the same from down to up.
    pub id: u64,

    /// Event location in the window coordinate system.
    pub location: Point2<f64>,

    pub phase: PointerPhase,
}

impl Pointer {
    /// A touch event for the given finger.
    pub fn touch(id: u64, phase: PointerPhase, location: Point2<f64>) -> Pointer {
        Pointer {
            id,
            location,
            phase,
        }
    }
}

/// Emitted by a control after a clean pointer down/up pair inside its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activation {
    /// The control that was activated.
    pub view: ViewId,

    /// Location of the pointer-up, in window coordinates.
    pub location: Point2<f64>,
}

pub struct EventHandler<Type>(Arc<Mutex<dyn FnMut(Type) + Send>>);

impl<T> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl<T> EventHandler<T> {
    pub fn new<F: 'static + FnMut(T) + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    /// Runs the handler.
    ///
    /// # Panics
    /// A handler must not call itself: this would deadlock rather than panic, so don’t.
    pub fn call(&self, event: T) {
        let mut handler = self.0.lock();
        (&mut *handler)(event)
    }
}

impl<T> fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler<{}>", core::any::type_name::<T>())
    }
}

/// Turns raw pointer events into control activations.
///
/// A pointer-down whose hit-test target is (or is inside) a control starts tracking that control.
/// The matching pointer-up activates it if it lands inside the control’s bounds. Anything else
/// (cancellation, releasing outside, the control disappearing) ends tracking silently.
#[derive(Debug, Default)]
pub struct ControlTracker {
    tracking: HashMap<u64, ViewId>,
}

impl ControlTracker {
    pub fn new() -> ControlTracker {
        ControlTracker::default()
    }

    /// Returns true if the pointer is currently tracking a control.
    pub fn is_tracking(&self, pointer_id: u64) -> bool {
        self.tracking.contains_key(&pointer_id)
    }

    /// Feeds a pointer event.
    ///
    /// Returns the handler to run if the event completed an activation. The handler is returned
    /// rather than called so that the caller can release the tree first.
    pub fn handle(
        &mut self,
        tree: &ViewTree,
        pointer: &Pointer,
    ) -> Option<(EventHandler<Activation>, Activation)> {
        match pointer.phase {
            PointerPhase::Down => {
                let control = tree
                    .root()
                    .and_then(|root| tree.hit_test(root, pointer.location))
                    .and_then(|target| tree.control_for(target));
                match control {
                    Some(control) => {
                        self.tracking.insert(pointer.id, control);
                    }
                    None => {
                        self.tracking.remove(&pointer.id);
                    }
                }
                None
            }
            PointerPhase::Moved => None,
            PointerPhase::Cancelled => {
                self.tracking.remove(&pointer.id);
                None
            }
            PointerPhase::Up => {
                let control = self.tracking.remove(&pointer.id)?;
                let root = tree.root()?;
                let local = tree.convert_point(pointer.location, root, control).ok()?;
                if !tree.point_inside(control, local) {
                    return None;
                }
                let handler = tree.activation_handler(control)?;
                Some((
                    handler,
                    Activation {
                        view: control,
                        location: pointer.location,
                    },
                ))
            }
        }
    }
}
