use crate::animation::{AnimationQueue, Change, Completion, Timing, Track};
use crate::events::{ControlTracker, Pointer};
use crate::rect::Rect;
use crate::view::{NativeType, ViewId};
use crate::view_tree::ViewTree;
use cgmath::{Point2, Vector2};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A handle to the UI state shared by the host and everything that lives in its tree.
///
/// Cheap to clone. All methods must be called from the thread that runs the host; none of them
/// hold a lock while calling back into user code, so completions and handlers may use the `Ui`
/// freely.
#[derive(Clone)]
pub struct Ui {
    tree: Arc<Mutex<ViewTree>>,
    animations: Arc<Mutex<AnimationQueue>>,
    events: Sender<Pointer>,
}

impl Ui {
    /// Locks the view tree.
    ///
    /// Drop the guard before calling any other `Ui` method.
    pub fn tree(&self) -> MutexGuard<'_, ViewTree> {
        self.tree.lock()
    }

    /// Applies changes immediately.
    ///
    /// Changes to views that no longer exist are skipped.
    pub fn apply(&self, changes: &[Change]) {
        let mut tree = self.tree.lock();
        for change in changes {
            let result = tree
                .visual(change.view)
                .and_then(|current| tree.set_visual(change.view, change.apply_to(current)));
            if let Err(err) = result {
                warn!("skipping change: {}", err);
            }
        }
    }

    /// Starts animating from the current values to the changed values.
    ///
    /// The completion runs from [`Host::advance`] once the end state has been written, even if
    /// some of the views went missing in the meantime.
    pub fn animate(&self, timing: Timing, changes: &[Change], completion: Completion) {
        let tracks: Vec<_> = {
            let tree = self.tree.lock();
            changes
                .iter()
                .filter_map(|change| match tree.visual(change.view) {
                    Ok(from) => Some(Track {
                        view: change.view,
                        from,
                        to: change.apply_to(from),
                    }),
                    Err(err) => {
                        warn!("not animating: {}", err);
                        None
                    }
                })
                .collect()
        };
        debug!("animating {} views over {:?}", tracks.len(), timing.duration());
        self.animations.lock().push(timing, tracks, completion);
    }

    /// Returns true if any animation is running.
    pub fn has_running_animations(&self) -> bool {
        !self.animations.lock().is_empty()
    }

    /// Finds the view that would receive a pointer event at a point in window coordinates.
    pub fn hit_test(&self, point: Point2<f64>) -> Option<ViewId> {
        let tree = self.tree.lock();
        tree.root().and_then(|root| tree.hit_test(root, point))
    }

    /// Returns a sender for feeding pointer events into the host.
    pub fn event_sender(&self) -> Sender<Pointer> {
        self.events.clone()
    }
}

/// Connects a view tree to the platform’s event loop.
///
/// The platform layer feeds pointer events through [`Ui::event_sender`] and drives time through
/// [`Host::advance`]; both must happen on the same thread.
pub struct Host {
    ui: Ui,
    window: ViewId,
    event_recv: Receiver<Pointer>,
    controls: ControlTracker,
}

impl Host {
    /// Creates a new host with a root (window) view of the given size.
    pub fn new(window_size: Vector2<f64>) -> Host {
        let (event_sender, event_recv) = channel::unbounded();

        let mut tree = ViewTree::new();
        let window = tree.add_view(NativeType::Layer, Rect::from_size(window_size));
        tree.set_root(window).expect("window view was just created");

        Host {
            ui: Ui {
                tree: Arc::new(Mutex::new(tree)),
                animations: Arc::new(Mutex::new(AnimationQueue::new())),
                events: event_sender,
            },
            window,
            event_recv,
            controls: ControlTracker::new(),
        }
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    /// The root view.
    pub fn window(&self) -> ViewId {
        self.window
    }

    /// Receives all events from the event queue and dispatches them.
    pub fn poll(&mut self) {
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => self.dispatch(event),
                Err(TryRecvError::Empty) => break,
                // the ui keeps a sender, so this only happens while tearing down
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn dispatch(&mut self, pointer: Pointer) {
        trace!("pointer {:?} at {:?}", pointer.phase, pointer.location);
        let activation = {
            let tree = self.ui.tree.lock();
            self.controls.handle(&tree, &pointer)
        };
        if let Some((handler, activation)) = activation {
            debug!("activated {:?}", activation.view);
            handler.call(activation);
        }
    }

    /// Advances all running animations by `dt`, then runs the completions of those that finished.
    pub fn advance(&mut self, dt: Duration) {
        let step = self.ui.animations.lock().advance(dt);
        {
            let mut tree = self.ui.tree.lock();
            for (view, visual) in step.writes {
                if let Err(err) = tree.set_visual(view, visual) {
                    trace!("dropping animation frame: {}", err);
                }
            }
        }
        for completion in step.completions {
            completion();
        }
    }

    /// Advances in fixed steps until no animation is running.
    ///
    /// Animations started by completions are run as well.
    pub fn settle(&mut self, frame: Duration) {
        while self.ui.has_running_animations() {
            self.advance(frame);
        }
    }
}
