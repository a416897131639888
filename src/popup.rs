//! The popup controller.

use crate::animator::{PopupAnimator, PopupViews};
use crate::background::BackgroundLayer;
use crate::config::PopupConfig;
use crate::error::PopupError;
use parking_lot::Mutex;
use perch_core::animation::Completion;
use perch_core::events::{Activation, EventHandler};
use perch_core::{HitTest, HitTestContext, Layout, NativeType, Rect, TreeError, Ui, ViewId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Where a popup is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupPhase {
    /// Created but not displayed yet.
    Hidden,

    /// The display animation is running.
    Displaying,

    Shown,

    /// The dismiss animation is running.
    Dismissing,

    /// Dismissed and detached from the container. Nothing can happen any more.
    Disposed,
}

impl PopupPhase {
    /// Returns true while a display or dismiss animation is running.
    pub fn is_animating(self) -> bool {
        match self {
            PopupPhase::Displaying | PopupPhase::Dismissing => true,
            _ => false,
        }
    }
}

/// A lifecycle callback.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    will_display: Option<Callback>,
    did_display: Option<Callback>,
    will_dismiss: Option<Callback>,
    did_dismiss: Option<Callback>,
}

#[derive(Debug)]
struct PopupFlags {
    dismissible: AtomicBool,
    interactive: AtomicBool,
    penetrable: AtomicBool,
}

/// Routes pointer queries on the popup’s root view.
///
/// Points over the content are swallowed unless the popup is interactive; points over the
/// background fall through to whatever lies below if the popup is penetrable.
struct PopupHitTest {
    content: ViewId,
    flags: Arc<PopupFlags>,
}

impl HitTest for PopupHitTest {
    fn hit_test(&self, cx: &HitTestContext<'_>) -> Option<ViewId> {
        let tree = cx.tree();
        let over_content = tree
            .convert_point(cx.point(), cx.view(), self.content)
            .map(|local| tree.point_inside(self.content, local))
            .unwrap_or(false);

        if over_content {
            if self.flags.interactive.load(Ordering::Relaxed) {
                cx.super_hit_test()
            } else {
                trace!("swallowing hit on non-interactive content");
                None
            }
        } else if self.flags.penetrable.load(Ordering::Relaxed) {
            trace!("hit passes through popup background");
            None
        } else {
            cx.super_hit_test()
        }
    }
}

struct Shared {
    ui: Ui,
    view: ViewId,
    container: ViewId,
    content: ViewId,
    background: BackgroundLayer,
    animator: Box<dyn PopupAnimator>,
    flags: Arc<PopupFlags>,
    phase: Mutex<PopupPhase>,
    callbacks: Mutex<Callbacks>,
}

impl Shared {
    fn views(&self) -> PopupViews {
        PopupViews {
            container: self.container,
            content: self.content,
            background: self.background.view(),
        }
    }

    /// Moves to `next` if the popup is currently in one of the `from` phases.
    fn begin(&self, from: &[PopupPhase], next: PopupPhase) -> bool {
        let mut phase = self.phase.lock();
        if !from.contains(&phase) {
            debug!("popup is {:?}; ignoring move to {:?}", *phase, next);
            return false;
        }
        debug!("popup {:?} -> {:?}", *phase, next);
        *phase = next;
        true
    }

    fn finish(&self, next: PopupPhase) {
        let mut phase = self.phase.lock();
        debug!("popup {:?} -> {:?}", *phase, next);
        *phase = next;
    }

    fn fire(&self, pick: fn(&Callbacks) -> &Option<Callback>) {
        let callback = pick(&self.callbacks.lock()).clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn display(self: &Arc<Self>, animated: bool, completion: Option<Completion>) -> bool {
        if !self.begin(&[PopupPhase::Hidden, PopupPhase::Shown], PopupPhase::Displaying) {
            return false;
        }

        if let Err(err) = self.ui.tree().add_subview(self.container, self.view) {
            warn!("could not attach popup: {}", err);
        }
        self.fire(|c| &c.will_display);

        let weak = Arc::downgrade(self);
        self.animator.display(
            &self.ui,
            self.views(),
            animated,
            Box::new(move || {
                if let Some(completion) = completion {
                    completion();
                }
                if let Some(shared) = weak.upgrade() {
                    shared.finish(PopupPhase::Shown);
                    shared.fire(|c| &c.did_display);
                }
            }),
        );
        true
    }

    fn dismiss(self: &Arc<Self>, animated: bool, completion: Option<Completion>) -> bool {
        if !self.begin(&[PopupPhase::Hidden, PopupPhase::Shown], PopupPhase::Dismissing) {
            return false;
        }

        self.fire(|c| &c.will_dismiss);

        let weak = Arc::downgrade(self);
        self.animator.dismiss(
            &self.ui,
            self.views(),
            animated,
            Box::new(move || {
                let shared = weak.upgrade();
                if let Some(shared) = &shared {
                    if let Err(err) = shared.ui.tree().remove_from_superview(shared.view) {
                        warn!("could not detach popup: {}", err);
                    }
                }
                if let Some(completion) = completion {
                    completion();
                }
                if let Some(shared) = shared {
                    shared.finish(PopupPhase::Disposed);
                    shared.fire(|c| &c.did_dismiss);
                }
            }),
        );
        true
    }

    fn background_activated(self: &Arc<Self>) {
        if self.flags.dismissible.load(Ordering::Relaxed) {
            debug!("background tapped; dismissing");
            self.dismiss(true, None);
        } else {
            trace!("background tapped; popup is not dismissible");
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        *self.callbacks.lock() = Callbacks::default();

        let mut tree = self.ui.tree();
        if tree.superview(self.content) == Some(self.view) {
            if let Err(err) = tree.remove_from_superview(self.content) {
                warn!("could not detach content: {}", err);
            }
        }
        if tree.contains(self.view) {
            if let Err(err) = tree.remove_view(self.view) {
                warn!("could not remove popup: {}", err);
            }
        }
    }
}

/// A transient overlay made of a background layer and a content view.
///
/// The popup does not own its container; the container must stay in the tree for as long as the
/// popup is used. The content view is owned by the caller too: dropping the popup detaches it but
/// leaves it alive.
///
/// # Lifecycle
/// A popup starts out [`Hidden`](PopupPhase::Hidden). [`display`](Popup::display) attaches it to
/// the container and animates it in; [`dismiss`](Popup::dismiss) animates it out and detaches
/// it for good. Calls made while an animation is running are ignored, and so are their
/// completions.
pub struct Popup {
    shared: Arc<Shared>,
}

impl Popup {
    /// Creates a popup with the default configuration.
    pub fn new<A>(
        ui: &Ui,
        container: ViewId,
        content: ViewId,
        animator: A,
    ) -> Result<Popup, PopupError>
    where
        A: PopupAnimator + 'static,
    {
        Popup::with_config(ui, container, content, animator, PopupConfig::default())
    }

    /// Creates a popup.
    ///
    /// The content is moved into the popup and the animator is set up, which puts the content in
    /// its hidden state. The popup is not attached to the container until it is displayed.
    pub fn with_config<A>(
        ui: &Ui,
        container: ViewId,
        content: ViewId,
        animator: A,
        config: PopupConfig,
    ) -> Result<Popup, PopupError>
    where
        A: PopupAnimator + 'static,
    {
        let bounds = {
            let tree = ui.tree();
            tree.kind(content)?;
            if tree.is_descendant(container, content) {
                return Err(PopupError::ContentIsContainer(content));
            }
            tree.bounds(container)?
        };

        let background = BackgroundLayer::new(ui, &config)?;
        let view = ui.tree().add_view(NativeType::Layer, bounds);

        let flags = Arc::new(PopupFlags {
            dismissible: AtomicBool::new(config.dismissible),
            interactive: AtomicBool::new(config.interactive),
            penetrable: AtomicBool::new(config.penetrable),
        });
        let mut shared = Shared {
            ui: ui.clone(),
            view,
            container,
            content,
            background,
            animator: Box::new(animator),
            flags: Arc::clone(&flags),
            phase: Mutex::new(PopupPhase::Hidden),
            callbacks: Mutex::new(Callbacks::default()),
        };

        Popup::assemble(&shared, bounds)?;
        let views = shared.views();
        shared.animator.setup(ui, views)?;

        ui.tree()
            .set_hit_test(view, Some(Arc::new(PopupHitTest { content, flags })))?;

        let shared = Arc::new(shared);
        let weak = Arc::downgrade(&shared);
        shared
            .background
            .set_action(EventHandler::new(move |_: Activation| {
                if let Some(shared) = Weak::upgrade(&weak) {
                    shared.background_activated();
                }
            }))?;

        debug!("created popup {:?} in {:?}", view, container);
        Ok(Popup { shared })
    }

    fn assemble(shared: &Shared, bounds: Rect) -> Result<(), TreeError> {
        let mut tree = shared.ui.tree();
        tree.set_frame(shared.view, bounds)?;
        tree.set_layout(shared.view, Layout::FillSuperview)?;
        tree.add_subview(shared.view, shared.background.view())?;
        tree.add_subview(shared.view, shared.content)
    }

    /// Attaches the popup to its container and animates it in.
    ///
    /// Returns false, without running the completion, if the popup is animating or has been
    /// dismissed. With `animated` set to false everything, including the completion, happens
    /// before this returns.
    pub fn display(&self, animated: bool, completion: Option<Completion>) -> bool {
        self.shared.display(animated, completion)
    }

    /// Animates the popup out and detaches it from its container.
    ///
    /// Returns false, without running the completion, if the popup is animating or has already
    /// been dismissed. The popup is detached before the completion runs.
    pub fn dismiss(&self, animated: bool, completion: Option<Completion>) -> bool {
        self.shared.dismiss(animated, completion)
    }

    pub fn phase(&self) -> PopupPhase {
        *self.shared.phase.lock()
    }

    pub fn is_animating(&self) -> bool {
        self.phase().is_animating()
    }

    /// Whether tapping the background dismisses the popup.
    pub fn is_dismissible(&self) -> bool {
        self.shared.flags.dismissible.load(Ordering::Relaxed)
    }

    pub fn set_dismissible(&self, dismissible: bool) {
        self.shared
            .flags
            .dismissible
            .store(dismissible, Ordering::Relaxed);
    }

    /// Whether the content receives pointer events.
    pub fn is_interactive(&self) -> bool {
        self.shared.flags.interactive.load(Ordering::Relaxed)
    }

    pub fn set_interactive(&self, interactive: bool) {
        self.shared
            .flags
            .interactive
            .store(interactive, Ordering::Relaxed);
    }

    /// Whether pointer events outside the content pass through to the views below the popup.
    pub fn is_penetrable(&self) -> bool {
        self.shared.flags.penetrable.load(Ordering::Relaxed)
    }

    pub fn set_penetrable(&self, penetrable: bool) {
        self.shared
            .flags
            .penetrable
            .store(penetrable, Ordering::Relaxed);
    }

    pub fn on_will_display<F: Fn() + Send + Sync + 'static>(&self, callback: F) {
        self.shared.callbacks.lock().will_display = Some(Arc::new(callback));
    }

    pub fn on_did_display<F: Fn() + Send + Sync + 'static>(&self, callback: F) {
        self.shared.callbacks.lock().did_display = Some(Arc::new(callback));
    }

    pub fn on_will_dismiss<F: Fn() + Send + Sync + 'static>(&self, callback: F) {
        self.shared.callbacks.lock().will_dismiss = Some(Arc::new(callback));
    }

    pub fn on_did_dismiss<F: Fn() + Send + Sync + 'static>(&self, callback: F) {
        self.shared.callbacks.lock().did_dismiss = Some(Arc::new(callback));
    }

    /// Removes all lifecycle callbacks.
    pub fn clear_callbacks(&self) {
        *self.shared.callbacks.lock() = Callbacks::default();
    }

    pub fn background(&self) -> &BackgroundLayer {
        &self.shared.background
    }

    pub fn animator(&self) -> &dyn PopupAnimator {
        &*self.shared.animator
    }

    /// The popup’s root view, which holds the background and the content.
    pub fn view(&self) -> ViewId {
        self.shared.view
    }

    pub fn content(&self) -> ViewId {
        self.shared.content
    }

    pub fn container(&self) -> ViewId {
        self.shared.container
    }
}

impl fmt::Debug for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popup")
            .field("view", &self.shared.view)
            .field("container", &self.shared.container)
            .field("content", &self.shared.content)
            .field("phase", &self.phase())
            .field("flags", &self.shared.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::{FadeAnimator, TimedAnimator};
    use cgmath::{Point2, Vector2};
    use perch_core::Host;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn setup() -> (Host, ViewId) {
        let host = Host::new(Vector2::new(320., 480.));
        let content = host
            .ui()
            .tree()
            .add_view(NativeType::Layer, Rect::from_xywh(60., 190., 200., 100.));
        (host, content)
    }

    fn log() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Callback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let make = move |name: &'static str| -> Callback {
            let log = Arc::clone(&log2);
            Arc::new(move || log.lock().push(name))
        };
        (log, make)
    }

    #[test]
    fn construction_builds_the_subtree() {
        let (host, content) = setup();
        let popup = Popup::new(host.ui(), host.window(), content, TimedAnimator::new()).unwrap();

        let tree = host.ui().tree();
        assert_eq!(
            tree.subviews(popup.view()).unwrap(),
            &[popup.background().view(), content][..]
        );
        assert_eq!(tree.superview(popup.view()), None);
        assert_eq!(tree.frame(popup.view()).unwrap(), Rect::from_xywh(0., 0., 320., 480.));
        assert_eq!(popup.phase(), PopupPhase::Hidden);
    }

    #[test]
    fn content_must_not_contain_the_container() {
        let (host, content) = setup();
        let err = Popup::new(host.ui(), host.window(), host.window(), TimedAnimator::new())
            .unwrap_err();
        assert_eq!(err, PopupError::ContentIsContainer(host.window()));

        let inner = host.ui().tree().add_view(NativeType::Layer, Rect::zero());
        host.ui().tree().add_subview(content, inner).unwrap();
        let err = Popup::new(host.ui(), inner, content, TimedAnimator::new()).unwrap_err();
        assert_eq!(err, PopupError::ContentIsContainer(content));
    }

    #[test]
    fn missing_views_are_reported() {
        let (host, content) = setup();
        host.ui().tree().remove_view(content).unwrap();
        let err = Popup::new(host.ui(), host.window(), content, TimedAnimator::new()).unwrap_err();
        assert_eq!(err, PopupError::Tree(TreeError::NoSuchView(content)));
    }

    #[test]
    fn callbacks_run_in_order() {
        let (host, content) = setup();
        let popup = Popup::new(host.ui(), host.window(), content, FadeAnimator::new()).unwrap();
        let (log, make) = log();
        {
            let mut callbacks = popup.shared.callbacks.lock();
            callbacks.will_display = Some(make("will display"));
            callbacks.did_display = Some(make("did display"));
            callbacks.will_dismiss = Some(make("will dismiss"));
            callbacks.did_dismiss = Some(make("did dismiss"));
        }

        let log2 = Arc::clone(&log);
        assert!(popup.display(false, Some(Box::new(move || log2.lock().push("displayed")))));
        let log2 = Arc::clone(&log);
        assert!(popup.dismiss(false, Some(Box::new(move || log2.lock().push("dismissed")))));

        assert_eq!(
            *log.lock(),
            vec![
                "will display",
                "displayed",
                "did display",
                "will dismiss",
                "dismissed",
                "did dismiss",
            ]
        );
    }

    #[test]
    fn phases_follow_animations() {
        let (mut host, content) = setup();
        let popup = Popup::new(host.ui(), host.window(), content, FadeAnimator::new()).unwrap();

        assert!(popup.display(true, None));
        assert_eq!(popup.phase(), PopupPhase::Displaying);
        assert!(popup.is_animating());
        assert_eq!(host.ui().tree().superview(popup.view()), Some(host.window()));

        host.settle(Duration::from_millis(16));
        assert_eq!(popup.phase(), PopupPhase::Shown);

        assert!(popup.dismiss(true, None));
        assert_eq!(popup.phase(), PopupPhase::Dismissing);
        host.settle(Duration::from_millis(16));
        assert_eq!(popup.phase(), PopupPhase::Disposed);
        assert_eq!(host.ui().tree().superview(popup.view()), None);
    }

    #[test]
    fn disposed_is_terminal() {
        let (host, content) = setup();
        let popup = Popup::new(host.ui(), host.window(), content, FadeAnimator::new()).unwrap();
        assert!(popup.dismiss(false, None));
        assert_eq!(popup.phase(), PopupPhase::Disposed);

        let count = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::clone(&count);
        let completion: Completion = Box::new(move || {
            count2.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!popup.display(false, Some(completion)));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(host.ui().tree().superview(popup.view()), None);
    }

    #[test]
    fn completion_may_reenter() {
        let (host, content) = setup();
        let popup = Arc::new(
            Popup::new(host.ui(), host.window(), content, FadeAnimator::new()).unwrap(),
        );
        let popup2 = Arc::clone(&popup);
        let accepted = Arc::new(AtomicBool::new(true));
        let accepted2 = Arc::clone(&accepted);
        popup.display(
            false,
            Some(Box::new(move || {
                // the phase is still Displaying here
                accepted2.store(popup2.dismiss(false, None), Ordering::SeqCst);
            })),
        );
        assert!(!accepted.load(Ordering::SeqCst));
        assert_eq!(popup.phase(), PopupPhase::Shown);
    }

    #[test]
    fn drop_detaches_content_and_removes_views() {
        let (host, content) = setup();
        let popup = Popup::new(host.ui(), host.window(), content, FadeAnimator::new()).unwrap();
        popup.display(false, None);
        let (view, background) = (popup.view(), popup.background().view());

        drop(popup);
        let tree = host.ui().tree();
        assert!(!tree.contains(view));
        assert!(!tree.contains(background));
        assert!(tree.contains(content));
        assert_eq!(tree.superview(content), None);
        assert!(tree.subviews(host.window()).unwrap().is_empty());
    }

    #[test]
    fn dropping_mid_animation_still_completes() {
        let (mut host, content) = setup();
        let popup = Popup::new(host.ui(), host.window(), content, FadeAnimator::new()).unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::clone(&count);
        popup.display(
            true,
            Some(Box::new(move || {
                count2.fetch_add(1, Ordering::SeqCst);
            })),
        );
        drop(popup);

        host.settle(Duration::from_millis(16));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hidden_popup_receives_no_hits() {
        let (host, content) = setup();
        let _popup = Popup::new(host.ui(), host.window(), content, FadeAnimator::new()).unwrap();
        assert_eq!(host.ui().hit_test(Point2::new(100., 100.)), Some(host.window()));
    }
}
