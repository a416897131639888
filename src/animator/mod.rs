//! Display and dismiss animations.
//!
//! A [`PopupAnimator`] decides what a popup looks like while hidden and while shown, and how it
//! gets from one to the other. Most animators compute a [`Transition`] once in
//! [`setup`](PopupAnimator::setup) and hand it to a [`TimedAnimator`], which plays it with a
//! fixed duration and easing curve.

mod fade;
mod slide;
mod spring;
mod zoom;

pub use fade::FadeAnimator;
pub use slide::{SlideAnimator, SlideDirection};
pub use spring::SpringDownwardAnimator;
pub use zoom::ZoomAnimator;

use perch_core::animation::{Change, Completion, Curve, Timing};
use perch_core::{TreeError, Ui, ViewId, Visual};
use std::time::Duration;
use tracing::trace;

/// The views an animator works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupViews {
    /// The view the popup is shown in. Its bounds define “off-screen”.
    pub container: ViewId,

    pub content: ViewId,

    /// The background layer’s control view.
    pub background: ViewId,
}

/// Content and background properties at one end of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupAppearance {
    pub content: Visual,
    pub background_opacity: f64,
}

impl PopupAppearance {
    /// Reads the current appearance from the tree.
    pub fn capture(ui: &Ui, views: &PopupViews) -> Result<PopupAppearance, TreeError> {
        let tree = ui.tree();
        Ok(PopupAppearance {
            content: tree.visual(views.content)?,
            background_opacity: tree.opacity(views.background)?,
        })
    }

    /// Changes that produce this appearance.
    ///
    /// The background’s frame is left alone since it follows the popup’s size.
    pub fn changes(&self, views: &PopupViews) -> Vec<Change> {
        vec![
            Change::visual(views.content, self.content),
            Change::new(views.background).opacity(self.background_opacity),
        ]
    }
}

/// The two end states of a popup animation, fixed when the animator is set up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Before display and after dismissal.
    pub hidden: PopupAppearance,

    /// After display.
    pub shown: PopupAppearance,
}

/// A strategy for showing and hiding a popup.
///
/// Every call to `display` or `dismiss` must run its completion exactly once, and only after the
/// end state has been written to the tree. With `animated` set to false the end state is applied
/// and the completion run before the call returns.
pub trait PopupAnimator: Send + Sync {
    /// Computes the hidden and shown states from the current geometry and applies the hidden
    /// state right away, so the popup can be attached without flashing.
    ///
    /// Called exactly once, when the popup is created.
    fn setup(&mut self, ui: &Ui, views: PopupViews) -> Result<(), TreeError>;

    /// Goes from the hidden state to the shown state.
    fn display(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion);

    /// Goes from the shown state to the hidden state.
    fn dismiss(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion);
}

impl<A: PopupAnimator + ?Sized> PopupAnimator for Box<A> {
    fn setup(&mut self, ui: &Ui, views: PopupViews) -> Result<(), TreeError> {
        (**self).setup(ui, views)
    }

    fn display(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion) {
        (**self).display(ui, views, animated, completion)
    }

    fn dismiss(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion) {
        (**self).dismiss(ui, views, animated, completion)
    }
}

/// Default duration of both display and dismiss animations.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(250);

/// The shared timed animation behind most animators.
///
/// On its own it has nothing to animate: `setup` does nothing, and `display`/`dismiss` leave
/// everything as it is and just complete (after the duration, if animated). Animators install a
/// [`Transition`] into it during their own setup.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedAnimator {
    pub display_duration: Duration,
    pub display_curve: Curve,
    pub dismiss_duration: Duration,
    pub dismiss_curve: Curve,
    transition: Option<Transition>,
}

impl Default for TimedAnimator {
    fn default() -> Self {
        TimedAnimator {
            display_duration: DEFAULT_DURATION,
            display_curve: Curve::EaseInOut,
            dismiss_duration: DEFAULT_DURATION,
            dismiss_curve: Curve::EaseInOut,
            transition: None,
        }
    }
}

impl TimedAnimator {
    pub fn new() -> TimedAnimator {
        TimedAnimator::default()
    }

    /// The installed transition, if any.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Stores the transition and applies its hidden state.
    pub fn install(&mut self, ui: &Ui, views: &PopupViews, transition: Transition) {
        ui.apply(&transition.hidden.changes(views));
        self.transition = Some(transition);
    }

    pub fn display_timing(&self) -> Timing {
        Timing::Curve {
            duration: self.display_duration,
            curve: self.display_curve,
        }
    }

    pub fn dismiss_timing(&self) -> Timing {
        Timing::Curve {
            duration: self.dismiss_duration,
            curve: self.dismiss_curve,
        }
    }

    /// Moves to `target`, either right away or with the given timing.
    ///
    /// A missing target changes nothing but still completes.
    pub fn animate_to(
        &self,
        ui: &Ui,
        views: &PopupViews,
        target: Option<&PopupAppearance>,
        animated: bool,
        timing: Timing,
        completion: Completion,
    ) {
        let changes = target.map_or_else(Vec::new, |target| target.changes(views));
        trace!("{} popup changes, animated: {}", changes.len(), animated);
        if animated {
            ui.animate(timing, &changes, completion);
        } else {
            ui.apply(&changes);
            completion();
        }
    }
}

impl PopupAnimator for TimedAnimator {
    fn setup(&mut self, _ui: &Ui, _views: PopupViews) -> Result<(), TreeError> {
        Ok(())
    }

    fn display(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion) {
        let target = self.transition.as_ref().map(|t| &t.shown);
        self.animate_to(ui, &views, target, animated, self.display_timing(), completion);
    }

    fn dismiss(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion) {
        let target = self.transition.as_ref().map(|t| &t.hidden);
        self.animate_to(ui, &views, target, animated, self.dismiss_timing(), completion);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cgmath::Vector2;
    use perch_core::{Host, NativeType, Rect};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A 320×480 window with a content view and a background view inside it.
    pub(crate) fn scene() -> (Host, PopupViews) {
        let host = Host::new(Vector2::new(320., 480.));
        let views = {
            let mut tree = host.ui().tree();
            let content = tree.add_view(NativeType::Layer, Rect::from_xywh(60., 190., 200., 100.));
            let background = tree.add_view(NativeType::Control, Rect::from_xywh(0., 0., 320., 480.));
            tree.add_subview(host.window(), background).unwrap();
            tree.add_subview(host.window(), content).unwrap();
            PopupViews {
                container: host.window(),
                content,
                background,
            }
        };
        (host, views)
    }

    pub(crate) fn counter() -> (Arc<AtomicUsize>, Completion) {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::clone(&count);
        (
            count,
            Box::new(move || {
                count2.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn base_setup_changes_nothing() {
        let (host, views) = scene();
        let before = PopupAppearance::capture(host.ui(), &views).unwrap();

        let mut animator = TimedAnimator::new();
        animator.setup(host.ui(), views).unwrap();
        assert!(animator.transition().is_none());

        let (count, completion) = counter();
        animator.display(host.ui(), views, false, completion);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(PopupAppearance::capture(host.ui(), &views).unwrap(), before);
    }

    #[test]
    fn base_animated_completes_after_duration() {
        let (mut host, views) = scene();
        let animator = TimedAnimator::new();

        let (count, completion) = counter();
        animator.dismiss(host.ui(), views, true, completion);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        host.advance(Duration::from_millis(200));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        host.advance(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn install_applies_hidden_state() {
        let (host, views) = scene();
        let shown = PopupAppearance::capture(host.ui(), &views).unwrap();
        let hidden = PopupAppearance {
            content: Visual {
                opacity: 0.,
                ..shown.content
            },
            background_opacity: 0.,
        };

        let mut animator = TimedAnimator::new();
        animator.install(host.ui(), &views, Transition { hidden, shown });
        assert_eq!(PopupAppearance::capture(host.ui(), &views).unwrap(), hidden);
        assert_eq!(animator.transition().unwrap().shown, shown);
    }
}
