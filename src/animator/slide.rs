use super::{PopupAnimator, PopupAppearance, PopupViews, TimedAnimator, Transition};
use perch_core::animation::Completion;
use perch_core::{Rect, TreeError, Ui, Visual};

/// The direction content travels in when it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Enters from beyond the container’s right edge.
    Leftward,

    /// Enters from beyond the container’s left edge.
    Rightward,

    /// Enters from below the container.
    Upward,

    /// Enters from above the container.
    Downward,
}

/// Slides the content in from off-screen and fades the background in.
///
/// The leftward slide keeps the background invisible even while shown.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideAnimator {
    direction: SlideDirection,
    pub base: TimedAnimator,
}

impl SlideAnimator {
    pub fn new(direction: SlideDirection) -> SlideAnimator {
        SlideAnimator {
            direction,
            base: TimedAnimator::new(),
        }
    }

    pub fn leftward() -> SlideAnimator {
        SlideAnimator::new(SlideDirection::Leftward)
    }

    pub fn rightward() -> SlideAnimator {
        SlideAnimator::new(SlideDirection::Rightward)
    }

    pub fn upward() -> SlideAnimator {
        SlideAnimator::new(SlideDirection::Upward)
    }

    pub fn downward() -> SlideAnimator {
        SlideAnimator::new(SlideDirection::Downward)
    }

    pub fn direction(&self) -> SlideDirection {
        self.direction
    }

    fn transition(&self, current: PopupAppearance, container: Rect) -> Transition {
        let target = current.content.frame;
        let source = match self.direction {
            SlideDirection::Leftward => target.with_x(container.size.x),
            SlideDirection::Rightward => target.with_x(-target.size.x),
            SlideDirection::Upward => target.with_y(container.size.y),
            SlideDirection::Downward => target.with_y(-target.size.y),
        };
        let shown_background = match self.direction {
            SlideDirection::Leftward => 0.,
            _ => 1.,
        };

        Transition {
            hidden: PopupAppearance {
                content: Visual {
                    frame: source,
                    ..current.content
                },
                background_opacity: 0.,
            },
            shown: PopupAppearance {
                content: current.content,
                background_opacity: shown_background,
            },
        }
    }
}

impl PopupAnimator for SlideAnimator {
    fn setup(&mut self, ui: &Ui, views: PopupViews) -> Result<(), TreeError> {
        let current = PopupAppearance::capture(ui, &views)?;
        let container = ui.tree().bounds(views.container)?;
        let transition = self.transition(current, container);
        self.base.install(ui, &views, transition);
        Ok(())
    }

    fn display(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion) {
        self.base.display(ui, views, animated, completion);
    }

    fn dismiss(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion) {
        self.base.dismiss(ui, views, animated, completion);
    }
}
