use super::{PopupAnimator, PopupAppearance, PopupViews, TimedAnimator, Transition};
use perch_core::animation::Completion;
use perch_core::{Transform, TreeError, Ui, Visual};

/// Scale of the content while hidden.
pub const ZOOM_HIDDEN_SCALE: f64 = 0.3;

/// Grows the content from a small, transparent version of itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoomAnimator {
    pub base: TimedAnimator,
}

impl ZoomAnimator {
    pub fn new() -> ZoomAnimator {
        ZoomAnimator::default()
    }
}

impl PopupAnimator for ZoomAnimator {
    fn setup(&mut self, ui: &Ui, views: PopupViews) -> Result<(), TreeError> {
        let current = PopupAppearance::capture(ui, &views)?;
        let transition = Transition {
            hidden: PopupAppearance {
                content: Visual {
                    opacity: 0.,
                    transform: Transform::scale(ZOOM_HIDDEN_SCALE, ZOOM_HIDDEN_SCALE),
                    ..current.content
                },
                background_opacity: 0.,
            },
            shown: PopupAppearance {
                content: Visual {
                    opacity: 1.,
                    transform: Transform::identity(),
                    ..current.content
                },
                background_opacity: 1.,
            },
        };
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
