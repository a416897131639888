use super::{PopupAnimator, PopupAppearance, PopupViews, TimedAnimator, Transition};
use perch_core::animation::Completion;
use perch_core::{TreeError, Ui, Visual};

/// Cross-fades content and background.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FadeAnimator {
    pub base: TimedAnimator,
}

impl FadeAnimator {
    pub fn new() -> FadeAnimator {
        FadeAnimator::default()
    }
}

impl PopupAnimator for FadeAnimator {
    fn setup(&mut self, ui: &Ui, views: PopupViews) -> Result<(), TreeError> {
        let current = PopupAppearance::capture(ui, &views)?;
        let with_opacity = |opacity| PopupAppearance {
            content: Visual {
                opacity,
                ..current.content
            },
            background_opacity: opacity,
        };
        let transition = Transition {
            hidden: with_opacity(0.),
            shown: with_opacity(1.),
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
