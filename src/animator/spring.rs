use super::{PopupAnimator, PopupViews, SlideAnimator};
use perch_core::animation::{Completion, Spring, Timing};
use perch_core::{TreeError, Ui};
use std::time::Duration;

/// Default duration of the spring when displaying.
pub const SPRING_DURATION: Duration = Duration::from_millis(500);

/// Drops the content in from above and lets it bounce into place.
///
/// Dismissal is a plain downward slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringDownwardAnimator {
    slide: SlideAnimator,
    pub duration: Duration,
    pub spring: Spring,
}

impl Default for SpringDownwardAnimator {
    fn default() -> Self {
        SpringDownwardAnimator {
            slide: SlideAnimator::downward(),
            duration: SPRING_DURATION,
            spring: Spring {
                damping_ratio: 0.8,
                initial_velocity: 0.7,
            },
        }
    }
}

impl SpringDownwardAnimator {
    pub fn new() -> SpringDownwardAnimator {
        SpringDownwardAnimator::default()
    }

    /// The underlying slide, which also sets the dismiss timing.
    pub fn slide(&self) -> &SlideAnimator {
        &self.slide
    }

    pub fn slide_mut(&mut self) -> &mut SlideAnimator {
        &mut self.slide
    }

    fn display_timing(&self) -> Timing {
        Timing::Spring {
            duration: self.duration,
            spring: self.spring,
        }
    }
}

impl PopupAnimator for SpringDownwardAnimator {
    fn setup(&mut self, ui: &Ui, views: PopupViews) -> Result<(), TreeError> {
        self.slide.setup(ui, views)
    }

    fn display(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion) {
        let base = &self.slide.base;
        let target = base.transition().map(|t| &t.shown);
        base.animate_to(ui, &views, target, animated, self.display_timing(), completion);
    }

    fn dismiss(&self, ui: &Ui, views: PopupViews, animated: bool, completion: Completion) {
        self.slide.dismiss(ui, views, animated, completion);
    }
}
