//! Timed and spring animations of view properties.
//!
//! An animation is a list of [`Change`]s plus a [`Timing`]. When it starts, the current values of
//! the affected views are captured as the from-state; every [`AnimationQueue::advance`] then
//! produces interpolated values until the timing runs out, at which point the exact target values
//! are written and the completion runs.

use crate::rect::Rect;
use crate::transform::Transform;
use crate::view::{ViewId, Visual};
use std::time::Duration;

/// A single-shot continuation run when an animation has finished.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Default for Curve {
    fn default() -> Self {
        Curve::EaseInOut
    }
}

impl Curve {
    /// Maps linear progress in 0..=1 to eased progress.
    pub fn ease(self, t: f64) -> f64 {
        let t = t.max(0.).min(1.);
        match self {
            Curve::Linear => t,
            Curve::EaseIn => t * t * t,
            Curve::EaseOut => {
                let t1 = t - 1.;
                t1 * t1 * t1 + 1.
            }
            Curve::EaseInOut => {
                if t < 0.5 {
                    4. * t * t * t
                } else {
                    let t1 = -2. * t + 2.;
                    1. - t1 * t1 * t1 / 2.
                }
            }
        }
    }
}

/// Fraction of the travel distance the spring envelope may still have left when the duration runs
/// out.
const SPRING_SETTLE_THRESHOLD: f64 = 0.01;

/// Damped spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// 1 is critically damped; lower values overshoot and oscillate.
    pub damping_ratio: f64,

    /// Initial velocity, in units of the total travel distance per second.
    pub initial_velocity: f64,
}

impl Spring {
    /// Position of the spring (0 at rest at the start, 1 at the target) after `t` seconds.
    ///
    /// The natural frequency is picked so that the slowest decaying term of the solution is down
    /// to [`SPRING_SETTLE_THRESHOLD`] after `duration` seconds.
    fn position(&self, t: f64, duration: f64) -> f64 {
        let zeta = self.damping_ratio.max(1e-3);
        let decay_rate = -SPRING_SETTLE_THRESHOLD.ln() / duration.max(1e-3);
        let omega_0 = if zeta > 1. {
            decay_rate / (zeta - (zeta * zeta - 1.).sqrt())
        } else {
            decay_rate / zeta
        };
        let v0 = self.initial_velocity;

        // displacement from the target: y(0) = -1, y'(0) = v0
        let y = if zeta < 1. {
            let omega_d = omega_0 * (1. - zeta * zeta).sqrt();
            let b = (v0 - zeta * omega_0) / omega_d;
            (-zeta * omega_0 * t).exp() * (-(omega_d * t).cos() + b * (omega_d * t).sin())
        } else if (zeta - 1.).abs() < 1e-6 {
            let b = v0 - omega_0;
            (-omega_0 * t).exp() * (-1. + b * t)
        } else {
            let root = (zeta * zeta - 1.).sqrt();
            let r1 = -omega_0 * (zeta - root);
            let r2 = -omega_0 * (zeta + root);
            let c1 = (v0 + r2) / (r1 - r2);
            let c2 = -1. - c1;
            c1 * (r1 * t).exp() + c2 * (r2 * t).exp()
        };
        1. + y
    }
}

/// How an animation progresses over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// A fixed-duration animation along an easing curve.
    Curve { duration: Duration, curve: Curve },

    /// A physically simulated spring that is snapped to its target after `duration`.
    Spring { duration: Duration, spring: Spring },
}

impl Timing {
    pub fn duration(&self) -> Duration {
        match self {
            Timing::Curve { duration, .. } | Timing::Spring { duration, .. } => *duration,
        }
    }

    /// Progress after `elapsed`: 0 at the start and 1 once the duration has passed; springs may
    /// overshoot in between.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        let duration = self.duration();
        if elapsed >= duration {
            return 1.;
        }
        let t = elapsed.as_secs_f64();
        let total = duration.as_secs_f64();
        match self {
            Timing::Curve { curve, .. } => curve.ease(t / total),
            Timing::Spring { spring, .. } => spring.position(t, total),
        }
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration()
    }
}

/// A target for some of a view’s visual properties.
///
/// Properties left as `None` keep whatever value the view has when the change is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub view: ViewId,
    pub frame: Option<Rect>,
    pub opacity: Option<f64>,
    pub transform: Option<Transform>,
}

impl Change {
    /// A change that doesn’t change anything yet.
    pub fn new(view: ViewId) -> Change {
        Change {
            view,
            frame: None,
            opacity: None,
            transform: None,
        }
    }

    /// A change to all properties.
    pub fn visual(view: ViewId, visual: Visual) -> Change {
        Change {
            view,
            frame: Some(visual.frame),
            opacity: Some(visual.opacity),
            transform: Some(visual.transform),
        }
    }

    pub fn frame(mut self, frame: Rect) -> Change {
        self.frame = Some(frame);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Change {
        self.opacity = Some(opacity);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Change {
        self.transform = Some(transform);
        self
    }

    /// Returns `current` with this change applied.
    pub fn apply_to(&self, current: Visual) -> Visual {
        Visual {
            frame: self.frame.unwrap_or(current.frame),
            opacity: self.opacity.unwrap_or(current.opacity),
            transform: self.transform.unwrap_or(current.transform),
        }
    }
}

/// One animated view inside an animation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Track {
    pub(crate) view: ViewId,
    pub(crate) from: Visual,
    pub(crate) to: Visual,
}

struct Running {
    timing: Timing,
    elapsed: Duration,
    tracks: Vec<Track>,
    completion: Option<Completion>,
}

/// Output of a single animation step.
#[derive(Default)]
pub struct Step {
    /// Property values to write into the tree, in order.
    pub writes: Vec<(ViewId, Visual)>,

    /// Completions of animations that finished in this step; run these after the writes.
    pub completions: Vec<Completion>,
}

/// The list of running animations.
#[derive(Default)]
pub struct AnimationQueue {
    running: Vec<Running>,
}

impl AnimationQueue {
    pub fn new() -> AnimationQueue {
        AnimationQueue::default()
    }

    pub(crate) fn push(&mut self, timing: Timing, tracks: Vec<Track>, completion: Completion) {
        self.running.push(Running {
            timing,
            elapsed: Duration::from_secs(0),
            tracks,
            completion: Some(completion),
        });
    }

    /// Number of animations still running.

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Advances all animations by `dt`.
    ///
    /// Animations are stepped in the order they were started, so a later animation of the same
    /// view wins.
    pub fn advance(&mut self, dt: Duration) -> Step {
        let mut step = Step::default();

        for animation in &mut self.running {
            animation.elapsed += dt;
            let finished = animation.timing.is_finished(animation.elapsed);
            let progress = animation.timing.progress(animation.elapsed);
            for track in &animation.tracks {
                let value = if finished {
                    track.to
                } else {
                    track.from.lerp(&track.to, progress)
                };
                step.writes.push((track.view, value));
            }
            if finished {
                if let Some(completion) = animation.completion.take() {
                    step.completions.push(completion);
                }
            }
        }

        self.running.retain(|animation| animation.completion.is_some());
        step
    }
}
