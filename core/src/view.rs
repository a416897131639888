use crate::rect::Rect;
use crate::transform::Transform;
use uuid::Uuid;

/// A unique identifier for a view.
///
/// (this is just a UUID)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u32, u16, u16, [u8; 8]);

impl ViewId {
    pub(crate) fn new() -> ViewId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        ViewId(a, b, c, *d)
    }
}

/// Types of native views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// A plain layer that fills its bounds with a background color.
    Layer,

    /// A layer that turns pointer down/up pairs into activations.
    Control,

    /// A translucent overlay that blurs whatever is behind it.
    VisualEffect(BlurStyle),
}

/// Blur material of a visual effect view, from lightest to heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurStyle {
    ExtraLight,
    Light,
    Dark,
    Regular,
    Prominent,
}

impl Default for BlurStyle {
    fn default() -> Self {
        BlurStyle::Dark
    }
}

/// How a view’s frame is derived when its superview changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The frame is only ever changed explicitly.
    Manual,

    /// The frame always equals the superview’s bounds.
    FillSuperview,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Manual
    }
}

/// The animatable properties of a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visual {
    /// Frame in the superview’s coordinate system, ignoring the transform.
    pub frame: Rect,

    /// Opacity between 0 and 1.
    pub opacity: f64,

    /// Transform, applied about the frame’s center.
    pub transform: Transform,
}

impl Visual {
    pub fn new(frame: Rect) -> Visual {
        Visual {
            frame,
            opacity: 1.,
            transform: Transform::identity(),
        }
    }

    /// Interpolates all properties.
    ///
    /// Properties that are equal in both visuals come out unchanged for any `t`. Frame and
    /// transform follow `t` past either end, but opacity stays within 0 and 1.
    pub fn lerp(&self, other: &Visual, t: f64) -> Visual {
        Visual {
            frame: if self.frame == other.frame {
                self.frame
            } else {
                self.frame.lerp(other.frame, t)
            },
            opacity: if self.opacity == other.opacity {
                self.opacity
            } else {
                crate::rect::lerp(self.opacity, other.opacity, t).max(0.).min(1.)
            },
            transform: if self.transform == other.transform {
                self.transform
            } else {
                self.transform.lerp(other.transform, t)
            },
        }
    }
}
