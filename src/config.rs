use crate::background::BackgroundStyle;
use perch_core::color::Color;
use perch_core::BlurStyle;

/// Initial settings of a popup.
///
/// Everything here can still be changed on the popup afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupConfig {
    /// Whether tapping the background dismisses the popup.
    pub dismissible: bool,

    /// Whether the content receives pointer events.
    pub interactive: bool,

    /// Whether pointer events outside the content pass through to whatever is below the popup.
    pub penetrable: bool,

    pub background_style: BackgroundStyle,

    /// Blur material, used when `background_style` is `Blur`.
    pub blur_style: BlurStyle,

    /// Backing color of the background; also visible under the blur.
    pub background_color: Color,
}

impl Default for PopupConfig {
    fn default() -> Self {
        PopupConfig {
            dismissible: false,
            interactive: true,
            penetrable: false,
            background_style: BackgroundStyle::SolidColor,
            blur_style: BlurStyle::Dark,
            background_color: Color::BLACK.with_alpha(0.3),
        }
    }
}
