//! The dimming layer behind popup content.

use crate::config::PopupConfig;
use parking_lot::Mutex;
use perch_core::color::Color;
use perch_core::events::{Activation, EventHandler};
use perch_core::{
    BlurStyle, HitTest, HitTestContext, Layout, NativeType, Rect, TreeError, Ui, ViewId,
};
use std::sync::Arc;
use tracing::{trace, warn};

/// How the background dims the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundStyle {
    /// Only the backing color.
    SolidColor,

    /// A blur overlay on top of the backing color.
    Blur,
}

impl Default for BackgroundStyle {
    fn default() -> Self {
        BackgroundStyle::SolidColor
    }
}

#[derive(Debug)]
struct BackgroundState {
    style: BackgroundStyle,
    blur_style: BlurStyle,
    color: Color,
    /// The blur overlay; exists iff `style` is `Blur`.
    effect: Option<ViewId>,
}

/// A full-size control behind the popup content.
///
/// The layer is filled with a backing color and, in the `Blur` style, covered by a visual effect
/// view. Pointer hits on the effect view count as hits on the layer itself, so activations
/// always come from the same control no matter the style.
pub struct BackgroundLayer {
    ui: Ui,
    view: ViewId,
    state: Mutex<BackgroundState>,
}

/// Re-targets hits on the effect overlay to the background layer.
struct EffectPassthrough;

impl HitTest for EffectPassthrough {
    fn hit_test(&self, cx: &HitTestContext<'_>) -> Option<ViewId> {
        let hit = cx.super_hit_test()?;
        let tree = cx.tree();
        let is_effect = hit != cx.view()
            && tree.superview(hit) == Some(cx.view())
            && matches!(tree.kind(hit), Ok(NativeType::VisualEffect(_)));
        if is_effect {
            Some(cx.view())
        } else {
            Some(hit)
        }
    }
}

impl BackgroundLayer {
    /// Creates the layer’s views. The layer is not attached anywhere yet.
    pub(crate) fn new(ui: &Ui, config: &PopupConfig) -> Result<BackgroundLayer, TreeError> {
        let view = {
            let mut tree = ui.tree();
            let view = tree.add_view(NativeType::Control, Rect::zero());
            tree.set_layout(view, Layout::FillSuperview)?;
            tree.set_background(view, config.background_color)?;
            tree.set_hit_test(view, Some(Arc::new(EffectPassthrough)))?;
            view
        };

        let layer = BackgroundLayer {
            ui: ui.clone(),
            view,
            state: Mutex::new(BackgroundState {
                style: config.background_style,
                blur_style: config.blur_style,
                color: config.background_color,
                effect: None,
            }),
        };
        {
            let mut state = layer.state.lock();
            layer.refresh(&mut state)?;
        }
        Ok(layer)
    }

    /// The control view.
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn style(&self) -> BackgroundStyle {
        self.state.lock().style
    }

    /// Switches between a plain color and a blur, creating or destroying the blur overlay.
    pub fn set_style(&self, style: BackgroundStyle) -> Result<(), TreeError> {
        let mut state = self.state.lock();
        state.style = style;
        self.refresh(&mut state)
    }

    pub fn blur_style(&self) -> BlurStyle {
        self.state.lock().blur_style
    }

    /// Sets the blur material. The overlay is only rebuilt if the style is `Blur`; otherwise the
    /// material is remembered for later.
    pub fn set_blur_style(&self, blur_style: BlurStyle) -> Result<(), TreeError> {
        let mut state = self.state.lock();
        state.blur_style = blur_style;
        if state.style == BackgroundStyle::Blur {
            self.refresh(&mut state)?;
        }
        Ok(())
    }

    pub fn color(&self) -> Color {
        self.state.lock().color
    }

    /// Sets the backing color, which is used in both styles.
    pub fn set_color(&self, color: Color) -> Result<(), TreeError> {
        let mut state = self.state.lock();
        state.color = color;
        self.ui.tree().set_background(self.view, color)
    }

    /// The blur overlay, if the style is `Blur`.
    pub fn effect_view(&self) -> Option<ViewId> {
        self.state.lock().effect
    }

    /// Runs the handler whenever the layer is tapped.
    pub(crate) fn set_action(&self, handler: EventHandler<Activation>) -> Result<(), TreeError> {
        self.ui.tree().set_activation_handler(self.view, Some(handler))
    }

    fn refresh(&self, state: &mut BackgroundState) -> Result<(), TreeError> {
        let mut tree = self.ui.tree();
        if let Some(effect) = state.effect.take() {
            tree.remove_view(effect)?;
        }
        if state.style == BackgroundStyle::Blur {
            let effect = tree.add_view(NativeType::VisualEffect(state.blur_style), Rect::zero());
            tree.set_layout(effect, Layout::FillSuperview)?;
            tree.insert_subview(self.view, effect, 0)?;
            state.effect = Some(effect);
        }
        trace!("background style {:?}, effect {:?}", state.style, state.effect);
        Ok(())
    }
}

impl Drop for BackgroundLayer {
    fn drop(&mut self) {
        let mut tree = self.ui.tree();
        if tree.contains(self.view) {
            if let Err(err) = tree.remove_view(self.view) {
                warn!("failed to remove background: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point2, Vector2};
    use perch_core::Host;

    fn attached_layer(host: &Host) -> BackgroundLayer {
        let layer = BackgroundLayer::new(host.ui(), &PopupConfig::default()).unwrap();
        host.ui()
            .tree()
            .add_subview(host.window(), layer.view())
            .unwrap();
        layer
    }

    fn effect_count(host: &Host, layer: &BackgroundLayer) -> usize {
        let tree = host.ui().tree();
        tree.subviews(layer.view())
            .unwrap()
            .iter()
            .filter(|id| matches!(tree.kind(**id), Ok(NativeType::VisualEffect(_))))
            .count()
    }

    #[test]
    fn defaults() {
        let host = Host::new(Vector2::new(320., 480.));
        let layer = attached_layer(&host);
        assert_eq!(layer.style(), BackgroundStyle::SolidColor);
        assert_eq!(layer.blur_style(), BlurStyle::Dark);
        assert_eq!(layer.color(), Color::BLACK.with_alpha(0.3));
        assert_eq!(layer.effect_view(), None);
        assert_eq!(
            host.ui().tree().frame(layer.view()).unwrap(),
            Rect::from_xywh(0., 0., 320., 480.)
        );
    }

    #[test]
    fn toggling_blur_keeps_exactly_one_overlay() {
        let host = Host::new(Vector2::new(320., 480.));
        let layer = attached_layer(&host);

        layer.set_style(BackgroundStyle::Blur).unwrap();
        assert_eq!(effect_count(&host, &layer), 1);
        let first = layer.effect_view().unwrap();

        layer.set_style(BackgroundStyle::SolidColor).unwrap();
        assert_eq!(effect_count(&host, &layer), 0);
        assert!(!host.ui().tree().contains(first));

        layer.set_style(BackgroundStyle::Blur).unwrap();
        layer.set_style(BackgroundStyle::Blur).unwrap();
        assert_eq!(effect_count(&host, &layer), 1);
    }

    #[test]
    fn blur_style_rebuilds_only_when_blurred() {
        let host = Host::new(Vector2::new(320., 480.));
        let layer = attached_layer(&host);

        layer.set_blur_style(BlurStyle::Light).unwrap();
        assert_eq!(layer.effect_view(), None);

        layer.set_style(BackgroundStyle::Blur).unwrap();
        let effect = layer.effect_view().unwrap();
        assert_eq!(
            host.ui().tree().kind(effect).unwrap(),
            NativeType::VisualEffect(BlurStyle::Light)
        );

        layer.set_blur_style(BlurStyle::ExtraLight).unwrap();
        let rebuilt = layer.effect_view().unwrap();
        assert_ne!(rebuilt, effect);
        assert_eq!(
            host.ui().tree().kind(rebuilt).unwrap(),
            NativeType::VisualEffect(BlurStyle::ExtraLight)
        );
        assert_eq!(effect_count(&host, &layer), 1);
    }

    #[test]
    fn color_applies_in_both_styles() {
        let host = Host::new(Vector2::new(320., 480.));
        let layer = attached_layer(&host);
        let red = Color::rgba(1., 0., 0., 0.5);

        layer.set_style(BackgroundStyle::Blur).unwrap();
        layer.set_color(red).unwrap();
        assert_eq!(host.ui().tree().background(layer.view()).unwrap(), red);
    }

    #[test]
    fn hits_on_the_overlay_belong_to_the_layer() {
        let host = Host::new(Vector2::new(320., 480.));
        let layer = attached_layer(&host);
        layer.set_style(BackgroundStyle::Blur).unwrap();

        assert_eq!(host.ui().hit_test(Point2::new(100., 100.)), Some(layer.view()));
    }

    #[test]
    fn overlay_follows_resize() {
        let host = Host::new(Vector2::new(320., 480.));
        let layer = attached_layer(&host);
        layer.set_style(BackgroundStyle::Blur).unwrap();
        let effect = layer.effect_view().unwrap();

        let resized = Rect::from_xywh(0., 0., 480., 320.);
        host.ui().tree().set_frame(host.window(), resized).unwrap();
        assert_eq!(host.ui().tree().frame(effect).unwrap(), resized);
    }

    #[test]
    fn drop_removes_views() {
        let host = Host::new(Vector2::new(320., 480.));
        let layer = attached_layer(&host);
        layer.set_style(BackgroundStyle::Blur).unwrap();
        let (view, effect) = (layer.view(), layer.effect_view().unwrap());

        drop(layer);
        let tree = host.ui().tree();
        assert!(!tree.contains(view));
        assert!(!tree.contains(effect));
    }
}
