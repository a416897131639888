use crate::color::Color;
use crate::error::TreeError;
use crate::events::{Activation, EventHandler};
use crate::rect::Rect;
use crate::transform::Transform;
use crate::view::{Layout, NativeType, ViewId, Visual};
use cgmath::{EuclideanSpace, Point2};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

/// Views below this opacity are treated as invisible by hit-testing.
pub const MIN_HIT_OPACITY: f64 = 0.01;

/// A custom hit-testing routine for a single view.
///
/// Installed with [`ViewTree::set_hit_test`]; replaces the default algorithm for that view. The
/// default is still available through [`HitTestContext::super_hit_test`].
pub trait HitTest: Send + Sync {
    fn hit_test(&self, cx: &HitTestContext<'_>) -> Option<ViewId>;
}

/// The query handed to a [`HitTest`] override.
pub struct HitTestContext<'a> {
    tree: &'a ViewTree,
    view: ViewId,
    point: Point2<f64>,
}

impl<'a> HitTestContext<'a> {
    pub fn tree(&self) -> &'a ViewTree {
        self.tree
    }

    /// The view being tested.
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// The query point in the view’s coordinate system.
    pub fn point(&self) -> Point2<f64> {
        self.point
    }

    /// Runs the default hit-testing algorithm for this view.
    pub fn super_hit_test(&self) -> Option<ViewId> {
        self.tree.default_hit_test(self.view, self.point)
    }
}

/// A node in the view tree.
struct Node {
    kind: NativeType,
    visual: Visual,
    background: Color,
    hidden: bool,
    /// If false, neither this view nor its subviews receive pointer events.
    interactive: bool,
    layout: Layout,
    /// The immediate superview.
    superview: Option<ViewId>,
    /// Ordered back to front.
    subviews: Vec<ViewId>,
    hit_test: Option<Arc<dyn HitTest>>,
    activation: Option<EventHandler<Activation>>,
}

impl Node {
    /// Maps a point from the superview’s coordinate system into this view’s.
    fn from_superview(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        let frame = self.visual.frame;
        let center = frame.center();
        let inverse = self.visual.transform.invert()?;
        let p = inverse.apply(Point2::new(point.x - center.x, point.y - center.y));
        Some(p + frame.size / 2.)
    }

    /// Maps a point from this view’s coordinate system into the superview’s.
    fn to_superview(&self, point: Point2<f64>) -> Point2<f64> {
        let frame = self.visual.frame;
        let p = self.visual.transform.apply(point - frame.size / 2.);
        frame.center() + p.to_vec()
    }
}

/// The view tree: an arena of native views with their properties and parent/child relations.
///
/// Coordinates of the root view’s own space are called window coordinates.
#[derive(Default)]
pub struct ViewTree {
    nodes: HashMap<ViewId, Node>,
    root: Option<ViewId>,
}

impl fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ViewTree")
            .field("root", &self.root)
            .field("views", &self.nodes.len())
            .finish()
    }
}

impl ViewTree {
    pub fn new() -> ViewTree {
        ViewTree::default()
    }

    fn node(&self, id: ViewId) -> Result<&Node, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::NoSuchView(id))
    }

    fn node_mut(&mut self, id: ViewId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::NoSuchView(id))
    }

    /// Creates a new, detached view.
    pub fn add_view(&mut self, kind: NativeType, frame: Rect) -> ViewId {
        let id = ViewId::new();
        self.nodes.insert(
            id,
            Node {
                kind,
                visual: Visual::new(frame),
                background: Color::CLEAR,
                hidden: false,
                interactive: true,
                layout: Layout::Manual,
                superview: None,
                subviews: Vec::new(),
                hit_test: None,
                activation: None,
            },
        );
        id
    }

    /// Destroys a view and all of its subviews, detaching it from its superview first.
    pub fn remove_view(&mut self, id: ViewId) -> Result<(), TreeError> {
        self.remove_from_superview(id)?;
        self.destroy(id);
        Ok(())
    }

    fn destroy(&mut self, id: ViewId) {
        if let Some(node) = self.nodes.remove(&id) {
            if self.root == Some(id) {
                self.root = None;
            }
            for subview in node.subviews {
                self.destroy(subview);
            }
        }
    }

    /// Returns true if the view exists.
    pub fn contains(&self, id: ViewId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sets the root (window) view.
    pub fn set_root(&mut self, id: ViewId) -> Result<(), TreeError> {
        self.node(id)?;
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<ViewId> {
        self.root
    }

    /// Adds a subview on top of all other subviews.
    ///
    /// The subview is removed from its previous superview, if any.
    pub fn add_subview(&mut self, superview: ViewId, subview: ViewId) -> Result<(), TreeError> {
        self.insert_subview(superview, subview, usize::MAX)
    }

    /// Inserts a subview at the given index, clamped to the number of subviews.
    ///
    /// Index 0 is the bottom-most position.
    pub fn insert_subview(
        &mut self,
        superview: ViewId,
        subview: ViewId,
        index: usize,
    ) -> Result<(), TreeError> {
        self.node(superview)?;
        self.node(subview)?;
        if self.is_descendant(superview, subview) {
            return Err(TreeError::Cycle(subview));
        }

        self.remove_from_superview(subview)?;

        let parent = self.node_mut(superview)?;
        let index = index.min(parent.subviews.len());
        parent.subviews.insert(index, subview);
        let bounds = parent.visual.frame.bounds();

        let child = self.node_mut(subview)?;
        child.superview = Some(superview);
        if child.layout == Layout::FillSuperview {
            self.set_frame(subview, bounds)?;
        }
        Ok(())
    }

    /// Detaches the view from its superview. Does nothing if it has none.
    pub fn remove_from_superview(&mut self, id: ViewId) -> Result<(), TreeError> {
        let superview = match self.node_mut(id)?.superview.take() {
            Some(superview) => superview,
            None => return Ok(()),
        };
        if let Some(parent) = self.nodes.get_mut(&superview) {
            parent.subviews.retain(|i| *i != id);
        }
        Ok(())
    }

    pub fn superview(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(&id).and_then(|node| node.superview)
    }

    /// Subviews, back to front.
    pub fn subviews(&self, id: ViewId) -> Result<&[ViewId], TreeError> {
        Ok(&self.node(id)?.subviews)
    }

    /// Returns true if `view` is `ancestor` or lies somewhere below it.
    pub fn is_descendant(&self, view: ViewId, ancestor: ViewId) -> bool {
        let mut cursor = Some(view);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.superview(id);
        }
        false
    }

    pub fn kind(&self, id: ViewId) -> Result<NativeType, TreeError> {
        Ok(self.node(id)?.kind)
    }

    pub fn frame(&self, id: ViewId) -> Result<Rect, TreeError> {
        Ok(self.node(id)?.visual.frame)
    }

    /// The view’s own coordinate space: its frame size at the origin.
    pub fn bounds(&self, id: ViewId) -> Result<Rect, TreeError> {
        Ok(self.node(id)?.visual.frame.bounds())
    }

    /// Sets the frame and re-lays out subviews that fill it.
    pub fn set_frame(&mut self, id: ViewId, frame: Rect) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.visual.frame = frame;
        let bounds = frame.bounds();
        let filling: Vec<_> = node.subviews.clone();
        for subview in filling {
            if self.node(subview)?.layout == Layout::FillSuperview {
                self.set_frame(subview, bounds)?;
            }
        }
        Ok(())
    }

    pub fn opacity(&self, id: ViewId) -> Result<f64, TreeError> {
        Ok(self.node(id)?.visual.opacity)
    }

    pub fn set_opacity(&mut self, id: ViewId, opacity: f64) -> Result<(), TreeError> {
        self.node_mut(id)?.visual.opacity = opacity;
        Ok(())
    }

    pub fn transform(&self, id: ViewId) -> Result<Transform, TreeError> {
        Ok(self.node(id)?.visual.transform)
    }

    pub fn set_transform(&mut self, id: ViewId, transform: Transform) -> Result<(), TreeError> {
        self.node_mut(id)?.visual.transform = transform;
        Ok(())
    }

    pub fn visual(&self, id: ViewId) -> Result<Visual, TreeError> {
        Ok(self.node(id)?.visual)
    }

    pub fn set_visual(&mut self, id: ViewId, visual: Visual) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.visual.opacity = visual.opacity;
        node.visual.transform = visual.transform;
        if node.visual.frame != visual.frame {
            self.set_frame(id, visual.frame)?;
        }
        Ok(())
    }

    pub fn background(&self, id: ViewId) -> Result<Color, TreeError> {
        Ok(self.node(id)?.background)
    }

    pub fn set_background(&mut self, id: ViewId, color: Color) -> Result<(), TreeError> {
        self.node_mut(id)?.background = color;
        Ok(())
    }

    pub fn set_hidden(&mut self, id: ViewId, hidden: bool) -> Result<(), TreeError> {
        self.node_mut(id)?.hidden = hidden;
        Ok(())
    }

    pub fn is_interactive(&self, id: ViewId) -> Result<bool, TreeError> {
        Ok(self.node(id)?.interactive)
    }

    pub fn set_interactive(&mut self, id: ViewId, interactive: bool) -> Result<(), TreeError> {
        self.node_mut(id)?.interactive = interactive;
        Ok(())
    }

    /// Sets the layout mode; a view that fills its superview is resized immediately.
    pub fn set_layout(&mut self, id: ViewId, layout: Layout) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.layout = layout;
        if let (Layout::FillSuperview, Some(superview)) = (layout, node.superview) {
            let bounds = self.bounds(superview)?;
            self.set_frame(id, bounds)?;
        }
        Ok(())
    }

    /// Installs or removes a hit-testing override.
    pub fn set_hit_test(
        &mut self,
        id: ViewId,
        hit_test: Option<Arc<dyn HitTest>>,
    ) -> Result<(), TreeError> {
        self.node_mut(id)?.hit_test = hit_test;
        Ok(())
    }

    /// Installs or removes the activation handler that makes a view behave as a control.
    pub fn set_activation_handler(
        &mut self,
        id: ViewId,
        handler: Option<EventHandler<Activation>>,
    ) -> Result<(), TreeError> {
        self.node_mut(id)?.activation = handler;
        Ok(())
    }

    pub fn activation_handler(&self, id: ViewId) -> Option<EventHandler<Activation>> {
        self.nodes.get(&id).and_then(|node| node.activation.clone())
    }

    /// Returns the closest view at or above `view` that has an activation handler.
    pub fn control_for(&self, view: ViewId) -> Option<ViewId> {
        let mut cursor = Some(view);
        while let Some(id) = cursor {
            let node = self.nodes.get(&id)?;
            if node.activation.is_some() {
                return Some(id);
            }
            cursor = node.superview;
        }
        None
    }

    /// Returns the topmost ancestor and the point in its coordinate system.
    fn to_top(&self, mut id: ViewId, mut point: Point2<f64>) -> Result<(ViewId, Point2<f64>), TreeError> {
        loop {
            let node = self.node(id)?;
            match node.superview {
                Some(superview) => {
                    point = node.to_superview(point);
                    id = superview;
                }
                None => return Ok((id, point)),
            }
        }
    }

    /// Converts a point from one view’s coordinate system to another’s.
    pub fn convert_point(
        &self,
        point: Point2<f64>,
        from: ViewId,
        to: ViewId,
    ) -> Result<Point2<f64>, TreeError> {
        let (top, point) = self.to_top(from, point)?;

        let mut path = Vec::new();
        let mut cursor = to;
        loop {
            let node = self.node(cursor)?;
            match node.superview {
                Some(superview) => {
                    path.push(cursor);
                    cursor = superview;
                }
                None => break,
            }
        }
        if cursor != top {
            return Err(TreeError::Disjoint(from, to));
        }

        path.iter().rev().try_fold(point, |point, id| {
            self.node(*id)?
                .from_superview(point)
                .ok_or(TreeError::Singular(*id))
        })
    }

    /// Returns true if the point (in the view’s coordinate system) lies within its bounds.
    pub fn point_inside(&self, id: ViewId, point: Point2<f64>) -> bool {
        self.nodes
            .get(&id)
            .map_or(false, |node| node.visual.frame.bounds().contains(point))
    }

    /// Returns the deepest view that should receive a pointer event at the given point, which is
    /// in `id`’s coordinate system.
    ///
    /// Uses the view’s [`HitTest`] override if there is one.
    pub fn hit_test(&self, id: ViewId, point: Point2<f64>) -> Option<ViewId> {
        let node = self.nodes.get(&id)?;
        match &node.hit_test {
            Some(hit_test) => hit_test.hit_test(&HitTestContext {
                tree: self,
                view: id,
                point,
            }),
            None => self.default_hit_test(id, point),
        }
    }

    /// The default hit-testing algorithm.
    ///
    /// Hidden, non-interactive and (nearly) transparent views receive nothing; neither does a
    /// point outside the bounds. Otherwise subviews are asked front to back, and if none of them
    /// claims the point, the view itself is the target.
    pub fn default_hit_test(&self, id: ViewId, point: Point2<f64>) -> Option<ViewId> {
        let node = self.nodes.get(&id)?;
        if node.hidden || !node.interactive || node.visual.opacity < MIN_HIT_OPACITY {
            return None;
        }
        if !node.visual.frame.bounds().contains(point) {
            return None;
        }

        for subview in node.subviews.iter().rev() {
            let local = match self.nodes.get(subview).and_then(|n| n.from_superview(point)) {
                Some(local) => local,
                None => continue,
            };
            if let Some(hit) = self.hit_test(*subview, local) {
                return Some(hit);
            }
        }

        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(tree: &mut ViewTree) -> ViewId {
        let root = tree.add_view(NativeType::Layer, Rect::from_xywh(0., 0., 320., 480.));
        tree.set_root(root).unwrap();
        root
    }

    #[test]
    fn subviews_keep_order_and_reparent() {
        let mut tree = ViewTree::new();
        let root = window(&mut tree);
        let a = tree.add_view(NativeType::Layer, Rect::zero());
        let b = tree.add_view(NativeType::Layer, Rect::zero());
        let c = tree.add_view(NativeType::Layer, Rect::zero());

        tree.add_subview(root, a).unwrap();
        tree.add_subview(root, b).unwrap();
        tree.insert_subview(root, c, 0).unwrap();
        assert_eq!(tree.subviews(root).unwrap(), &[c, a, b]);

        tree.add_subview(a, c).unwrap();
        assert_eq!(tree.subviews(root).unwrap(), &[a, b]);
        assert_eq!(tree.superview(c), Some(a));
        assert!(tree.is_descendant(c, root));

        tree.remove_from_superview(b).unwrap();
        assert_eq!(tree.subviews(root).unwrap(), &[a]);
        assert_eq!(tree.superview(b), None);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut tree = ViewTree::new();
        let root = window(&mut tree);
        let child = tree.add_view(NativeType::Layer, Rect::zero());
        tree.add_subview(root, child).unwrap();

        assert_eq!(tree.add_subview(child, root), Err(TreeError::Cycle(root)));
        assert_eq!(tree.add_subview(child, child), Err(TreeError::Cycle(child)));
        assert_eq!(tree.superview(root), None);
    }

    #[test]
    fn remove_view_destroys_subtree() {
        let mut tree = ViewTree::new();
        let root = window(&mut tree);
        let a = tree.add_view(NativeType::Layer, Rect::zero());
        let b = tree.add_view(NativeType::Layer, Rect::zero());
        tree.add_subview(root, a).unwrap();
        tree.add_subview(a, b).unwrap();

        tree.remove_view(a).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(tree.subviews(root).unwrap().is_empty());
        assert_eq!(tree.frame(a), Err(TreeError::NoSuchView(a)));
    }

    #[test]
    fn fill_layout_follows_resize() {
        let mut tree = ViewTree::new();
        let root = window(&mut tree);
        let fill = tree.add_view(NativeType::Layer, Rect::zero());
        tree.set_layout(fill, Layout::FillSuperview).unwrap();
        tree.add_subview(root, fill).unwrap();
        assert_eq!(tree.frame(fill).unwrap(), Rect::from_xywh(0., 0., 320., 480.));

        tree.set_frame(root, Rect::from_xywh(0., 0., 480., 320.)).unwrap();
        assert_eq!(tree.frame(fill).unwrap(), Rect::from_xywh(0., 0., 480., 320.));
    }

    #[test]
    fn convert_point_through_transform() {
        let mut tree = ViewTree::new();
        let root = window(&mut tree);
        let view = tree.add_view(NativeType::Layer, Rect::from_xywh(100., 100., 100., 100.));
        tree.add_subview(root, view).unwrap();
        tree.set_transform(view, Transform::scale(0.5, 0.5)).unwrap();

        // the scaled view covers (125, 125)..(175, 175) on screen
        let p = tree.convert_point(Point2::new(125., 125.), root, view).unwrap();
        assert!((p.x).abs() < 1e-9 && (p.y).abs() < 1e-9);
        let q = tree.convert_point(Point2::new(100., 100.), view, root).unwrap();
        assert!((q.x - 175.).abs() < 1e-9 && (q.y - 175.).abs() < 1e-9);

        let orphan = tree.add_view(NativeType::Layer, Rect::zero());
        assert_eq!(
            tree.convert_point(Point2::new(0., 0.), root, orphan),
            Err(TreeError::Disjoint(root, orphan))
        );
    }

    #[test]
    fn hit_test_prefers_topmost_and_skips_inert_views() {
        let mut tree = ViewTree::new();
        let root = window(&mut tree);
        let below = tree.add_view(NativeType::Layer, Rect::from_xywh(0., 0., 100., 100.));
        let above = tree.add_view(NativeType::Layer, Rect::from_xywh(50., 50., 100., 100.));
        tree.add_subview(root, below).unwrap();
        tree.add_subview(root, above).unwrap();

        let p = Point2::new(60., 60.);
        assert_eq!(tree.hit_test(root, p), Some(above));

        tree.set_opacity(above, 0.).unwrap();
        assert_eq!(tree.hit_test(root, p), Some(below));

        tree.set_interactive(below, false).unwrap();
        assert_eq!(tree.hit_test(root, p), Some(root));

        tree.set_hidden(root, true).unwrap();
        assert_eq!(tree.hit_test(root, p), None);
        assert_eq!(tree.hit_test(root, Point2::new(400., 0.)), None);
    }

    struct Swallow;

    impl HitTest for Swallow {
        fn hit_test(&self, cx: &HitTestContext<'_>) -> Option<ViewId> {
            // only claim the left half
            if cx.point().x < 50. {
                cx.super_hit_test()
            } else {
                None
            }
        }
    }

    #[test]
    fn hit_test_override_can_defer_to_default() {
        let mut tree = ViewTree::new();
        let root = window(&mut tree);
        let view = tree.add_view(NativeType::Layer, Rect::from_xywh(0., 0., 100., 100.));
        tree.add_subview(root, view).unwrap();
        tree.set_hit_test(view, Some(Arc::new(Swallow))).unwrap();

        assert_eq!(tree.hit_test(root, Point2::new(10., 10.)), Some(view));
        assert_eq!(tree.hit_test(root, Point2::new(60., 10.)), Some(root));
    }
}
