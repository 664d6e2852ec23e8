use thiserror::Error;

use crate::change::{
    Change, ChangeManager, ConnectionChange, MoveChange, ResizeChange, TextChange, apply_change,
};
use crate::config::Config;
use crate::geometry::{Handle, Point};
use crate::model::{Diagram, ModelError};
use crate::project::Project;
use crate::render::DiagramRenderer;
use crate::router::RouteError;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no diagram with id {0}")]
    UnknownDiagram(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Keyboard modifiers active during a pointer event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Alt suppresses grid snapping.
    pub alt: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Escape,
    Enter,
}

/// What the pointer landed on, in hit priority order.
#[derive(Debug, Clone, PartialEq)]
enum HitTarget {
    ResizeHandle(Handle),
    /// Interior polyline coordinate of the selected connection.
    Vertex { connection: String, index: usize },
    /// Segment midpoint of the selected connection; dragging it
    /// inserts a new bend point.
    Insert { connection: String, segment: usize },
    Element(String),
    Connection(String),
    Empty,
}

#[derive(Debug)]
enum ActiveEdit {
    Move {
        change: MoveChange,
        /// Pointer offset from the element's absolute origin at grab time.
        grab: Point,
    },
    Resize {
        change: ResizeChange,
        press: Point,
    },
    Bend {
        change: ConnectionChange,
        /// Which entry of `new_bend_points` follows the pointer.
        index: usize,
    },
}

#[derive(Debug, Default)]
enum EditState {
    #[default]
    Idle,
    /// Button is down but the pointer has not travelled far enough to
    /// count as a drag.
    Pending { target: HitTarget, press: Point },
    Active(ActiveEdit),
    TextEdit {
        element_id: String,
        old_text: String,
        buffer: String,
    },
}

/// Interactive editing session over one diagram of a project.
///
/// Drives the model and renderer from pointer and key events; every
/// completed gesture becomes one entry in the undo history.
pub struct DiagramEditor {
    project: Project,
    diagram_id: String,
    renderer: DiagramRenderer,
    changes: ChangeManager,
    config: Config,
    state: EditState,
    selection: Vec<String>,
    last_clicked: Option<String>,
}

impl DiagramEditor {
    pub fn new(project: Project, diagram_id: &str, config: Config) -> Result<Self, EditorError> {
        if project.diagram(diagram_id).is_none() {
            return Err(EditorError::UnknownDiagram(diagram_id.to_string()));
        }
        let renderer = DiagramRenderer::new(&config);
        let mut editor = Self {
            project,
            diagram_id: diagram_id.to_string(),
            renderer,
            changes: ChangeManager::new(),
            config,
            state: EditState::Idle,
            selection: Vec::new(),
            last_clicked: None,
        };
        editor.refresh()?;
        Ok(editor)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Primary (most recently selected) object, the one that carries
    /// resize handles or bend drag points.
    pub fn selection(&self) -> Option<&str> {
        self.selection.last().map(String::as_str)
    }

    /// Every selected object, in selection order.
    pub fn selections(&self) -> &[String] {
        &self.selection
    }

    pub fn can_undo(&self) -> bool {
        self.changes.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.changes.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.changes.len()
    }

    pub fn svg(&self) -> String {
        self.renderer.svg()
    }

    /// Text currently being edited, if a text edit is in progress.
    pub fn text_buffer(&self) -> Option<&str> {
        match &self.state {
            EditState::TextEdit { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    fn diagram(&self) -> &Diagram {
        // Checked in new(); diagrams are never removed by the editor.
        self.project
            .diagram(&self.diagram_id)
            .unwrap_or_else(|| unreachable!("diagram validated on construction"))
    }

    fn diagram_mut(&mut self) -> &mut Diagram {
        let id = self.diagram_id.clone();
        self.project
            .diagram_mut(&id)
            .unwrap_or_else(|| unreachable!("diagram validated on construction"))
    }

    fn refresh(&mut self) -> Result<(), EditorError> {
        self.renderer.set_selection(&self.selection);
        let diagram = self
            .project
            .diagram(&self.diagram_id)
            .ok_or_else(|| EditorError::UnknownDiagram(self.diagram_id.clone()))?;
        self.renderer.build(&self.project, diagram)?;
        Ok(())
    }

    fn snap(&self, value: f32, modifiers: Modifiers) -> f32 {
        if modifiers.alt {
            return value;
        }
        let grid = self.config.editor.grid_size;
        (value / grid).round() * grid
    }

    fn snap_point(&self, point: Point, modifiers: Modifiers) -> Point {
        Point::new(self.snap(point.x, modifiers), self.snap(point.y, modifiers))
    }

    // ── hit testing ─────────────────────────────────────────────────

    fn hit_test(&self, pos: Point) -> HitTarget {
        let tolerance = self.config.editor.hit_tolerance;

        if let Some(selection) = self.selection.last() {
            if let Some(bounds) = self.diagram().absolute_bounds(selection) {
                let reach = self.config.editor.handle_size;
                for handle in Handle::ALL {
                    let at = handle.position(&bounds);
                    if (pos.x - at.x).abs() <= reach && (pos.y - at.y).abs() <= reach {
                        return HitTarget::ResizeHandle(handle);
                    }
                }
            }

            if let Some(routed) = self.renderer.routed().iter().find(|r| r.id == *selection) {
                let vertex_reach = self.config.editor.connection_point_radius + tolerance;
                for (index, coord) in routed.coords.iter().enumerate() {
                    if index == 0 || index == routed.coords.len() - 1 {
                        continue;
                    }
                    if pos.distance_to(*coord) <= vertex_reach {
                        return HitTarget::Vertex {
                            connection: selection.clone(),
                            index,
                        };
                    }
                }
                let insert_reach = self.config.editor.insertion_point_radius + tolerance;
                for (segment, pair) in routed.coords.windows(2).enumerate() {
                    let mid = pair[0].add(pair[1]).scale(0.5);
                    if pos.distance_to(mid) <= insert_reach {
                        return HitTarget::Insert {
                            connection: selection.clone(),
                            segment,
                        };
                    }
                }
            }
        }

        match self.renderer.element_at(pos) {
            Some(id) => match id.strip_prefix("connection:") {
                Some(connection) => HitTarget::Connection(connection.to_string()),
                None => HitTarget::Element(id.to_string()),
            },
            None => HitTarget::Empty,
        }
    }

    /// Topmost element under `pos`, skipping `exclude` and everything
    /// inside it. Used to pick the drop parent while dragging.
    fn drop_target_at(&self, pos: Point, exclude: &str) -> Option<String> {
        let diagram = self.diagram();
        for child in diagram.descendants().into_iter().rev() {
            if child.id == exclude || diagram.is_descendant_of(&child.id, exclude) {
                continue;
            }
            if let Some(bounds) = diagram.absolute_bounds(&child.id) {
                if bounds.contains(pos, 0.0) {
                    return Some(child.id.clone());
                }
            }
        }
        None
    }

    // ── pointer protocol ────────────────────────────────────────────

    pub fn pointer_down(&mut self, pos: Point, _modifiers: Modifiers) -> Result<(), EditorError> {
        // A press anywhere else while editing text acts as blur; a press
        // while a drag is somehow still active discards that drag first.
        match std::mem::take(&mut self.state) {
            EditState::TextEdit {
                element_id,
                old_text,
                buffer,
            } => {
                self.state = EditState::TextEdit {
                    element_id,
                    old_text,
                    buffer,
                };
                self.discard_text_edit()?;
            }
            EditState::Active(active) => self.cancel_drag(active)?,
            other => self.state = other,
        }
        let target = self.hit_test(pos);
        self.state = EditState::Pending { target, press: pos };
        Ok(())
    }

    pub fn pointer_move(&mut self, pos: Point, modifiers: Modifiers) -> Result<(), EditorError> {
        match std::mem::take(&mut self.state) {
            EditState::Pending { target, press } => {
                if pos.distance_to(press) < self.config.editor.drag_threshold {
                    self.state = EditState::Pending { target, press };
                    return Ok(());
                }
                if let Some(active) = self.begin_drag(&target, press)? {
                    self.state = EditState::Active(active);
                    self.update_drag(pos, modifiers)?;
                } else {
                    self.state = EditState::Pending { target, press };
                }
                Ok(())
            }
            EditState::Active(active) => {
                self.state = EditState::Active(active);
                self.update_drag(pos, modifiers)
            }
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    pub fn pointer_up(&mut self, pos: Point, modifiers: Modifiers) -> Result<(), EditorError> {
        match std::mem::take(&mut self.state) {
            EditState::Pending { target, .. } => self.finish_click(&target, modifiers),
            EditState::Active(active) => self.finish_drag(active, pos, modifiers),
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    pub fn key(&mut self, key: EditorKey) -> Result<(), EditorError> {
        match key {
            EditorKey::Escape => match std::mem::take(&mut self.state) {
                EditState::Active(active) => self.cancel_drag(active),
                EditState::TextEdit {
                    element_id,
                    old_text,
                    buffer,
                } => {
                    self.state = EditState::TextEdit {
                        element_id,
                        old_text,
                        buffer,
                    };
                    self.discard_text_edit()
                }
                other => {
                    self.state = other;
                    Ok(())
                }
            },
            EditorKey::Enter => {
                if matches!(self.state, EditState::TextEdit { .. }) {
                    self.commit_text_edit()
                } else {
                    Ok(())
                }
            }
        }
    }

    /// The editing surface lost focus: abandon any in-progress text edit.
    pub fn blur(&mut self) -> Result<(), EditorError> {
        if matches!(self.state, EditState::TextEdit { .. }) {
            self.discard_text_edit()
        } else {
            Ok(())
        }
    }

    pub fn text_input(&mut self, text: &str) {
        if let EditState::TextEdit { buffer, .. } = &mut self.state {
            *buffer = text.to_string();
        }
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        // An in-progress change never enters history; it is discarded.
        if let EditState::Active(active) = std::mem::take(&mut self.state) {
            self.cancel_drag(active)?;
        }
        let diagram_id = self.diagram_id.clone();
        let undone = self.changes.undo(&mut self.project, &diagram_id)?;
        if undone {
            self.refresh()?;
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let diagram_id = self.diagram_id.clone();
        let redone = self.changes.redo(&mut self.project, &diagram_id)?;
        if redone {
            self.refresh()?;
        }
        Ok(redone)
    }

    // ── click handling ──────────────────────────────────────────────

    fn finish_click(&mut self, target: &HitTarget, modifiers: Modifiers) -> Result<(), EditorError> {
        match target {
            HitTarget::Element(id) => {
                if modifiers.shift {
                    self.toggle_selection(id);
                } else if self.selection.len() == 1
                    && self.selection[0] == *id
                    && self.last_clicked.as_deref() == Some(id)
                {
                    self.begin_text_edit(id.clone())?;
                    return Ok(());
                } else {
                    self.selection = vec![id.clone()];
                    self.last_clicked = Some(id.clone());
                }
            }
            HitTarget::Connection(id) => {
                if modifiers.shift {
                    self.toggle_selection(id);
                } else {
                    self.selection = vec![id.clone()];
                    self.last_clicked = Some(id.clone());
                }
            }
            HitTarget::ResizeHandle(_) | HitTarget::Vertex { .. } | HitTarget::Insert { .. } => {}
            HitTarget::Empty => {
                if !modifiers.shift {
                    self.selection.clear();
                    self.last_clicked = None;
                }
            }
        }
        self.state = EditState::Idle;
        self.refresh()
    }

    fn toggle_selection(&mut self, id: &str) {
        match self.selection.iter().position(|s| s == id) {
            Some(index) => {
                self.selection.remove(index);
            }
            None => self.selection.push(id.to_string()),
        }
        self.last_clicked = Some(id.to_string());
    }

    // ── drag lifecycle ──────────────────────────────────────────────

    fn begin_drag(
        &mut self,
        target: &HitTarget,
        press: Point,
    ) -> Result<Option<ActiveEdit>, EditorError> {
        match target {
            HitTarget::Element(id) => {
                let diagram = self.diagram();
                let Some(child) = diagram.child(id) else {
                    return Ok(None);
                };
                let old_parent = child.parent_id().map(str::to_string);
                let old_bounds = child.bounds;
                let Some(abs) = diagram.absolute_bounds(id) else {
                    return Ok(None);
                };
                let grab = press.sub(abs.origin());
                // While dragging, the element lives at the top level in
                // absolute coordinates; the drop resolves the parent.
                let id = id.clone();
                self.diagram_mut().reparent(&id, None)?;
                self.diagram_mut().set_bounds(&id, abs)?;
                Ok(Some(ActiveEdit::Move {
                    change: MoveChange {
                        element_id: id,
                        old_parent: old_parent.clone(),
                        new_parent: old_parent,
                        old_bounds,
                        new_bounds: abs,
                    },
                    grab,
                }))
            }
            HitTarget::ResizeHandle(handle) => {
                let Some(selection) = self.selection.last().cloned() else {
                    return Ok(None);
                };
                let Some(child) = self.diagram().child(&selection) else {
                    return Ok(None);
                };
                Ok(Some(ActiveEdit::Resize {
                    change: ResizeChange {
                        element_id: selection,
                        handle: *handle,
                        old_bounds: child.bounds,
                        new_bounds: child.bounds,
                    },
                    press,
                }))
            }
            HitTarget::Vertex { connection, index } => {
                let Some(existing) = self.diagram().connection(connection) else {
                    return Ok(None);
                };
                let bends = existing.bend_points.clone();
                Ok(Some(ActiveEdit::Bend {
                    change: ConnectionChange {
                        connection_id: connection.clone(),
                        old_bend_points: bends.clone(),
                        new_bend_points: bends,
                    },
                    // Interior coordinate i is bend i-1.
                    index: index - 1,
                }))
            }
            HitTarget::Insert {
                connection,
                segment,
            } => {
                let Some(existing) = self.diagram().connection(connection) else {
                    return Ok(None);
                };
                let old = existing.bend_points.clone();
                let mut new = old.clone();
                let index = (*segment).min(new.len());
                new.insert(index, Point::ZERO);
                Ok(Some(ActiveEdit::Bend {
                    change: ConnectionChange {
                        connection_id: connection.clone(),
                        old_bend_points: old,
                        new_bend_points: new,
                    },
                    index,
                }))
            }
            HitTarget::Connection(_) | HitTarget::Empty => Ok(None),
        }
    }

    fn update_drag(&mut self, pos: Point, modifiers: Modifiers) -> Result<(), EditorError> {
        let mut state = std::mem::take(&mut self.state);
        // Which part of the scene the edit invalidates: the dragged
        // element's subtree, or just the connection layer.
        let mut touched_element = None;
        let result: Result<(), EditorError> = match &mut state {
            EditState::Active(ActiveEdit::Move { change, grab }) => {
                let origin = self.snap_point(pos.sub(*grab), modifiers);
                change.new_bounds = change.new_bounds.with_origin(origin);
                let element_id = change.element_id.clone();
                let new_bounds = change.new_bounds;
                self.diagram_mut().set_bounds(&element_id, new_bounds)?;
                let target = self.drop_target_at(pos, &element_id);
                self.renderer.set_drop_target(target.as_deref());
                touched_element = Some(element_id);
                Ok(())
            }
            EditState::Active(ActiveEdit::Resize { change, press }) => {
                let delta = self.snap_point(pos.sub(*press), modifiers);
                change.new_bounds = change.handle.resize(
                    &change.old_bounds,
                    delta,
                    self.config.editor.min_element_size,
                );
                let element_id = change.element_id.clone();
                let new_bounds = change.new_bounds;
                self.diagram_mut().set_bounds(&element_id, new_bounds)?;
                touched_element = Some(element_id);
                Ok(())
            }
            EditState::Active(ActiveEdit::Bend { change, index }) => {
                if let Some(center) = self.source_anchor_center(&change.connection_id) {
                    let offset = self.snap_point(pos, modifiers).sub(center);
                    if let Some(bend) = change.new_bend_points.get_mut(*index) {
                        *bend = offset;
                    }
                    self.collapse_bends(change, index, pos);
                    let connection_id = change.connection_id.clone();
                    let bends = change.new_bend_points.clone();
                    self.diagram_mut().set_bend_points(&connection_id, bends)?;
                }
                Ok(())
            }
            _ => Ok(()),
        };
        self.state = state;
        result?;
        match touched_element {
            Some(id) => self.refresh_live_element(&id),
            None => self.refresh_live_connections(),
        }
    }

    /// Live cleanup while a bend vertex is dragged. Entering an endpoint
    /// shape drops the bend points it makes redundant (everything before
    /// the handle for the source, everything after it for the target);
    /// landing on another routed vertex splices out the points between
    /// the two, keeping the stationary vertex.
    fn collapse_bends(&self, change: &mut ConnectionChange, index: &mut usize, pos: Point) {
        let diagram = self.diagram();
        if let Some(connection) = diagram.connection(&change.connection_id) {
            if let Some(bounds) = diagram.absolute_bounds(&connection.source) {
                if bounds.contains(pos, 0.0) && *index > 0 {
                    change.new_bend_points.drain(..*index);
                    *index = 0;
                }
            }
            if let Some(bounds) = diagram.absolute_bounds(&connection.target) {
                if bounds.contains(pos, 0.0) {
                    change.new_bend_points.truncate(*index + 1);
                }
            }
        }

        let reach = self.config.editor.connection_point_radius + self.config.editor.hit_tolerance;
        let Some(routed) = self
            .renderer
            .routed()
            .iter()
            .find(|r| r.id == change.connection_id)
        else {
            return;
        };
        for (coord_index, coord) in routed.coords.iter().enumerate() {
            if coord_index == 0 || coord_index == routed.coords.len() - 1 {
                continue;
            }
            let other = coord_index - 1;
            if other == *index || other >= change.new_bend_points.len() {
                continue;
            }
            if pos.distance_to(*coord) > reach {
                continue;
            }
            if other < *index {
                change.new_bend_points.drain(other + 1..=*index);
                *index = other;
            } else {
                change.new_bend_points.drain(*index..other);
            }
            break;
        }
    }

    /// Live feedback for a drag: re-instantiate the dragged subtree and
    /// redraw the connection layer, leaving every other element alone.
    fn refresh_live_element(&mut self, id: &str) -> Result<(), EditorError> {
        self.renderer.set_selection(&self.selection);
        let diagram = self
            .project
            .diagram(&self.diagram_id)
            .ok_or_else(|| EditorError::UnknownDiagram(self.diagram_id.clone()))?;
        let parent = diagram
            .child(id)
            .and_then(|c| c.parent_id())
            .map(str::to_string);
        self.renderer.remove_element(id);
        self.renderer.add_element(&self.project, diagram, id, parent.as_deref());
        self.renderer.clear_connections();
        self.renderer.add_connections(diagram)?;
        self.renderer.refresh_overlays(diagram);
        Ok(())
    }

    fn refresh_live_connections(&mut self) -> Result<(), EditorError> {
        self.renderer.set_selection(&self.selection);
        let diagram = self
            .project
            .diagram(&self.diagram_id)
            .ok_or_else(|| EditorError::UnknownDiagram(self.diagram_id.clone()))?;
        self.renderer.clear_connections();
        self.renderer.add_connections(diagram)?;
        self.renderer.refresh_overlays(diagram);
        Ok(())
    }

    fn finish_drag(
        &mut self,
        active: ActiveEdit,
        pos: Point,
        modifiers: Modifiers,
    ) -> Result<(), EditorError> {
        self.state = EditState::Idle;
        match active {
            ActiveEdit::Move { mut change, grab } => {
                self.renderer.set_drop_target(None);
                let abs_origin = self.snap_point(pos.sub(grab), modifiers);
                let parent = self.drop_target_at(pos, &change.element_id);
                let parent_origin = parent
                    .as_deref()
                    .and_then(|p| self.diagram().absolute_position(p))
                    .unwrap_or(Point::ZERO);
                let local = change.old_bounds.with_origin(abs_origin.sub(parent_origin));

                change.new_parent = parent.clone();
                change.new_bounds = local;
                let element_id = change.element_id.clone();
                self.diagram_mut().reparent(&element_id, parent.as_deref())?;
                self.diagram_mut().set_bounds(&element_id, local)?;
                self.selection = vec![element_id];
                self.changes.commit(Change::Move(change));
            }
            ActiveEdit::Resize { change, .. } => {
                self.changes.commit(Change::Resize(change));
            }
            ActiveEdit::Bend { mut change, .. } => {
                self.prune_bend_points(&mut change);
                let connection_id = change.connection_id.clone();
                let bends = change.new_bend_points.clone();
                self.diagram_mut().set_bend_points(&connection_id, bends)?;
                self.changes.commit(Change::Connection(change));
            }
        }
        self.refresh()
    }

    fn cancel_drag(&mut self, active: ActiveEdit) -> Result<(), EditorError> {
        self.state = EditState::Idle;
        self.renderer.set_drop_target(None);
        match active {
            ActiveEdit::Move { change, .. } => {
                let element_id = change.element_id.clone();
                self.diagram_mut()
                    .reparent(&element_id, change.old_parent.as_deref())?;
                self.diagram_mut().set_bounds(&element_id, change.old_bounds)?;
            }
            ActiveEdit::Resize { change, .. } => {
                self.diagram_mut()
                    .set_bounds(&change.element_id, change.old_bounds)?;
            }
            ActiveEdit::Bend { change, .. } => {
                self.diagram_mut()
                    .set_bend_points(&change.connection_id, change.old_bend_points)?;
            }
        }
        self.refresh()
    }

    /// Center a connection's bend offsets are measured from: the source
    /// element's center, or the source connection's midpoint.
    fn source_anchor_center(&self, connection_id: &str) -> Option<Point> {
        let connection = self.diagram().connection(connection_id)?;
        if let Some(bounds) = self.diagram().absolute_bounds(&connection.source) {
            return Some(bounds.center());
        }
        self.renderer
            .routed()
            .iter()
            .find(|r| r.id == connection.source)
            .map(|r| r.midpoint)
    }

    /// Drop bend points a finished drag made redundant: points absorbed
    /// by an endpoint shape, and runs of coincident points.
    fn prune_bend_points(&self, change: &mut ConnectionChange) {
        let diagram = self.diagram();
        let Some(connection) = diagram.connection(&change.connection_id) else {
            return;
        };
        let Some(center) = self.source_anchor_center(&change.connection_id) else {
            return;
        };
        let source_bounds = diagram.absolute_bounds(&connection.source);
        let target_bounds = diagram.absolute_bounds(&connection.target);

        change.new_bend_points.retain(|bend| {
            let abs = center.add(*bend);
            let absorbed = [&source_bounds, &target_bounds]
                .into_iter()
                .flatten()
                .any(|bounds| bounds.contains(abs, 0.0));
            !absorbed
        });
        change.new_bend_points.dedup();
    }

    // ── text editing ────────────────────────────────────────────────

    fn begin_text_edit(&mut self, element_id: String) -> Result<(), EditorError> {
        let old_text = self.current_text(&element_id);
        self.state = EditState::TextEdit {
            element_id,
            buffer: old_text.clone(),
            old_text,
        };
        Ok(())
    }

    fn current_text(&self, child_id: &str) -> String {
        let Some(child) = self.diagram().child(child_id) else {
            return String::new();
        };
        if let Some(element_id) = &child.element_id {
            if let Some(entity) = self.project.entity(element_id) {
                return entity.name.clone();
            }
        }
        child.content.clone().unwrap_or_default()
    }

    fn commit_text_edit(&mut self) -> Result<(), EditorError> {
        let EditState::TextEdit {
            element_id,
            old_text,
            buffer,
        } = std::mem::take(&mut self.state)
        else {
            return Ok(());
        };
        let change = Change::Text(TextChange {
            element_id,
            old_text,
            new_text: buffer,
        });
        if change.is_changed() {
            apply_change(&mut self.project, &self.diagram_id.clone(), &change)?;
            self.changes.commit(change);
        }
        self.refresh()
    }

    fn discard_text_edit(&mut self) -> Result<(), EditorError> {
        self.state = EditState::Idle;
        self.refresh()
    }
}
