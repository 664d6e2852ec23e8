use std::path::Path;

use archimate_editor::config::Config;
use archimate_editor::editor::{DiagramEditor, EditorKey, Modifiers};
use archimate_editor::geometry::{Bounds, Point};
use archimate_editor::model::{Diagram, DiagramChild, SourceConnection};
use archimate_editor::project::Project;
use archimate_editor::render::DiagramRenderer;
use archimate_editor::router::route_connections;

const NO_SNAP: Modifiers = Modifiers {
    alt: true,
    shift: false,
};

fn load_fixture() -> Project {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("archisurance.json");
    Project::from_path(&path).expect("fixture load failed")
}

/// Two free-standing boxes joined by a connection with one bend point.
fn boxes_with_bend() -> Project {
    let mut project = Project::new("p", "boxes");
    let mut diagram = Diagram::new("view", "view");
    let mut a = DiagramChild::new("a", "BusinessActor", Bounds::new(0.0, 0.0, 160.0, 60.0));
    let mut connection = SourceConnection::new("c1", "a", "b");
    connection.bend_points = vec![Point::new(40.0, 0.0)];
    a.source_connections.push(connection);
    diagram.insert_child(a, None).unwrap();
    diagram
        .insert_child(
            DiagramChild::new("b", "BusinessRole", Bounds::new(300.0, 0.0, 160.0, 60.0)),
            None,
        )
        .unwrap();
    project.add_diagram(diagram);
    project
}

/// A box plus a larger container to drop it into.
fn box_and_container() -> Project {
    let mut project = Project::new("p", "container");
    let mut diagram = Diagram::new("view", "view");
    diagram
        .insert_child(
            DiagramChild::new("a", "BusinessActor", Bounds::new(0.0, 0.0, 160.0, 60.0)),
            None,
        )
        .unwrap();
    diagram
        .insert_child(
            DiagramChild::new("b", "Group", Bounds::new(200.0, 100.0, 300.0, 200.0)),
            None,
        )
        .unwrap();
    project.add_diagram(diagram);
    project
}

fn click(editor: &mut DiagramEditor, at: Point) {
    editor.pointer_down(at, Modifiers::default()).unwrap();
    editor.pointer_up(at, Modifiers::default()).unwrap();
}

fn drag(editor: &mut DiagramEditor, from: Point, to: Point) {
    editor.pointer_down(from, NO_SNAP).unwrap();
    editor.pointer_move(to, NO_SNAP).unwrap();
    editor.pointer_up(to, NO_SNAP).unwrap();
}

#[test]
fn fixture_renders_every_view() {
    let project = load_fixture();
    for diagram in project.diagrams() {
        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer.build(&project, diagram).expect("build failed");
        let svg = renderer.svg();
        assert!(svg.contains("<svg"), "{}: missing <svg tag", diagram.id);
        assert!(svg.contains("</svg>"), "{}: missing </svg tag", diagram.id);
    }
}

#[test]
fn fixture_business_view_content() {
    let project = load_fixture();
    let diagram = project.diagram("business-view").unwrap();
    let mut renderer = DiagramRenderer::new(&Config::default());
    renderer.build(&project, diagram).unwrap();
    let svg = renderer.svg();

    assert!(svg.contains("Client"));
    assert!(svg.contains("Claims Handling"));
    assert!(svg.contains("<title>The insured party.</title>"));
    // The realization connection keeps its dash pattern.
    assert!(svg.contains(r#"stroke-dasharray="4,2""#));
    // The note renders both lines.
    assert!(svg.contains("Check coverage"));
    assert!(svg.contains("before payout"));
}

#[test]
fn fixture_routes_connection_anchored_on_connection() {
    let project = load_fixture();
    let diagram = project.diagram("business-view").unwrap();
    let routed = route_connections(diagram).unwrap();
    assert_eq!(routed.len(), 4);

    let serving = routed.iter().find(|r| r.id == "v-serving").unwrap();
    let note_line = routed.iter().find(|r| r.id == "v-note-line").unwrap();
    assert_eq!(*note_line.coords.last().unwrap(), serving.midpoint);
}

#[test]
fn fixture_queries() {
    let project = load_fixture();
    let unused: Vec<&str> = project
        .unused_entities()
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(unused, vec!["unused-goal"]);

    let views: Vec<&str> = project
        .diagrams_with_element("claims-app")
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(views, vec!["business-view", "application-view"]);

    assert_eq!(project.source_relationships("claims").len(), 1);
    assert_eq!(project.target_relationships("claims").len(), 2);
}

#[test]
fn facing_edges_share_axis_coordinate() {
    let project = boxes_with_bend();
    let mut diagram_routed = route_connections(project.diagram("view").unwrap()).unwrap();
    let routed = diagram_routed.remove(0);
    // Every coordinate stays on the horizontal centerline because the
    // two shapes overlap fully on the y axis.
    for coord in &routed.coords {
        assert_eq!(coord.y, 30.0);
    }
    assert_eq!(routed.coords.first().unwrap().x, 120.0);
    assert_eq!(routed.coords.last().unwrap().x, 300.0);
}

#[test]
fn drop_into_container_translates_coordinates() {
    let project = box_and_container();
    let mut editor = DiagramEditor::new(project, "view", Config::default()).unwrap();
    drag(
        &mut editor,
        Point::new(50.0, 30.0),
        Point::new(270.0, 160.0),
    );

    let diagram = editor.project().diagram("view").unwrap();
    let a = diagram.child("a").unwrap();
    assert_eq!(a.parent_id(), Some("b"));
    assert_eq!(a.bounds, Bounds::new(20.0, 30.0, 160.0, 60.0));
}

#[test]
fn every_change_kind_round_trips_through_undo() {
    // Move.
    let mut editor = DiagramEditor::new(box_and_container(), "view", Config::default()).unwrap();
    drag(
        &mut editor,
        Point::new(50.0, 30.0),
        Point::new(270.0, 160.0),
    );
    assert!(editor.undo().unwrap());
    let diagram = editor.project().diagram("view").unwrap();
    assert_eq!(diagram.child("a").unwrap().parent_id(), None);
    assert_eq!(
        diagram.child("a").unwrap().bounds,
        Bounds::new(0.0, 0.0, 160.0, 60.0)
    );
    assert!(editor.redo().unwrap());
    assert_eq!(
        editor
            .project()
            .diagram("view")
            .unwrap()
            .child("a")
            .unwrap()
            .parent_id(),
        Some("b")
    );

    // Resize.
    let mut editor = DiagramEditor::new(box_and_container(), "view", Config::default()).unwrap();
    click(&mut editor, Point::new(50.0, 30.0));
    drag(
        &mut editor,
        Point::new(160.0, 30.0),
        Point::new(208.0, 30.0),
    );
    assert_eq!(
        editor
            .project()
            .diagram("view")
            .unwrap()
            .child("a")
            .unwrap()
            .bounds
            .width,
        208.0
    );
    editor.undo().unwrap();
    assert_eq!(
        editor
            .project()
            .diagram("view")
            .unwrap()
            .child("a")
            .unwrap()
            .bounds
            .width,
        160.0
    );

    // Connection bend.
    let mut editor = DiagramEditor::new(boxes_with_bend(), "view", Config::default()).unwrap();
    click(&mut editor, Point::new(200.0, 30.0));
    assert_eq!(editor.selection(), Some("c1"));
    drag(&mut editor, Point::new(120.0, 30.0), Point::new(120.0, 80.0));
    assert_eq!(
        editor
            .project()
            .diagram("view")
            .unwrap()
            .connection("c1")
            .unwrap()
            .bend_points,
        vec![Point::new(40.0, 50.0)]
    );
    editor.undo().unwrap();
    assert_eq!(
        editor
            .project()
            .diagram("view")
            .unwrap()
            .connection("c1")
            .unwrap()
            .bend_points,
        vec![Point::new(40.0, 0.0)]
    );
}

#[test]
fn bend_dragged_onto_endpoint_is_absorbed() {
    let mut editor = DiagramEditor::new(boxes_with_bend(), "view", Config::default()).unwrap();
    click(&mut editor, Point::new(200.0, 30.0));
    assert_eq!(editor.selection(), Some("c1"));
    // Drag the bend vertex into the middle of the source shape.
    drag(&mut editor, Point::new(120.0, 30.0), Point::new(80.0, 30.0));
    assert!(
        editor
            .project()
            .diagram("view")
            .unwrap()
            .connection("c1")
            .unwrap()
            .bend_points
            .is_empty()
    );
    // Undo restores the absorbed point.
    editor.undo().unwrap();
    assert_eq!(
        editor
            .project()
            .diagram("view")
            .unwrap()
            .connection("c1")
            .unwrap()
            .bend_points,
        vec![Point::new(40.0, 0.0)]
    );
}

#[test]
fn commit_after_undo_drops_redo_tail() {
    let mut editor = DiagramEditor::new(box_and_container(), "view", Config::default()).unwrap();
    click(&mut editor, Point::new(50.0, 30.0));
    // Two resizes.
    drag(
        &mut editor,
        Point::new(160.0, 30.0),
        Point::new(208.0, 30.0),
    );
    drag(
        &mut editor,
        Point::new(104.0, 60.0),
        Point::new(104.0, 96.0),
    );
    assert_eq!(editor.history_len(), 2);

    editor.undo().unwrap();
    assert!(editor.can_redo());

    // A fresh gesture replaces the undone tail.
    drag(&mut editor, Point::new(50.0, 30.0), Point::new(120.0, 90.0));
    assert_eq!(editor.history_len(), 2);
    assert!(!editor.can_redo());
    assert!(editor.can_undo());
}

#[test]
fn text_edit_commits_and_reverts() {
    let project = load_fixture();
    let mut editor = DiagramEditor::new(project, "business-view", Config::default()).unwrap();
    let inside_client = Point::new(50.0, 30.0);
    click(&mut editor, inside_client);
    click(&mut editor, inside_client);
    assert_eq!(editor.text_buffer(), Some("Client"));

    editor.text_input("Customer");
    editor.key(EditorKey::Enter).unwrap();
    assert_eq!(editor.project().entity("client").unwrap().name, "Customer");
    assert!(editor.svg().contains("Customer"));

    editor.undo().unwrap();
    assert_eq!(editor.project().entity("client").unwrap().name, "Client");
}

#[test]
fn escape_during_drag_leaves_model_untouched() {
    let mut editor = DiagramEditor::new(box_and_container(), "view", Config::default()).unwrap();
    editor.pointer_down(Point::new(50.0, 30.0), NO_SNAP).unwrap();
    editor.pointer_move(Point::new(270.0, 160.0), NO_SNAP).unwrap();
    editor.key(EditorKey::Escape).unwrap();

    let diagram = editor.project().diagram("view").unwrap();
    let a = diagram.child("a").unwrap();
    assert_eq!(a.parent_id(), None);
    assert_eq!(a.bounds, Bounds::new(0.0, 0.0, 160.0, 60.0));
    assert_eq!(editor.history_len(), 0);
}
