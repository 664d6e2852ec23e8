use archimate_editor::config::Config;
use archimate_editor::geometry::{Bounds, Point};
use archimate_editor::model::{Diagram, DiagramChild, SourceConnection};
use archimate_editor::project::Project;
use archimate_editor::render::DiagramRenderer;
use archimate_editor::router::route_connections;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// A grid of boxes with every box connected to the next one, plus a few
/// long-range connections with bend points to keep the router honest.
fn grid_project(cols: usize, rows: usize) -> Project {
    let mut project = Project::new("bench", "Bench");
    let mut diagram = Diagram::new("view", "Bench View");
    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            let mut child = DiagramChild::new(
                &format!("n{index}"),
                "ApplicationComponent",
                Bounds::new(col as f32 * 220.0, row as f32 * 120.0, 160.0, 60.0),
            );
            if index > 0 {
                child
                    .source_connections
                    .push(SourceConnection::new(
                        &format!("c{index}"),
                        &format!("n{index}"),
                        &format!("n{}", index - 1),
                    ));
            }
            if index >= cols {
                let mut long = SourceConnection::new(
                    &format!("l{index}"),
                    &format!("n{index}"),
                    &format!("n{}", index - cols),
                );
                long.bend_points = vec![Point::new(-40.0, -60.0)];
                child.source_connections.push(long);
            }
            diagram
                .insert_child(child, None)
                .expect("grid ids are unique");
        }
    }
    project.add_diagram(diagram);
    project
}

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_connections");
    for size in [4usize, 8, 16] {
        let project = grid_project(size, size);
        let diagram = project.diagram("view").expect("view exists");
        group.bench_with_input(
            BenchmarkId::from_parameter(size * size),
            diagram,
            |b, diagram| {
                b.iter(|| route_connections(black_box(diagram)).expect("acyclic grid"));
            },
        );
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let config = Config::default();
    for size in [4usize, 8, 16] {
        let project = grid_project(size, size);
        group.bench_with_input(
            BenchmarkId::from_parameter(size * size),
            &project,
            |b, project| {
                let diagram = project.diagram("view").expect("view exists");
                b.iter(|| {
                    let mut renderer = DiagramRenderer::new(&config);
                    renderer.build(project, diagram).expect("build succeeds");
                    black_box(renderer.svg())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_routing, bench_render
);
criterion_main!(benches);
