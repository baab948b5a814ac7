use std::path::{Path, PathBuf};

use build_visualizer::{
    Config, Graph, GridPos, NodeKind, OutputFormat, Project, SortError, Target, VisualizeError,
    build_layout, render, visualize_to,
};

fn fixture(name: &str) -> Project {
    let path: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    Project::parse(&input).expect("fixture parse failed")
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.layout.fast_text_metrics = true;
    config
}

fn png_size(path: &Path) -> (u32, u32) {
    let bytes = std::fs::read(path).expect("png read failed");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n", "{}: not a PNG", path.display());
    // IHDR is the first chunk: width and height follow the 8-byte signature
    // and the 8-byte chunk header.
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    (width, height)
}

fn labels_in_row(graph: &Graph, row: usize) -> Vec<&str> {
    let mut nodes: Vec<_> = graph.nodes().iter().filter(|n| n.pos.row == row).collect();
    nodes.sort_by_key(|n| n.pos.column);
    nodes.iter().map(|n| n.label.as_str()).collect()
}

#[test]
fn webapp_rows_follow_dependency_order() {
    let project = fixture("webapp.json5");
    let targets = project.topo_sort("dist").unwrap();
    let graph = build_layout(&targets);

    assert_eq!(graph.extent(), (4, 6));
    assert_eq!(graph.nodes().len(), 16);
    assert_eq!(graph.edges().len(), 15);
    assert_eq!(labels_in_row(&graph, 0), vec!["init", "mkdir", "tstamp"]);
    assert_eq!(labels_in_row(&graph, 4), vec!["docs"]);
    assert_eq!(labels_in_row(&graph, 5), vec!["dist", "zip", "checksum", "echo"]);
    assert!(graph.nodes().iter().all(|n| n.label != "clean"));

    for row in 1..6 {
        let head = graph.node_at(GridPos::new(0, row)).unwrap();
        let above = graph.node_at(GridPos::new(0, row - 1)).unwrap();
        let incoming: Vec<_> = graph.edges().iter().filter(|e| e.to == head.id).collect();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].from, above.id);
        assert_eq!(above.kind, NodeKind::Target);
    }
}

#[cfg(feature = "png")]
#[test]
fn webapp_png_size_matches_grid() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("build.png");
    let config = fast_config();
    let graph = visualize_to(
        &fixture("webapp.json5"),
        "dist",
        &output,
        OutputFormat::Png,
        &config,
    )
    .unwrap();
    assert_eq!(graph.extent(), (4, 6));

    let pad = config.layout.padding * 2.0;
    let expected_w = (4.0 * 100.0 + 3.0 * 50.0 + pad) as u32;
    let expected_h = (6.0 * 100.0 + 5.0 * 50.0 + pad) as u32;
    assert_eq!(png_size(&output), (expected_w, expected_h));
}

#[cfg(feature = "png")]
#[test]
fn empty_graph_still_renders_an_image() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.png");
    let config = fast_config();
    let layout = render(&build_layout(&[]), &output, OutputFormat::Png, &config).unwrap();
    assert!(layout.nodes.is_empty());
    let (w, h) = png_size(&output);
    assert!(w >= 1 && h >= 1);
}

#[cfg(feature = "png")]
#[test]
fn scale_multiplies_pixel_size() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scaled.png");
    let mut config = fast_config();
    config.render.scale = 2.0;
    render(
        &build_layout(&[Target::with_tasks("build", ["compile", "test"])]),
        &output,
        OutputFormat::Png,
        &config,
    )
    .unwrap();
    let single = (3.0 * 100.0 + 2.0 * 50.0 + config.layout.padding * 2.0) as u32;
    let height = (100.0 + config.layout.padding * 2.0) as u32;
    assert_eq!(png_size(&output), (single * 2, height * 2));
}

#[test]
fn svg_output_is_written_whole() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("build.svg");
    render(
        &build_layout(&[Target::new("init"), Target::with_tasks("build", ["compile"])]),
        &output,
        OutputFormat::Svg,
        &fast_config(),
    )
    .unwrap();
    let svg = std::fs::read_to_string(&output).unwrap();
    assert!(svg.starts_with("<svg") && svg.ends_with("</svg>"));
    assert!(svg.contains(">init</tspan>"));
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn cycle_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("build.png");
    let err = visualize_to(
        &fixture("cycle.json5"),
        "a",
        &output,
        OutputFormat::Png,
        &fast_config(),
    )
    .unwrap_err();
    match err {
        VisualizeError::Sort(SortError::Cycle { chain }) => {
            assert_eq!(chain, vec!["a", "b", "a"]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn project_without_targets_has_no_root() {
    let project = fixture("empty.json");
    assert!(matches!(
        project.resolve_root(None),
        Err(SortError::NoTarget { .. })
    ));
}

#[test]
fn unwritable_destination_is_a_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("no-such-dir").join("build.svg");
    let err = visualize_to(
        &fixture("webapp.json5"),
        "compile",
        &output,
        OutputFormat::Svg,
        &fast_config(),
    )
    .unwrap_err();
    assert!(matches!(err, VisualizeError::Render(_)));
    assert!(!output.exists());
}

#[test]
fn svg_helper_renders_ordered_targets() {
    let svg = build_visualizer::render_targets_svg(
        &[Target::with_tasks("build", ["compile", "test"])],
        &fast_config(),
    );
    assert!(svg.contains(">build</tspan>"));
    assert!(svg.contains(">test</tspan>"));
    assert_eq!(svg.matches("marker-end=").count(), 2);
}
