//! End-to-end properties of graph construction, staleness and rendering on
//! real on-disk source trees.

use std::fs;
use std::path::{Path, PathBuf};

use filetime::{set_file_mtime, FileTime};
use smelt_deps::{
    render_tree, CyclePolicy, DependencyGraph, DepsError, GraphOptions, DEFAULT_MAX_DEPTH,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn touch(path: &Path, secs: i64) {
    set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
}

fn at(secs: i64) -> FileTime {
    FileTime::from_unix_time(secs, 0)
}

/// Writes `len` headers `c0.h .. c{len-1}.h`, each including the next.
fn write_chain(dir: &Path, len: usize) -> PathBuf {
    for i in 0..len {
        let content = if i + 1 < len {
            format!("#include \"c{}.h\"\n", i + 1)
        } else {
            String::new()
        };
        write(dir, &format!("c{i}.h"), &content);
    }
    dir.join("c0.h")
}

fn tolerant() -> GraphOptions {
    GraphOptions {
        cycles: CyclePolicy::Tolerate,
        ..GraphOptions::default()
    }
}

// ===========================================================================
// Memoization
// ===========================================================================

#[test]
fn shared_header_is_one_node_across_units() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "shared.h", "");
    let main = write(dir.path(), "main.cpp", "#include \"shared.h\"\n");
    let util = write(dir.path(), "util.cpp", "#include \"shared.h\"\n");

    let mut graph = DependencyGraph::new();
    let main_id = graph.build(&main).unwrap();
    let util_id = graph.build(&util).unwrap();

    let from_main = graph.node(main_id).dependencies()[0];
    let from_util = graph.node(util_id).dependencies()[0];
    assert_eq!(from_main, from_util);
    assert_eq!(graph.len(), 3);
}

#[test]
fn separate_graphs_do_not_share_state() {
    let dir = TempDir::new().unwrap();
    let main = write(dir.path(), "main.cpp", "");

    let mut first = DependencyGraph::new();
    first.build(&main).unwrap();
    let second = DependencyGraph::new();
    assert!(second.is_empty());
    assert!(second.lookup(&main).is_none());
}

// ===========================================================================
// Parsing
// ===========================================================================

#[test]
fn only_local_includes_become_dependencies() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.h", "");
    write(dir.path(), "b.h", "");
    let main = write(
        dir.path(),
        "main.cpp",
        "#include \"a.h\"\n  #  include  \"b.h\"\n#include <system.h>\n",
    );

    let mut graph = DependencyGraph::new();
    let root = graph.build(&main).unwrap();
    let names: Vec<_> = graph
        .node(root)
        .dependencies()
        .iter()
        .map(|&d| graph.node(d).path().file_name().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["a.h", "b.h"]);
}

// ===========================================================================
// Staleness
// ===========================================================================

#[test]
fn direct_staleness() {
    let dir = TempDir::new().unwrap();
    let src = write(dir.path(), "unit.c", "");
    touch(&src, 500);

    let mut graph = DependencyGraph::new();
    let root = graph.build(&src).unwrap();
    assert!(graph.is_stale_after(root, at(499)).unwrap());
    assert!(!graph.is_stale_after(root, at(501)).unwrap());
}

#[test]
fn transitive_staleness() {
    let dir = TempDir::new().unwrap();
    let c = write(dir.path(), "C.h", "");
    let b = write(dir.path(), "B.h", "#include \"C.h\"\n");
    let a = write(dir.path(), "A.cpp", "#include \"B.h\"\n");
    touch(&a, 10);
    touch(&b, 10);
    touch(&c, 20);

    let mut graph = DependencyGraph::new();
    let root = graph.build(&a).unwrap();
    assert!(graph.is_stale_after(root, at(15)).unwrap());
}

#[test]
fn no_spurious_rebuild() {
    let dir = TempDir::new().unwrap();
    let base = write(dir.path(), "base.h", "");
    let mid = write(dir.path(), "mid.h", "#include \"base.h\"\n");
    let src = write(
        dir.path(),
        "main.cpp",
        "#include \"mid.h\"\n#include \"base.h\"\n",
    );
    touch(&base, 10);
    touch(&mid, 12);
    touch(&src, 11);

    let mut graph = DependencyGraph::new();
    let root = graph.build(&src).unwrap();
    assert!(!graph.is_stale_after(root, at(20)).unwrap());
}

// ===========================================================================
// Cycles
// ===========================================================================

#[test]
fn tolerated_cycle_terminates_and_links_back() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "A.h", "#include \"B.h\"\n");
    write(dir.path(), "B.h", "#include \"A.h\"\n");

    let mut graph = DependencyGraph::with_options(tolerant());
    let a_id = graph.build(&a).unwrap();
    let b_id = graph.node(a_id).dependencies()[0];

    assert!(graph.node(b_id).path().ends_with("B.h"));
    assert_eq!(graph.node(b_id).dependencies()[0], a_id);
    assert_eq!(graph.len(), 2);
}

#[test]
fn tolerated_cycle_staleness_terminates() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "A.h", "#include \"B.h\"\n");
    let b = write(dir.path(), "B.h", "#include \"A.h\"\n");
    touch(&a, 10);
    touch(&b, 30);

    let mut graph = DependencyGraph::with_options(tolerant());
    let root = graph.build(&a).unwrap();
    assert!(graph.is_stale_after(root, at(20)).unwrap());
    assert!(!graph.is_stale_after(root, at(40)).unwrap());
}

#[test]
fn rejected_cycle_names_the_chain() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "A.h", "#include \"B.h\"\n");
    write(dir.path(), "B.h", "#include \"A.h\"\n");

    let mut graph = DependencyGraph::new();
    let err = graph.build(&a).unwrap_err();
    match &err {
        DepsError::CircularDependency { cycle } => {
            assert_eq!(cycle.len(), 3);
            assert!(cycle[0].ends_with("A.h"));
            assert!(cycle[1].ends_with("B.h"));
            assert!(cycle[2].ends_with("A.h"));
        }
        other => panic!("expected CircularDependency, got {other:?}"),
    }
    assert!(err.to_string().contains("A.h"));
    assert!(graph.is_empty());
}

// ===========================================================================
// Depth guard
// ===========================================================================

#[test]
fn rendering_a_long_chain_hits_the_depth_bound() {
    let dir = TempDir::new().unwrap();
    let root_path = write_chain(dir.path(), 25);

    let mut graph = DependencyGraph::with_options(GraphOptions {
        max_depth: 64,
        ..GraphOptions::default()
    });
    let root = graph.build(&root_path).unwrap();

    let err = render_tree(&graph, root, DEFAULT_MAX_DEPTH).unwrap_err();
    match err {
        DepsError::MaxDepthExceeded { path, depth, limit } => {
            assert_eq!(depth, 20);
            assert_eq!(limit, 20);
            assert!(path.ends_with("c20.h"));
        }
        other => panic!("expected MaxDepthExceeded, got {other:?}"),
    }
}

#[test]
fn rendering_a_short_chain_succeeds() {
    let dir = TempDir::new().unwrap();
    let root_path = write_chain(dir.path(), 10);

    let mut graph = DependencyGraph::new();
    let root = graph.build(&root_path).unwrap();
    let lines = graph.render(root).unwrap();

    assert_eq!(lines.len(), 10);
    assert!(lines[0].ends_with("c0.h"));
    assert!(lines[9].starts_with(&format!("{}- ", "  ".repeat(9))));
    assert!(lines[9].ends_with("c9.h"));
}

#[test]
fn rendering_a_tolerated_cycle_hits_the_depth_bound() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "A.h", "#include \"B.h\"\n");
    write(dir.path(), "B.h", "#include \"A.h\"\n");

    let mut graph = DependencyGraph::with_options(tolerant());
    let root = graph.build(&a).unwrap();
    let err = graph.render(root).unwrap_err();
    assert!(matches!(err, DepsError::MaxDepthExceeded { limit: 20, .. }));
}

#[test]
fn constructing_a_long_chain_hits_the_depth_bound() {
    let dir = TempDir::new().unwrap();
    let root_path = write_chain(dir.path(), 25);

    let mut graph = DependencyGraph::new();
    let err = graph.build(&root_path).unwrap_err();
    assert!(matches!(err, DepsError::MaxDepthExceeded { limit: 20, .. }));
    assert!(graph.is_empty());
}

#[test]
fn depth_bound_does_not_depend_on_build_order() {
    let dir = TempDir::new().unwrap();
    // c0.h .. c14.h, then z0.cpp .. z9.h leading into c0.h: 25 levels in total.
    let chain = write_chain(dir.path(), 15);
    for i in 0..10 {
        let next = if i < 9 {
            format!("z{}.h", i + 1)
        } else {
            "c0.h".to_string()
        };
        let name = if i == 0 { "z0.cpp".to_string() } else { format!("z{i}.h") };
        write(dir.path(), &name, &format!("#include \"{next}\"\n"));
    }
    let unit = dir.path().join("z0.cpp");

    let mut cold = DependencyGraph::new();
    let cold_err = cold.build(&unit).unwrap_err();

    let mut warm = DependencyGraph::new();
    warm.build(&chain).unwrap();
    let cached = warm.len();
    let warm_err = warm.build(&unit).unwrap_err();

    assert_eq!(cold_err.to_string(), warm_err.to_string());
    match warm_err {
        DepsError::MaxDepthExceeded { path, depth, limit } => {
            assert!(path.ends_with("c10.h"));
            assert_eq!(depth, 20);
            assert_eq!(limit, 20);
        }
        other => panic!("expected MaxDepthExceeded, got {other:?}"),
    }
    assert_eq!(warm.len(), cached);
}
