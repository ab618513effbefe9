//! Tests for the block dependency graph

use maplit::btreemap;

use crate::model::Block;
use crate::pipeline::{GraphError, PipelineGraph};
use crate::test_helpers::{block, pipeline};

fn node(name: &str) -> Block {
    block(name, "RowDeleter", btreemap! {})
}

fn names<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Vec<String> {
    blocks.into_iter().map(|b| b.name.clone()).collect()
}

/* ===================== Ordering ===================== */

#[test]
fn test_topological_order_follows_pipes() {
    let p = pipeline(
        "P",
        vec![node("Load"), node("Interpret"), node("Extract")],
        &[("Extract", "Interpret"), ("Interpret", "Load")],
    );
    let graph = PipelineGraph::build(&p).unwrap();

    assert_eq!(names(graph.topological_order()), vec!["Extract", "Interpret", "Load"]);
}

#[test]
fn test_ties_keep_declaration_order() {
    let p = pipeline(
        "P",
        vec![node("B"), node("A"), node("C"), node("D")],
        &[("A", "D")],
    );
    let graph = PipelineGraph::build(&p).unwrap();

    // B, A and C are all ready at the start; D becomes ready after A
    assert_eq!(names(graph.topological_order()), vec!["B", "A", "C", "D"]);
}

/* ===================== Neighbours ===================== */

#[test]
fn test_predecessor_successors_and_descendants() {
    let p = pipeline(
        "P",
        vec![node("Root"), node("Left"), node("Right"), node("LeftLeaf"), node("Other")],
        &[("Root", "Left"), ("Root", "Right"), ("Left", "LeftLeaf")],
    );
    let graph = PipelineGraph::build(&p).unwrap();

    assert_eq!(graph.predecessor("Left").map(|b| b.name.as_str()), Some("Root"));
    assert!(graph.predecessor("Root").is_none());
    assert!(graph.predecessors("Other").is_empty());
    assert_eq!(names(graph.successors("Root")), vec!["Left", "Right"]);
    assert_eq!(names(graph.descendants("Root")), vec!["Left", "Right", "LeftLeaf"]);
    assert!(graph.descendants("Other").is_empty());
}

/* ===================== Structural Errors ===================== */

#[test]
fn test_build_errors() {
    let duplicate = pipeline("P", vec![node("A"), node("A")], &[]);
    assert_eq!(
        PipelineGraph::build(&duplicate).unwrap_err(),
        GraphError::DuplicateBlock("A".to_string())
    );

    let unknown = pipeline("P", vec![node("A")], &[("A", "B")]);
    assert_eq!(
        PipelineGraph::build(&unknown).unwrap_err(),
        GraphError::UnknownBlock("B".to_string())
    );

    let fan_in = pipeline(
        "P",
        vec![node("A"), node("B"), node("C")],
        &[("A", "C"), ("B", "C")],
    );
    assert_eq!(
        PipelineGraph::build(&fan_in).unwrap_err(),
        GraphError::MultipleInputs("C".to_string())
    );

    let cycle = pipeline(
        "P",
        vec![node("Start"), node("A"), node("B")],
        &[("A", "B"), ("B", "A")],
    );
    assert_eq!(
        PipelineGraph::build(&cycle).unwrap_err(),
        GraphError::Cycle("A".to_string())
    );
}
