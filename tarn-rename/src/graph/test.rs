use crate::graph::DeclarationGraph;
use pretty_assertions::assert_eq;
use tarn_syntax::names::{DeclarationName, LetName, NamespaceName, QualifiedName};

fn node(name: &str) -> DeclarationName {
    DeclarationName::Let(LetName(QualifiedName::new(
        NamespaceName::new(&["Mina", "Test"], "Graph"),
        name,
    )))
}

fn local_names(components: Vec<Vec<DeclarationName>>) -> Vec<Vec<String>> {
    components
        .into_iter()
        .map(|component| {
            let mut names: Vec<String> = component
                .iter()
                .map(|name| String::from(name.qualified_name().local_name()))
                .collect();
            names.sort();
            names
        })
        .collect()
}

#[test]
fn scc_empty_1() {
    let graph = DeclarationGraph::new();
    assert!(graph.is_empty());
    assert_eq!(graph.strongly_connected_components(), Vec::<Vec<DeclarationName>>::new());
}

#[test]
fn scc_chain_1() {
    let mut graph = DeclarationGraph::new();
    graph.add_edge(&node("b"), &node("c"));
    graph.add_edge(&node("a"), &node("b"));
    assert_eq!(
        local_names(graph.strongly_connected_components()),
        vec![vec!["a"], vec!["b"], vec!["c"]]
    );
}

#[test]
fn scc_cycle_1() {
    let mut graph = DeclarationGraph::new();
    graph.add_edge(&node("c"), &node("a"));
    graph.add_edge(&node("a"), &node("b"));
    graph.add_edge(&node("b"), &node("a"));
    graph.add_edge(&node("b"), &node("d"));
    assert_eq!(
        local_names(graph.strongly_connected_components()),
        vec![vec!["c"], vec!["a", "b"], vec!["d"]]
    );
}

#[test]
fn scc_self_loop_1() {
    let mut graph = DeclarationGraph::new();
    graph.add_edge(&node("a"), &node("a"));
    assert!(graph.has_edge(&node("a"), &node("a")));
    assert_eq!(
        local_names(graph.strongly_connected_components()),
        vec![vec!["a"]]
    );
}

#[test]
fn add_edge_twice_1() {
    let mut graph = DeclarationGraph::new();
    graph.add_edge(&node("a"), &node("b"));
    graph.add_edge(&node("a"), &node("b"));
    assert_eq!(graph.nodes(), &[node("a"), node("b")]);
    assert!(graph.has_edge(&node("a"), &node("b")));
    assert!(!graph.has_edge(&node("b"), &node("a")));
}
