//! Dependencies between the top-level declarations of a namespace.

#[cfg(test)]
mod test;

use fixedbitset::FixedBitSet;
use fnv::FnvHashMap;
use tarn_syntax::{names::DeclarationName, Declaration, Name};

/**
A directed graph with an edge from each declaration to the declarations that
refer to it.

Self loops are allowed. Nodes are numbered in the order they were first seen,
which keeps every traversal deterministic.
*/
#[derive(Debug, Default, Clone)]
pub struct DeclarationGraph {
    nodes: Vec<DeclarationName>,
    indices: FnvHashMap<DeclarationName, usize>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl DeclarationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[DeclarationName] {
        &self.nodes
    }

    fn add_node(&mut self, node: &DeclarationName) -> usize {
        match self.indices.get(node) {
            Some(ix) => *ix,
            None => {
                let ix = self.nodes.len();
                self.nodes.push(node.clone());
                self.indices.insert(node.clone(), ix);
                self.successors.push(Vec::new());
                self.predecessors.push(Vec::new());
                ix
            }
        }
    }

    /// Record that `target` depends on `source`.
    pub fn add_edge(&mut self, source: &DeclarationName, target: &DeclarationName) {
        let source = self.add_node(source);
        let target = self.add_node(target);
        if !self.successors[source].contains(&target) {
            self.successors[source].push(target);
            self.predecessors[target].push(source);
        }
    }

    pub fn has_edge(&self, source: &DeclarationName, target: &DeclarationName) -> bool {
        match (self.indices.get(source), self.indices.get(target)) {
            (Some(source), Some(target)) => self.successors[*source].contains(target),
            _ => false,
        }
    }

    /**
    The strongly connected components of the graph, dependencies first.

    Kosaraju's algorithm: the second pass visits the transposed graph in
    reverse finishing order, which yields the components in topological order.
    */
    pub fn strongly_connected_components(&self) -> Vec<Vec<DeclarationName>> {
        let size = self.nodes.len();

        let mut visited = FixedBitSet::with_capacity(size);
        let mut finished = Vec::with_capacity(size);
        for start in 0..size {
            if visited.put(start) {
                continue;
            }
            let mut stack = vec![(start, 0)];
            while let Some((node, edge)) = stack.pop() {
                match self.successors[node].get(edge) {
                    Some(&next) => {
                        stack.push((node, edge + 1));
                        if !visited.put(next) {
                            stack.push((next, 0));
                        }
                    }
                    None => finished.push(node),
                }
            }
        }

        let mut assigned = FixedBitSet::with_capacity(size);
        let mut components = Vec::new();
        for &root in finished.iter().rev() {
            if assigned.put(root) {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                component.push(self.nodes[node].clone());
                for &prev in &self.predecessors[node] {
                    if !assigned.put(prev) {
                        stack.push(prev);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    /**
    Arrange renamed declarations into groups that only depend on themselves and
    earlier groups.

    Members of a group are sorted by source position. Declarations that don't
    appear in the graph form a final group in their original order.
    */
    pub fn group_declarations(
        &self,
        declarations: Vec<Declaration<Name>>,
    ) -> Vec<Vec<Declaration<Name>>> {
        let mut unsorted: Vec<Option<Declaration<Name>>> =
            declarations.into_iter().map(Some).collect();

        let mut by_name: FnvHashMap<DeclarationName, Vec<usize>> = FnvHashMap::default();
        for (ix, declaration) in unsorted.iter().enumerate() {
            if let Some(name) = declaration
                .as_ref()
                .and_then(|declaration| declaration.meta().meta.declaration_name())
            {
                by_name.entry(name).or_default().push(ix);
            }
        }

        let mut groups = Vec::new();
        for component in self.strongly_connected_components() {
            let mut group: Vec<Declaration<Name>> = component
                .iter()
                .filter_map(|name| by_name.remove(name))
                .flatten()
                .filter_map(|ix| unsorted[ix].take())
                .collect();
            group.sort_by_key(|declaration| declaration.meta().range.start);
            if !group.is_empty() {
                groups.push(group);
            }
        }

        let disconnected: Vec<Declaration<Name>> = unsorted.into_iter().flatten().collect();
        if !disconnected.is_empty() {
            groups.push(disconnected);
        }

        log::debug!(
            "grouped declarations into {} groups: {:?}",
            groups.len(),
            groups
                .iter()
                .map(|group| group
                    .iter()
                    .map(|declaration| declaration.name().to_string())
                    .collect::<Vec<_>>())
                .collect::<Vec<_>>()
        );

        groups
    }
}
