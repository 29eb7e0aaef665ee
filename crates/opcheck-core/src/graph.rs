//! Graph construction, validation and ordering.
//!
//! Both the traced framework model and the converted IR model are stored as
//! a [`ModelGraph`]. Edges are derived from tensor names: a node that lists
//! a tensor as input depends on the node that lists it as output.

use crate::error::CoreError;
use crate::types::{GraphEdge, GraphNode, ModelGraph, NodeAttribute, NodeId};
use anyhow::Result;
use std::collections::{BTreeSet, HashMap, HashSet};

fn invalid(msg: impl Into<String>) -> anyhow::Error {
    CoreError::InvalidGraph(msg.into()).into()
}

impl ModelGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `node`, overwriting its id with its position.
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(GraphNode { id, ..node });
        id
    }

    /// Node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ids of nodes whose `op_type` is exactly `op_type`.
    pub fn find_nodes_by_op(&self, op_type: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter_map(|node| (node.op_type == op_type).then_some(node.id))
            .collect()
    }

    /// Distinct op types, first occurrence first.
    pub fn op_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .map(|node| node.op_type.as_str())
            .filter(|op| seen.insert(*op))
            .collect()
    }

    /// Recompute edges from the tensor names nodes produce and consume.
    pub fn rebuild_edges(&mut self) -> Result<()> {
        let mut producers: HashMap<&str, NodeId> = HashMap::new();
        for node in &self.nodes {
            for output in &node.outputs {
                if producers.insert(output.as_str(), node.id).is_some() {
                    return Err(invalid(format!(
                        "tensor '{output}' is produced by more than one node"
                    )));
                }
            }
        }

        let mut edges = Vec::new();
        for node in &self.nodes {
            let sourced = node.inputs.iter().filter_map(|input| {
                let &from_node = producers.get(input.as_str())?;
                Some(GraphEdge {
                    from_node,
                    to_node: node.id,
                    tensor_name: input.clone(),
                })
            });
            edges.extend(sourced);
        }
        self.edges = edges;
        Ok(())
    }

    /// Check that the graph is well formed.
    ///
    /// Every node input must be a graph input, an external constant listed
    /// in `constants`, or produced by some node; every graph output must be
    /// produced or be a graph input; the graph must be acyclic.
    pub fn validate(&self, constants: &HashSet<String>) -> Result<()> {
        if let Some((pos, node)) = self.nodes.iter().enumerate().find(|(pos, n)| n.id != *pos) {
            return Err(invalid(format!("node at position {pos} carries id {}", node.id)));
        }

        let defined: HashSet<&str> = self
            .inputs
            .iter()
            .chain(constants)
            .chain(self.nodes.iter().flat_map(|node| &node.outputs))
            .map(String::as_str)
            .collect();

        for node in &self.nodes {
            if let Some(missing) = node.inputs.iter().find(|i| !defined.contains(i.as_str())) {
                return Err(invalid(format!(
                    "node {} ({}) reads undefined tensor '{missing}'",
                    node.id, node.op_type
                )));
            }
        }
        if let Some(missing) = self.outputs.iter().find(|o| !defined.contains(o.as_str())) {
            return Err(invalid(format!(
                "graph output '{missing}' is not produced by any node"
            )));
        }

        self.topological_sort().map(drop)
    }

    /// Node ids in dependency order. Ready nodes are taken lowest id first,
    /// so an already ordered graph keeps its insertion order.
    pub fn topological_sort(&self) -> Result<Vec<NodeId>> {
        let count = self.nodes.len();
        let mut pending = vec![0usize; count];
        let mut consumers: Vec<Vec<NodeId>> = vec![Vec::new(); count];
        for edge in &self.edges {
            if edge.from_node >= count || edge.to_node >= count {
                return Err(invalid(format!(
                    "edge {} -> {} references a missing node",
                    edge.from_node, edge.to_node
                )));
            }
            pending[edge.to_node] += 1;
            consumers[edge.from_node].push(edge.to_node);
        }

        let mut ready: BTreeSet<NodeId> = (0..count).filter(|&id| pending[id] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(id) = ready.pop_first() {
            order.push(id);
            for &next in &consumers[id] {
                pending[next] -= 1;
                if pending[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        if order.len() == count {
            Ok(order)
        } else {
            Err(invalid(format!(
                "graph has a cycle through {} node(s)",
                count - order.len()
            )))
        }
    }

    /// Nodes in [`topological_sort`](Self::topological_sort) order.
    pub fn execution_order(&self) -> Result<Vec<&GraphNode>> {
        Ok(self
            .topological_sort()?
            .into_iter()
            .map(|id| &self.nodes[id])
            .collect())
    }
}

/// Incremental graph construction with generated tensor names.
pub struct GraphBuilder {
    graph: ModelGraph,
    prefix: String,
    counter: usize,
}

impl GraphBuilder {
    /// Create a new graph builder. Generated tensor names start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            graph: ModelGraph::new(),
            prefix: prefix.into(),
            counter: 0,
        }
    }

    /// Declare a graph input.
    pub fn add_graph_input(&mut self, name: impl Into<String>) -> &mut Self {
        self.graph.inputs.push(name.into());
        self
    }

    /// Fresh tensor name.
    pub fn fresh_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.counter);
        self.counter += 1;
        name
    }

    /// Append a node producing `num_outputs` freshly named tensors.
    pub fn add_op(
        &mut self,
        op_type: &str,
        inputs: &[String],
        attributes: HashMap<String, NodeAttribute>,
        num_outputs: usize,
    ) -> Vec<String> {
        let outputs: Vec<String> = (0..num_outputs).map(|_| self.fresh_name()).collect();
        self.graph.add_node(GraphNode {
            id: 0,
            op_type: op_type.to_string(),
            attributes,
            inputs: inputs.to_vec(),
            outputs: outputs.clone(),
            name: None,
        });
        outputs
    }

    /// Set graph outputs.
    pub fn set_outputs(&mut self, outputs: Vec<String>) -> &mut Self {
        self.graph.outputs = outputs;
        self
    }

    /// Attach a metadata entry.
    pub fn add_metadata(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.graph.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Finish the graph, deriving edges and validating it.
    pub fn build(mut self, constants: &HashSet<String>) -> Result<ModelGraph> {
        self.graph.rebuild_edges()?;
        self.graph.validate(constants)?;
        Ok(self.graph)
    }
}
