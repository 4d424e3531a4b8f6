// 🌳 Category Graph - tree ordering for the category list
//
// Edges run parent → child. The graph rejects dangling parents on build and
// cycles on sort; a successful sort yields parents before children with each
// category's level filled in.

use crate::collection::Entity;
use crate::entities::Category;
use crate::error::{CatalogError, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

pub struct CategoryGraph {
    graph: DiGraph<Category, ()>,

    /// Category id → node index
    nodes: HashMap<String, NodeIndex>,
}

impl CategoryGraph {
    /// Build the graph. A later category with an already seen id replaces
    /// the earlier one, same as the collection would.
    pub fn new<I>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = Category>,
    {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

        for category in categories {
            match nodes.get(category.key()).copied() {
                Some(node) => graph[node] = category,
                None => {
                    let key = category.key().to_string();
                    let node = graph.add_node(category);
                    nodes.insert(key, node);
                }
            }
        }

        let mut edges = Vec::new();
        for child in graph.node_indices() {
            let category = &graph[child];
            let Some(parent_id) = category.parent_id.as_deref() else {
                continue;
            };

            if parent_id == category.key() {
                return Err(CatalogError::CategoryCycle {
                    id: parent_id.to_string(),
                });
            }

            match nodes.get(parent_id) {
                Some(&parent) => edges.push((parent, child)),
                None => {
                    return Err(CatalogError::DanglingParent {
                        id: category.key().to_string(),
                        parent_id: parent_id.to_string(),
                    })
                }
            }
        }

        for (parent, child) in edges {
            graph.add_edge(parent, child, ());
        }

        Ok(CategoryGraph { graph, nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Categories with parents first, each carrying its level (roots = 0)
    pub fn topsorted(self) -> Result<Vec<Category>> {
        let order = toposort(&self.graph, None).map_err(|cycle| CatalogError::CategoryCycle {
            id: self.graph[cycle.node_id()].key().to_string(),
        })?;

        let mut levels = vec![0usize; self.graph.node_count()];
        for &node in &order {
            let level = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .next()
                .map(|parent| levels[parent.index()] + 1)
                .unwrap_or(0);
            levels[node.index()] = level;
        }

        let (graph_nodes, _) = self.graph.into_nodes_edges();
        let mut slots: Vec<Option<Category>> =
            graph_nodes.into_iter().map(|node| Some(node.weight)).collect();

        Ok(order
            .into_iter()
            .filter_map(|node| {
                let mut category = slots[node.index()].take()?;
                category.level = levels[node.index()];
                Some(category)
            })
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, parent_id: Option<&str>) -> Category {
        Category::new(id, &format!("Category {}", id), parent_id)
    }

    fn position(sorted: &[Category], id: &str) -> usize {
        sorted.iter().position(|c| c.key() == id).unwrap()
    }

    #[test]
    fn test_chain_levels() {
        let sorted = CategoryGraph::new(vec![
            category("1", None),
            category("2", Some("1")),
            category("3", Some("2")),
        ])
        .unwrap()
        .topsorted()
        .unwrap();

        let levels: HashMap<&str, usize> = sorted.iter().map(|c| (c.key(), c.level)).collect();
        assert_eq!(levels["1"], 0);
        assert_eq!(levels["2"], 1);
        assert_eq!(levels["3"], 2);
    }

    #[test]
    fn test_parents_precede_children_when_input_is_reversed() {
        let sorted = CategoryGraph::new(vec![
            category("leaf", Some("mid")),
            category("other", Some("root")),
            category("mid", Some("root")),
            category("root", None),
            category("second-root", None),
        ])
        .unwrap()
        .topsorted()
        .unwrap();

        assert_eq!(sorted.len(), 5);
        for child in &sorted {
            if let Some(parent_id) = child.parent_id.as_deref() {
                let parent = &sorted[position(&sorted, parent_id)];
                assert!(position(&sorted, parent_id) < position(&sorted, child.key()));
                assert_eq!(child.level, parent.level + 1);
            } else {
                assert_eq!(child.level, 0);
            }
        }
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = CategoryGraph::new(vec![category("A", Some("B")), category("B", Some("A"))])
            .unwrap()
            .topsorted();

        match result {
            Err(CatalogError::CategoryCycle { id }) => assert!(id == "A" || id == "B"),
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let result = CategoryGraph::new(vec![category("A", Some("A"))]);

        assert!(matches!(result, Err(CatalogError::CategoryCycle { .. })));
    }

    #[test]
    fn test_dangling_parent_is_rejected() {
        let result = CategoryGraph::new(vec![category("1", None), category("2", Some("42"))]);

        assert_eq!(
            result.err(),
            Some(CatalogError::DanglingParent {
                id: "2".to_string(),
                parent_id: "42".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let graph = CategoryGraph::new(vec![
            category("1", None),
            Category::new("1", "Renamed", None),
        ])
        .unwrap();
        assert_eq!(graph.len(), 1);

        let sorted = graph.topsorted().unwrap();
        assert_eq!(sorted[0].name.as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_empty_graph() {
        let graph = CategoryGraph::new(Vec::new()).unwrap();

        assert!(graph.is_empty());
        assert!(graph.topsorted().unwrap().is_empty());
    }
}
