use crate::error::{ScheduleError, ScheduleResult};
use crate::ids::TaskId;
use crate::project::Project;
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Dependency graph of a project, edges running predecessor -> successor.
pub struct ScheduleDag {
    pub graph: DiGraph<TaskId, ()>,
    pub id_to_index: HashMap<TaskId, NodeIndex>,
}

impl ScheduleDag {
    pub fn build(project: &Project) -> Self {
        let mut graph: DiGraph<TaskId, ()> = DiGraph::new();
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::new();

        // Nodes first, in id order
        for task in project.tasks() {
            let node_ix = graph.add_node(task.id());
            id_to_index.insert(task.id(), node_ix);
        }

        // Edges: pred -> task
        for task in project.tasks() {
            for pred in task.predecessors() {
                if let (Some(&u), Some(&v)) = (id_to_index.get(pred), id_to_index.get(&task.id())) {
                    graph.add_edge(u, v, ());
                }
            }
        }

        Self { graph, id_to_index }
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Task ids with every predecessor ahead of its successors.
    pub fn topological_order(&self) -> ScheduleResult<Vec<TaskId>> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            let id = self.graph[cycle.node_id()];
            ScheduleError::Cycle {
                predecessor: id,
                successor: id,
            }
        })?;
        Ok(order.into_iter().map(|ix| self.graph[ix]).collect())
    }

    pub fn successors(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbors(id, Direction::Outgoing)
    }

    pub fn predecessors(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: TaskId, direction: Direction) -> Vec<TaskId> {
        self.id_to_index
            .get(&id)
            .map(|ix| {
                self.graph
                    .neighbors_directed(*ix, direction)
                    .map(|n| self.graph[n])
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn topological_order_ignores_insertion_order() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut project = Project::new("Dag", start);
        let late = project.create_task("Late", 1, None);
        let early = project.create_task("Early", 1, None);
        project.add_predecessor(early, late).unwrap();

        let dag = ScheduleDag::build(&project);
        assert!(!dag.is_cyclic());
        assert_eq!(dag.topological_order().unwrap(), vec![early, late]);
        assert_eq!(dag.successors(early), vec![late]);
        assert_eq!(dag.predecessors(late), vec![early]);
    }
}
