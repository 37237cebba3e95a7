//! Action graph construction and validation.
//!
//! Edges express two relations: `requires` (must run after) and `notify`
//! (trigger on change). The graph preserves insertion order so topological
//! ties break deterministically; the same construction sequence always
//! yields the same execution order.

use std::collections::{BTreeSet, HashMap};

use crate::action::Action;
use crate::error::{CairnError, Result};

/// Directed graph over actions.
#[derive(Debug, Default)]
pub struct ActionGraph {
    /// Actions in insertion order.
    actions: Vec<Action>,
    /// Action id to index in `actions`.
    index: HashMap<String, usize>,
    /// Edges added for a `from` id not present in the graph.
    dangling: Vec<(String, String)>,
}

impl ActionGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action. Rejects duplicate ids.
    pub fn add_action(&mut self, action: Action) -> Result<()> {
        if self.index.contains_key(&action.id) {
            return Err(CairnError::DuplicateAction {
                id: action.id.clone(),
            });
        }
        self.index.insert(action.id.clone(), self.actions.len());
        self.actions.push(action);
        Ok(())
    }

    /// Add a requires edge: `from` must run after `to`.
    ///
    /// Edges may reference ids not yet added; [`validate`](Self::validate)
    /// rejects any that are still dangling.
    pub fn add_requires(&mut self, from: &str, to: &str) {
        if let Some(&idx) = self.index.get(from) {
            self.actions[idx].requires.push(to.to_string());
        } else {
            self.dangling.push((from.to_string(), to.to_string()));
        }
    }

    /// Add a notify edge: `from` marks `to` pending-refresh on change.
    pub fn add_notify(&mut self, from: &str, to: &str) {
        if let Some(&idx) = self.index.get(from) {
            self.actions[idx].notifies.push(to.to_string());
        } else {
            self.dangling.push((from.to_string(), to.to_string()));
        }
    }

    /// Whether an action id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of actions in the graph.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action ids in insertion order.
    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.id.as_str())
    }

    /// Look up an action by id.
    pub fn get(&self, id: &str) -> Option<&Action> {
        self.index.get(id).map(|&idx| &self.actions[idx])
    }

    /// Direct requires-dependencies of an action.
    pub fn requires_of(&self, id: &str) -> Option<&[String]> {
        self.get(id).map(|a| a.requires.as_slice())
    }

    /// Notify targets of an action.
    pub fn notifies_of(&self, id: &str) -> Option<&[String]> {
        self.get(id).map(|a| a.notifies.as_slice())
    }

    /// Validate the graph: no dangling edges, notify targets are refresh
    /// triggers, and the requires relation is acyclic.
    pub fn validate(&self) -> Result<()> {
        if let Some((from, to)) = self.dangling.first() {
            return Err(CairnError::UnknownAction {
                from: from.clone(),
                to: to.clone(),
                unknown: from.clone(),
            });
        }

        for action in &self.actions {
            for dep in &action.requires {
                if !self.index.contains_key(dep) {
                    return Err(CairnError::UnknownAction {
                        from: action.id.clone(),
                        to: dep.clone(),
                        unknown: dep.clone(),
                    });
                }
            }
            for target in &action.notifies {
                let Some(target_action) = self.get(target) else {
                    return Err(CairnError::UnknownAction {
                        from: action.id.clone(),
                        to: target.clone(),
                        unknown: target.clone(),
                    });
                };
                if !target_action.refresh_only {
                    return Err(CairnError::InvalidNotifyTarget {
                        from: action.id.clone(),
                        to: target.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.find_cycle() {
            return Err(CairnError::GraphCycle {
                cycle: cycle.join(" -> "),
            });
        }

        Ok(())
    }

    /// Returns action ids in topological order (dependencies before
    /// dependents), ties broken by insertion order.
    ///
    /// Returns an error if a cycle is detected.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let mut in_degree: Vec<usize> = self
            .actions
            .iter()
            .map(|a| {
                a.requires
                    .iter()
                    .filter(|dep| self.index.contains_key(dep.as_str()))
                    .count()
            })
            .collect();

        // Reverse adjacency: for each action, who depends on it.
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.actions.len()];
        for (idx, action) in self.actions.iter().enumerate() {
            for dep in &action.requires {
                if let Some(&dep_idx) = self.index.get(dep) {
                    dependents[dep_idx].push(idx);
                }
            }
        }

        // Ready set ordered by insertion index for determinism.
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(idx, _)| idx)
            .collect();

        let mut result = Vec::with_capacity(self.actions.len());

        while let Some(&idx) = ready.iter().next() {
            ready.remove(&idx);
            result.push(self.actions[idx].id.clone());

            for &dependent in &dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if result.len() != self.actions.len() {
            let cycle = self
                .find_cycle()
                .map(|c| c.join(" -> "))
                .unwrap_or_else(|| "unknown".to_string());
            return Err(CairnError::GraphCycle { cycle });
        }

        Ok(result)
    }

    /// Find a cycle in the requires relation, returning the id path if one
    /// exists.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        let mut state = vec![State::Unvisited; self.actions.len()];
        let mut path: Vec<usize> = Vec::new();

        fn dfs(
            node: usize,
            graph: &ActionGraph,
            state: &mut Vec<State>,
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            state[node] = State::Visiting;
            path.push(node);

            for dep in &graph.actions[node].requires {
                let Some(&dep_idx) = graph.index.get(dep) else {
                    continue;
                };
                match state[dep_idx] {
                    State::Visiting => {
                        // Found cycle: slice the path from the first visit.
                        let cycle_start = path.iter().position(|&n| n == dep_idx).unwrap();
                        let mut cycle: Vec<String> = path[cycle_start..]
                            .iter()
                            .map(|&n| graph.actions[n].id.clone())
                            .collect();
                        cycle.push(graph.actions[dep_idx].id.clone());
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(dep_idx, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        for idx in 0..self.actions.len() {
            if state[idx] == State::Unvisited {
                if let Some(cycle) = dfs(idx, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}
