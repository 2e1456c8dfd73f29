//! Recalculation order and circular dependency detection.
//!
//! When a cell changes, every cell whose formula references it (directly or
//! through other cells) must be recomputed, each one after everything it
//! reads. This module walks that "referenced by" direction depth first and
//! returns a topological order starting at the changed cell.
//!
//! The graph is assumed acyclic before the change, and only the changed
//! cell's own edges are new, so any cycle must pass through the changed cell.
//! Reaching it again during the walk is reported as [`OrderError::Cycle`].
//!
//! [`evaluation_order`] is the full-sheet counterpart: it orders every
//! formula cell after the cells it reads, for example after loading a file.

use std::collections::HashSet;

use log::trace;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The walk returned to its start. The path begins and ends with it.
    #[error("circular dependency: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("recalculation would touch more than {limit} cells")]
    TooLarge { limit: usize },
}

struct Frame {
    name: String,
    next: Vec<String>,
}

/// Order in which `start` and everything that transitively reads it must be
/// recomputed. `start` comes first.
///
/// `readers(name)` lists the cells whose formulas reference `name`. At most
/// `limit` cells are visited before giving up with [`OrderError::TooLarge`].
pub fn recalculation_order<F>(
    start: &str,
    mut readers: F,
    limit: usize,
) -> Result<Vec<String>, OrderError>
where
    F: FnMut(&str) -> Vec<String>,
{
    let mut visited: HashSet<String> = HashSet::new();
    let mut finished: Vec<String> = Vec::new();

    visited.insert(start.to_string());
    if visited.len() > limit {
        return Err(OrderError::TooLarge { limit });
    }
    let mut stack = vec![Frame {
        name: start.to_string(),
        next: readers(start),
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(reader) = frame.next.pop() else {
            if let Some(done) = stack.pop() {
                finished.push(done.name);
            }
            continue;
        };

        if reader == start {
            let mut path: Vec<String> = stack.iter().map(|f| f.name.clone()).collect();
            path.push(reader);
            return Err(OrderError::Cycle(path));
        }
        if !visited.insert(reader.clone()) {
            continue;
        }
        if visited.len() > limit {
            return Err(OrderError::TooLarge { limit });
        }
        let next = readers(&reader);
        stack.push(Frame { name: reader, next });
    }

    finished.reverse();
    trace!("{} cells to recalculate from {}", finished.len(), start);
    Ok(finished)
}

/// Order in which every name in `names` can be evaluated, each one after
/// everything `reads(name)` lists. Names only reachable through `reads` are
/// part of the order too.
pub fn evaluation_order<I, F>(names: I, mut reads: F) -> Result<Vec<String>, OrderError>
where
    I: IntoIterator,
    I::Item: Into<String>,
    F: FnMut(&str) -> Vec<String>,
{
    let mut done: HashSet<String> = HashSet::new();
    let mut active: HashSet<String> = HashSet::new();
    let mut order: Vec<String> = Vec::new();

    for root in names {
        let root: String = root.into();
        if done.contains(&root) {
            continue;
        }
        active.insert(root.clone());
        let next = reads(&root);
        let mut stack = vec![Frame { name: root, next }];

        while let Some(frame) = stack.last_mut() {
            let Some(dep) = frame.next.pop() else {
                if let Some(finished) = stack.pop() {
                    active.remove(&finished.name);
                    done.insert(finished.name.clone());
                    order.push(finished.name);
                }
                continue;
            };
            if done.contains(&dep) {
                continue;
            }
            if active.contains(&dep) {
                let from = stack.iter().position(|f| f.name == dep).unwrap_or(0);
                let mut path: Vec<String> = stack[from..].iter().map(|f| f.name.clone()).collect();
                path.push(dep);
                return Err(OrderError::Cycle(path));
            }
            active.insert(dep.clone());
            let next = reads(&dep);
            stack.push(Frame { name: dep, next });
        }
    }

    trace!("evaluation order covers {} cells", order.len());
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Build a `readers` function from (reader, referenced) pairs.
    fn readers_of(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Vec<String> + use<> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (reader, referenced) in pairs {
            map.entry(referenced.to_string())
                .or_default()
                .push(reader.to_string());
        }
        move |name| map.get(name).cloned().unwrap_or_default()
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_lone_cell() {
        let order = recalculation_order("A1", readers_of(&[]), 10).unwrap();
        assert_eq!(order, vec!["A1"]);
    }

    #[test]
    fn test_chain_order() {
        // B1 = A1 + 1, C1 = B1 + A1
        let readers = readers_of(&[("B1", "A1"), ("C1", "B1"), ("C1", "A1")]);
        let order = recalculation_order("A1", readers, 10).unwrap();
        assert_eq!(order, vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_diamond_is_topological() {
        let readers = readers_of(&[("B", "A"), ("C", "A"), ("D", "B"), ("D", "C"), ("E", "D")]);
        let order = recalculation_order("A", readers, 10).unwrap();
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], "A");
        assert!(position(&order, "B") < position(&order, "D"));
        assert!(position(&order, "C") < position(&order, "D"));
        assert!(position(&order, "D") < position(&order, "E"));
    }

    #[test]
    fn test_unrelated_cells_are_skipped() {
        let readers = readers_of(&[("B", "A"), ("Y", "X")]);
        let order = recalculation_order("A", readers, 10).unwrap();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[test]
    fn test_self_cycle() {
        let err = recalculation_order("A1", readers_of(&[("A1", "A1")]), 10).unwrap_err();
        assert_eq!(err, OrderError::Cycle(vec!["A1".into(), "A1".into()]));
    }

    #[test]
    fn test_indirect_cycle_path() {
        let readers = readers_of(&[("B1", "A1"), ("C1", "B1"), ("A1", "C1")]);
        let err = recalculation_order("A1", readers, 10).unwrap_err();
        assert_eq!(
            err,
            OrderError::Cycle(vec!["A1".into(), "B1".into(), "C1".into(), "A1".into()])
        );
        assert_eq!(err.to_string(), "circular dependency: A1 -> B1 -> C1 -> A1");
    }

    #[test]
    fn test_limit() {
        let pairs: Vec<(String, String)> = (0..20)
            .map(|i| (format!("c{}", i + 1), format!("c{i}")))
            .collect();
        let refs: Vec<(&str, &str)> = pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        assert!(recalculation_order("c0", readers_of(&refs), 100).is_ok());
        let err = recalculation_order("c0", readers_of(&refs), 5).unwrap_err();
        assert_eq!(err, OrderError::TooLarge { limit: 5 });
    }

    #[test]
    fn test_limit_counts_the_start_cell() {
        assert_eq!(
            recalculation_order("A1", readers_of(&[]), 0),
            Err(OrderError::TooLarge { limit: 0 })
        );
        assert_eq!(recalculation_order("A1", readers_of(&[]), 1).unwrap(), vec!["A1"]);
        let err = recalculation_order("A1", readers_of(&[("B1", "A1")]), 1).unwrap_err();
        assert_eq!(err, OrderError::TooLarge { limit: 1 });
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let pairs: Vec<(String, String)> = (0..50_000)
            .map(|i| (format!("c{}", i + 1), format!("c{i}")))
            .collect();
        let refs: Vec<(&str, &str)> = pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let order = recalculation_order("c0", readers_of(&refs), usize::MAX).unwrap();
        assert_eq!(order.len(), 50_001);
        assert_eq!(order.last().map(String::as_str), Some("c50000"));
    }

    #[test]
    fn test_evaluation_order_reads_first() {
        // C1 reads B1 and A1, B1 reads A1
        let reads = |name: &str| -> Vec<String> {
            match name {
                "C1" => vec!["B1".into(), "A1".into()],
                "B1" => vec!["A1".into()],
                _ => vec![],
            }
        };
        let order = evaluation_order(["C1", "B1", "A1"], reads).unwrap();
        assert_eq!(order, vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_evaluation_order_includes_reached_names() {
        let reads = |name: &str| -> Vec<String> {
            if name == "total" { vec!["x".into()] } else { vec![] }
        };
        let order = evaluation_order(["total"], reads).unwrap();
        assert_eq!(order, vec!["x", "total"]);
    }

    #[test]
    fn test_evaluation_order_detects_cycle() {
        let reads = |name: &str| -> Vec<String> {
            match name {
                "a" => vec!["b".into()],
                "b" => vec!["c".into()],
                "c" => vec!["b".into()],
                _ => vec![],
            }
        };
        let err = evaluation_order(["a"], reads).unwrap_err();
        assert_eq!(err, OrderError::Cycle(vec!["b".into(), "c".into(), "b".into()]));
    }
}
