use crate::cluster::node::{Node, NodeId, Role};
use crate::error::Error;
use crate::state::node_state::{NodeState, Status};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Shared source of truth for all node state. Descriptors are immutable;
/// each node's mutable state sits behind its own mutex, so an update on one
/// node never blocks another.
pub struct Registry {
    nodes: Vec<Node>,
    states: Vec<Mutex<NodeState>>,
    backups: Vec<NodeId>,
}

impl Registry {
    pub fn build(primaries: usize, backups: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut nodes = Vec::new();
        let mut states = Vec::new();

        for i in 1..=primaries {
            let id = NodeId(nodes.len());
            nodes.push(Node::new(id, format!("server{i}"), Role::Primary));
            states.push(Mutex::new(NodeState::initial(
                rng.gen_range(10..=50) as f64,
                rng.gen_range(30..=70) as f64,
                Status::Normal,
            )));
        }
        for i in 1..=backups {
            let id = NodeId(nodes.len());
            nodes.push(Node::new(id, format!("backup{i}"), Role::Backup));
            states.push(Mutex::new(NodeState::initial(
                rng.gen_range(5..=30) as f64,
                rng.gen_range(20..=50) as f64,
                Status::Standby,
            )));
        }

        let backups = nodes
            .iter()
            .filter(|n| n.role() == Role::Backup)
            .map(|n| n.id())
            .collect();

        Self {
            nodes,
            states,
            backups,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.nodes.get(id.index()).ok_or(Error::UnknownNode(id))
    }

    /// Backup node ids in ascending id order.
    pub fn backups(&self) -> &[NodeId] {
        &self.backups
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn slot(&self, id: NodeId) -> Result<&Mutex<NodeState>, Error> {
        self.states.get(id.index()).ok_or(Error::UnknownNode(id))
    }

    /// Consistent clone of one node's state, taken under its lock.
    pub fn get(&self, id: NodeId) -> Result<NodeState, Error> {
        Ok(self.slot(id)?.lock().clone())
    }

    /// Runs a mutation under the node's lock so no other write interleaves.
    pub fn update<R>(&self, id: NodeId, f: impl FnOnce(&mut NodeState) -> R) -> Result<R, Error> {
        Ok(f(&mut self.slot(id)?.lock()))
    }

    /// Applies both legs of a load transfer while holding both node locks,
    /// acquired in index order so concurrent transfers cannot deadlock.
    pub fn transfer(&self, source: NodeId, target: NodeId, excess: f64) -> Result<(), Error> {
        if source.index() == target.index() {
            return Err(Error::SelfTransfer);
        }
        let src = self.slot(source)?;
        let dst = self.slot(target)?;
        let (mut src, mut dst) = if source.index() < target.index() {
            let a = src.lock();
            let b = dst.lock();
            (a, b)
        } else {
            let b = dst.lock();
            let a = src.lock();
            (a, b)
        };
        src.shed(excess);
        dst.absorb(excess);
        Ok(())
    }

    /// Per-node-consistent clones in id order. Nodes are snapshotted one at
    /// a time, so rows may be mutually stale but never torn.
    pub fn snapshot_all(&self) -> Vec<NodeState> {
        self.states.iter().map(|s| s.lock().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_build_ranges_and_roles() {
        let registry = Registry::build(8, 2, 7);

        assert_eq!(10, registry.node_count());
        assert_eq!(&[NodeId(8), NodeId(9)], registry.backups());
        assert_eq!("server1", registry.nodes()[0].name());
        assert_eq!("backup2", registry.nodes()[9].name());

        for node in registry.nodes() {
            let state = registry.get(node.id()).unwrap();
            assert_relative_eq!(0.0, state.load());
            assert!(state.history().is_empty());
            match node.role() {
                Role::Primary => {
                    assert!((10.0..=50.0).contains(&state.cpu()));
                    assert!((30.0..=70.0).contains(&state.memory()));
                    assert_eq!(Status::Normal, state.status());
                }
                Role::Backup => {
                    assert!((5.0..=30.0).contains(&state.cpu()));
                    assert!((20.0..=50.0).contains(&state.memory()));
                    assert_eq!(Status::Standby, state.status());
                }
            }
        }
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let registry = Registry::build(1, 0, 0);
        assert_eq!(Err(Error::UnknownNode(NodeId(5))), registry.get(NodeId(5)));
    }

    #[test]
    fn test_update_persists_and_returns() {
        let registry = Registry::build(1, 0, 0);
        let load = registry
            .update(NodeId(0), |state| {
                state.observe(Role::Primary, 0.0, 50.0, 60.0, 40.0, 70.0)
            })
            .unwrap();

        assert_relative_eq!(52.0, load);
        assert_relative_eq!(52.0, registry.get(NodeId(0)).unwrap().load());
    }

    #[test]
    fn test_transfer_moves_load_between_nodes() {
        let registry = Registry::build(1, 1, 0);
        registry
            .update(NodeId(0), |s| s.force_gauges(60.0, 80.0, 50.0, 85.0))
            .unwrap();
        registry
            .update(NodeId(1), |s| s.force_gauges(10.0, 20.0, 30.0, 20.0))
            .unwrap();

        registry.transfer(NodeId(0), NodeId(1), 15.0).unwrap();

        let source = registry.get(NodeId(0)).unwrap();
        let target = registry.get(NodeId(1)).unwrap();
        assert_relative_eq!(73.0, source.load());
        assert_relative_eq!(30.5, target.load());
        assert_eq!(Status::Active, target.status());
    }

    #[test]
    fn test_self_transfer_is_rejected() {
        let registry = Registry::build(1, 0, 0);
        assert_eq!(
            Err(Error::SelfTransfer),
            registry.transfer(NodeId(0), NodeId(0), 5.0)
        );
    }

    #[test]
    fn test_concurrent_updates_never_tear_a_snapshot() {
        let registry = Arc::new(Registry::build(4, 0, 0));
        let mut handles = Vec::new();

        for i in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(i as u64);
                for _ in 0..1000 {
                    let cpu = rng.gen_range(10..=100) as f64;
                    let memory = rng.gen_range(30..=90) as f64;
                    let temperature = 25.0 + 0.3 * cpu;
                    registry
                        .update(NodeId(i), |state| {
                            state.observe(Role::Primary, 0.0, cpu, memory, temperature, 70.0)
                        })
                        .unwrap();
                }
            }));
        }
        for _ in 0..2 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    for state in registry.snapshot_all() {
                        if state.history().is_empty() {
                            continue;
                        }
                        let expected = 0.6 * state.cpu()
                            + 0.3 * state.memory()
                            + 0.1 * state.temperature();
                        assert_relative_eq!(expected, state.load());
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_concurrent_transfers_and_updates_do_not_deadlock() {
        let registry = Arc::new(Registry::build(2, 0, 0));
        let mut handles = Vec::new();

        for (source, target) in [(NodeId(0), NodeId(1)), (NodeId(1), NodeId(0))] {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    registry.transfer(source, target, 1.0).unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
