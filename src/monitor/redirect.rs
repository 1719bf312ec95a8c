use crate::cluster::node::NodeId;
use crate::cluster::registry::Registry;
use crate::error::Error;
use tracing::{debug, info};

/// Shifts `excess` load from an overloaded primary to the least-loaded
/// backup. Ties go to the lowest backup id, so repeated calls are
/// deterministic. With no backup configured this is a no-op.
pub fn redirect(registry: &Registry, source: NodeId, excess: f64) -> Result<Option<NodeId>, Error> {
    let mut target: Option<(NodeId, f64)> = None;
    for &id in registry.backups() {
        let load = registry.get(id)?.load();
        let better = match target {
            None => true,
            Some((_, best)) => load < best,
        };
        if better {
            target = Some((id, load));
        }
    }

    let Some((target, _)) = target else {
        debug!(
            source = registry.node(source)?.name(),
            "overloaded with no backup available"
        );
        return Ok(None);
    };

    info!(
        from = registry.node(source)?.name(),
        to = registry.node(target)?.name(),
        excess,
        "redirecting load"
    );
    registry.transfer(source, target, excess)?;
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::node_state::Status;
    use approx::assert_relative_eq;

    fn set_load(registry: &Registry, id: NodeId, load: f64) {
        registry
            .update(id, |s| {
                s.force_gauges(s.cpu(), s.memory(), s.temperature(), load)
            })
            .unwrap();
    }

    #[test]
    fn test_redirect_picks_least_loaded_backup() {
        let registry = Registry::build(1, 2, 0);
        set_load(&registry, NodeId(0), 85.0);
        set_load(&registry, NodeId(1), 50.0);
        set_load(&registry, NodeId(2), 20.0);

        let target = redirect(&registry, NodeId(0), 15.0).unwrap();

        assert_eq!(Some(NodeId(2)), target);
        assert_relative_eq!(73.0, registry.get(NodeId(0)).unwrap().load());
        assert_relative_eq!(30.5, registry.get(NodeId(2)).unwrap().load());
        assert_eq!(Status::Active, registry.get(NodeId(2)).unwrap().status());
        assert_relative_eq!(50.0, registry.get(NodeId(1)).unwrap().load());
    }

    #[test]
    fn test_ties_break_to_lowest_id() {
        let registry = Registry::build(1, 2, 0);
        for _ in 0..5 {
            set_load(&registry, NodeId(1), 20.0);
            set_load(&registry, NodeId(2), 20.0);
            let target = redirect(&registry, NodeId(0), 1.0).unwrap();
            assert_eq!(Some(NodeId(1)), target);
        }
    }

    #[test]
    fn test_no_backup_is_a_noop() {
        let registry = Registry::build(2, 0, 0);
        set_load(&registry, NodeId(0), 85.0);

        assert_eq!(None, redirect(&registry, NodeId(0), 15.0).unwrap());
        assert_relative_eq!(85.0, registry.get(NodeId(0)).unwrap().load());
    }
}
