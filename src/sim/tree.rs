use std::collections::BTreeSet;

use crate::sim::{BodyId, GeomId, SimModel};

/// All bodies in the subtree rooted at `root`, including `root` itself.
///
/// Walks the parent-id table; the self-parented world body never recurses
/// into itself.
pub fn descendant_bodies<M: SimModel + ?Sized>(model: &M, root: BodyId) -> BTreeSet<BodyId> {
    let mut found = BTreeSet::from([root]);
    let mut stack = vec![root];
    while let Some(parent) = stack.pop() {
        for id in 0..model.nbody() {
            if id != parent && model.body_parent(id) == Some(parent) && found.insert(id) {
                stack.push(id);
            }
        }
    }
    found
}

/// Geoms attached directly to any body in `bodies`, in geom-id order.
pub fn geoms_of_bodies<M: SimModel + ?Sized>(model: &M, bodies: &BTreeSet<BodyId>) -> Vec<GeomId> {
    (0..model.ngeom())
        .filter(|&g| model.geom_body(g).is_some_and(|b| bodies.contains(&b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SceneModel;
    use nalgebra::Vector3;

    fn tree() -> (SceneModel, BodyId) {
        let mut m = SceneModel::new();
        let z = Vector3::zeros();
        let root = m.add_body("faucetBase", 0, z).unwrap();
        let l1 = m.add_body("link1", root, z).unwrap();
        let l2 = m.add_body("link2", l1, z).unwrap();
        m.add_body("handle", l2, z).unwrap();
        let table = m.add_body("table", 0, z).unwrap();
        m.add_body("leg", table, z).unwrap();
        m.add_geom(root, Vector3::new(0.03, 0.06, 0.0)).unwrap();
        m.add_geom(table, Vector3::new(0.7, 0.4, 0.027)).unwrap();
        m.add_geom(l2, Vector3::new(0.01, 0.0875, 0.0)).unwrap();
        (m, root)
    }

    #[test]
    fn collects_nested_bodies_but_not_siblings() {
        let (m, root) = tree();
        let bodies = descendant_bodies(&m, root);
        let names: Vec<&str> = bodies.iter().filter_map(|&b| m.body_name(b)).collect();
        assert_eq!(names, vec!["faucetBase", "link1", "link2", "handle"]);
        assert_eq!(geoms_of_bodies(&m, &bodies), vec![0, 2]);
    }

    #[test]
    fn world_root_terminates_and_covers_everything() {
        let (m, _) = tree();
        let all = descendant_bodies(&m, 0);
        assert_eq!(all.len(), m.nbody());
    }

    #[test]
    fn leaf_is_its_own_subtree() {
        let (m, _) = tree();
        let handle = m.body_id("handle").unwrap();
        assert_eq!(descendant_bodies(&m, handle), BTreeSet::from([handle]));
    }
}
