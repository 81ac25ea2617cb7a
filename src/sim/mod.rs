// Simulator seam: model tables that factors write into, the per-step physics
// driven by the Sawyer base env, and "unwrapped" access through wrapper stacks.

pub mod kinematic;
pub mod model;
pub mod scenes;
pub mod tree;

use std::collections::BTreeMap;

use nalgebra::Vector3;

use crate::core::{Info, InfoValue, Result};

pub use kinematic::KinematicSim;
pub use model::SceneModel;
pub use tree::{descendant_bodies, geoms_of_bodies};

pub type BodyId = usize;
pub type GeomId = usize;
pub type TextureId = usize;
pub type MaterialId = usize;
pub type SiteId = usize;

/// Id tables and mutable parameters of a simulator model.
///
/// Body 0 is the world body and is its own parent. Body positions are
/// relative to the parent body; site positions are in the world frame.
pub trait SimModel {
    fn nbody(&self) -> usize;
    fn body_id(&self, name: &str) -> Option<BodyId>;
    fn body_name(&self, id: BodyId) -> Option<&str>;
    fn body_parent(&self, id: BodyId) -> Option<BodyId>;
    fn body_pos(&self, id: BodyId) -> Option<Vector3<f64>>;
    fn set_body_pos(&mut self, id: BodyId, pos: Vector3<f64>) -> Result<()>;
    /// Orientation as (w, x, y, z).
    fn body_quat(&self, id: BodyId) -> Option<[f64; 4]>;

    fn ngeom(&self) -> usize;
    fn geom_body(&self, id: GeomId) -> Option<BodyId>;
    fn geom_size(&self, id: GeomId) -> Option<Vector3<f64>>;
    fn set_geom_size(&mut self, id: GeomId, size: Vector3<f64>) -> Result<()>;

    fn texture_id(&self, name: &str) -> Option<TextureId>;
    fn material_id(&self, name: &str) -> Option<MaterialId>;
    fn material_texture(&self, id: MaterialId) -> Option<TextureId>;
    fn set_material_texture(&mut self, id: MaterialId, texture: TextureId) -> Result<()>;

    fn site_id(&self, name: &str) -> Option<SiteId>;
    fn site_pos(&self, id: SiteId) -> Option<Vector3<f64>>;
    fn set_site_pos(&mut self, id: SiteId, pos: Vector3<f64>) -> Result<()>;

    fn body_names(&self) -> Vec<&str> {
        (0..self.nbody()).filter_map(|id| self.body_name(id)).collect()
    }

    fn site_pos_by_name(&self, name: &str) -> Option<Vector3<f64>> {
        self.site_pos(self.site_id(name)?)
    }
}

/// Physics behind a Sawyer arm scene. Implementations own the model.
pub trait Simulator {
    type Model: SimModel;

    fn model(&self) -> &Self::Model;
    fn model_mut(&mut self) -> &mut Self::Model;

    /// Restore the dynamic state (not model parameters) to its initial value.
    fn reset(&mut self);
    fn set_mocap_pos(&mut self, pos: Vector3<f64>);
    fn set_gripper_effort(&mut self, effort: f64);
    fn advance(&mut self, substeps: usize);

    fn hand_pos(&self) -> Vector3<f64>;
    fn tcp_center(&self) -> Vector3<f64>;
    /// Raw distance between the gripper pads, normalised so 1.0 is fully open.
    fn gripper_distance(&self) -> f64;

    fn describe(&self) -> String {
        let h = self.hand_pos();
        format!("hand=({:.3}, {:.3}, {:.3}) grip={:.3}", h.x, h.y, h.z, self.gripper_distance())
    }
}

/// Access to the innermost simulated env through any stack of wrappers.
pub trait Simulated {
    type Model: SimModel;

    fn model(&self) -> &Self::Model;
    fn model_mut(&mut self) -> &mut Self::Model;
    fn factors(&self) -> &FactorRecord;
    fn factors_mut(&mut self) -> &mut FactorRecord;

    /// Root body of the manipulated object, when the task names one.
    fn object_name(&self) -> Option<&str> { None }
}

/// Current value of every factor applied to a scene, keyed by factor name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FactorRecord {
    values: BTreeMap<String, InfoValue>,
}

impl FactorRecord {
    pub fn new() -> Self { Self::default() }

    pub fn set<V: Into<InfoValue>>(&mut self, name: &str, value: V) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&InfoValue> { self.values.get(name) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Info entries of the form `factor/<name>`.
    pub fn to_info(&self) -> Info {
        let mut info = Info::new();
        for (k, v) in &self.values {
            info.insert(format!("factor/{k}"), v.clone());
        }
        info
    }
}
