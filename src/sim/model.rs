use nalgebra::Vector3;

use crate::core::{GymError, Result};
use crate::sim::{BodyId, GeomId, MaterialId, SimModel, SiteId, TextureId};

const IDENTITY_QUAT: [f64; 4] = [1.0, 0.0, 0.0, 0.0];

#[derive(Clone, Debug, PartialEq)]
struct Body {
    name: String,
    parent: BodyId,
    pos: Vector3<f64>,
    quat: [f64; 4],
}

#[derive(Clone, Debug, PartialEq)]
struct Geom {
    body: BodyId,
    size: Vector3<f64>,
}

#[derive(Clone, Debug, PartialEq)]
struct Material {
    name: String,
    texture: Option<TextureId>,
}

/// Sites are attached to a body; their world position follows the body chain.
#[derive(Clone, Debug, PartialEq)]
struct Site {
    name: String,
    body: BodyId,
    offset: Vector3<f64>,
}

/// In-memory model tables in the shape of a MuJoCo `mjModel`.
///
/// Built incrementally with the `add_*` methods; ids are dense and assigned
/// in insertion order. Body 0 is always `world`.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneModel {
    bodies: Vec<Body>,
    geoms: Vec<Geom>,
    textures: Vec<String>,
    materials: Vec<Material>,
    sites: Vec<Site>,
}

impl Default for SceneModel {
    fn default() -> Self { Self::new() }
}

impl SceneModel {
    pub fn new() -> Self {
        Self {
            bodies: vec![Body { name: "world".into(), parent: 0, pos: Vector3::zeros(), quat: IDENTITY_QUAT }],
            geoms: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            sites: Vec::new(),
        }
    }

    pub fn add_body(&mut self, name: &str, parent: BodyId, pos: Vector3<f64>) -> Result<BodyId> {
        if self.body_id(name).is_some() {
            return Err(GymError::InvalidArgument(format!("duplicate body name: {name}")));
        }
        self.check_body(parent)?;
        self.bodies.push(Body { name: name.to_string(), parent, pos, quat: IDENTITY_QUAT });
        Ok(self.bodies.len() - 1)
    }

    pub fn add_geom(&mut self, body: BodyId, size: Vector3<f64>) -> Result<GeomId> {
        self.check_body(body)?;
        self.geoms.push(Geom { body, size });
        Ok(self.geoms.len() - 1)
    }

    pub fn add_texture(&mut self, name: &str) -> Result<TextureId> {
        if self.texture_id(name).is_some() {
            return Err(GymError::InvalidArgument(format!("duplicate texture name: {name}")));
        }
        self.textures.push(name.to_string());
        Ok(self.textures.len() - 1)
    }

    pub fn add_material(&mut self, name: &str, texture: Option<TextureId>) -> Result<MaterialId> {
        if self.material_id(name).is_some() {
            return Err(GymError::InvalidArgument(format!("duplicate material name: {name}")));
        }
        if let Some(t) = texture {
            self.check_texture(t)?;
        }
        self.materials.push(Material { name: name.to_string(), texture });
        Ok(self.materials.len() - 1)
    }

    /// Add a site at world position `pos`, attached to `body`.
    pub fn add_site(&mut self, name: &str, body: BodyId, pos: Vector3<f64>) -> Result<SiteId> {
        if self.site_id(name).is_some() {
            return Err(GymError::InvalidArgument(format!("duplicate site name: {name}")));
        }
        let origin = self.body_world_pos(body).ok_or_else(|| GymError::unknown("body id", body.to_string()))?;
        self.sites.push(Site { name: name.to_string(), body, offset: pos - origin });
        Ok(self.sites.len() - 1)
    }

    /// World position of a body, accumulated along its parent chain.
    pub fn body_world_pos(&self, id: BodyId) -> Option<Vector3<f64>> {
        let mut pos = Vector3::zeros();
        let mut cur = id;
        // parent chain is acyclic by construction: parents always precede children
        loop {
            let body = self.bodies.get(cur)?;
            pos += body.pos;
            if body.parent == cur {
                return Some(pos);
            }
            cur = body.parent;
        }
    }

    fn check_body(&self, id: BodyId) -> Result<()> {
        if id < self.bodies.len() { Ok(()) } else { Err(GymError::unknown("body id", id.to_string())) }
    }

    fn check_texture(&self, id: TextureId) -> Result<()> {
        if id < self.textures.len() { Ok(()) } else { Err(GymError::unknown("texture id", id.to_string())) }
    }
}

impl SimModel for SceneModel {
    fn nbody(&self) -> usize { self.bodies.len() }

    fn body_id(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().position(|b| b.name == name)
    }

    fn body_name(&self, id: BodyId) -> Option<&str> {
        self.bodies.get(id).map(|b| b.name.as_str())
    }

    fn body_parent(&self, id: BodyId) -> Option<BodyId> {
        self.bodies.get(id).map(|b| b.parent)
    }

    fn body_pos(&self, id: BodyId) -> Option<Vector3<f64>> {
        self.bodies.get(id).map(|b| b.pos)
    }

    fn set_body_pos(&mut self, id: BodyId, pos: Vector3<f64>) -> Result<()> {
        self.check_body(id)?;
        self.bodies[id].pos = pos;
        Ok(())
    }

    fn body_quat(&self, id: BodyId) -> Option<[f64; 4]> {
        self.bodies.get(id).map(|b| b.quat)
    }

    fn ngeom(&self) -> usize { self.geoms.len() }

    fn geom_body(&self, id: GeomId) -> Option<BodyId> {
        self.geoms.get(id).map(|g| g.body)
    }

    fn geom_size(&self, id: GeomId) -> Option<Vector3<f64>> {
        self.geoms.get(id).map(|g| g.size)
    }

    fn set_geom_size(&mut self, id: GeomId, size: Vector3<f64>) -> Result<()> {
        let geom = self.geoms.get_mut(id).ok_or_else(|| GymError::unknown("geom id", id.to_string()))?;
        geom.size = size;
        Ok(())
    }

    fn texture_id(&self, name: &str) -> Option<TextureId> {
        self.textures.iter().position(|t| t == name)
    }

    fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.materials.iter().position(|m| m.name == name)
    }

    fn material_texture(&self, id: MaterialId) -> Option<TextureId> {
        self.materials.get(id).and_then(|m| m.texture)
    }

    fn set_material_texture(&mut self, id: MaterialId, texture: TextureId) -> Result<()> {
        self.check_texture(texture)?;
        let mat = self.materials.get_mut(id).ok_or_else(|| GymError::unknown("material id", id.to_string()))?;
        mat.texture = Some(texture);
        Ok(())
    }

    fn site_id(&self, name: &str) -> Option<SiteId> {
        self.sites.iter().position(|s| s.name == name)
    }

    fn site_pos(&self, id: SiteId) -> Option<Vector3<f64>> {
        let site = self.sites.get(id)?;
        Some(self.body_world_pos(site.body)? + site.offset)
    }

    fn set_site_pos(&mut self, id: SiteId, pos: Vector3<f64>) -> Result<()> {
        let body = self.sites.get(id).map(|s| s.body).ok_or_else(|| GymError::unknown("site id", id.to_string()))?;
        let origin = self.body_world_pos(body).ok_or_else(|| GymError::unknown("body id", body.to_string()))?;
        self.sites[id].offset = pos - origin;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sites_follow_their_body() {
        let mut m = SceneModel::new();
        let base = m.add_body("base", 0, Vector3::new(0.0, 0.8, 0.0)).unwrap();
        let link = m.add_body("link", base, Vector3::new(0.0, 0.0, 0.1)).unwrap();
        let site = m.add_site("tip", link, Vector3::new(0.0, 0.7, 0.1)).unwrap();
        assert_eq!(m.site_pos(site), Some(Vector3::new(0.0, 0.7, 0.1)));

        m.set_body_pos(base, Vector3::new(0.05, 0.85, 0.0)).unwrap();
        let moved = m.site_pos(site).unwrap();
        assert!((moved - Vector3::new(0.05, 0.75, 0.1)).norm() < 1e-12);
    }

    #[test]
    fn duplicate_and_dangling_ids_are_rejected() {
        let mut m = SceneModel::new();
        m.add_body("obj", 0, Vector3::zeros()).unwrap();
        assert!(m.add_body("obj", 0, Vector3::zeros()).is_err());
        assert!(m.add_geom(7, Vector3::zeros()).is_err());
        assert!(m.add_material("table_wood", Some(3)).is_err());
        assert!(m.set_geom_size(0, Vector3::zeros()).is_err());
    }

    #[test]
    fn material_texture_can_be_swapped() {
        let mut m = SceneModel::new();
        let wood = m.add_texture("wood").unwrap();
        let marble = m.add_texture("marble").unwrap();
        let mat = m.add_material("table_wood", Some(wood)).unwrap();
        m.set_material_texture(mat, marble).unwrap();
        assert_eq!(m.material_texture(mat), Some(marble));
        assert!(m.set_material_texture(mat, 9).is_err());
    }
}
