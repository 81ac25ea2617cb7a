//! Scene models for the kinematic simulator.

use nalgebra::Vector3;

use crate::core::Result;
use crate::sim::SceneModel;
use crate::wrappers::constants::TABLE_MATERIAL_NAME;

/// Textures available to the table material in the built-in scenes.
pub const TABLE_TEXTURES: [&str; 4] = ["wood", "darkwood", "marble", "granite"];

/// Table with a swappable surface material, shared by the Sawyer scenes.
fn add_table(model: &mut SceneModel) -> Result<()> {
    let mut textures = Vec::with_capacity(TABLE_TEXTURES.len());
    for name in TABLE_TEXTURES {
        textures.push(model.add_texture(name)?);
    }
    model.add_material(TABLE_MATERIAL_NAME, textures.first().copied())?;
    let table = model.add_body("tablelink", 0, Vector3::new(0.0, 0.6, -0.027))?;
    model.add_geom(table, Vector3::new(0.7, 0.4, 0.027))?;
    Ok(())
}

/// Sawyer faucet scene: a table and a faucet whose handle sits 0.175 m in
/// front of the base, at handle height 0.125 m.
pub fn sawyer_faucet() -> Result<SceneModel> {
    let mut m = SceneModel::new();
    add_table(&mut m)?;

    let hand = m.add_body("hand", 0, Vector3::new(0.0, 0.4, 0.2))?;
    m.add_geom(hand, Vector3::new(0.035, 0.035, 0.05))?;

    let base = m.add_body("faucetBase", 0, Vector3::new(0.0, 0.8, 0.0))?;
    m.add_geom(base, Vector3::new(0.05, 0.05, 0.005))?;
    let column = m.add_body("faucet_link1", base, Vector3::new(0.0, 0.0, 0.06))?;
    m.add_geom(column, Vector3::new(0.02, 0.065, 0.0))?;
    let handle = m.add_body("faucet_link2", column, Vector3::new(0.0, 0.0, 0.065))?;
    m.add_geom(handle, Vector3::new(0.01, 0.0875, 0.0))?;
    m.add_geom(handle, Vector3::new(0.02, 0.0, 0.0))?;

    m.add_site("handleStartOpen", handle, Vector3::new(0.0, 0.625, 0.125))?;
    m.add_site("handleStartClose", handle, Vector3::new(0.0, 0.975, 0.125))?;
    m.add_site("goal_open", 0, Vector3::zeros())?;
    m.add_site("goal_close", 0, Vector3::zeros())?;
    Ok(m)
}
