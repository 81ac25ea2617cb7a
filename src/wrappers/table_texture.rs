use crate::core::{Env, GymError, InfoValue, Result};
use crate::sim::{MaterialId, SimModel, Simulated, TextureId};
use crate::spaces::Discrete;
use crate::wrappers::constants::{TABLE_MATERIAL_NAME, TABLE_TEXTURE_FACTOR};
use crate::wrappers::factor::{Factor, FactorWrapper};

/// Swaps the texture of the table material among a fixed list of textures.
#[derive(Clone, Debug)]
pub struct TableTexture {
    texture_names: Vec<String>,
    texture_ids: Vec<TextureId>,
    material: MaterialId,
    space: Discrete,
}

/// Configuration for [`TableTextureWrapper`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableTextureConfig {
    pub texture_names: Vec<String>,
    pub material: String,
    pub seed: Option<u64>,
}

impl TableTextureConfig {
    pub fn new<I, S>(texture_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texture_names: texture_names.into_iter().map(Into::into).collect(),
            material: TABLE_MATERIAL_NAME.to_string(),
            seed: None,
        }
    }
}

pub type TableTextureWrapper<E> = FactorWrapper<E, TableTexture>;

impl TableTexture {
    /// Resolve every texture and the target material up front.
    pub fn new<S: Simulated + ?Sized>(env: &S, texture_names: &[String], material: &str) -> Result<Self> {
        if texture_names.is_empty() {
            return Err(GymError::InvalidArgument("table texture list is empty".into()));
        }
        let model = env.model();
        let texture_ids = texture_names
            .iter()
            .map(|name| model.texture_id(name).ok_or_else(|| GymError::unknown("texture", name.as_str())))
            .collect::<Result<Vec<_>>>()?;
        let material = model.material_id(material).ok_or_else(|| GymError::unknown("material", material))?;
        let n = u32::try_from(texture_names.len())
            .map_err(|_| GymError::InvalidArgument("too many table textures".into()))?;
        Ok(Self {
            texture_names: texture_names.to_vec(),
            texture_ids,
            material,
            space: Discrete::with_start(0, n),
        })
    }

    pub fn texture_names(&self) -> &[String] { &self.texture_names }

    fn index(&self, value: u32) -> Result<usize> {
        value
            .checked_sub(self.space.start())
            .map(|i| i as usize)
            .filter(|&i| i < self.texture_ids.len())
            .ok_or_else(|| GymError::InvalidFactor {
                factor: TABLE_TEXTURE_FACTOR,
                reason: format!("no texture at index {value}"),
            })
    }
}

impl Factor for TableTexture {
    type Space = Discrete;

    fn name(&self) -> &'static str { TABLE_TEXTURE_FACTOR }

    fn space(&self) -> &Discrete { &self.space }

    fn apply<S: Simulated + ?Sized>(&mut self, env: &mut S, value: &u32) -> Result<()> {
        let idx = self.index(*value)?;
        env.model_mut().set_material_texture(self.material, self.texture_ids[idx])
    }

    fn describe(&self, value: &u32) -> InfoValue {
        match self.index(*value) {
            Ok(idx) => InfoValue::Str(self.texture_names[idx].clone()),
            Err(_) => InfoValue::from(*value),
        }
    }
}

impl<E: Env + Simulated> FactorWrapper<E, TableTexture> {
    /// Builds the wrapper with the first texture already applied.
    pub fn table_texture(env: E, config: TableTextureConfig) -> Result<Self> {
        let factor = TableTexture::new(&env, &config.texture_names, &config.material)?;
        let start = factor.space.start();
        Self::new(env, factor, config.seed).with_initial_value(start)
    }
}
