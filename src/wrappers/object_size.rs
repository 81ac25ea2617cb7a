use std::collections::{BTreeMap, BTreeSet};

use nalgebra::Vector3;

use crate::core::{Env, GymError, InfoValue, Result};
use crate::sim::{GeomId, SimModel, Simulated, descendant_bodies, geoms_of_bodies};
use crate::spaces::BoxSpace;
use crate::wrappers::constants::{DEFAULT_SCALE_RANGE, OBJECT_BODY_NAME, OBJECT_SIZE_FACTOR};
use crate::wrappers::factor::{Factor, FactorWrapper};

/// Scales every geom of the task object by a uniformly sampled factor.
///
/// Baseline sizes are captured once, when the factor is built, and every
/// application writes `baseline * scale`, so scales never compound.
#[derive(Clone, Debug)]
pub struct ObjectSize {
    space: BoxSpace<f64, 1>,
    baseline: Option<BTreeMap<GeomId, Vector3<f64>>>,
}

/// Configuration for [`ObjectSizeWrapper`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectSizeConfig {
    pub scale_range: (f64, f64),
    pub seed: Option<u64>,
}

impl Default for ObjectSizeConfig {
    fn default() -> Self { Self { scale_range: DEFAULT_SCALE_RANGE, seed: None } }
}

pub type ObjectSizeWrapper<E> = FactorWrapper<E, ObjectSize>;

impl ObjectSize {
    pub fn capture<S: Simulated + ?Sized>(env: &S, scale_range: (f64, f64)) -> Result<Self> {
        let (lo, hi) = scale_range;
        if !(lo >= 0.0) {
            return Err(GymError::InvalidArgument(format!("object scale must be non-negative, got {lo}")));
        }
        if !(lo.is_finite() && hi.is_finite()) {
            return Err(GymError::InvalidArgument(format!("object scale range must be finite, got ({lo}, {hi})")));
        }
        let space = BoxSpace::try_new([lo], [hi])?;
        Ok(Self { space, baseline: capture_baseline(env) })
    }

    /// Captured default sizes, or `None` when the object body was missing.
    pub fn baseline(&self) -> Option<&BTreeMap<GeomId, Vector3<f64>>> { self.baseline.as_ref() }
}

// With a task-named object the whole body subtree is scaled; the fallback
// `obj` body only contributes its own geoms.
fn capture_baseline<S: Simulated + ?Sized>(env: &S) -> Option<BTreeMap<GeomId, Vector3<f64>>> {
    let model = env.model();
    let name = env.object_name().unwrap_or(OBJECT_BODY_NAME);
    let Some(root) = model.body_id(name) else {
        tracing::warn!(
            factor = OBJECT_SIZE_FACTOR,
            object = name,
            bodies = ?model.body_names(),
            "object body not found; sizes will not be randomized"
        );
        return None;
    };
    let bodies = if env.object_name().is_some() {
        descendant_bodies(model, root)
    } else {
        BTreeSet::from([root])
    };
    let sizes: BTreeMap<_, _> = geoms_of_bodies(model, &bodies)
        .into_iter()
        .filter_map(|g| model.geom_size(g).map(|size| (g, size)))
        .collect();
    tracing::debug!(object = name, geoms = sizes.len(), "captured default object sizes");
    Some(sizes)
}

impl Factor for ObjectSize {
    type Space = BoxSpace<f64, 1>;

    fn name(&self) -> &'static str { OBJECT_SIZE_FACTOR }

    fn space(&self) -> &Self::Space { &self.space }

    fn apply<S: Simulated + ?Sized>(&mut self, env: &mut S, value: &[f64; 1]) -> Result<()> {
        let Some(baseline) = &self.baseline else {
            tracing::warn!(factor = OBJECT_SIZE_FACTOR, "default sizes not captured; not setting factor value");
            return Ok(());
        };
        let model = env.model_mut();
        for (&geom, size) in baseline {
            model.set_geom_size(geom, size * value[0])?;
        }
        Ok(())
    }

    fn describe(&self, value: &[f64; 1]) -> InfoValue { InfoValue::F64(value[0]) }
}

impl<E: Env + Simulated> FactorWrapper<E, ObjectSize> {
    pub fn object_size(env: E, config: ObjectSizeConfig) -> Result<Self> {
        let factor = ObjectSize::capture(&env, config.scale_range)?;
        Ok(Self::new(env, factor, config.seed))
    }
}
