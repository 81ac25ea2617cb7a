use std::fmt::Debug;

use crate::core::{Env, GymError, Info, InfoValue, RenderFrame, Result, Step};
use crate::sim::{FactorRecord, Simulated};
use crate::spaces::Space;
use crate::utils::rng::{DEFAULT_SEED, RngStream, labelled_rng};

/// A randomized scene parameter.
pub trait Factor {
    type Space: Space<Element: Clone + Debug>;

    /// Identifier used in logs, info keys and the factor record.
    fn name(&self) -> &'static str;

    /// Distribution the value is sampled from.
    fn space(&self) -> &Self::Space;

    /// Push `value` into simulator state.
    fn apply<S: Simulated + ?Sized>(&mut self, env: &mut S, value: &<Self::Space as Space>::Element) -> Result<()>;

    /// How a value is reported in info maps and the factor record.
    fn describe(&self, value: &<Self::Space as Space>::Element) -> InfoValue;
}

/// Element type of a factor's space.
pub type FactorValue<F> = <<F as Factor>::Space as Space>::Element;

/// Wraps an environment and re-samples one factor at every reset.
///
/// The factor is applied before the inner env resets, so task reset logic
/// sees the randomized scene. It is then held for the whole episode.
#[derive(Debug)]
pub struct FactorWrapper<E, F: Factor> {
    inner: E,
    factor: F,
    rng: RngStream,
    value: Option<FactorValue<F>>,
    sample_on_reset: bool,
}

impl<E, F> FactorWrapper<E, F>
where
    E: Env + Simulated,
    F: Factor,
{
    pub fn new(inner: E, factor: F, seed: Option<u64>) -> Self {
        let rng = labelled_rng(seed.unwrap_or(DEFAULT_SEED), factor.name());
        Self { inner, factor, rng, value: None, sample_on_reset: true }
    }

    /// Apply `value` immediately, before the first reset.
    pub fn with_initial_value(mut self, value: FactorValue<F>) -> Result<Self> {
        self.set_factor_value(value)?;
        Ok(self)
    }

    pub fn factor_name(&self) -> &'static str { self.factor.name() }

    pub fn factor(&self) -> &F { &self.factor }

    /// Value currently applied to the scene, if any.
    pub fn factor_value(&self) -> Option<&FactorValue<F>> { self.value.as_ref() }

    pub fn sample_factor(&mut self) -> FactorValue<F> {
        self.factor.space().sample(&mut self.rng)
    }

    /// Validate, apply and record a factor value.
    pub fn set_factor_value(&mut self, value: FactorValue<F>) -> Result<()> {
        let name = self.factor.name();
        if !self.factor.space().contains(&value) {
            return Err(GymError::InvalidFactor {
                factor: name,
                reason: format!("{value:?} is outside the factor space"),
            });
        }
        self.factor.apply(&mut self.inner, &value)?;
        let described = self.factor.describe(&value);
        tracing::debug!(factor = name, value = %described, "applied factor");
        self.inner.factors_mut().set(name, described);
        self.value = Some(value);
        Ok(())
    }

    /// When disabled, resets keep the current value instead of sampling.
    pub fn set_sample_on_reset(&mut self, enabled: bool) { self.sample_on_reset = enabled; }

    pub fn inner(&self) -> &E { &self.inner }
    pub fn inner_mut(&mut self) -> &mut E { &mut self.inner }
    pub fn into_inner(self) -> E { self.inner }
}

impl<E, F> Env for FactorWrapper<E, F>
where
    E: Env + Simulated,
    F: Factor,
{
    type Obs = E::Obs;
    type Act = E::Act;

    fn reset(&mut self, seed: Option<u64>) -> (Self::Obs, Info) {
        let name = self.factor.name();
        if let Some(s) = seed {
            self.rng = labelled_rng(s, name);
        }
        if self.sample_on_reset {
            let value = self.sample_factor();
            if let Err(e) = self.set_factor_value(value) {
                tracing::error!(factor = name, error = %e, "failed to apply sampled factor");
            }
        }
        let (obs, mut info) = self.inner.reset(seed);
        if let Some(v) = &self.value {
            info.insert(format!("factor/{name}"), self.factor.describe(v));
        }
        (obs, info)
    }

    fn step(&mut self, action: Self::Act) -> Step<Self::Obs> { self.inner.step(action) }

    fn render(&self) -> Option<RenderFrame> { self.inner.render() }
    fn close(&mut self) { self.inner.close() }
}

impl<E, F> Simulated for FactorWrapper<E, F>
where
    E: Simulated,
    F: Factor,
{
    type Model = E::Model;

    fn model(&self) -> &Self::Model { self.inner.model() }
    fn model_mut(&mut self) -> &mut Self::Model { self.inner.model_mut() }
    fn factors(&self) -> &FactorRecord { self.inner.factors() }
    fn factors_mut(&mut self) -> &mut FactorRecord { self.inner.factors_mut() }
    fn object_name(&self) -> Option<&str> { self.inner.object_name() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SceneModel, SimModel};
    use crate::spaces::Discrete;
    use nalgebra::Vector3;

    /// Minimal simulated env: one body whose x position is the factor.
    struct SlideEnv {
        model: SceneModel,
        factors: FactorRecord,
        resets: u32,
    }

    impl SlideEnv {
        fn new() -> Self {
            let mut model = SceneModel::new();
            model.add_body("slider", 0, Vector3::zeros()).unwrap();
            Self { model, factors: FactorRecord::new(), resets: 0 }
        }
    }

    impl Env for SlideEnv {
        type Obs = f64;
        type Act = ();

        fn reset(&mut self, _seed: Option<u64>) -> (f64, Info) {
            self.resets += 1;
            (self.model.body_pos(1).unwrap().x, Info::new())
        }

        fn step(&mut self, _action: ()) -> Step<f64> {
            Step::new(self.model.body_pos(1).unwrap().x, 0.0, false, false, Info::new())
        }
    }

    impl Simulated for SlideEnv {
        type Model = SceneModel;
        fn model(&self) -> &SceneModel { &self.model }
        fn model_mut(&mut self) -> &mut SceneModel { &mut self.model }
        fn factors(&self) -> &FactorRecord { &self.factors }
        fn factors_mut(&mut self) -> &mut FactorRecord { &mut self.factors }
    }

    struct SlidePosition(Discrete);

    impl Factor for SlidePosition {
        type Space = Discrete;
        fn name(&self) -> &'static str { "slide" }
        fn space(&self) -> &Discrete { &self.0 }
        fn apply<S: Simulated + ?Sized>(&mut self, env: &mut S, value: &u32) -> Result<()> {
            env.model_mut().set_body_pos(1, Vector3::new(*value as f64, 0.0, 0.0))
        }
        fn describe(&self, value: &u32) -> InfoValue { InfoValue::from(*value) }
    }

    /// Only position 1 can be applied; every other value fails.
    struct StuckSlide {
        space: Discrete,
        rejected: u32,
    }

    impl Factor for StuckSlide {
        type Space = Discrete;
        fn name(&self) -> &'static str { "stuck" }
        fn space(&self) -> &Discrete { &self.space }
        fn apply<S: Simulated + ?Sized>(&mut self, env: &mut S, value: &u32) -> Result<()> {
            if *value != 1 {
                self.rejected += 1;
                return Err(GymError::Other(format!("slider jammed at {value}")));
            }
            env.model_mut().set_body_pos(1, Vector3::new(1.0, 0.0, 0.0))
        }
        fn describe(&self, value: &u32) -> InfoValue { InfoValue::from(*value) }
    }

    fn wrapped(seed: Option<u64>) -> FactorWrapper<SlideEnv, SlidePosition> {
        FactorWrapper::new(SlideEnv::new(), SlidePosition(Discrete::with_start(1, 5)), seed)
    }

    #[test]
    fn reset_applies_factor_before_inner_reset() {
        let mut env = wrapped(Some(3));
        for _ in 0..20 {
            let (obs, info) = env.reset(None);
            let v = *env.factor_value().unwrap();
            assert_eq!(obs, v as f64);
            assert_eq!(info.get("factor/slide"), Some(&InfoValue::I64(v as i64)));
            assert_eq!(env.factors().get("slide"), Some(&InfoValue::I64(v as i64)));
            // held for the episode
            assert_eq!(env.step(()).observation, v as f64);
        }
        assert_eq!(env.inner().resets, 20);
    }

    #[test]
    fn seeded_resets_repeat_the_same_values() {
        let mut a = wrapped(None);
        let mut b = wrapped(None);
        let xs: Vec<f64> = (0..10).map(|i| a.reset(Some(i)).0).collect();
        let ys: Vec<f64> = (0..10).map(|i| b.reset(Some(i)).0).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn out_of_space_values_are_rejected_and_not_applied() {
        let mut env = wrapped(None).with_initial_value(2).unwrap();
        let err = env.set_factor_value(9).unwrap_err();
        assert!(matches!(err, GymError::InvalidFactor { factor: "slide", .. }));
        assert_eq!(env.factor_value(), Some(&2));
        assert_eq!(env.model().body_pos(1).unwrap().x, 2.0);
    }

    #[test]
    fn fixed_factor_survives_resets() {
        let mut env = wrapped(Some(1)).with_initial_value(4).unwrap();
        env.set_sample_on_reset(false);
        for s in 0..5 {
            let (obs, _) = env.reset(Some(s));
            assert_eq!(obs, 4.0);
        }
    }

    #[test]
    fn failed_apply_on_reset_keeps_previous_value() {
        let factor = StuckSlide { space: Discrete::with_start(1, 5), rejected: 0 };
        let mut env = FactorWrapper::new(SlideEnv::new(), factor, Some(5)).with_initial_value(1).unwrap();
        for s in 0..20 {
            let (obs, info) = env.reset(Some(s));
            assert_eq!(obs, 1.0);
            assert_eq!(env.factor_value(), Some(&1));
            assert_eq!(info.get("factor/stuck"), Some(&InfoValue::I64(1)));
            assert_eq!(env.factors().get("stuck"), Some(&InfoValue::I64(1)));
            assert_eq!(env.model().body_pos(1).unwrap().x, 1.0);
        }
        assert!(env.factor().rejected > 0);
        assert_eq!(env.inner().resets, 20);
    }
}
