// Registration and specs: construct environments by id with string kwargs.

use std::any::Any;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

use crate::core::{Env, GymError, Info, RenderFrame, Result, Step};
use crate::tasks::{SawyerConfig, kinematic_faucet_env};
use crate::wrappers::{FactorWrapper, ObjectSizeConfig, TableTextureConfig};

/// Key-value kwargs for make(); values are parsed by each factory.
pub type KwArgs = HashMap<String, String>;

/// Id of the built-in faucet-open environment on the kinematic simulator.
pub const FAUCET_OPEN_ID: &str = "SawyerFaucetOpen-v2";

/// Environment specification metadata.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvSpec {
    /// Unique identifier like "SawyerFaucetOpen-v2".
    pub id: String,
    /// Episode length after which steps are truncated.
    pub max_episode_steps: Option<u32>,
    /// Target reward threshold for a "solved" score, if defined.
    pub reward_threshold: Option<f32>,
    /// Whether environment has inherent nondeterminism beyond RNG seed.
    pub nondeterministic: bool,
    pub version: Option<String>,
}

impl EnvSpec {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), max_episode_steps: None, reward_threshold: None, nondeterministic: false, version: None }
    }
}

/// A type-erased environment so make() can return differently wrapped envs.
pub trait EnvDyn {
    fn reset(&mut self, seed: Option<u64>) -> (Box<dyn Any>, Info);
    fn step(&mut self, action: Box<dyn Any>) -> Result<Step<Box<dyn Any>>>;
    fn render(&self) -> Option<RenderFrame>;
    fn close(&mut self);
}

/// Adapts any Env into EnvDyn by boxing Obs/Act via Any.
struct DynEnv<E: Env>(E);

impl<E: Env> EnvDyn for DynEnv<E>
where
    E::Obs: Any + 'static,
    E::Act: Any + 'static,
{
    fn reset(&mut self, seed: Option<u64>) -> (Box<dyn Any>, Info) {
        let (obs, info) = self.0.reset(seed);
        (Box::new(obs), info)
    }

    fn step(&mut self, action: Box<dyn Any>) -> Result<Step<Box<dyn Any>>> {
        let action = action.downcast::<E::Act>().map_err(|_| {
            GymError::InvalidAction(format!("expected {}", std::any::type_name::<E::Act>()))
        })?;
        let s = self.0.step(*action);
        Ok(Step::new(Box::new(s.observation) as Box<dyn Any>, s.reward, s.terminated, s.truncated, s.info))
    }

    fn render(&self) -> Option<RenderFrame> { self.0.render() }
    fn close(&mut self) { self.0.close() }
}

pub type BoxedEnv = Box<dyn EnvDyn + Send + Sync>;

/// Factory closure type for constructing environments with kwargs.
pub type FactoryFn = Box<dyn Fn(KwArgs) -> Result<BoxedEnv> + Send + Sync>;

#[derive(Default)]
struct RegistryInner {
    specs: HashMap<String, EnvSpec>,
    factories: HashMap<String, FactoryFn>,
}

struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    fn new() -> Self { Self { inner: RwLock::new(RegistryInner::default()) } }

    fn register(&self, spec: EnvSpec, factory: FactoryFn) -> Result<()> {
        let mut g = self.inner.write().map_err(|_| GymError::Other("registry poisoned".into()))?;
        if g.specs.contains_key(&spec.id) {
            return Err(GymError::Other(format!("Env id already registered: {}", spec.id)));
        }
        g.factories.insert(spec.id.clone(), factory);
        g.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    fn get_spec(&self, id: &str) -> Option<EnvSpec> {
        let g = self.inner.read().ok()?;
        g.specs.get(id).cloned()
    }

    fn make(&self, id: &str, kwargs: KwArgs) -> Result<BoxedEnv> {
        let guard = self.inner.read().map_err(|_| GymError::Other("registry poisoned".into()))?;
        match guard.factories.get(id) {
            Some(f) => f(kwargs),
            None => Err(GymError::unknown("environment", id)),
        }
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Register an environment spec and its factory globally.
pub fn register(spec: EnvSpec, factory: FactoryFn) -> Result<()> { registry().register(spec, factory) }

/// Fetch a registered EnvSpec by id.
pub fn get_spec(id: &str) -> Option<EnvSpec> { registry().get_spec(id) }

/// Construct an environment by id with kwargs, returning a boxed dynamic env.
pub fn make<S: AsRef<str>>(id: S, kwargs: KwArgs) -> Result<BoxedEnv> { registry().make(id.as_ref(), kwargs) }

/// Box a concrete env behind the dynamic interface.
pub fn boxed<E>(env: E) -> BoxedEnv
where
    E: Env + Send + Sync + 'static,
    E::Obs: Any + 'static,
    E::Act: Any + 'static,
{
    Box::new(DynEnv(env))
}

/// Helper to adapt a fallible constructor into a factory function.
pub fn factory_of<E, F>(ctor: F) -> FactoryFn
where
    E: Env + Send + Sync + 'static,
    E::Obs: Any + 'static,
    E::Act: Any + 'static,
    F: Fn(KwArgs) -> Result<E> + Send + Sync + 'static,
{
    Box::new(move |kwargs: KwArgs| ctor(kwargs).map(boxed))
}

/// Parse an optional kwarg with `FromStr`.
pub fn parse_kwarg<T>(kwargs: &KwArgs, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    kwargs
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| GymError::InvalidArgument(format!("kwarg {key}={raw:?}: {e}")))
        })
        .transpose()
}

/// Parse a `"lo,hi"` kwarg.
pub fn parse_range(kwargs: &KwArgs, key: &str) -> Result<Option<(f64, f64)>> {
    let Some(raw) = kwargs.get(key) else { return Ok(None) };
    let bad = || GymError::InvalidArgument(format!("kwarg {key}={raw:?}: expected \"lo,hi\""));
    let (lo, hi) = raw.split_once(',').ok_or_else(bad)?;
    let lo = lo.trim().parse::<f64>().map_err(|_| bad())?;
    let hi = hi.trim().parse::<f64>().map_err(|_| bad())?;
    Ok(Some((lo, hi)))
}

/// Parse a comma-separated list kwarg, dropping empty items.
pub fn parse_list(kwargs: &KwArgs, key: &str) -> Option<Vec<String>> {
    kwargs.get(key).map(|raw| {
        raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
    })
}

/// Builds the faucet env and stacks the factor wrappers requested in kwargs:
/// `seed`, `random_init`, `max_path_length`, `object_size="lo,hi"`,
/// `table_textures="a,b"`.
fn make_faucet_open(kwargs: KwArgs) -> Result<BoxedEnv> {
    let defaults = SawyerConfig::default();
    let seed = parse_kwarg::<u64>(&kwargs, "seed")?;
    let config = SawyerConfig {
        random_init: parse_kwarg(&kwargs, "random_init")?.unwrap_or(defaults.random_init),
        max_path_length: parse_kwarg(&kwargs, "max_path_length")?.unwrap_or(defaults.max_path_length),
        seed,
        ..defaults
    };
    let env = kinematic_faucet_env(config)?;

    let size = parse_range(&kwargs, "object_size")?.map(|scale_range| ObjectSizeConfig { scale_range, seed });
    let texture = parse_list(&kwargs, "table_textures").map(|names| TableTextureConfig { seed, ..TableTextureConfig::new(names) });
    tracing::debug!(id = FAUCET_OPEN_ID, ?size, ?texture, "building environment");

    match (size, texture) {
        (None, None) => Ok(boxed(env)),
        (Some(s), None) => Ok(boxed(FactorWrapper::object_size(env, s)?)),
        (None, Some(t)) => Ok(boxed(FactorWrapper::table_texture(env, t)?)),
        (Some(s), Some(t)) => Ok(boxed(FactorWrapper::table_texture(FactorWrapper::object_size(env, s)?, t)?)),
    }
}

/// Register the environments shipped with this crate. Safe to call repeatedly.
pub fn register_builtin() -> Result<()> {
    if get_spec(FAUCET_OPEN_ID).is_some() {
        return Ok(());
    }
    let spec = EnvSpec {
        id: FAUCET_OPEN_ID.into(),
        max_episode_steps: Some(SawyerConfig::default().max_path_length),
        reward_threshold: None,
        nondeterministic: false,
        version: Some("2".into()),
    };
    match register(spec, Box::new(make_faucet_open)) {
        // lost a registration race with another thread
        Err(_) if get_spec(FAUCET_OPEN_ID).is_some() => Ok(()),
        other => other,
    }
}
