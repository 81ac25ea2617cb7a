// Core traits and types shared by environments, factor wrappers and tasks.

/// A small ordered info map returned alongside observations.
/// Keeps insertion order so episode summaries print predictably.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info {
    entries: Vec<(String, InfoValue)>,
}

impl Info {
    /// Create an empty Info map.
    pub fn new() -> Self { Self { entries: Vec::new() } }

    /// Insert or replace a key with the given value.
    pub fn insert<K: Into<String>, V: Into<InfoValue>>(&mut self, key: K, value: V) {
        let k = key.into();
        let value = value.into();
        if let Some((_, v)) = self.entries.iter_mut().find(|(kk, _)| kk == &k) {
            *v = value;
        } else {
            self.entries.push((k, value));
        }
    }

    /// Get a reference to a value by key.
    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Shortcut for numeric entries; integers and bools are widened.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            InfoValue::F64(v) => Some(*v),
            InfoValue::I64(v) => Some(*v as f64),
            InfoValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            InfoValue::Str(_) => None,
        }
    }

    /// Copy every entry of `other` into this map, overwriting duplicates.
    pub fn extend(&mut self, other: Info) {
        for (k, v) in other.entries {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }
}

/// Value types carried in info maps and factor records.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfoValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
}

impl From<bool> for InfoValue { fn from(v: bool) -> Self { InfoValue::Bool(v) } }
impl From<i64> for InfoValue { fn from(v: i64) -> Self { InfoValue::I64(v) } }
impl From<i32> for InfoValue { fn from(v: i32) -> Self { InfoValue::I64(v as i64) } }
impl From<u32> for InfoValue { fn from(v: u32) -> Self { InfoValue::I64(v as i64) } }
impl From<f64> for InfoValue { fn from(v: f64) -> Self { InfoValue::F64(v) } }
impl From<f32> for InfoValue { fn from(v: f32) -> Self { InfoValue::F64(v as f64) } }
impl From<&str> for InfoValue { fn from(v: &str) -> Self { InfoValue::Str(v.to_string()) } }
impl From<String> for InfoValue { fn from(v: String) -> Self { InfoValue::Str(v) } }

impl std::fmt::Display for InfoValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfoValue::Bool(v) => write!(f, "{v}"),
            InfoValue::I64(v) => write!(f, "{v}"),
            InfoValue::F64(v) => write!(f, "{v:.4}"),
            InfoValue::Str(v) => f.write_str(v),
        }
    }
}

/// A frame returned by `Env::render`.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderFrame {
    /// Textual description of the scene state.
    Text(String),
}

/// A step result from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<Obs> {
    pub observation: Obs,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

impl<Obs> Step<Obs> {
    pub fn new(observation: Obs, reward: f32, terminated: bool, truncated: bool, info: Info) -> Self {
        Self { observation, reward, terminated, truncated, info }
    }
}

/// Recoverable errors across environment, factor and registry APIs.
#[derive(thiserror::Error, Debug)]
pub enum GymError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),
    #[error("Environment not ready: {0}")]
    NotReady(String),
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    #[error("Unknown {kind} name: {name}")]
    UnknownName { kind: &'static str, name: String },
    #[error("Invalid value for factor {factor}: {reason}")]
    InvalidFactor { factor: &'static str, reason: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl GymError {
    pub(crate) fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        GymError::UnknownName { kind, name: name.into() }
    }
}

/// Convenience alias for results using GymError.
pub type Result<T> = std::result::Result<T, GymError>;

/// Core environment trait following the Gymnasium contract.
pub trait Env {
    type Obs;
    type Act;

    /// Reset the environment to an initial state.
    /// Implementations should re-seed internal RNGs when `seed` is provided.
    fn reset(&mut self, seed: Option<u64>) -> (Self::Obs, Info);

    /// Apply an action and advance the environment by one step.
    fn step(&mut self, action: Self::Act) -> Step<Self::Obs>;

    /// Render a frame of the current state, if supported.
    fn render(&self) -> Option<RenderFrame> { None }

    /// Close and release any external resources.
    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_insert_replaces_existing_key() {
        let mut info = Info::new();
        info.insert("success", 0.0);
        info.insert("near_object", true);
        info.insert("success", 1.0);
        assert_eq!(info.len(), 2);
        assert_eq!(info.get_f64("success"), Some(1.0));
        assert_eq!(info.get_f64("near_object"), Some(1.0));
        assert_eq!(info.iter().next().map(|(k, _)| k), Some("success"));
    }

    #[test]
    fn info_extend_overwrites() {
        let mut a = Info::new();
        a.insert("x", 1i64);
        let mut b = Info::new();
        b.insert("x", "two");
        b.insert("y", 3.5f32);
        a.extend(b);
        assert_eq!(a.get("x"), Some(&InfoValue::Str("two".into())));
        assert_eq!(a.get_f64("x"), None);
        assert_eq!(a.get_f64("y"), Some(3.5));
    }

    #[test]
    fn error_messages_name_the_offender() {
        let e = GymError::unknown("texture", "velvet");
        assert_eq!(e.to_string(), "Unknown texture name: velvet");
        let e = GymError::InvalidFactor { factor: "object_size", reason: "2.0 outside [0.4, 1.4]".into() };
        assert!(e.to_string().contains("object_size"));
    }
}
