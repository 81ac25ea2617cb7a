pub mod core;
pub mod registry;
pub mod sim;
pub mod spaces;
pub mod tasks;
pub mod utils;
pub mod wrappers;

pub use crate::core::{Env, GymError, Info, InfoValue, RenderFrame, Result, Step};
pub use crate::registry::{EnvSpec, KwArgs, get_spec, make, register, register_builtin};
pub use crate::sim::{FactorRecord, KinematicSim, SceneModel, SimModel, Simulated, Simulator};
pub use crate::spaces::{BoxSpace, Discrete, Space};
pub use crate::tasks::{FaucetOpenEnv, SawyerConfig, SawyerFaucetOpenV2, SawyerXyzEnv, Task, kinematic_faucet_env};
pub use crate::wrappers::{
    Factor, FactorWrapper, ObjectSizeConfig, ObjectSizeWrapper, TableTextureConfig, TableTextureWrapper,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacked_factors_reach_the_same_scene() {
        let env = kinematic_faucet_env(SawyerConfig::default()).unwrap();
        let env = ObjectSizeWrapper::object_size(env, ObjectSizeConfig::default()).unwrap();
        let mut env =
            TableTextureWrapper::table_texture(env, TableTextureConfig::new(["marble", "granite"])).unwrap();
        assert_eq!(env.object_name(), Some("faucetBase"));

        let (obs, info) = env.reset(Some(11));
        assert_eq!(obs.len(), tasks::OBS_DIM);
        assert!(info.get("factor/object_size").is_some());
        assert!(info.get("factor/table_texture").is_some());
        assert_eq!(env.factors().iter().count(), 2);

        let s = env.step([0.5, 0.5, 0.0, 0.0]);
        assert!(!s.terminated);
        assert!(matches!(env.render(), Some(RenderFrame::Text(_))));
    }
}
