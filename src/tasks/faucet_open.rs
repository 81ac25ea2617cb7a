use nalgebra::Vector3;

use crate::core::{GymError, Info, Result};
use crate::sim::{KinematicSim, SimModel, scenes};
use crate::spaces::BoxSpace;
use crate::tasks::reward::{Sigmoid, tolerance};
use crate::tasks::sawyer::{Action, Observation, RewardContext, SawyerConfig, SawyerXyzEnv, Task};

pub const FAUCET_BASE_BODY: &str = "faucetBase";
pub const HANDLE_SITE: &str = "handleStartOpen";

const HANDLE_LENGTH: f64 = 0.175;
const TARGET_RADIUS: f64 = 0.07;
const REACH_RADIUS: f64 = 0.01;
/// Target sits this far above the base, at handle height.
const TARGET_HEIGHT: f64 = 0.125;
/// Offsets from the handle site to the point the reward tracks.
const SITE_TO_OBJ: [f64; 3] = [0.0, 0.0, -0.01];
const OBJ_TO_GRIP: [f64; 3] = [-0.04, 0.0, 0.03];
/// Parking spot for the unused closing goal marker.
const GOAL_CLOSE_PARKED: [f64; 3] = [10.0, 10.0, 10.0];

/// Components of the faucet-open reward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaucetReward {
    pub reward: f64,
    pub tcp_to_obj: f64,
    pub tcp_opened: f64,
    pub target_to_obj: f64,
    pub object_grasped: f64,
    pub in_place: f64,
}

/// Rotate a faucet handle open by pushing it sideways.
#[derive(Clone, Debug)]
pub struct SawyerFaucetOpenV2 {
    hand_space: BoxSpace<f64, 3>,
    random_reset_space: BoxSpace<f64, 3>,
    hand_init_pos: Vector3<f64>,
    obj_init_pos: Vector3<f64>,
    target_pos: Vector3<f64>,
}

pub type FaucetOpenEnv<S> = SawyerXyzEnv<S, SawyerFaucetOpenV2>;

impl Default for SawyerFaucetOpenV2 {
    fn default() -> Self { Self::new() }
}

impl SawyerFaucetOpenV2 {
    pub fn new() -> Self {
        let obj_init_pos = Vector3::new(0.0, 0.8, 0.0);
        Self {
            hand_space: BoxSpace::new([-0.5, 0.40, -0.15], [0.5, 1.0, 0.5]),
            random_reset_space: BoxSpace::new([-0.05, 0.8, 0.0], [0.05, 0.85, 0.0]),
            hand_init_pos: Vector3::new(0.0, 0.4, 0.2),
            obj_init_pos,
            target_pos: Self::target_for(obj_init_pos),
        }
    }

    fn target_for(obj_init_pos: Vector3<f64>) -> Vector3<f64> {
        obj_init_pos + Vector3::new(HANDLE_LENGTH, 0.0, TARGET_HEIGHT)
    }

    pub fn obj_init_pos(&self) -> Vector3<f64> { self.obj_init_pos }

    pub fn compute_reward(&self, obs: &Observation, ctx: &RewardContext) -> Result<FaucetReward> {
        let obj = Vector3::new(obs[4], obs[5], obs[6]) + Vector3::from(OBJ_TO_GRIP);
        let target = self.target_pos;

        let target_to_obj = (obj - target).norm();
        let target_to_obj_init = (self.obj_init_pos - target).norm();
        let in_place = tolerance(
            target_to_obj,
            (0.0, TARGET_RADIUS),
            (target_to_obj_init - TARGET_RADIUS).abs(),
            Sigmoid::LongTail,
        )?;

        let tcp_to_obj = (obj - ctx.tcp_center).norm();
        let tcp_to_obj_init = (self.obj_init_pos - ctx.init_tcp).norm();
        let reach = tolerance(
            tcp_to_obj,
            (0.0, REACH_RADIUS),
            (tcp_to_obj_init - REACH_RADIUS).abs(),
            Sigmoid::Gaussian,
        )?;

        let shaped = 2.0 * (2.0 * reach + 3.0 * in_place);
        let reward = if target_to_obj <= TARGET_RADIUS { 10.0 } else { shaped };

        Ok(FaucetReward {
            reward,
            tcp_to_obj,
            tcp_opened: 0.0,
            target_to_obj,
            object_grasped: reach,
            in_place,
        })
    }
}

impl Task for SawyerFaucetOpenV2 {
    fn name(&self) -> &'static str { "faucet-open-v2" }

    fn object_name(&self) -> Option<&str> { Some(FAUCET_BASE_BODY) }

    fn hand_init_pos(&self) -> Vector3<f64> { self.hand_init_pos }
    fn hand_space(&self) -> &BoxSpace<f64, 3> { &self.hand_space }
    fn random_reset_space(&self) -> &BoxSpace<f64, 3> { &self.random_reset_space }

    fn check_model<M: SimModel>(&self, model: &M) -> Result<()> {
        model.body_id(FAUCET_BASE_BODY).ok_or_else(|| GymError::unknown("body", FAUCET_BASE_BODY))?;
        model.site_id(HANDLE_SITE).ok_or_else(|| GymError::unknown("site", HANDLE_SITE))?;
        Ok(())
    }

    fn reset_model<M: SimModel>(&mut self, model: &mut M, sampled: Option<Vector3<f64>>) -> Result<()> {
        let base = model.body_id(FAUCET_BASE_BODY).ok_or_else(|| GymError::unknown("body", FAUCET_BASE_BODY))?;
        if let Some(pos) = sampled {
            model.set_body_pos(base, pos)?;
        }
        // the model is authoritative so scene edits made by wrappers are honoured
        self.obj_init_pos = model.body_pos(base).ok_or_else(|| GymError::unknown("body id", base.to_string()))?;
        self.target_pos = Self::target_for(self.obj_init_pos);
        Ok(())
    }

    fn object_pos<M: SimModel>(&self, model: &M) -> Result<Vector3<f64>> {
        let site = model.site_pos_by_name(HANDLE_SITE).ok_or_else(|| GymError::unknown("site", HANDLE_SITE))?;
        Ok(site + Vector3::from(SITE_TO_OBJ))
    }

    fn object_quat<M: SimModel>(&self, model: &M) -> Result<[f64; 4]> {
        model
            .body_id(FAUCET_BASE_BODY)
            .and_then(|id| model.body_quat(id))
            .ok_or_else(|| GymError::unknown("body", FAUCET_BASE_BODY))
    }

    fn target_pos(&self) -> Vector3<f64> { self.target_pos }

    fn target_sites(&self) -> Vec<(&'static str, Vector3<f64>)> {
        vec![("goal_open", self.target_pos), ("goal_close", Vector3::from(GOAL_CLOSE_PARKED))]
    }

    fn evaluate_state(&self, obs: &Observation, _action: &Action, ctx: &RewardContext) -> Result<(f64, Info)> {
        let r = self.compute_reward(obs, ctx)?;
        let mut info = Info::new();
        info.insert("success", if r.target_to_obj <= TARGET_RADIUS { 1.0 } else { 0.0 });
        info.insert("near_object", if r.tcp_to_obj <= REACH_RADIUS { 1.0 } else { 0.0 });
        info.insert("grasp_success", 1.0);
        info.insert("grasp_reward", r.object_grasped);
        info.insert("in_place_reward", r.in_place);
        info.insert("obj_to_target", r.target_to_obj);
        info.insert("unscaled_reward", r.reward);
        Ok((r.reward, info))
    }
}

/// Faucet-open env on the kinematic simulator and the built-in faucet scene.
pub fn kinematic_faucet_env(config: SawyerConfig) -> Result<FaucetOpenEnv<KinematicSim>> {
    let task = SawyerFaucetOpenV2::new();
    let sim = KinematicSim::new(scenes::sawyer_faucet()?, task.hand_init_pos());
    SawyerXyzEnv::new(sim, task, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Env;
    use crate::sim::Simulated;

    fn env(config: SawyerConfig) -> FaucetOpenEnv<KinematicSim> {
        kinematic_faucet_env(config).unwrap()
    }

    fn move_handle(env: &mut FaucetOpenEnv<KinematicSim>, obj: Vector3<f64>) {
        let site = env.model().site_id(HANDLE_SITE).unwrap();
        env.model_mut().set_site_pos(site, obj - Vector3::from(OBJ_TO_GRIP) - Vector3::from(SITE_TO_OBJ)).unwrap();
    }

    #[test]
    fn reward_is_ten_inside_target_radius() {
        let mut env = env(SawyerConfig::default());
        env.reset(Some(0));
        let target = env.task().target_pos();
        assert!((target - Vector3::new(0.175, 0.8, 0.125)).norm() < 1e-12);

        move_handle(&mut env, target + Vector3::new(0.0, 0.0, 0.5 * TARGET_RADIUS));
        let s = env.step([0.0; 4]);
        assert_eq!(s.reward, 10.0);
        assert_eq!(s.info.get_f64("success"), Some(1.0));
        assert_eq!(s.info.get_f64("unscaled_reward"), Some(10.0));
    }

    #[test]
    fn shaped_reward_outside_target_is_bounded() {
        let mut env = env(SawyerConfig::default());
        env.reset(Some(0));
        let s = env.step([0.0; 4]);
        assert!(s.reward > 0.0 && s.reward < 10.0, "reward {}", s.reward);
        assert_eq!(s.info.get_f64("success"), Some(0.0));
        assert_eq!(s.info.get_f64("near_object"), Some(0.0));
        assert_eq!(s.info.get_f64("grasp_success"), Some(1.0));
        let dist = s.info.get_f64("obj_to_target").unwrap();
        assert!(dist > TARGET_RADIUS);
    }

    #[test]
    fn reaching_the_handle_raises_reward() {
        let task = SawyerFaucetOpenV2::new();
        let mut obs = [0.0; 39];
        obs[4..7].copy_from_slice(&[0.0, 0.625, 0.115]);
        let obj = Vector3::new(0.0, 0.625, 0.115) + Vector3::from(OBJ_TO_GRIP);
        let init_tcp = Vector3::new(0.0, 0.4, 0.2);
        let far = task.compute_reward(&obs, &RewardContext { tcp_center: init_tcp, init_tcp }).unwrap();
        let near = task.compute_reward(&obs, &RewardContext { tcp_center: obj, init_tcp }).unwrap();
        assert!(near.reward > far.reward);
        assert_eq!(near.object_grasped, 1.0);
        assert!(near.tcp_to_obj < 1e-12);
    }

    #[test]
    fn random_init_moves_base_and_target() {
        let mut env = env(SawyerConfig { random_init: true, ..SawyerConfig::default() });
        for seed in 0..10 {
            env.reset(Some(seed));
            let base = env.task().obj_init_pos();
            assert!((-0.05..=0.05).contains(&base.x));
            assert!((0.8..=0.85).contains(&base.y));
            let goal = env.model().site_pos_by_name("goal_open").unwrap();
            assert!((goal - (base + Vector3::new(HANDLE_LENGTH, 0.0, TARGET_HEIGHT))).norm() < 1e-12);
        }
    }

    #[test]
    fn goal_is_hidden_unless_fully_observable() {
        let mut hidden = env(SawyerConfig::default());
        let (obs, _) = hidden.reset(Some(1));
        assert_eq!(&obs[36..], &[0.0, 0.0, 0.0]);

        let mut visible = env(SawyerConfig { partially_observable: false, ..SawyerConfig::default() });
        let (obs, _) = visible.reset(Some(1));
        assert_eq!(&obs[36..], visible.task().target_pos().as_slice());
    }

    #[test]
    fn check_model_rejects_scenes_without_a_faucet() {
        let task = SawyerFaucetOpenV2::new();
        let sim = KinematicSim::new(crate::sim::SceneModel::new(), task.hand_init_pos());
        let err = SawyerXyzEnv::new(sim, task, SawyerConfig::default()).err().unwrap();
        assert!(matches!(err, GymError::UnknownName { kind: "body", .. }));
    }
}
