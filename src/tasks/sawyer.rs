use nalgebra::Vector3;

use crate::core::{Env, GymError, Info, RenderFrame, Result, Step};
use crate::sim::{FactorRecord, SimModel, Simulated, Simulator};
use crate::spaces::{BoxSpace, Space};
use crate::utils::rng::{DEFAULT_SEED, RngStream, rng_from_seed};

/// Length of a Sawyer observation vector.
pub const OBS_DIM: usize = 39;
/// Hand (3) + gripper (1) + two padded objects of position and quaternion (14).
const FRAME_DIM: usize = 18;
const GOAL_OFFSET: usize = 2 * FRAME_DIM;
/// Settling iterations used to drive the hand to its initial pose.
const HAND_RESET_ITERS: usize = 50;

pub type Observation = [f64; OBS_DIM];
/// xyz hand displacement in [-1, 1] followed by gripper effort.
pub type Action = [f64; 4];
type Frame = [f64; FRAME_DIM];

/// Base environment configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SawyerConfig {
    pub max_path_length: u32,
    pub frame_skip: usize,
    pub action_scale: f64,
    /// Sample the object position from the task's reset space on every reset.
    pub random_init: bool,
    /// Hide the goal position (zeros in the last three observation slots).
    pub partially_observable: bool,
    /// Mocap bounds; the task's hand bounds when unset.
    pub mocap_low: Option<[f64; 3]>,
    pub mocap_high: Option<[f64; 3]>,
    pub seed: Option<u64>,
}

impl Default for SawyerConfig {
    fn default() -> Self {
        Self {
            max_path_length: 500,
            frame_skip: 5,
            action_scale: 1.0 / 100.0,
            random_init: false,
            partially_observable: true,
            mocap_low: None,
            mocap_high: None,
            seed: None,
        }
    }
}

/// Geometry available to a task when it scores a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardContext {
    pub tcp_center: Vector3<f64>,
    /// TCP position right after the hand was reset.
    pub init_tcp: Vector3<f64>,
}

/// A manipulation skill scored inside a [`SawyerXyzEnv`].
pub trait Task {
    fn name(&self) -> &'static str;

    /// Root body of the manipulated object.
    fn object_name(&self) -> Option<&str> { None }

    fn hand_init_pos(&self) -> Vector3<f64>;
    fn hand_space(&self) -> &BoxSpace<f64, 3>;
    fn random_reset_space(&self) -> &BoxSpace<f64, 3>;

    /// Fail early when the model lacks bodies or sites the task reads.
    fn check_model<M: SimModel>(&self, _model: &M) -> Result<()> { Ok(()) }

    /// Place the object and goal for a new episode. `sampled` is set when
    /// random initialisation is enabled.
    fn reset_model<M: SimModel>(&mut self, model: &mut M, sampled: Option<Vector3<f64>>) -> Result<()>;

    fn object_pos<M: SimModel>(&self, model: &M) -> Result<Vector3<f64>>;
    fn object_quat<M: SimModel>(&self, model: &M) -> Result<[f64; 4]>;

    fn target_pos(&self) -> Vector3<f64>;

    /// Visual goal markers and where to put them.
    fn target_sites(&self) -> Vec<(&'static str, Vector3<f64>)> { Vec::new() }

    fn evaluate_state(&self, obs: &Observation, action: &Action, ctx: &RewardContext) -> Result<(f64, Info)>;
}

/// Sawyer arm env with mocap xyz control, generic over the physics backend
/// and the task being scored.
pub struct SawyerXyzEnv<S: Simulator, T: Task> {
    sim: S,
    task: T,
    config: SawyerConfig,
    rng: RngStream,
    factors: FactorRecord,
    mocap_space: BoxSpace<f64, 3>,
    mocap: Vector3<f64>,
    init_tcp: Vector3<f64>,
    curr_path_length: u32,
    prev_frame: Frame,
    last_obs: Observation,
}

impl<S: Simulator, T: Task> SawyerXyzEnv<S, T> {
    pub fn new(sim: S, task: T, config: SawyerConfig) -> Result<Self> {
        if config.max_path_length == 0 || config.frame_skip == 0 {
            return Err(GymError::InvalidArgument("max_path_length and frame_skip must be positive".into()));
        }
        if !(config.action_scale > 0.0) {
            return Err(GymError::InvalidArgument(format!("action_scale must be positive, got {}", config.action_scale)));
        }
        task.check_model(sim.model())?;
        let low = config.mocap_low.unwrap_or(*task.hand_space().low());
        let high = config.mocap_high.unwrap_or(*task.hand_space().high());
        let mocap_space = BoxSpace::try_new(low, high)?;
        let hand = task.hand_init_pos();
        Ok(Self {
            sim,
            task,
            rng: rng_from_seed(config.seed.unwrap_or(DEFAULT_SEED)),
            config,
            factors: FactorRecord::new(),
            mocap_space,
            mocap: hand,
            init_tcp: hand,
            curr_path_length: 0,
            prev_frame: [0.0; FRAME_DIM],
            last_obs: [0.0; OBS_DIM],
        })
    }

    pub fn sim(&self) -> &S { &self.sim }
    pub fn sim_mut(&mut self) -> &mut S { &mut self.sim }
    pub fn task(&self) -> &T { &self.task }
    pub fn config(&self) -> &SawyerConfig { &self.config }
    pub fn curr_path_length(&self) -> u32 { self.curr_path_length }
    pub fn init_tcp(&self) -> Vector3<f64> { self.init_tcp }
    pub fn tcp_center(&self) -> Vector3<f64> { self.sim.tcp_center() }

    fn reset_hand(&mut self) {
        let home = self.task.hand_init_pos();
        for _ in 0..HAND_RESET_ITERS {
            self.sim.set_mocap_pos(home);
            self.sim.set_gripper_effort(-1.0);
            self.sim.advance(self.config.frame_skip);
        }
        self.mocap = home;
        self.init_tcp = self.sim.tcp_center();
    }

    fn place_target_sites(&mut self) {
        let model = self.sim.model_mut();
        for (name, pos) in self.task.target_sites() {
            let placed = match model.site_id(name) {
                Some(id) => model.set_site_pos(id, pos),
                None => Err(GymError::unknown("site", name)),
            };
            if let Err(e) = placed {
                tracing::debug!(task = self.task.name(), site = name, error = %e, "target site not placed");
            }
        }
    }

    fn current_frame(&self) -> Frame {
        let mut frame = [0.0; FRAME_DIM];
        let hand = self.sim.hand_pos();
        frame[..3].copy_from_slice(hand.as_slice());
        frame[3] = self.sim.gripper_distance().clamp(0.0, 1.0);
        let model = self.sim.model();
        match (self.task.object_pos(model), self.task.object_quat(model)) {
            (Ok(pos), Ok(quat)) => {
                frame[4..7].copy_from_slice(pos.as_slice());
                frame[7..11].copy_from_slice(&quat);
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(task = self.task.name(), error = %e, "object pose unavailable");
            }
        }
        frame
    }

    fn assemble(&self, frame: &Frame) -> Observation {
        let mut obs = [0.0; OBS_DIM];
        obs[..FRAME_DIM].copy_from_slice(frame);
        obs[FRAME_DIM..GOAL_OFFSET].copy_from_slice(&self.prev_frame);
        if !self.config.partially_observable {
            obs[GOAL_OFFSET..].copy_from_slice(self.task.target_pos().as_slice());
        }
        obs
    }
}

impl<S: Simulator, T: Task> Env for SawyerXyzEnv<S, T> {
    type Obs = Observation;
    type Act = Action;

    fn reset(&mut self, seed: Option<u64>) -> (Observation, Info) {
        if let Some(s) = seed {
            self.rng = rng_from_seed(s);
        }
        self.curr_path_length = 0;
        self.sim.reset();
        self.reset_hand();

        let sampled = self
            .config
            .random_init
            .then(|| BoxSpace::to_vector(self.task.random_reset_space().sample(&mut self.rng)));
        if let Err(e) = self.task.reset_model(self.sim.model_mut(), sampled) {
            tracing::error!(task = self.task.name(), error = %e, "task reset failed");
        }
        self.place_target_sites();

        let frame = self.current_frame();
        self.prev_frame = frame;
        self.last_obs = self.assemble(&frame);
        (self.last_obs, self.factors.to_info())
    }

    fn step(&mut self, action: Action) -> Step<Observation> {
        if self.curr_path_length >= self.config.max_path_length {
            tracing::warn!(task = self.task.name(), "step past max_path_length; reset the environment");
            return Step::new(self.last_obs, 0.0, false, true, Info::new());
        }
        if action.iter().any(|a| a.is_nan()) {
            tracing::warn!(task = self.task.name(), ?action, "NaN action component treated as zero");
        }
        let action = action.map(|a| if a.is_nan() { 0.0 } else { a.clamp(-1.0, 1.0) });

        let delta = Vector3::new(action[0], action[1], action[2]) * self.config.action_scale;
        self.mocap = self.mocap_space.clamp_vector(self.mocap + delta);
        self.sim.set_mocap_pos(self.mocap);
        self.sim.set_gripper_effort(action[3]);
        self.sim.advance(self.config.frame_skip);
        self.curr_path_length += 1;

        let frame = self.current_frame();
        let obs = self.assemble(&frame);
        self.prev_frame = frame;
        self.last_obs = obs;

        let ctx = RewardContext { tcp_center: self.sim.tcp_center(), init_tcp: self.init_tcp };
        let (reward, info) = self.task.evaluate_state(&obs, &action, &ctx).unwrap_or_else(|e| {
            tracing::error!(task = self.task.name(), error = %e, "reward evaluation failed");
            (0.0, Info::new())
        });
        let truncated = self.curr_path_length >= self.config.max_path_length;
        Step::new(obs, reward as f32, false, truncated, info)
    }

    fn render(&self) -> Option<RenderFrame> {
        Some(RenderFrame::Text(format!(
            "{} step={}/{} {}",
            self.task.name(),
            self.curr_path_length,
            self.config.max_path_length,
            self.sim.describe()
        )))
    }
}

impl<S: Simulator, T: Task> Simulated for SawyerXyzEnv<S, T> {
    type Model = S::Model;

    fn model(&self) -> &S::Model { self.sim.model() }
    fn model_mut(&mut self) -> &mut S::Model { self.sim.model_mut() }
    fn factors(&self) -> &FactorRecord { &self.factors }
    fn factors_mut(&mut self) -> &mut FactorRecord { &mut self.factors }
    fn object_name(&self) -> Option<&str> { self.task.object_name() }
}
