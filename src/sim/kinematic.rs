use nalgebra::Vector3;

use crate::sim::{SceneModel, Simulator};

/// Gripper pad separation when fully open, in metres.
const MAX_GRIPPER_OPENING: f64 = 0.1;
/// Opening change per substep at full effort.
const GRIPPER_RATE: f64 = 0.002;

/// Kinematic stand-in for a physics engine.
///
/// The hand tracks the mocap target exactly and the gripper opening integrates
/// effort. Nothing collides and objects only move when the model is edited.
/// Useful for exercising wrappers and reward code without a physics backend.
#[derive(Clone, Debug)]
pub struct KinematicSim {
    model: SceneModel,
    home: Vector3<f64>,
    hand: Vector3<f64>,
    mocap: Vector3<f64>,
    effort: f64,
    opening: f64,
}

impl KinematicSim {
    pub fn new(model: SceneModel, home: Vector3<f64>) -> Self {
        Self { model, home, hand: home, mocap: home, effort: 0.0, opening: 0.0 }
    }

    pub fn mocap_pos(&self) -> Vector3<f64> { self.mocap }
}

impl Simulator for KinematicSim {
    type Model = SceneModel;

    fn model(&self) -> &SceneModel { &self.model }
    fn model_mut(&mut self) -> &mut SceneModel { &mut self.model }

    fn reset(&mut self) {
        self.hand = self.home;
        self.mocap = self.home;
        self.effort = 0.0;
        self.opening = 0.0;
    }

    fn set_mocap_pos(&mut self, pos: Vector3<f64>) { self.mocap = pos; }

    fn set_gripper_effort(&mut self, effort: f64) { self.effort = effort.clamp(-1.0, 1.0); }

    fn advance(&mut self, substeps: usize) {
        for _ in 0..substeps {
            self.hand = self.mocap;
            // positive effort closes the gripper, as on the Sawyer
            self.opening = (self.opening - self.effort * GRIPPER_RATE).clamp(0.0, MAX_GRIPPER_OPENING);
        }
    }

    fn hand_pos(&self) -> Vector3<f64> { self.hand }

    fn tcp_center(&self) -> Vector3<f64> { self.hand }

    fn gripper_distance(&self) -> f64 { self.opening / MAX_GRIPPER_OPENING }
}
