pub mod faucet_open;
pub mod reward;
pub mod sawyer;

pub use faucet_open::{FaucetOpenEnv, FaucetReward, SawyerFaucetOpenV2, kinematic_faucet_env};
pub use reward::{Sigmoid, hamacher_product, tolerance, tolerance_with};
pub use sawyer::{Action, OBS_DIM, Observation, RewardContext, SawyerConfig, SawyerXyzEnv, Task};
