use gym_factors::tasks::{Action, OBS_DIM};
use gym_factors::{Env, SawyerConfig, Simulator, Step, kinematic_faucet_env};

// Two envs with the same seed and actions produce identical rollouts.
#[test]
fn seeded_rollouts_match() {
    let config = SawyerConfig { random_init: true, ..SawyerConfig::default() };
    let mut a = kinematic_faucet_env(config.clone()).unwrap();
    let mut b = kinematic_faucet_env(config).unwrap();
    let (oa, _) = a.reset(Some(42));
    let (ob, _) = b.reset(Some(42));
    assert_eq!(oa, ob);

    let actions: [Action; 4] = [[1.0, 0.0, 0.0, -1.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, -1.0, 1.0], [3.0, -3.0, 0.0, 0.0]];
    for act in actions {
        let sa: Step<_> = a.step(act);
        let sb = b.step(act);
        assert_eq!(sa.observation, sb.observation);
        assert_eq!(sa.reward, sb.reward);
        assert_eq!(sa.info, sb.info);
    }
}

#[test]
fn hand_moves_by_scaled_clipped_action_and_stays_in_bounds() {
    let mut env = kinematic_faucet_env(SawyerConfig::default()).unwrap();
    let (obs, _) = env.reset(Some(0));
    assert_eq!(obs.len(), OBS_DIM);
    let start = [obs[0], obs[1], obs[2]];

    // clipped to 1.0, scaled by 1/100
    let s = env.step([5.0, 0.0, 0.0, 0.0]);
    assert!((s.observation[0] - (start[0] + 0.01)).abs() < 1e-12);
    // previous frame lives in the second block
    assert_eq!(&s.observation[18..21], &start);

    for _ in 0..200 {
        env.step([0.0, -1.0, -1.0, 0.0]);
    }
    let pos = env.sim().hand_pos();
    assert!((pos.y - 0.40).abs() < 1e-12);
    assert!((pos.z + 0.15).abs() < 1e-12);
}

#[test]
fn episode_truncates_at_max_path_length() {
    let mut env = kinematic_faucet_env(SawyerConfig { max_path_length: 3, ..SawyerConfig::default() }).unwrap();
    env.reset(Some(1));
    let flags: Vec<bool> = (0..3).map(|_| env.step([0.0; 4]).truncated).collect();
    assert_eq!(flags, vec![false, false, true]);

    let past = env.step([1.0, 0.0, 0.0, 0.0]);
    assert!(past.truncated);
    assert_eq!(past.reward, 0.0);
    assert_eq!(env.curr_path_length(), 3);

    env.reset(None);
    assert_eq!(env.curr_path_length(), 0);
}

#[test]
fn nan_action_components_do_not_move_the_hand() {
    let mut env = kinematic_faucet_env(SawyerConfig::default()).unwrap();
    let (obs, _) = env.reset(Some(0));

    let s = env.step([f64::NAN, 1.0, 0.0, f64::NAN]);
    assert!(s.observation.iter().all(|v| v.is_finite()));
    assert!((s.observation[0] - obs[0]).abs() < 1e-12);
    assert!((s.observation[1] - (obs[1] + 0.01)).abs() < 1e-12);
    assert!((s.observation[2] - obs[2]).abs() < 1e-12);
}
