use gym_factors::registry::{FAUCET_OPEN_ID, KwArgs, make, register_builtin};
use gym_factors::tasks::Action;
use gym_factors::{GymError, RenderFrame};
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), GymError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    register_builtin()?;
    let kwargs: KwArgs = [
        ("seed", "7"),
        ("random_init", "true"),
        ("max_path_length", "150"),
        ("object_size", "0.4,1.4"),
        ("table_textures", "wood,darkwood,marble,granite"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let mut env = make(FAUCET_OPEN_ID, kwargs)?;

    let mut rng = StdRng::seed_from_u64(7);
    let unit = Uniform::new_inclusive(-1.0f64, 1.0);

    for episode in 0..3u64 {
        let (_obs, info) = env.reset(Some(episode));
        let factors: Vec<String> = info.iter().filter(|(k, _)| k.starts_with("factor/")).map(|(k, v)| format!("{k}={v}")).collect();
        tracing::info!(episode, factors = ?factors, "episode start");

        let mut ret = 0.0f64;
        let mut successes = 0u32;
        loop {
            let action: Action = [unit.sample(&mut rng), unit.sample(&mut rng), unit.sample(&mut rng), unit.sample(&mut rng)];
            let step = env.step(Box::new(action))?;
            ret += step.reward as f64;
            if step.info.get_f64("success") == Some(1.0) {
                successes += 1;
            }
            if step.terminated || step.truncated {
                break;
            }
        }
        if let Some(RenderFrame::Text(frame)) = env.render() {
            tracing::info!(episode, ret, successes, %frame, "episode end");
        }
    }
    env.close();
    Ok(())
}
