use bopt_optimizer::{bayes_opt, Bounds, Surrogate};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("Bayesian optimization of f(x) = -(x - 2)^2 over [-10, 10]");

    let objective = |x: f64| -(x - 2.0).powi(2);
    let bounds = Bounds::new(-10.0, 10.0)?;
    let known_points = [-5.0, 0.0, 5.0];

    let outcome = bayes_opt(&known_points, &objective, 5, bounds)?;

    for record in &outcome.iterations {
        println!(
            "iteration {}: x = {:>9.5}  f(x) = {:>10.5}  EI = {:.3e}  running max = {:.5}",
            record.iteration, record.x, record.y, record.expected_improvement, record.running_max
        );
    }

    if let Some(best) = outcome.best_observation() {
        println!("best observed point: f({:.5}) = {:.5}", best.x, best.y);
    }
    println!("model trained on {} points", outcome.model.n_samples());

    let (running_max, points, recorded, _model) = outcome.into_parts();
    println!("running max: {running_max:.5}");
    println!("known points: {points:?}");
    println!("recorded values: {recorded:?}");

    Ok(())
}
