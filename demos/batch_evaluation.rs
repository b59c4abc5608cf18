use decimath_rs::{Engine, EngineConfig};

fn main() {
    pretty_env_logger::init();

    let engine = Engine::with_config(EngineConfig {
        cache_capacity: 16,
        ..EngineConfig::default()
    });

    let prices = ["19.99", "5.25", "120", "0.10"];
    let owned: Vec<String> = prices
        .iter()
        .map(|price| format!("round(({} * 1.0825) * 100) / 100", price))
        .chain(std::iter::once("1 / 0".to_string()))
        .collect();
    let expressions: Vec<&str> = owned.iter().map(String::as_str).collect();

    for (i, (expression, result)) in expressions
        .iter()
        .zip(engine.evaluate_batch(&expressions))
        .enumerate()
    {
        match result {
            Ok(value) => println!("Result {}: {} = {}", i, expression, value),
            Err(err) => println!("Result {}: {}", i, err.render(expression)),
        }
    }
    println!("{} expression(s) cached", engine.cached_expressions());
}
