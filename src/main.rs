use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    let model_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "model.obj".to_string());

    brae::viewer(model_path).run();
    Ok(())
}
