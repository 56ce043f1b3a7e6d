mod bvh;
mod canvas;
mod color;
mod error;
mod extremes;
mod lights;
mod mesh;
mod primitives;
mod ray;
mod renderer;
mod scene;
mod view;

use std::path::Path;
use std::process::ExitCode;

use error::RenderError;
use scene::Scene;

const SPEC_PATH: &str = "SPEC/image.json";
const OUTPUT_PATH: &str = "./output.ppm";

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), RenderError> {
    let spec_path = Path::new(SPEC_PATH);
    let scene = Scene::load(spec_path)?;

    log::info!(
        "rendering {}x{} ({} primitives)",
        scene.width,
        scene.height,
        scene.primitives.len()
    );

    let canvas = renderer::render(&scene);

    let final_canvas = if scene.ssaa {
        canvas.ssaa_downsample()
    } else {
        canvas
    };

    final_canvas.write_ppm(Path::new(OUTPUT_PATH))?;

    log::info!("wrote {OUTPUT_PATH}");
    Ok(())
}
