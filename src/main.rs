//! `glowgrid [OPTIONS.toml]`: open a window showing the sphere grid.

use std::path::Path;

use glowgrid::options::Options;
use glowgrid::{GlowGridError, Viewer};

fn run() -> Result<(), GlowGridError> {
    let options = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading options from {path}");
            Options::load(Path::new(&path))?
        }
        None => Options::default(),
    };
    Viewer::builder().with_options(options).build().run()
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
