use lantern_demos::scene::SCENE_NAMES;
use lantern_demos::{DemoError, HeadlessSurface, RenderLoop, SceneConfig};
use lantern_glfw::GlfwSurface;
use lantern_windowing::{WindowDim, WindowOpt};
use std::{path::PathBuf, process};
use structopt::StructOpt;

// frames rendered by a headless run when no limit is given
const HEADLESS_FRAMES: u64 = 60;

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  /// Scene to run.
  #[structopt(default_value = "pyramid")]
  scene: String,

  #[structopt(short, long, default_value = "lantern-demos/assets")]
  /// Directory where to pick shaders and textures from.
  assets: PathBuf,

  #[structopt(long, default_value = "800")]
  width: u32,

  #[structopt(long, default_value = "800")]
  height: u32,

  #[structopt(short, long)]
  /// Stop after that many frames.
  frames: Option<u64>,

  #[structopt(long)]
  /// Render with the recording backend instead of opening a window.
  headless: bool,

  #[structopt(short, long)]
  /// List available scenes.
  list_scenes: bool,
}

fn show_available_scenes() {
  println!("available scenes:");

  for name in SCENE_NAMES.iter() {
    println!("  - {}", name);
  }
}

fn run_scene(cli_opts: CLIOpts) -> Result<(), DemoError> {
  let scene = SceneConfig::by_name(&cli_opts.scene)
    .ok_or_else(|| DemoError::UnknownScene(cli_opts.scene.clone()))?;

  log::info!("running {}", scene.name);

  if cli_opts.headless {
    let surface = HeadlessSurface::new([cli_opts.width, cli_opts.height]);
    let frames = cli_opts.frames.unwrap_or(HEADLESS_FRAMES);
    let surface = RenderLoop::new(surface, scene, cli_opts.assets)
      .with_frame_limit(Some(frames))
      .run()?;

    let faults = surface.mock().faults();
    log::info!(
      "{} frames, {} driver calls, {} faults",
      surface.presented(),
      surface.mock().calls().len(),
      faults.len()
    );

    for fault in faults {
      log::warn!("{:?}", fault);
    }
  } else {
    let dim = WindowDim::Windowed(cli_opts.width, cli_opts.height);
    let surface = GlfwSurface::new(scene.name, WindowOpt::default().set_dim(dim))?;

    RenderLoop::new(surface, scene, cli_opts.assets)
      .with_frame_limit(cli_opts.frames)
      .run()?;
  }

  Ok(())
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if cli_opts.list_scenes {
    show_available_scenes();
  } else if let Err(e) = run_scene(cli_opts) {
    log::error!("{}", e);
    process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let opts = CLIOpts::from_iter(&["lantern-demos"]);

    assert_eq!(opts.scene, "pyramid");
    assert_eq!(opts.assets, PathBuf::from("lantern-demos/assets"));
    assert_eq!((opts.width, opts.height), (800, 800));
    assert_eq!(opts.frames, None);
    assert!(!opts.headless);
    assert!(!opts.list_scenes);
  }

  #[test]
  fn headless_quad() {
    let opts = CLIOpts::from_iter(&["lantern-demos", "quad", "--headless", "--frames", "3"]);

    assert_eq!(opts.scene, "quad");
    assert!(opts.headless);
    assert_eq!(opts.frames, Some(3));
  }

  #[test]
  fn unknown_scene() {
    let opts = CLIOpts::from_iter(&["lantern-demos", "cube", "--headless"]);

    match run_scene(opts) {
      Err(DemoError::UnknownScene(name)) => assert_eq!(name, "cube"),
      r => panic!("unexpected result: {:?}", r),
    }
  }
}
