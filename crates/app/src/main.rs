//! Entry point for objview.
//! Demo selection, logging and backend/size flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use asset::{
    mesh::{VertexLayout, load_mesh},
    primitives,
    texture::{CubemapData, TextureData},
};
use corelib::{Animation, SceneController, SceneState, Shading};
use platform::{SceneAssets, WindowSettings};
use renderer::Material;

const USAGE: &str = "usage: objview <triangle | cube [texture] | mesh <obj> | textured <obj> [texture] | cubemap <obj> [cubemap_dir]> \
[--gpu-backend=auto|vulkan|dx12|metal|gl] [--size=WxH | --width=W --height=H]";

/// Which scene to show.
#[derive(Clone, Debug, PartialEq)]
enum Demo {
    Triangle,
    Cube { texture: Option<PathBuf> },
    Mesh { obj: PathBuf },
    Textured { obj: PathBuf, texture: Option<PathBuf> },
    Cubemap { obj: PathBuf, faces: Option<PathBuf> },
}

fn parse_backend_arg(args: &[String]) -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    let mut backends = wgpu::Backends::all(); // default = auto
    for arg in args {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => wgpu::Backends::all(),
                "vulkan" | "vk" => wgpu::Backends::VULKAN,
                "dx12" | "d3d12" => wgpu::Backends::DX12,
                "metal" | "mtl" => wgpu::Backends::METAL,
                "gl" | "opengl" | "gles" => wgpu::Backends::GL,
                other => {
                    log::warn!("Unknown backend '{}', falling back to auto.", other);
                    wgpu::Backends::all()
                }
            };
        }
    }
    backends
}

fn parse_size_args(args: &[String]) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

/// Positional arguments (anything not starting with `--`) pick the demo.
fn parse_demo(args: &[String]) -> Result<Demo> {
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));
    let Some(name) = positional.next() else {
        bail!("missing demo name\n{USAGE}");
    };
    let mut path = || positional.next().map(PathBuf::from);

    let demo = match name.as_str() {
        "triangle" => Demo::Triangle,
        "cube" => Demo::Cube { texture: path() },
        "mesh" => Demo::Mesh {
            obj: path().with_context(|| format!("mesh needs an OBJ path\n{USAGE}"))?,
        },
        "textured" => {
            let obj = path().with_context(|| format!("textured needs an OBJ path\n{USAGE}"))?;
            Demo::Textured {
                obj,
                texture: path(),
            }
        }
        "cubemap" => {
            let obj = path().with_context(|| format!("cubemap needs an OBJ path\n{USAGE}"))?;
            Demo::Cubemap { obj, faces: path() }
        }
        other => bail!("unknown demo '{other}'\n{USAGE}"),
    };
    Ok(demo)
}

/// Load everything the demo draws and the scene that animates it.
fn build_scene(demo: &Demo, width: u32, height: u32) -> Result<(SceneAssets, SceneController)> {
    let state = SceneState::new(width, height);
    let (mesh, material, state, animation) = match demo {
        Demo::Triangle => (
            primitives::triangle(),
            Material::VertexColor,
            state,
            Animation::None,
        ),
        Demo::Cube { texture } => (
            primitives::textured_cube(),
            Material::Texture2d(load_texture(texture.as_deref())?),
            state.with_shading(Shading::Textured),
            Animation::Spin,
        ),
        Demo::Textured { obj, texture } => (
            load_mesh(obj, VertexLayout::PositionNormalTexcoord)?,
            Material::Texture2d(load_texture(texture.as_deref())?),
            state.with_shading(Shading::Textured),
            Animation::None,
        ),
        Demo::Mesh { obj } => (
            load_mesh(obj, VertexLayout::PositionColor)?,
            Material::VertexColor,
            state,
            Animation::None,
        ),
        Demo::Cubemap { obj, faces } => {
            let cubemap = match faces {
                Some(dir) => CubemapData::load_dir(dir)?,
                None => {
                    log::info!("No cubemap directory given; using solid faces");
                    CubemapData::create_test_cubemap(64)
                }
            };
            (
                load_mesh(obj, VertexLayout::PositionNormal)?,
                Material::Cubemap(cubemap),
                state.with_shading(Shading::Color),
                Animation::None,
            )
        }
    };
    Ok((
        SceneAssets { mesh, material },
        SceneController::new(state, animation),
    ))
}

fn load_texture(path: Option<&Path>) -> Result<TextureData> {
    match path {
        Some(path) => TextureData::load(path),
        None => {
            log::info!("No texture given; using a checkerboard");
            Ok(TextureData::create_test_texture(256))
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let demo = parse_demo(&args)?;
    let backends = parse_backend_arg(&args);
    let (width, height) = parse_size_args(&args);
    log::info!(
        "Starting objview. Demo: {:?}, backend: {:?}, window_size={}x{}",
        demo,
        backends,
        width,
        height
    );

    let (assets, controller) = build_scene(&demo, width, height)?;
    let settings = WindowSettings {
        title: format!("objview - {}", assets.material.name()),
        width,
        height,
        backends,
    };
    platform::run(settings, assets, controller)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
