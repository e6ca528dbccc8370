//! Entry point: logging, CLI flags, then hand over to the platform loop.

use std::path::PathBuf;

use anyhow::Result;
use platform::RunConfig;

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

/// `--name` or `--name=on|off`; absent means off.
fn parse_switch_arg(args: &[String], name: &str) -> bool {
    let bare = format!("--{name}");
    let prefix = format!("--{name}=");
    let mut enabled = false;
    for arg in args {
        if *arg == bare {
            enabled = true;
        } else if let Some(val) = arg.strip_prefix(&prefix) {
            enabled = matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    enabled
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

    let ww = w.unwrap_or(platform::DEFAULT_WIDTH).max(1);
    let hh = h.unwrap_or(platform::DEFAULT_HEIGHT).max(1);
    (ww, hh)
}

fn parse_path_arg(args: &[String], name: &str) -> Option<PathBuf> {
    let prefix = format!("--{name}=");
    args.iter()
        .rev()
        .find_map(|arg| arg.strip_prefix(&prefix))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn parse_config(args: &[String]) -> RunConfig {
    let defaults = RunConfig::default();
    let (width, height) = parse_size_args(args);
    RunConfig {
        backends: parse_backend_arg(args),
        width,
        height,
        x_mesh: parse_path_arg(args, "x-mesh").unwrap_or(defaults.x_mesh),
        o_mesh: parse_path_arg(args, "o-mesh").unwrap_or(defaults.o_mesh),
        show_tiles: parse_switch_arg(args, "show-tiles"),
        show_fps: parse_switch_arg(args, "show-fps"),
        title: defaults.title,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_config(&args);
    log::info!(
        "Starting Tic-Tac-Toe. Backend: {:?}, window_size={}x{}, meshes=({}, {}), show_tiles={}, show_fps={}",
        config.backends,
        config.width,
        config.height,
        config.x_mesh.display(),
        config.o_mesh.display(),
        config.show_tiles,
        config.show_fps
    );

    platform::run(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_flags_gives_defaults() {
        assert_eq!(parse_config(&[]), RunConfig::default());
    }

    #[test]
    fn backend_aliases() {
        assert_eq!(parse_backend_arg(&args(&["--gpu-backend=VK"])), wgpu::Backends::VULKAN);
        assert_eq!(parse_backend_arg(&args(&["--gpu-backend=opengl"])), wgpu::Backends::GL);
        assert_eq!(parse_backend_arg(&args(&["--gpu-backend=bogus"])), wgpu::Backends::all());
    }

    #[test]
    fn size_flags() {
        assert_eq!(parse_size_args(&args(&["--size=800x600"])), (800, 600));
        assert_eq!(parse_size_args(&args(&["--width=640"])), (640, 1000));
        assert_eq!(parse_size_args(&args(&["--size=0X0"])), (1, 1));
        assert_eq!(parse_size_args(&args(&["--size=wide"])), (1000, 1000));
    }

    #[test]
    fn switches() {
        assert!(parse_switch_arg(&args(&["--show-tiles"]), "show-tiles"));
        assert!(parse_switch_arg(&args(&["--show-tiles=on"]), "show-tiles"));
        assert!(!parse_switch_arg(&args(&["--show-tiles=off"]), "show-tiles"));
        assert!(!parse_switch_arg(&args(&["--show-fps"]), "show-tiles"));
    }

    #[test]
    fn mesh_paths_override_defaults() {
        let cfg = parse_config(&args(&["--x-mesh=meshes/cross.obj", "--o-mesh="]));
        assert_eq!(cfg.x_mesh, PathBuf::from("meshes/cross.obj"));
        assert_eq!(cfg.o_mesh, RunConfig::default().o_mesh);
    }
}
