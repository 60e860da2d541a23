use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use depthflow::{
    Config, DepthEstimator, DepthMatrix, DepthRequest, FileDepthEstimator, FrameRGBA, Heightfield,
    ParallaxSession, Param, SessionOpts, SourceImage, Viewport, load_image, normalize_depth,
};

#[derive(Parser, Debug)]
#[command(name = "depthflow", version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single parallax frame as a PNG.
    Frame(FrameArgs),
    /// Render an animated frame sequence as numbered PNGs.
    Sequence(SequenceArgs),
    /// Write the normalized heightfield as a grayscale PNG.
    Heightfield(HeightfieldArgs),
    /// Print the parameter table.
    Params(ParamsArgs),
}

#[derive(clap::Args, Debug)]
struct SceneArgs {
    /// Source color image.
    #[arg(long)]
    image: PathBuf,

    /// Depth matrix JSON (array of rows).
    #[arg(long)]
    depth: PathBuf,

    /// Output width; defaults to the image width.
    #[arg(long)]
    width: Option<u32>,

    /// Output height; defaults to the image height.
    #[arg(long)]
    height: Option<u32>,

    /// Parameter preset JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override one parameter, `name=value`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Pointer position `x,y` in [-1,1]; enables pointer-driven depth origin.
    #[arg(long, allow_hyphen_values = true)]
    pointer: Option<String>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of frames.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Frames per second; loops advance in real time at this rate.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Output directory for `frame_00000.png`, ...
    #[arg(long)]
    out_dir: PathBuf,

    /// Loop a parameter, `name[:speed[:min:max]]`. Repeatable.
    #[arg(long = "loop", value_name = "SPEC")]
    loops: Vec<String>,
}

#[derive(Parser, Debug)]
struct HeightfieldArgs {
    /// Depth matrix JSON (array of rows).
    #[arg(long)]
    depth: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ParamsArgs {
    /// Print the default config as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
        Command::Heightfield(args) => cmd_heightfield(args),
        Command::Params(args) => cmd_params(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (session, viewport) = open_session(&args.scene)?;
    let frame = session.render_frame(viewport);
    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let (mut session, viewport) = open_session(&args.scene)?;
    {
        let mut loops = session
            .loops()
            .lock()
            .map_err(|_| anyhow::anyhow!("loop engine lock poisoned"))?;
        for spec in &args.loops {
            let lp = parse_loop(spec)?;
            loops.enable(lp.param);
            if let Some(speed) = lp.speed {
                loops.set_speed(lp.param, speed)?;
            }
            if let Some((min, max)) = lp.range {
                loops.set_range(lp.param, min, max)?;
            }
        }
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out_dir = args.out_dir.clone();
    session.render_sequence(viewport, args.frames, args.fps, |index, frame| {
        let path = out_dir.join(format!("frame_{index:05}.png"));
        write_png(&path, &frame)?;
        Ok(())
    })?;

    eprintln!("wrote {} frames to {}", args.frames, args.out_dir.display());
    Ok(())
}

fn cmd_heightfield(args: HeightfieldArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.depth)
        .with_context(|| format!("read depth '{}'", args.depth.display()))?;
    let heightfield = normalize_depth(&DepthMatrix::from_json(&bytes)?)?;
    let frame = FrameRGBA {
        width: heightfield.width(),
        height: heightfield.height(),
        data: heightfield.to_gray_rgba8(),
        premultiplied: false,
    };
    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_params(args: ParamsArgs) -> anyhow::Result<()> {
    if args.json {
        println!("{}", Config::default().to_json_pretty()?);
        return Ok(());
    }
    println!(
        "{:<18} {:>8} {:>8} {:>6} {:>8}",
        "name", "min", "max", "step", "default"
    );
    for param in Param::ALL {
        let s = param.spec();
        println!(
            "{:<18} {:>8} {:>8} {:>6} {:>8}",
            s.name, s.min, s.max, s.step, s.default
        );
    }
    Ok(())
}

fn open_session(scene: &SceneArgs) -> anyhow::Result<(ParallaxSession, Viewport)> {
    let image: SourceImage = load_image(&scene.image)?;
    let heightfield = read_heightfield(&scene.depth, &scene.image)?;
    let viewport = Viewport::new(
        scene.width.unwrap_or(image.width()),
        scene.height.unwrap_or(image.height()),
    )?;

    let opts = SessionOpts {
        threads: scene.threads,
        ..SessionOpts::default()
    };
    let session = ParallaxSession::new(image, heightfield, opts)?;

    if let Some(path) = &scene.config {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        let mut preset = Config::from_json(&bytes)?;
        // Presets keep the image-derived aspect ratio unless they name it.
        if !json_names_key(&bytes, Param::AspectRatio.name())? {
            preset.set(
                Param::AspectRatio,
                session.config().get(Param::AspectRatio),
            )?;
        }
        session.config().replace(&preset);
    }
    for assignment in &scene.set {
        let (name, value) = assignment
            .split_once('=')
            .with_context(|| format!("expected NAME=VALUE, got '{assignment}'"))?;
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("parse value in '{assignment}'"))?;
        session.config().set_by_name(name.trim(), value)?;
    }
    if let Some(pointer) = &scene.pointer {
        let (x, y) = parse_pair(pointer)?;
        session.pointer().set(x, y)?;
        session.pointer().set_enabled(true);
    }

    Ok((session, viewport))
}

fn read_heightfield(depth: &Path, image: &Path) -> anyhow::Result<Heightfield> {
    let estimator = FileDepthEstimator::new(depth);
    let request = DepthRequest::new(image.to_string_lossy(), "");
    let matrix = estimator.estimate(&request)?;
    Ok(normalize_depth(&matrix)?)
}

fn json_names_key(bytes: &[u8], key: &str) -> anyhow::Result<bool> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(bytes).context("parse config json")?;
    Ok(map.contains_key(key))
}

fn parse_pair(s: &str) -> anyhow::Result<(f64, f64)> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("expected x,y, got '{s}'"))?;
    Ok((
        x.trim().parse().with_context(|| format!("parse x in '{s}'"))?,
        y.trim().parse().with_context(|| format!("parse y in '{s}'"))?,
    ))
}

struct LoopSpec {
    param: Param,
    speed: Option<f64>,
    range: Option<(f64, f64)>,
}

fn parse_loop(spec: &str) -> anyhow::Result<LoopSpec> {
    let parts: Vec<&str> = spec.split(':').collect();
    let num = |s: &str| -> anyhow::Result<f64> {
        s.trim()
            .parse()
            .with_context(|| format!("parse number '{s}' in loop '{spec}'"))
    };
    let param: Param = parts[0].trim().parse()?;
    match parts.as_slice() {
        [_] => Ok(LoopSpec {
            param,
            speed: None,
            range: None,
        }),
        [_, speed] => Ok(LoopSpec {
            param,
            speed: Some(num(speed)?),
            range: None,
        }),
        [_, speed, min, max] => Ok(LoopSpec {
            param,
            speed: Some(num(speed)?),
            range: Some((num(min)?, num(max)?)),
        }),
        _ => anyhow::bail!("expected name[:speed[:min:max]], got '{spec}'"),
    }
}

fn write_png(path: &Path, frame: &FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
