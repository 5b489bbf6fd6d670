use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use invert_overlay::vello_cpu;
use invert_overlay::{
    Background, DrawNotifier, DrawSubscription, HostSurface, InvertOverlay, ManualClock,
    OverlayConfig, OverlayResult, Rgba8, SurfaceSize,
};

#[derive(Parser, Debug)]
#[command(name = "invert-overlay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one host frame with the overlay on top as a PNG.
    Frame(FrameArgs),
    /// Toggle the overlay and render the fade as a PNG sequence.
    Fade(FadeArgs),
}

#[derive(Parser, Debug)]
struct SurfaceArgs {
    /// Demo surface width in pixels.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Demo surface height in pixels.
    #[arg(long, default_value_t = 200)]
    height: u32,

    /// Overlay config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FadeArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Output directory for `fade_NNNN.png` frames.
    #[arg(long)]
    out_dir: PathBuf,

    /// Frames per second of the sequence.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Fade(args) => cmd_fade(args),
    }
}

/// Checkerboard of colored tiles on a light background, so inversion is easy to eyeball.
struct DemoSurface {
    size: SurfaceSize,
    notifier: DrawNotifier,
}

impl DemoSurface {
    const BACKGROUND: Rgba8 = Rgba8::new(240, 240, 232, 255);
    const TILES: [Rgba8; 4] = [
        Rgba8::new(220, 40, 40, 255),
        Rgba8::new(40, 160, 60, 255),
        Rgba8::new(40, 80, 220, 255),
        Rgba8::new(20, 20, 20, 160),
    ];

    /// Redraw into a fresh frame and notify after-draw listeners.
    fn redraw(&self) -> anyhow::Result<vello_cpu::Pixmap> {
        let (w, h) = self.size.to_raster_dims()?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let bg = Self::BACKGROUND;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));
        self.draw(&mut ctx)?;
        ctx.flush();

        let mut frame = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut frame);
        self.notifier.notify();
        Ok(frame)
    }
}

impl HostSurface for DemoSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn background(&self) -> Option<Background> {
        Some(Background::Solid(Self::BACKGROUND))
    }

    fn draw(&self, ctx: &mut vello_cpu::RenderContext) -> OverlayResult<()> {
        let tile = (self.size.width.min(self.size.height) / 5).max(1);
        let cols = self.size.width / tile;
        let rows = self.size.height / tile;
        for row in 0..rows {
            for col in 0..cols {
                if (row + col) % 2 == 1 {
                    continue;
                }
                let c = Self::TILES[((row * cols + col) as usize) % Self::TILES.len()];
                let x0 = f64::from(col * tile);
                let y0 = f64::from(row * tile);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    x0,
                    y0,
                    x0 + f64::from(tile),
                    y0 + f64::from(tile),
                ));
            }
        }
        Ok(())
    }

    fn on_after_draw(&self, listener: Box<dyn FnMut()>) -> DrawSubscription {
        self.notifier.subscribe(listener)
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<OverlayConfig> {
    Ok(match path {
        Some(p) => OverlayConfig::from_json_path(p)?,
        None => OverlayConfig::default(),
    })
}

fn setup(args: &SurfaceArgs) -> anyhow::Result<(Rc<DemoSurface>, InvertOverlay, ManualClock)> {
    let config = load_config(args.config.as_deref())?;
    let clock = ManualClock::new();
    let host = Rc::new(DemoSurface {
        size: SurfaceSize::new(args.width, args.height),
        notifier: DrawNotifier::new(),
    });
    let mut overlay = InvertOverlay::with_clock(config, Rc::new(clock.clone()))?;
    overlay.attach(host.clone());
    Ok((host, overlay, clock))
}

/// One host frame: redraw (which captures), settle the fade, paint the overlay on top.
fn render_frame(
    host: &DemoSurface,
    overlay: &mut InvertOverlay,
) -> anyhow::Result<vello_cpu::Pixmap> {
    let mut frame = host.redraw()?;
    overlay.advance();
    overlay.paint(&mut frame);
    Ok(frame)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (host, mut overlay, _clock) = setup(&args.surface)?;
    let frame = render_frame(&host, &mut overlay)?;
    write_png(&args.out, &frame)?;

    let stats = overlay.stats();
    eprintln!(
        "wrote {} (inverted={}, captures={}, buffers={} bytes)",
        args.out.display(),
        overlay.is_inverted(),
        stats.captures,
        stats.buffers.retained_bytes
    );
    Ok(())
}

fn cmd_fade(args: FadeArgs) -> anyhow::Result<()> {
    if args.fps == 0 {
        anyhow::bail!("fps must be > 0");
    }
    let (host, mut overlay, clock) = setup(&args.surface)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    // Settle one frame so the starting state is captured before toggling.
    render_frame(&host, &mut overlay)?;
    overlay.toggle_inversion();

    let step_ms = (1000 / u64::from(args.fps)).max(1);
    let mut index = 0u32;
    loop {
        let frame = render_frame(&host, &mut overlay)?;
        let path = args.out_dir.join(format!("fade_{index:04}.png"));
        write_png(&path, &frame)?;
        index += 1;
        if !overlay.is_animating() {
            break;
        }
        clock.advance_ms(step_ms);
    }

    eprintln!(
        "wrote {index} frames to {} (inverted={})",
        args.out_dir.display(),
        overlay.is_inverted()
    );
    Ok(())
}

fn write_png(path: &Path, frame: &vello_cpu::Pixmap) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let straight = unpremultiply(frame.data_as_u8_slice());
    image::save_buffer_with_format(
        path,
        &straight,
        u32::from(frame.width()),
        u32::from(frame.height()),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn unpremultiply(premul: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(premul.len());
    for px in premul.chunks_exact(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for &c in &px[..3] {
            let v = (u16::from(c) * 255 + a / 2) / a;
            out.push(v.min(255) as u8);
        }
        out.push(px[3]);
    }
    out
}
