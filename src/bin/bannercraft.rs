use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bannercraft", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a creative and write it as a PNG.
    Compose(ComposeArgs),
    /// Parse and validate a template descriptor.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Template descriptor (JSON file path or http(s) URL).
    #[arg(long)]
    template: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Caption text drawn per the template's caption style.
    #[arg(long)]
    caption: Option<String>,

    /// Call-to-action text drawn on the rounded button.
    #[arg(long)]
    cta: Option<String>,

    /// Background color (hex like #0369a1, or a CSS name).
    #[arg(long)]
    bg: Option<String>,

    /// Start from the seeded demo session instead of a blank state;
    /// explicit flags still override.
    #[arg(long)]
    sample: bool,

    /// Image to overlay into the template's mask rect.
    #[arg(long)]
    upload: Option<PathBuf>,

    /// TTF/OTF font file; defaults to a system sans-serif.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Seconds to wait for layer fetches before rendering what arrived.
    #[arg(long, default_value_t = 30)]
    load_timeout: u64,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Template descriptor (JSON file path or http(s) URL).
    #[arg(long)]
    template: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let font_bytes = match &args.font {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("read font '{}'", path.display()))?,
        None => bannercraft::text::find_system_font()?,
    };

    let canvas = bannercraft::CanvasSize::new(args.width, args.height)?;
    let renderer = bannercraft::Renderer::new(canvas, font_bytes)?;
    let mut composer = if args.sample {
        bannercraft::Composer::with_state(renderer, bannercraft::EditState::sample())
    } else {
        bannercraft::Composer::new(renderer)
    };

    if let Some(caption) = &args.caption {
        composer.set_caption(caption.clone())?;
    }
    if let Some(cta) = &args.cta {
        composer.set_cta(cta.clone())?;
    }
    if let Some(bg) = &args.bg {
        composer.set_background_color(bannercraft::Color::parse(bg)?)?;
    }

    if let Some(path) = &args.upload {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read upload '{}'", path.display()))?;
        composer.upload_image(bytes)?;
    }

    composer.load_template(&args.template)?;
    let frame = composer.drain(Duration::from_secs(args.load_timeout))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let template = bannercraft::assets::load_template(&args.template)?;
    eprintln!(
        "ok: {} layers, caption wraps at {}, cta wraps at {}",
        template.urls.in_draw_order().len(),
        template.caption.max_characters_per_line,
        template.cta.wrap_length,
    );
    Ok(())
}
