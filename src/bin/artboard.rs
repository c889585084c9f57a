use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use artboard::{
    ExportFormat, ExportRequest, Exporter, FilterSettings, Scene, SceneSurface, TemplateCatalog,
    TemplateKind, category_label, filters,
};

#[derive(Parser, Debug)]
#[command(name = "artboard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the builtin templates.
    Templates(TemplatesArgs),
    /// Export a template or a saved scene to a raster file.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// Only show templates of this kind.
    #[arg(long, value_enum)]
    kind: Option<KindChoice>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Template id to export.
    #[arg(long, conflicts_with = "scene")]
    template: Option<String>,

    /// Saved scene JSON to export.
    #[arg(long = "in")]
    scene: Option<PathBuf>,

    /// Output format. `svg` and `pdf` fall back to png.
    #[arg(long, value_enum, default_value_t = FormatChoice::Png)]
    format: FormatChoice,

    /// Output width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Encoder quality in (0, 1]. Honored for jpg only.
    #[arg(long, default_value_t = 0.92)]
    quality: f32,

    /// Filter preset name (e.g. "طبيعي").
    #[arg(long)]
    preset: Option<String>,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindChoice {
    Travel,
    Cv,
    Logo,
    Social,
}

impl From<KindChoice> for TemplateKind {
    fn from(k: KindChoice) -> Self {
        match k {
            KindChoice::Travel => TemplateKind::Travel,
            KindChoice::Cv => TemplateKind::Cv,
            KindChoice::Logo => TemplateKind::Logo,
            KindChoice::Social => TemplateKind::Social,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpg,
    Pdf,
    Svg,
}

impl From<FormatChoice> for ExportFormat {
    fn from(f: FormatChoice) -> Self {
        match f {
            FormatChoice::Png => ExportFormat::Png,
            FormatChoice::Jpg => ExportFormat::Jpg,
            FormatChoice::Pdf => ExportFormat::Pdf,
            FormatChoice::Svg => ExportFormat::Svg,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Templates(args) => cmd_templates(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<()> {
    let catalog = TemplateCatalog::builtin();
    for t in catalog.list(args.kind.map(Into::into)) {
        println!(
            "{:<22} {:<16} {:>3} elements  {}x{}  [{}]",
            t.id,
            category_label(&t.category),
            t.elements.len(),
            t.canvas.width,
            t.canvas.height,
            t.name
        );
    }
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args)?;

    let filter = match &args.preset {
        Some(name) => filters::preset(name)
            .with_context(|| format!("unknown filter preset '{name}'"))?,
        None => FilterSettings::default(),
    };

    let surface = SceneSurface::with_filters(&scene, filter);
    let exporter = Exporter::new(&args.out);
    let request = ExportRequest {
        format: args.format.into(),
        quality: args.quality,
        width: args.width,
        height: args.height,
    };

    let report = exporter.export(Some(&surface), &request);
    match report.path {
        Some(path) => {
            println!("exported {}", path.display());
            Ok(())
        }
        None => anyhow::bail!(
            "{}",
            report.error.unwrap_or_else(|| "export failed".to_string())
        ),
    }
}

fn load_scene(args: &ExportArgs) -> anyhow::Result<Scene> {
    if let Some(id) = &args.template {
        return Ok(TemplateCatalog::builtin().select(id)?);
    }
    if let Some(path) = &args.scene {
        let payload = std::fs::read_to_string(path)
            .with_context(|| format!("read scene from '{}'", path.display()))?;
        return Ok(Scene::from_json(&payload)?);
    }
    anyhow::bail!("either --template or --in is required");
}
