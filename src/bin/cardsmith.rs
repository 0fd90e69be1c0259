use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cardsmith::{
    AddTemplateCommand, CARD_BLOCK_LANGUAGE, CardBlockView, CpuBackend, FontSettings,
    FsImageResolver, JsonFileSink, RegisterOutcome, RenderSettings, TemplateStore, encode_png,
    fenced_blocks, parse_instance, png_data_uri, render_card,
};

#[derive(Parser, Debug)]
#[command(name = "cardsmith", version, about = "Composite trading cards from JSON templates")]
struct Cli {
    #[command(flatten)]
    fonts: FontArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Extra directory of .ttf/.otf/.ttc files (repeatable; adds to CARDSMITH_FONT_DIR).
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    /// Do not load system fonts.
    #[arg(long, global = true, default_value_t = false)]
    no_system_fonts: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register the first `cardTemplate` block of a document.
    Register(RegisterArgs),
    /// Render every `card` block of a document to PNG.
    Render(RenderArgs),
    /// List registered templates.
    List(ListArgs),
}

#[derive(Parser, Debug)]
struct RegisterArgs {
    /// Markdown document holding the template block.
    #[arg(long)]
    doc: PathBuf,

    /// Template collection JSON.
    #[arg(long)]
    store: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Markdown document holding `card` blocks.
    #[arg(long)]
    doc: PathBuf,

    /// Template collection JSON.
    #[arg(long)]
    store: PathBuf,

    /// Root for art and background paths (defaults to the document's directory).
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Output directory for `card-NNN.png`.
    #[arg(long)]
    out: PathBuf,

    /// Also write an HTML page with one table per card block.
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Template collection JSON.
    #[arg(long)]
    store: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();

    let cli = Cli::parse();
    let fonts = FontSettings::from_env().with_system_fonts(!cli.fonts.no_system_fonts);
    let fonts = cli
        .fonts
        .font_dirs
        .into_iter()
        .fold(fonts, FontSettings::with_font_dir);

    match cli.cmd {
        Command::Register(args) => cmd_register(args),
        Command::Render(args) => cmd_render(args, &fonts),
        Command::List(args) => cmd_list(args),
    }
}

fn read_doc(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read document '{}'", path.display()))
}

fn cmd_register(args: RegisterArgs) -> anyhow::Result<()> {
    let doc = read_doc(&args.doc)?;
    let mut store = TemplateStore::load_json(&args.store)?;
    let mut sink = JsonFileSink::new(&args.store);

    match AddTemplateCommand.run(&mut store, &mut sink, &doc)? {
        RegisterOutcome::NotApplicable => {
            anyhow::bail!("'{}' has no cardTemplate block", args.doc.display())
        }
        RegisterOutcome::Declined => {
            eprintln!("template block has no name; nothing registered");
        }
        RegisterOutcome::Registered { name, replaced } => {
            let verb = if replaced { "replaced" } else { "added" };
            eprintln!("{verb} template '{name}' in {}", args.store.display());
        }
    }
    Ok(())
}

fn cmd_render(args: RenderArgs, fonts: &FontSettings) -> anyhow::Result<()> {
    let doc = read_doc(&args.doc)?;
    let store = TemplateStore::load_json(&args.store)?;
    let assets_root = match args.assets {
        Some(root) => root,
        None => args
            .doc
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    let mut assets = FsImageResolver::new(assets_root);
    let mut backend = CpuBackend::with_font_settings(RenderSettings::default(), fonts);
    if backend.fonts().is_empty() {
        tracing::warn!("no fonts loaded; cards with text attributes will fail to render");
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let blocks = fenced_blocks(&doc, CARD_BLOCK_LANGUAGE);
    let mut html = String::new();
    for (i, source) in blocks.iter().enumerate() {
        let Some(instance) = parse_instance(source)
            .with_context(|| format!("card block #{}", i + 1))?
        else {
            continue;
        };

        let frame = render_card(&store, &instance, &mut backend, &mut assets)
            .with_context(|| format!("render card block #{}", i + 1))?;
        let image_data_uri = match &frame {
            Some(frame) => {
                let path = args.out.join(format!("card-{:03}.png", i + 1));
                let png = encode_png(frame)?;
                std::fs::write(&path, png)
                    .with_context(|| format!("write png '{}'", path.display()))?;
                eprintln!("wrote {}", path.display());
                if args.html.is_some() {
                    Some(png_data_uri(frame)?)
                } else {
                    None
                }
            }
            None => {
                eprintln!(
                    "card block #{}: unknown template {:?}",
                    i + 1,
                    instance.template_name.as_deref().unwrap_or_default()
                );
                None
            }
        };

        if args.html.is_some() {
            let view = CardBlockView {
                source: source.clone(),
                image_data_uri,
            };
            html.push_str(&view.to_html());
            html.push('\n');
        }
    }

    if let Some(path) = &args.html {
        let page = format!("<!doctype html>\n<html><body>\n{html}</body></html>\n");
        std::fs::write(path, page).with_context(|| format!("write html '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let store = TemplateStore::load_json(&args.store)?;
    for template in store.templates() {
        let attrs = match template.attribute_list() {
            Ok(list) => format!("{} attribute(s)", list.map_or(0, |l| l.len())),
            Err(e) => format!("unusable: {e}"),
        };
        println!("{}\t{attrs}", template.name());
    }
    Ok(())
}
