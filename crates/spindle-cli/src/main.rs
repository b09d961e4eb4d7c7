use std::io::Read;
use std::ops::Range;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use spindle_core::{
    Document, EditError, EditorConfig, EmbedRenderer, NodeId, NodeKind, apply_offsets, char_count,
    clear_offsets, lines, resolve_position, runs, sanitize_paste, styles_offsets, toggle_offsets,
};
use spindle_render::{DiagramRenderer, MathRenderer};

#[derive(Parser)]
#[command(version, about = "spindle - styled block editing from the command line", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON editor configuration file
    #[arg(long, global = true, env = "SPINDLE_CONFIG")]
    config: Option<PathBuf>,

    /// Log engine decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BlockArgs {
    /// Editor markup, or `-` to read it from standard input
    markup: String,

    /// Index of the block to work on
    #[arg(long, default_value_t = 0)]
    block: usize,
}

#[derive(Args)]
struct StyleArgs {
    #[command(flatten)]
    input: BlockArgs,

    /// Style tag, e.g. edt-b
    #[arg(long)]
    style: String,

    /// Char range as START..END
    #[arg(long, value_parser = parse_range)]
    range: Range<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the lines of a block as JSON
    Lines {
        #[command(flatten)]
        input: BlockArgs,
    },
    /// Print the char count of a block
    Count {
        #[command(flatten)]
        input: BlockArgs,
    },
    /// Resolve a char offset to a position in the block
    Resolve {
        #[command(flatten)]
        input: BlockArgs,

        offset: usize,
    },
    /// Print the styles shared by every char of a range
    Styles {
        #[command(flatten)]
        input: BlockArgs,

        /// Char range as START..END
        #[arg(long, value_parser = parse_range)]
        range: Range<usize>,
    },
    /// Apply a style over a range and print the resulting markup
    Apply(StyleArgs),
    /// Remove a style from a range and print the resulting markup
    Clear(StyleArgs),
    /// Toggle a style over a range and print the resulting markup
    Toggle(StyleArgs),
    /// Print the styled runs of a block as JSON
    Runs {
        #[command(flatten)]
        input: BlockArgs,
    },
    /// Sanitize clipboard HTML and print the runs as JSON
    Paste {
        /// Clipboard HTML, or `-` for standard input
        html: String,
    },
    /// Render a LaTeX formula to MathML
    Math {
        latex: String,

        /// Inline layout even if display math is configured
        #[arg(long)]
        inline: bool,
    },
    /// Print the image markup for a PlantUML diagram
    Diagram { source: String },
}

fn main() -> Result<()> {
    init_miette()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Lines { input } => {
            let (doc, block) = load_block(&input)?;
            println!("{}", serde_json::to_string(&lines(&doc.tree, block, None)).into_diagnostic()?);
        }
        Commands::Count { input } => {
            let (doc, block) = load_block(&input)?;
            println!("{}", char_count(&doc.tree, block));
        }
        Commands::Resolve { input, offset } => {
            let (doc, block) = load_block(&input)?;
            let position = resolve_position(&doc.tree, block, offset);
            let value = serde_json::json!({
                "node": position.node.to_string(),
                "kind": kind_name(doc.tree.kind(position.node)),
                "offset": position.offset,
            });
            println!("{value}");
        }
        Commands::Styles { input, range } => {
            let (doc, block) = load_block(&input)?;
            let styles = styles_offsets(&doc.tree, block, range);
            println!("{}", serde_json::to_string(&styles).into_diagnostic()?);
        }
        Commands::Apply(args) => restyle(args, apply_offsets)?,
        Commands::Clear(args) => restyle(args, clear_offsets)?,
        Commands::Toggle(args) => restyle(args, toggle_offsets)?,
        Commands::Runs { input } => {
            let (doc, block) = load_block(&input)?;
            let events = runs(&doc.tree, block);
            println!("{}", serde_json::to_string_pretty(&events).into_diagnostic()?);
        }
        Commands::Paste { html } => {
            let html = read_input(&html)?;
            let runs = sanitize_paste(&html, &config.paste);
            println!("{}", serde_json::to_string_pretty(&runs).into_diagnostic()?);
        }
        Commands::Math { latex, inline } => {
            let renderer = MathRenderer {
                display: config.render.display_math && !inline,
            };
            render_embed(&renderer, &latex)?;
        }
        Commands::Diagram { source } => {
            render_embed(&DiagramRenderer::from_config(&config.render), &source)?;
        }
    }

    Ok(())
}

type RestyleFn =
    fn(&mut spindle_core::Tree, NodeId, Range<usize>, &str) -> spindle_core::HostRange;

fn restyle(args: StyleArgs, op: RestyleFn) -> Result<()> {
    let (mut doc, block) = load_block(&args.input)?;
    op(&mut doc.tree, block, args.range, &args.style);
    println!("{}", doc.to_markup());
    Ok(())
}

fn render_embed(renderer: &dyn EmbedRenderer, source: &str) -> Result<()> {
    let mut out = String::new();
    renderer
        .render(source, &mut out)
        .map_err(|err| miette::miette!("render failed: {err}"))?;
    println!("{out}");
    Ok(())
}

fn kind_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Text(_) => "text",
        NodeKind::Break { .. } => "break",
        NodeKind::Wrapper { .. } => "wrapper",
        NodeKind::Embed { .. } => "embed",
        NodeKind::Block { .. } => "block",
        NodeKind::Cell { .. } => "cell",
        NodeKind::Element { .. } => "element",
    }
}

fn parse_range(value: &str) -> std::result::Result<Range<usize>, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {value:?}"))?;
    let start = start.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let end = end.trim().parse::<usize>().map_err(|e| e.to_string())?;
    Ok(start..end)
}

fn read_input(value: &str) -> Result<String> {
    if value != "-" {
        return Ok(value.to_string());
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
    Ok(buf)
}

/// Parse the markup argument. Bare inline markup without any block is
/// treated as the content of block 0.
fn load_block(args: &BlockArgs) -> Result<(Document, NodeId)> {
    let markup = read_input(&args.markup)?;
    let mut doc = Document::parse(&markup).into_diagnostic()?;
    let has_blocks = doc
        .tree
        .descendants(doc.root)
        .any(|n| matches!(doc.tree.kind(n), NodeKind::Block { .. }));
    if !has_blocks {
        doc = Document::parse(&format!(r#"<div data-block-index="0">{markup}</div>"#))
            .into_diagnostic()?;
    }
    let block = doc
        .block(args.block)
        .ok_or(EditError::BlockNotFound(args.block))
        .into_diagnostic()?;
    Ok((doc, block))
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    let config = serde_json::from_str(&text).into_diagnostic()?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .with_cause_chain()
                .context_lines(3)
                .tab_width(2)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();
    Ok(())
}
