mod svg_renderer;

use std::path::PathBuf;

use anyhow::{bail, Context};
use docopt::Docopt;
use log::info;
use serde::Deserialize;

use texmath_render::resources::DirectoryProvider;
use texmath_render::{TeXFormula, TeXStyle, TypesetContext};

const USAGE: &str = "
Usage: mathimg [options] <formula> <output>

Renders TeX math markup such as '\\frac{a}{b}' to an SVG file.

Options:
    -s SIZE --size=SIZE           Text size in pixels per em. [default: 40]
    --style=STYLE                 One of display, text, script, scriptscript. [default: display]
    -r DIR --resources=DIR        Load fonts and tables from DIR instead of the built-in copies.
    --show-logical-bounds         Outline the logical box of every glyph.
    -h --help                     Show this message.
";

#[derive(Debug, Deserialize)]
struct Args {
    arg_formula: String,
    arg_output: String,
    flag_size: f32,
    flag_style: String,
    flag_resources: Option<String>,
    flag_show_logical_bounds: bool,
}

fn parse_style(name: &str) -> anyhow::Result<TeXStyle> {
    let style = match name {
        "display" => TeXStyle::Display,
        "text" => TeXStyle::Text,
        "script" => TeXStyle::Script,
        "scriptscript" => TeXStyle::ScriptScript,
        other => bail!("unknown style {:?}", other),
    };
    Ok(style)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    let style = parse_style(&args.flag_style)?;
    if !(args.flag_size > 0.0) {
        bail!("size must be positive, got {}", args.flag_size);
    }

    let ctx = match args.flag_resources {
        Some(ref dir) => TypesetContext::load_from(&DirectoryProvider::new(dir)),
        None => TypesetContext::load(),
    }
    .context("could not load typesetting resources")?;

    let formula = TeXFormula::parse(&ctx, &args.arg_formula)
        .with_context(|| format!("could not parse {:?}", args.arg_formula))?;
    let math_box = formula.create_box(&ctx, style, args.flag_size)?;
    info!(
        "laid out box {} x ({} + {}) em",
        math_box.width, math_box.height, math_box.depth
    );

    let mut out_path = PathBuf::from(&args.arg_output);
    if out_path.is_dir() {
        out_path.push("formula.svg");
    }
    let flags = svg_renderer::Flags {
        show_logical_bounds: args.flag_show_logical_bounds,
    };
    svg_renderer::render(&math_box, args.flag_size, flags, &out_path)
        .with_context(|| format!("could not write {}", out_path.display()))?;
    Ok(())
}
