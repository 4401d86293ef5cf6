//! CLI tool for tableshape - draws one frame of a table shape
//!
//! Usage:
//!   tableshape_cli <params.json>                    # SVG to stdout
//!   tableshape_cli <params.json> -o out.svg         # SVG to file
//!   tableshape_cli <params.json> --commands         # recorded draw commands as JSON
//!   tableshape_cli <params.json> --frame 12 --length 60 --fps 30
//!   tableshape_cli <params.json> --font "Yu Gothic UI" --font Meiryo
//!
//! Log output is controlled with `RUST_LOG` (for example `RUST_LOG=tableshape=debug`).

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Write};

use tableshape::{FontCatalog, FrameTime, MemoryFontCatalog, TableShapeParameter};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: tableshape_cli <params.json> [--frame N] [--length N] [--fps N] \
                     [--font NAME]... [--system-fonts] [--commands] [-o output]";

#[derive(Debug)]
struct Options {
    input: String,
    output: Option<String>,
    time: FrameTime,
    fonts: Vec<String>,
    system_fonts: bool,
    commands: bool,
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn parse_number(flag: &str, value: Option<String>) -> i32 {
    let Some(value) = value else {
        fail(&format!("{flag} needs a value\n{USAGE}"));
    };
    match value.parse() {
        Ok(n) => n,
        Err(e) => fail(&format!("Invalid value for {flag}: {value} ({e})")),
    }
}

fn parse_args() -> Options {
    let mut args = env::args().skip(1);
    let mut input = None;
    let mut output = None;
    let mut time = FrameTime::new(0, 1, 30);
    let mut fonts = Vec::new();
    let mut system_fonts = false;
    let mut commands = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => match args.next() {
                Some(path) => output = Some(path),
                None => fail(USAGE),
            },
            "--frame" => time.frame = parse_number("--frame", args.next()),
            "--length" => time.length = parse_number("--length", args.next()),
            "--fps" => time.fps = parse_number("--fps", args.next()),
            "--font" => match args.next() {
                Some(name) => fonts.push(name),
                None => fail(USAGE),
            },
            "--system-fonts" => system_fonts = true,
            "--commands" => commands = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ if input.is_none() && !arg.starts_with('-') => input = Some(arg),
            _ => fail(&format!("Unexpected argument: {arg}\n{USAGE}")),
        }
    }

    let Some(input) = input else {
        fail(USAGE);
    };
    Options {
        input,
        output,
        time,
        fonts,
        system_fonts,
        commands,
    }
}

#[cfg(feature = "system-fonts")]
fn system_catalog() -> Box<dyn FontCatalog> {
    Box::new(tableshape::render::SystemFontCatalog::load())
}

#[cfg(not(feature = "system-fonts"))]
fn system_catalog() -> Box<dyn FontCatalog> {
    tracing::warn!("built without the system-fonts feature, using an empty catalog");
    Box::new(MemoryFontCatalog::new())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let opts = parse_args();

    let json = match fs::read_to_string(&opts.input) {
        Ok(s) => s,
        Err(e) => fail(&format!("Error reading {}: {}", opts.input, e)),
    };

    let param = match TableShapeParameter::from_json_str(&json) {
        Ok(p) => p,
        Err(e) => fail(&format!("Error parsing parameters: {e}")),
    };

    let catalog: Box<dyn FontCatalog> = if opts.system_fonts {
        system_catalog()
    } else {
        Box::new(MemoryFontCatalog::with_families(opts.fonts.iter()))
    };

    let rendered = if opts.commands {
        tableshape::record_frame(&param, &opts.time, catalog).and_then(|(commands, _)| {
            serde_json::to_string_pretty(&commands).map_err(tableshape::TableError::from)
        })
    } else {
        tableshape::render_svg(&param, &opts.time, catalog)
    };
    let text = match rendered {
        Ok(t) => t,
        Err(e) => fail(&format!("Error rendering table: {e}")),
    };

    match opts.output {
        Some(path) => {
            if let Err(e) = fs::write(&path, &text) {
                fail(&format!("Error writing {path}: {e}"));
            }
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout
                .write_all(text.as_bytes())
                .and_then(|()| writeln!(stdout))
            {
                fail(&format!("Error writing output: {e}"));
            }
        }
    }
}
