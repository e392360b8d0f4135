//! paren-hide - a terminal Lisp viewer whose parentheses can be hidden
//!
//! Lisp buffers open with the paren-hide minor mode on; its toggle key
//! draws every delimiter in the background color and back again.

mod buffer;
mod command;
mod companion;
mod config;
mod display;
mod error;
mod face;
mod host;
mod input;
mod mode;
mod paren_hide;
mod session;
mod syntax;
mod terminal;
mod viewer;
mod window;

use std::env;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use buffer::Buffer;
use command::KeyTable;
use companion::ParenMatcher;
use config::Config;
use error::{Result, ViewerError};
use face::Theme;
use input::Key;
use session::Session;
use syntax::SyntaxManager;
use terminal::Terminal;
use viewer::{Viewer, ViewerOptions};

/// Environment variable naming the log file
const LOG_ENV: &str = "PAREN_HIDE_LOG";

/// Command line arguments
#[derive(Debug, Default, PartialEq)]
struct Args {
    file: Option<PathBuf>,
    hidden: bool,
    light: bool,
    no_companion: bool,
    print: bool,
    help: bool,
    version: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => parsed.help = true,
                "--version" | "-V" => parsed.version = true,
                "--hidden" => parsed.hidden = true,
                "--light" => parsed.light = true,
                "--no-companion" => parsed.no_companion = true,
                "--print" | "-p" => parsed.print = true,
                flag if flag.starts_with('-') => {
                    return Err(ViewerError::Message(format!("unknown option '{}'", flag)));
                }
                _ if parsed.file.is_some() => {
                    return Err(ViewerError::Message("only one file can be viewed".to_string()));
                }
                _ => parsed.file = Some(PathBuf::from(&arg)),
            }
        }
        Ok(parsed)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse(env::args().skip(1))?;

    // Handle --help and --version
    if args.help {
        print_usage();
        return Ok(());
    }
    if args.version {
        print_version();
        return Ok(());
    }

    init_logging();

    let Some(path) = args.file.as_deref() else {
        return Err(ViewerError::Message("no file given (try --help)".to_string()));
    };

    let config = Config::load();
    let theme = if args.light { Theme::light() } else { config.theme() };
    let buffer = Buffer::from_file(path)?;

    let mut session = Session::new(buffer, &SyntaxManager::new(), theme);
    session.set_frame_background(config.frame_background().or_else(terminal::detect_background));
    if config.companion && !args.no_companion {
        session = session.with_companion(ParenMatcher::new());
    }

    let options = ViewerOptions {
        toggle_key: config.toggle_key(),
        hide_on_open: config.hide_on_open || args.hidden,
        show_line_numbers: config.show_line_numbers,
    };

    if args.print {
        let mut session = Viewer::new(session, options, 1).into_session();
        display::print_buffer(&mut io::stdout().lock(), &mut session, options.show_line_numbers)?;
        return Ok(());
    }

    // Initialize terminal
    let mut terminal = Terminal::new()?;
    let mut viewer = Viewer::new(session, options, terminal.rows().saturating_sub(2));
    viewer.run(&mut terminal)
}

/// Send tracing events to the file named by `PAREN_HIDE_LOG`
///
/// The terminal belongs to the viewer, so without the variable events
/// are dropped.
fn init_logging() {
    let Some(path) = env::var_os(LOG_ENV) else {
        return;
    };
    match File::create(&path) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_max_level(tracing::Level::DEBUG)
                .try_init();
        }
        Err(e) => eprintln!("Warning: cannot open log file {}: {}", PathBuf::from(path).display(), e),
    }
}

fn print_usage() {
    println!("paren-hide {} - Lisp viewer with hideable parentheses", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: paren-hide [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -h, --help       Show this help message");
    println!("  -V, --version    Show version information");
    println!("  -p, --print      Print the highlighted file to stdout and exit");
    println!("      --hidden     Start with parentheses hidden");
    println!("      --light      Use the light theme");
    println!("      --no-companion  Do not show matching parentheses");
    println!();
    println!("Languages: {}", SyntaxManager::new().list_languages().join(", "));
    println!("Settings are read from ~/.paren-hide.toml; set {} to a path to log there.", LOG_ENV);
    println!();
    println!("Key bindings:");
    for line in key_help(Config::load().toggle_key()) {
        println!("{}", line);
    }
}

/// Key listing: the in-mode toggle first, then the global bindings
fn key_help(toggle_key: Key) -> Vec<String> {
    let mut lines = vec![format!("  {:<14} {}", toggle_key.display_name(), paren_hide::TOGGLE_COMMAND)];
    lines.extend(
        KeyTable::with_defaults()
            .all_bindings()
            .into_iter()
            .map(|(key, cmd)| format!("  {:<14} {}", key.display_name(), cmd.name())),
    );
    lines
}

fn print_version() {
    println!("paren-hide {}", env!("CARGO_PKG_VERSION"));
    println!("A paren-hiding minor mode in a terminal Lisp viewer");
}
