use std::path::PathBuf;
use std::process;

use anyhow::{Context, bail};
use blend_view::common::config::{Config, DEFAULT_CONFIG, config_file};
use blend_view::common::log;
use blend_view::layout_engine::{Orientation, Splitter};
use blend_view::view::{HeadlessContext, MouseEvent, Panel, Spacer};
use blend_view::{NodeId, Point, Size, ViewTree};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Check the configuration file and exit.
    #[arg(long)]
    validate: bool,

    /// Print the default configuration and exit.
    #[arg(long)]
    print_default_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a window holding a splitter and print the resulting tree.
    Demo {
        /// Number of panes.
        #[arg(long, default_value_t = 3)]
        panes: usize,

        /// Stack panes bottom to top instead of left to right.
        #[arg(long)]
        vertical: bool,

        /// Window size as WIDTHxHEIGHT.
        #[arg(long, default_value = "800x600", value_parser = parse_size)]
        size: Size,

        /// Resize the window to WIDTHxHEIGHT after the initial layout.
        #[arg(long, value_parser = parse_size)]
        resize: Option<Size>,

        /// Drag the first handle by this many pixels.
        #[arg(long, allow_hyphen_values = true)]
        drag: Option<i32>,
    },
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s.split_once(['x', 'X']).ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = w.trim().parse::<i32>().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let height = h.trim().parse::<i32>().map_err(|e| format!("bad height {h:?}: {e}"))?;
    Ok(Size::new(width, height))
}

fn main() {
    let opt = Cli::parse();

    if opt.print_default_config {
        print!("{DEFAULT_CONFIG}");
        return;
    }

    let config_path = opt.config.clone().unwrap_or_else(config_file);

    if opt.validate {
        let issues = match Config::read(&config_path) {
            Ok(config) => config.validate(),
            Err(e) => vec![format!("{}: {e}", config_path.display())],
        };
        if issues.is_empty() {
            println!("Config validation passed");
        } else {
            for issue in issues {
                eprintln!("{}", issue);
            }
            process::exit(1);
        }
        return;
    }

    let config = match Config::read_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {e}", config_path.display());
            process::exit(1);
        }
    };
    log::init_logging(&config.logging);

    let result = match opt.command {
        Some(Commands::Demo { panes, vertical, size, resize, drag }) => {
            run_demo(config, panes, vertical, size, resize, drag)
        }
        None => {
            println!("Nothing to do. Try `blend-view demo --help`.");
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("{e:#}");
        process::exit(1);
    }
}

fn run_demo(
    config: Config,
    panes: usize,
    vertical: bool,
    size: Size,
    resize: Option<Size>,
    drag: Option<i32>,
) -> anyhow::Result<()> {
    if panes == 0 {
        bail!("a splitter needs at least one pane");
    }
    let orientation = if vertical { Orientation::Vertical } else { config.splitter.default_orientation };
    let policy = config.splitter.default_size_policy;

    let mut tree = ViewTree::with_config(HeadlessContext::new(), config);
    let window = tree.insert(Panel::window());
    tree.resize(window, size);
    let splitter = tree.insert(Splitter::new(orientation));
    tree.push_back(window, splitter);
    tree.resize_sub_view(window, splitter, size);

    for _ in 0..panes {
        let pane = tree.insert(Spacer::new().with_expand(true, true));
        if !Splitter::add_pane(&mut tree, splitter, pane, policy) {
            bail!("splitter refused pane {pane:?}");
        }
    }
    tree.validate(window).map_err(anyhow::Error::msg).context("tree is inconsistent after layout")?;
    print!("{}", tree.draw_tree(window));

    if let Some(new_size) = resize {
        info!(?new_size, "resizing window");
        tree.resize(window, new_size);
        tree.resize_sub_view(window, splitter, new_size);
        print!("{}", tree.draw_tree(window));
    }

    if let Some(delta) = drag {
        let Some(handle) = Splitter::handles(&tree, splitter).first().copied() else {
            bail!("no handle to drag with a single pane");
        };
        drag_handle(&mut tree, window, handle, orientation, delta);
        print!("{}", tree.draw_tree(window));
    }

    tree.process_redraw_requests();
    tree.draw(window);
    let syncs = tree.render_context_as::<HeadlessContext>().map_or(0, HeadlessContext::sync_count);
    println!("window synchronized {syncs} time(s)");
    Ok(())
}

fn drag_handle(tree: &mut ViewTree, window: NodeId, handle: NodeId, orientation: Orientation, delta: i32) {
    let rect = tree.rect(handle);
    let origin = tree.global_position(handle) + Point::new(rect.size.width / 2, rect.size.height / 2);
    let target = origin + orientation.point(delta, 0);

    let set_cursor = |tree: &mut ViewTree, at: Point| {
        if let Some(ctx) = tree.render_context_as_mut::<HeadlessContext>() {
            ctx.set_cursor_position(at);
        }
    };
    set_cursor(tree, origin);
    tree.dispatch_mouse_press(window, &MouseEvent::new(origin));
    set_cursor(tree, target);
    tree.dispatch_mouse_move(window, &MouseEvent::new(target));
    tree.dispatch_mouse_release(window, &MouseEvent::new(target));
}
