//! area-xprop
//!
//! Prints the window metadata the Area window manager derives from a
//! client's ICCCM / EWMH properties.
//!
//! Usage: `area-xprop [--active | WINDOW] [--icon PATH]`

use anyhow::{Context, Result, bail};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x11rb::connection::Connection;

use area_hints::config::Config;
use area_hints::shared::Geometry;
use area_hints::wm::properties::Properties;
use area_hints::{
    Backend, ClientProperties, Constraints, ExtendedState, ScreenModel, WindowId, X11Backend,
};

enum Target {
    Active,
    Window(WindowId),
}

struct Args {
    target: Target,
    icon_path: Option<String>,
}

fn parse_window_id(arg: &str) -> Result<WindowId> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => WindowId::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.with_context(|| format!("Invalid window id {:?}", arg))
}

fn parse_args() -> Result<Args> {
    let mut target = Target::Active;
    let mut icon_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--active" | "-a" => target = Target::Active,
            "--icon" | "-i" => {
                icon_path = Some(args.next().context("--icon needs a file path")?);
            }
            "--help" | "-h" => {
                println!("Usage: area-xprop [--active | WINDOW] [--icon PATH]");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("Unknown option {}", other),
            other => target = Target::Window(parse_window_id(other)?),
        }
    }

    Ok(Args { target, icon_path })
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "area_hints=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args()?;
    let config = Config::load()?;

    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
    let (width, height) = {
        let screen = &conn.setup().roots[screen_num];
        (u32::from(screen.width_in_pixels), u32::from(screen.height_in_pixels))
    };
    let backend = X11Backend::new(conn, screen_num).context("Failed to intern atoms")?;
    info!("Connected to screen {} ({}x{})", screen_num, width, height);

    let props = Properties::new(&backend);
    let window = match args.target {
        Target::Window(window) => window,
        Target::Active => props
            .active_window()?
            .context("No window is active")?,
    };
    debug!("Inspecting window 0x{:x}", window);

    // Topology discovery is the window manager's job; the root size is
    // enough for the maximize check.
    let screens = ScreenModel::new(
        &[("root", Geometry::new(0, 0, width, height))],
        config.screens.scale,
    );
    print_window(&backend, &config, &screens, window)?;

    if let Some(path) = args.icon_path {
        let client = ClientProperties::new(&backend, window, &config.icons);
        match client.icon() {
            Some(png) => {
                std::fs::write(&path, png).with_context(|| format!("Failed to write {}", path))?;
                println!("icon written to {}", path);
            }
            None => println!("window has no icon"),
        }
    }

    Ok(())
}

fn print_window<B: Backend>(backend: &B, config: &Config, screens: &ScreenModel, window: WindowId) -> Result<()> {
    let props = Properties::new(backend);
    let client = ClientProperties::new(backend, window, &config.icons);
    let constraints = Constraints::new(backend);

    println!("window:            0x{:x}", window);
    println!("title:             {:?}", client.title()?);
    println!("class:             {:?}", client.class()?);
    println!("command:           {:?}", client.command()?);
    println!("icon name:         {:?}", client.icon_name()?);
    println!("type:              {}", client.window_type()?.atom_name());
    println!("decorated:         {}", client.decorated()?);
    match client.transient_for()? {
        Some(parent) => println!("transient for:     0x{:x}", parent),
        None => println!("transient for:     none"),
    }
    println!("override redirect: {}", props.override_redirect(window)?);
    println!("state:             {:?}", ExtendedState::new(backend).get(window)?);
    println!("skip taskbar:      {}", client.skip_taskbar()?);
    println!("WM_STATE:          {:?}", props.wm_state(window)?);

    let min = constraints.size_min(window)?;
    println!("min size:          {}x{}", min.width, min.height);
    match constraints.size_max(window)? {
        Some(max) => println!("max size:          {}x{}", max.width, max.height),
        None => println!("max size:          unconstrained"),
    }
    println!("fixed size:        {}", constraints.size_fixed(window)?);
    if let Some(screen) = screens.primary() {
        println!(
            "can maximize:      {} (on {}x{})",
            constraints.size_can_maximize(window, screen)?,
            screen.width,
            screen.height
        );
    }

    Ok(())
}
