//! uiohook probe: loads the native helper for this platform and reports
//! what it sees.
//!
//! Useful for checking a machine's layouts, key bindings and modifier state
//! without installing a hook.
//!
//! ```text
//! uiohook-probe [--config <path>] [--mock]
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load HelperConfig       -- platform config file or --config
//!  └─ init tracing            -- RUST_LOG, else [logging] level
//!  └─ build helper
//!       ├─ MessageHookHelper<WindowsPlatform>   (Windows)
//!       ├─ RecordHelper<X11Platform>            (Linux, x11-backend)
//!       └─ both helpers on mock platforms       (--mock)
//!  └─ session: load → report → resolve → unload
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use uiohook_core::{CharClass, VirtualKeyCode};
use uiohook_native::application::InputHelper;
use uiohook_native::infrastructure::storage::config::{self, HelperConfig};

/// Keys whose native codes the probe reports.
const PROBE_KEYS: [VirtualKeyCode; 4] = [
    VirtualKeyCode::KeyA,
    VirtualKeyCode::Enter,
    VirtualKeyCode::ShiftL,
    VirtualKeyCode::NumpadEnter,
];

#[derive(Debug, Default)]
struct ProbeArgs {
    config: Option<PathBuf>,
    mock: bool,
}

impl ProbeArgs {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Self> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--mock" => parsed.mock = true,
                "--config" => {
                    let path = args.next().context("--config needs a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                other => bail!("unknown argument {other:?}; usage: uiohook-probe [--config <path>] [--mock]"),
            }
        }
        Ok(parsed)
    }
}

fn main() -> anyhow::Result<()> {
    let args = ProbeArgs::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(mock = args.mock, "uiohook probe starting");

    if args.mock {
        run_mock(&config);
        return Ok(());
    }
    run_native(&config)
}

/// Loads `helper` once, reports its state, runs `body`, then unloads it.
///
/// Returns whatever `body` produced.
fn session<H, T>(backend: &str, helper: &mut H, body: impl FnOnce(&mut H) -> T) -> T
where
    H: InputHelper,
{
    let available = helper.load();
    info!(backend, available, modifiers = ?helper.modifiers(), "helper loaded");
    for vcode in PROBE_KEYS {
        let native = helper.vcode_to_keycode(vcode);
        info!(backend, ?vcode, native, "key binding");
    }

    let result = body(helper);

    let released = helper.unload();
    info!(backend, released, "helper unloaded");
    result
}

/// Resolves `key` and logs the text it produces.
fn log_text<H: InputHelper>(backend: &str, helper: &mut H, key: &H::Key) -> usize {
    let mut out = [0u16; 4];
    let mut classes = [CharClass::EMPTY; 4];
    let count = helper.resolve_unicode(key, &mut out, &mut classes);
    info!(
        backend,
        text = %String::from_utf16_lossy(&out[..count]),
        classes = ?&classes[..count],
        "resolved text"
    );
    count
}

#[cfg(target_os = "windows")]
fn run_native(_config: &HelperConfig) -> anyhow::Result<()> {
    use uiohook_native::application::{KeyStroke, MessageHookHelper};
    use uiohook_native::infrastructure::platform::windows::WindowsPlatform;

    let mut helper = MessageHookHelper::new(WindowsPlatform::new());
    session("windows", &mut helper, |helper| {
        log_text("windows", helper, &KeyStroke::new(0x41, 0x1E))
    });
    Ok(())
}

#[cfg(all(target_os = "linux", feature = "x11-backend"))]
fn run_native(config: &HelperConfig) -> anyhow::Result<()> {
    use uiohook_native::application::RecordHelper;
    use uiohook_native::infrastructure::platform::x11::X11Platform;

    let platform = X11Platform::open(None).context("failed to open the X display")?;
    let mut helper = RecordHelper::new(platform, config.record_options());

    session("x11", &mut helper, |helper| {
        let repeat = helper.enable_detectable_auto_repeat();
        info!(detectable_auto_repeat = repeat, "auto-repeat configured");
        for logical in 1..=3 {
            info!(logical, physical = helper.map_pointer_button(logical), "pointer button");
        }
    });
    Ok(())
}

#[cfg(not(any(
    target_os = "windows",
    all(target_os = "linux", feature = "x11-backend")
)))]
fn run_native(_config: &HelperConfig) -> anyhow::Result<()> {
    bail!("no native backend in this build; rerun with --mock or enable the `x11-backend` feature")
}

/// Exercises both helpers against the in-memory platforms.
fn run_mock(config: &HelperConfig) {
    use uiohook_core::wire::{EventBody, KeyEvent, MarshalledEvent};
    use uiohook_native::application::{KeyStroke, MessageHookHelper, RecordHelper};
    use uiohook_native::infrastructure::platform::mock::{MockLayoutPlatform, MockXPlatform};

    let layouts = MockLayoutPlatform::new()
        .with_layouts(&[0x0409_0409])
        .with_focus(Some(0x0409_0409))
        .with_key(0x41, 'a', 'A');
    let mut windows = MessageHookHelper::new(layouts);
    session("mock-windows", &mut windows, |helper| {
        log_text("mock-windows", helper, &KeyStroke::new(0x41, 0x1E))
    });

    let mut x11 = RecordHelper::new(MockXPlatform::evdev().with_text(38, "a"), config.record_options());
    let press = MarshalledEvent {
        timestamp: 0,
        send_event: false,
        body: EventBody::KeyPress(KeyEvent {
            keycode: 38,
            ..KeyEvent::default()
        }),
    };
    session("mock-x11", &mut x11, |helper| log_text("mock-x11", helper, &press));
}
