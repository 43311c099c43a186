use crate::prefs::Preferences;
use clap::Parser;
use dotgrid::render::RenderOptions;
use std::path::PathBuf;

/// `backdrop` - renders a frame of the interactive dot-grid backdrop.
///
/// Loads the path set for a viewport from the path store (generating and
/// uploading it on a miss), replays a pointer trace through the tracker and
/// writes the resulting frame as SVG.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Base URL of the `path_store` service.
    #[arg(long, env = "PATH_STORE_URL", default_value = "http://127.0.0.1:8080")]
    pub store_url: String,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Upper bound for a single request to the path store.
    ///
    /// Past this the store is treated as unavailable and paths are generated
    /// locally.
    #[arg(long, env = "PATH_STORE_TIMEOUT_MS", default_value_t = 2000)]
    pub request_timeout_ms: u64,

    /// Seed for path generation and bundle selection. Random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON file overriding grid tuning (spacing, stride, distance band, ...).
    #[arg(long)]
    pub grid_config: Option<PathBuf>,

    /// Pointer trace to replay, one `x,y` per line. A diagonal sweep is used
    /// when omitted.
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Pointer events delivered between two animation frames.
    #[arg(long, default_value_t = 4)]
    pub events_per_frame: usize,

    /// Where to write the rendered SVG frame.
    #[arg(long, default_value = "backdrop.svg")]
    pub out: PathBuf,

    /// Preferences file holding the animation and dark-mode toggles.
    #[arg(long, env = "BACKDROP_PREFS", default_value = "backdrop-prefs.json")]
    pub prefs: PathBuf,

    /// Set and persist the dark-mode toggle.
    #[arg(long)]
    pub dark_mode: Option<bool>,

    /// Set and persist the animation toggle.
    #[arg(long)]
    pub animations: Option<bool>,

    /// Draw only hotspots and paths, without the background dots.
    #[arg(long)]
    pub hide_lattice: bool,

    /// Do not upload locally generated paths.
    #[arg(long)]
    pub no_store: bool,

    /// Invalidate the cached set for this viewport before loading.
    #[arg(long)]
    pub clear_cache: bool,
}

impl Config {
    /// Render options for this run: the persisted toggles plus per-run flags.
    pub fn render_options(&self, prefs: &Preferences) -> RenderOptions {
        prefs.render_options().with_hide_lattice(self.hide_lattice)
    }
}
