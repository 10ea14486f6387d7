use clap::Parser;

use crate::SessionSource;

/// Developer switches read from the page's location hash, e.g. `#-vv&--seed=42`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct LaunchArgs {
    /// What log level to use
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Force a board seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl LaunchArgs {
    pub fn from_fragment(fragment: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(fragment.split(['#', '&']))
    }

    pub fn random_source(&self) -> SessionSource {
        SessionSource::new(self.seed)
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use gloo::utils::window;

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    match LaunchArgs::from_fragment(&location_hash) {
        Ok(args) => {
            if let Some(log_level) = args.verbose.log_level() {
                if let Err(err) = console_log::init_with_level(log_level) {
                    gloo::console::error!(format!("Error initializing logger: {err}"));
                }
            }
            log::debug!("seed: {:?}", args.seed);
        }
        Err(err) => gloo::console::error!(format!("Could not parse launch args: {err}")),
    }
}
