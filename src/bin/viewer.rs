#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use anyhow::{bail, Context, Result};
    use clap::Parser;
    use indicatif::{ProgressBar, ProgressStyle};
    use pano_viewer::resource::{IMAGE_EXTENSIONS, RADIANCE_EXTENSIONS};
    use pano_viewer::{
        run_headless, HeadlessRequest, LoadStatus, LocalFile, SourceEvent, ViewerConfig,
    };

    #[derive(Parser, Debug)]
    #[command(about = "360° panorama viewer (LDR / HDR / EXR)", version)]
    struct Opt {
        /// Panorama URL or local file; the built-in sample is shown if omitted
        source: Option<String>,

        /// JSON viewer configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Choose the panorama with a file dialog
        #[arg(long, conflicts_with = "source")]
        pick: bool,

        /// Wheel deltas applied after loading (comma separated)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        zoom: Vec<f32>,

        /// Write a tone-mapped PNG of the loaded radiance map
        #[arg(long, value_name = "PNG")]
        preview: Option<PathBuf>,

        #[arg(long, default_value_t = 1.0)]
        exposure: f32,

        #[arg(long)]
        poll_interval_ms: Option<u64>,

        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Simulated start-up time of the radiance decoders
        #[arg(long, default_value_t = 0)]
        decoder_delay_ms: u64,
    }

    fn pick_file() -> Option<LocalFile> {
        let extensions: Vec<&str> = IMAGE_EXTENSIONS
            .iter()
            .chain(RADIANCE_EXTENSIONS)
            .copied()
            .collect();
        rfd::FileDialog::new()
            .set_title("Open panorama")
            .add_filter("panorama", extensions.as_slice())
            .pick_file()
            .map(LocalFile::on_disk)
    }

    fn source_event(source: String) -> SourceEvent {
        if Path::new(&source).is_file() {
            SourceEvent::FileSelected(LocalFile::on_disk(source))
        } else {
            SourceEvent::UrlSubmitted(source)
        }
    }

    pub fn main() -> Result<()> {
        env_logger::init();
        let opt = Opt::parse();

        let mut config = match &opt.config {
            Some(path) => ViewerConfig::from_path(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(ms) = opt.poll_interval_ms {
            config.poll_interval_ms = ms.max(1);
        }
        if let Some(ms) = opt.timeout_ms {
            config.load_timeout_ms = ms;
        }

        let source = if opt.pick {
            match pick_file() {
                Some(file) => Some(SourceEvent::FileSelected(file)),
                None => {
                    log::info!("no file picked, showing the default panorama");
                    None
                }
            }
        } else {
            opt.source.map(source_event)
        };

        let request = HeadlessRequest {
            source,
            wheel: opt.zoom,
            decoder_delay: Duration::from_millis(opt.decoder_delay_ms),
            ..Default::default()
        };

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .context("building spinner style")?,
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("starting viewer");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime")?;
        let local = tokio::task::LocalSet::new();
        let report = local.block_on(
            &runtime,
            run_headless(&config, request, |attempt| {
                spinner.set_message(format!(
                    "{} ({}, {} checks, {:.0}%)",
                    attempt.source,
                    attempt.class,
                    attempt.polls,
                    attempt.progress * 100.
                ));
            }),
        )?;
        spinner.finish_and_clear();

        if let Some(source) = &report.source {
            println!("source: {source}");
        }
        println!(
            "fov: {:.1}°  yaw: {:.1}°",
            report.surface.fov.0, report.surface.yaw.0
        );
        match &report.status {
            Some(LoadStatus::Applied { class, elapsed, .. }) => {
                println!("loaded {class} panorama in {elapsed:?}")
            }
            Some(LoadStatus::Failed { source, error }) => {
                bail!("loading {source} failed: {error}")
            }
            None => println!("raster panorama handed to the renderer"),
        }

        if let Some(path) = &opt.preview {
            let Some(texture) = report.surface.texture() else {
                bail!("--preview needs an HDR or EXR panorama");
            };
            texture
                .tone_mapped(opt.exposure)
                .save(path)
                .with_context(|| format!("writing preview {}", path.display()))?;
            println!("preview written to {}", path.display());
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
