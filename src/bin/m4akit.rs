use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use m4akit::esds::AdtsHeader;
use m4akit::{AdtsSink, Config, CookieLayout, Mp4TrackSetup, SinkTarget};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// How to walk the ES_Descriptor body; overrides the config file
    #[arg(long, value_enum, global = true)]
    layout: Option<Layout>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the decoded AudioSpecificConfig and MP4 track setup of a cookie
    Inspect {
        cookie: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Wrap raw AAC access units (one per file) into an ADTS stream
    Adts {
        #[arg(long)]
        cookie: PathBuf,
        /// Output path, `-` for stdout; overrides the config file
        #[arg(short, long)]
        output: Option<String>,
        #[arg(required = true)]
        frames: Vec<PathBuf>,
    },
    /// Print the ADTS header for a payload of the given length
    Header {
        #[arg(long)]
        cookie: PathBuf,
        #[arg(long)]
        length: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Layout {
    Fixed,
    Flagged,
}

impl From<Layout> for CookieLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Fixed => CookieLayout::Fixed,
            Layout::Flagged => CookieLayout::Flagged,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log.as_deref().unwrap_or("info")))
        .context("invalid log filter")?;
    // stdout may carry the ADTS stream
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let layout = args
        .layout
        .map(CookieLayout::from)
        .unwrap_or(config.cookie.layout);

    match args.command {
        Command::Inspect { cookie, json } => {
            let setup = Mp4TrackSetup::from_cookie(&read_cookie(&cookie)?, layout)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&setup)?);
            } else {
                let audio = &setup.audio_config;
                println!("object type:          {}", audio.object_type);
                println!("sampling rate index:  {}", audio.sampling_rate_index);
                println!("sampling rate:        {} Hz", audio.sampling_rate);
                println!("channel config:       {}", audio.channel_config);
                println!("track time scale:     {}", setup.time_scale);
                println!("track channel count:  {}", setup.channel_count);
                println!("es configuration:     {}", hex(&setup.es_configuration));
            }
        }
        Command::Adts {
            cookie,
            output,
            frames,
        } => {
            let target: SinkTarget = match output {
                Some(path) => path.parse()?,
                None => config.output.target()?,
            };
            let mut sink = AdtsSink::create(&target, &read_cookie(&cookie)?, layout)?;
            for path in &frames {
                let payload =
                    fs::read(path).with_context(|| format!("reading {}", path.display()))?;
                sink.write_frame(&payload)
                    .with_context(|| format!("writing frame {}", path.display()))?;
            }
            let (_, stats) = sink.finish()?;
            info!(
                frames = stats.frames_written,
                bytes = stats.bytes_written,
                output = %target,
                "wrote ADTS stream"
            );
        }
        Command::Header { cookie, length } => {
            let (_, audio) = m4akit::esds::parse_cookie(&read_cookie(&cookie)?, layout)?;
            let header = AdtsHeader::new(&audio, length)?;
            println!("{}", hex(&header.to_bytes()));
        }
    }

    Ok(())
}

fn read_cookie(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading cookie {}", path.display()))
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
