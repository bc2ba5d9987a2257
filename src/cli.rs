//! CLI argument parsing.
//!
//! The CLI only gathers configuration; submission and download live in the
//! library so other callers can drive them directly.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::params::{Direction, JobParameters, TrajectoryOptions};

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "windscan",
    version,
    about = "Submit HYSPLIT trajectory jobs to NOAA READY and fetch their GIS archives",
    after_help = "Examples:\n  windscan run --lat 41.98 --lon -87.90 --year 22 --month 10 --day 29 --hour 22\n  windscan submit --lat -33.87 --lon 151.21 --direction forward\n  windscan fetch --job-id 123456 --out /tmp/gis_123456.zip",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// JSON client config (base_url, timeout_secs, step_pause_ms, ...)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the READY server base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Emit a machine-readable JSON summary on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Log request-level detail
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a job and print its id
    Submit(SubmitArgs),
    /// Submit a job, wait, and download its archive
    Run(RunArgs),
    /// Download the archive of an already submitted job
    Fetch(FetchArgs),
}

/// Job definition flags; defaults reproduce a known-good Chicago O'Hare run.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Source latitude in signed decimal degrees
    #[arg(long, default_value_t = 41.98, allow_negative_numbers = true)]
    pub lat: f64,

    /// Source longitude in signed decimal degrees
    #[arg(long, default_value_t = -87.90, allow_negative_numbers = true)]
    pub lon: f64,

    /// Two-digit start year
    #[arg(long, default_value_t = 22)]
    pub year: u8,

    /// Start month (1-12)
    #[arg(long, default_value_t = 10)]
    pub month: u8,

    /// Start day (1-31)
    #[arg(long, default_value_t = 29)]
    pub day: u8,

    /// Start hour UTC (0-23)
    #[arg(long, default_value_t = 22)]
    pub hour: u8,

    #[arg(long, value_enum, default_value_t = Direction::Backward)]
    pub direction: Direction,

    /// Run length in hours
    #[arg(long, default_value_t = 168)]
    pub duration: u32,

    /// Source height above ground in meters
    #[arg(long, default_value_t = 500)]
    pub height: u32,
}

impl JobArgs {
    pub fn to_parameters(&self) -> JobParameters {
        JobParameters::new(self.lat, self.lon, self.year, self.month, self.day, self.hour)
            .with_options(TrajectoryOptions {
                direction: self.direction,
                duration_hours: self.duration,
                source_height_m: self.height,
            })
    }
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Destination for the archive (default: gis_<id>.zip in the working directory)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Seconds to wait before downloading (overrides config)
    #[arg(long, value_name = "SECS")]
    pub delay: Option<u64>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Numeric job id printed by `submit`
    #[arg(long)]
    pub job_id: String,

    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Seconds to wait before downloading (default: no wait)
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub delay: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_match_reference_job() {
        let args = RootArgs::try_parse_from(["windscan", "run"]).unwrap();
        let Command::Run(run) = args.command else {
            panic!("expected run command");
        };
        let params = run.job.to_parameters();
        assert_eq!(params, JobParameters::new(41.98, -87.90, 22, 10, 29, 22));
        assert!(run.out.is_none());
    }

    #[test]
    fn parses_negative_coordinates_and_options() {
        let args = RootArgs::try_parse_from([
            "windscan",
            "submit",
            "--lat",
            "-33.87",
            "--lon",
            "151.21",
            "--direction",
            "forward",
            "--height",
            "1000",
            "--json",
        ])
        .unwrap();
        assert!(args.json);
        let Command::Submit(submit) = args.command else {
            panic!("expected submit command");
        };
        let params = submit.job.to_parameters();
        assert_eq!(params.latitude, -33.87);
        assert_eq!(params.options.direction, Direction::Forward);
        assert_eq!(params.options.source_height_m, 1000);
    }

    #[test]
    fn fetch_requires_job_id() {
        assert!(RootArgs::try_parse_from(["windscan", "fetch"]).is_err());
        let args = RootArgs::try_parse_from(["windscan", "fetch", "--job-id", "42"]).unwrap();
        let Command::Fetch(fetch) = args.command else {
            panic!("expected fetch command");
        };
        assert_eq!(fetch.job_id, "42");
        assert_eq!(fetch.delay, 0);
    }
}
