use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use visdump::{
    build_figure, collect_all, collect_run_group, export_group, list_environments, per_run,
    render, summarize_group, AggregateConfig, Axis, AxisRange, CsvConfig, Figure, Matches,
    PlotConfig, RenderOptions, RunGroup, Settings,
};
use visdump_client::VisdomClient;

#[derive(Parser, Debug)]
#[command(name = "visdump")]
#[command(about = "Export and plot experiment metrics stored on a Visdom server")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    server: ServerArgs,

    /// Settings file (TOML); defaults to ./visdump.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the `[visdom]` settings section.
#[derive(Args, Debug, Default)]
struct ServerArgs {
    /// Visdom server URL
    #[arg(long, global = true)]
    visdom_url: Option<String>,

    /// Visdom server port
    #[arg(long, global = true)]
    visdom_port: Option<u16>,

    /// Path prefix the server is mounted under
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List environment ids containing a substring
    Ls {
        /// Substring to look for
        pattern: String,
    },
    /// Write one x,y CSV file per matching environment
    Csv(CsvArgs),
    /// Print max/min statistics across runs
    Stats(StatsArgs),
    /// Plot features of several run groups into one image
    Plot(PlotArgs),
    /// Re-render a figure saved with `plot --save-figure`
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct CsvArgs {
    /// Title of the window holding the curve
    #[arg(long)]
    feature_name: String,

    /// Substring selecting the environments
    #[arg(long)]
    env_base_name: String,

    /// Appended to the environment id to form the file name
    #[arg(long, default_value = ".csv")]
    suffix: String,

    /// Directory the files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Keep at most this many samples per run
    #[arg(long)]
    max_samples: Option<usize>,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Title of the window holding the curve
    #[arg(long)]
    feature_name: String,

    /// Substrings selecting one run group each
    #[arg(long, num_args = 1.., required = true)]
    env_base_names: Vec<String>,

    /// Axis the statistics are taken over
    #[arg(long, value_enum, default_value_t = AxisArg::Y)]
    axis: AxisArg,

    /// Keep at most this many samples per run
    #[arg(long)]
    max_samples: Option<usize>,
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// Window titles to plot
    #[arg(long, num_args = 1.., required = true)]
    feature_names: Vec<String>,

    /// Substrings selecting one run group each
    #[arg(long, num_args = 1.., required = true)]
    env_base_names: Vec<String>,

    /// Legend per base name, in the same order
    #[arg(long, num_args = 1..)]
    legends: Option<Vec<String>>,

    /// Display label per feature, in the same order
    #[arg(long, num_args = 1..)]
    feature_labels: Option<Vec<String>>,

    #[arg(long, default_value = "")]
    title: String,

    #[arg(long)]
    x_label: Option<String>,

    #[arg(long)]
    y_label: Option<String>,

    #[command(flatten)]
    ranges: RangeArgs,

    #[command(flatten)]
    size: SizeArgs,

    /// Image file; `.svg` selects SVG output
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    /// Also save the figure as JSON for `render`
    #[arg(long)]
    save_figure: Option<PathBuf>,

    /// Keep at most this many samples per run
    #[arg(long)]
    max_samples: Option<usize>,

    /// Skip printing max/min statistics
    #[arg(long)]
    no_stats: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Figure written by `plot --save-figure`
    figure: PathBuf,

    /// Image file; `.svg` selects SVG output
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    /// Replace the saved title
    #[arg(long)]
    title: Option<String>,

    #[command(flatten)]
    ranges: RangeArgs,

    #[command(flatten)]
    size: SizeArgs,
}

#[derive(Args, Debug, Default)]
struct RangeArgs {
    /// Fixed x axis bounds
    #[arg(long, num_args = 2, value_names = ["LO", "HI"], allow_negative_numbers = true)]
    x_range: Option<Vec<f64>>,

    /// Fixed y axis bounds
    #[arg(long, num_args = 2, value_names = ["LO", "HI"], allow_negative_numbers = true)]
    y_range: Option<Vec<f64>>,
}

impl RangeArgs {
    fn x(&self) -> Result<Option<AxisRange>> {
        parse_range(self.x_range.as_deref())
    }

    fn y(&self) -> Result<Option<AxisRange>> {
        parse_range(self.y_range.as_deref())
    }
}

#[derive(Args, Debug, Default)]
struct SizeArgs {
    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum AxisArg {
    X,
    Y,
}

impl From<AxisArg> for Axis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    apply_server_args(&mut settings, &cli.server);
    debug!("settings: {:?}", settings);

    match cli.command {
        Command::Render(args) => run_render(args, &settings),
        Command::Ls { pattern } => {
            let client = connect(&settings)?;
            block_on(run_ls(&client, &pattern))
        }
        Command::Csv(args) => {
            let client = connect(&settings)?;
            block_on(run_csv(&client, args))
        }
        Command::Stats(args) => {
            let client = connect(&settings)?;
            block_on(run_stats(&client, args))
        }
        Command::Plot(args) => {
            let plan = PlotPlan::new(args, &settings)?;
            let client = connect(&settings)?;
            block_on(run_plot(&client, plan))
        }
    }
}

fn connect(settings: &Settings) -> Result<VisdomClient> {
    VisdomClient::builder()
        .server(settings.visdom.url.as_str())
        .port(settings.visdom.port)
        .base_url(settings.visdom.base_url.as_str())
        .timeout(settings.visdom.timeout())
        .build()
        .context("failed to build Visdom client")
}

/// Requests are issued one at a time, so a current-thread runtime is enough.
fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(future)
}

fn apply_server_args(settings: &mut Settings, args: &ServerArgs) {
    if let Some(url) = &args.visdom_url {
        settings.visdom.url = url.clone();
    }
    if let Some(port) = args.visdom_port {
        settings.visdom.port = port;
    }
    if let Some(base_url) = &args.base_url {
        settings.visdom.base_url = base_url.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        settings.visdom.timeout_secs = timeout;
    }
}

fn render_options(settings: &Settings, size: &SizeArgs) -> RenderOptions {
    let mut options = settings.plot.render_options();
    if let Some(width) = size.width {
        options.width = width;
    }
    if let Some(height) = size.height {
        options.height = height;
    }
    options
}

fn parse_range(bounds: Option<&[f64]>) -> Result<Option<AxisRange>> {
    match bounds {
        None => Ok(None),
        Some(&[lo, hi]) => Ok(Some(AxisRange::new(lo, hi)?)),
        Some(other) => anyhow::bail!("expected two bounds, got {}", other.len()),
    }
}

async fn run_ls(client: &VisdomClient, pattern: &str) -> Result<()> {
    let envs = list_environments(client, pattern, Matches::Any).await?;
    for env in envs {
        println!("{}", env);
    }
    Ok(())
}

async fn run_csv(client: &VisdomClient, args: CsvArgs) -> Result<()> {
    let group = collect_run_group(client, &args.env_base_name, &args.feature_name).await?;

    let aggregate = AggregateConfig {
        max_samples: args.max_samples,
    };
    let trimmed = RunGroup {
        runs: per_run(&group, &aggregate)?,
        name: group.name,
    };

    let config = CsvConfig {
        out_dir: args.out_dir,
        suffix: args.suffix,
    };
    let written = export_group(&trimmed, &config)?;
    info!("exported {} csv files", written.len());
    Ok(())
}

async fn run_stats(client: &VisdomClient, args: StatsArgs) -> Result<()> {
    let aggregate = AggregateConfig {
        max_samples: args.max_samples,
    };
    for base in &args.env_base_names {
        let group = collect_run_group(client, base, &args.feature_name).await?;
        let summary = summarize_group(&group, base, args.axis.into(), &aggregate)?;
        println!("{}", summary);
    }
    Ok(())
}

/// Everything `plot` needs, validated before the first request.
struct PlotPlan {
    features: Vec<String>,
    bases: Vec<String>,
    config: PlotConfig,
    output: PathBuf,
    save_figure: Option<PathBuf>,
    options: RenderOptions,
    stats: bool,
}

impl PlotPlan {
    fn new(args: PlotArgs, settings: &Settings) -> Result<Self> {
        let config = PlotConfig {
            title: args.title,
            x_label: args.x_label.unwrap_or_else(|| settings.plot.x_label.clone()),
            y_label: args.y_label.unwrap_or_else(|| settings.plot.y_label.clone()),
            legends: args.legends,
            feature_labels: args.feature_labels,
            x_range: args.ranges.x()?,
            y_range: args.ranges.y()?,
            aggregate: AggregateConfig {
                max_samples: args.max_samples,
            },
        };
        config.validate(args.env_base_names.len(), args.feature_names.len())?;

        Ok(Self {
            options: render_options(settings, &args.size),
            features: args.feature_names,
            bases: args.env_base_names,
            config,
            output: args.output,
            save_figure: args.save_figure,
            stats: !args.no_stats,
        })
    }
}

async fn run_plot(client: &VisdomClient, plan: PlotPlan) -> Result<()> {
    let groups = collect_all(client, &plan.bases, &plan.features).await?;

    if plan.stats {
        let feature_count = plan.features.len();
        for (base_idx, base) in groups.iter().enumerate() {
            for (feature_idx, (feature, group)) in base.features.iter().enumerate() {
                let label =
                    plan.config
                        .legend(base_idx, &base.base, feature_idx, feature, feature_count);
                let summary = summarize_group(group, &label, Axis::Y, &plan.config.aggregate)?;
                println!("{}", summary);
            }
        }
    }

    let figure = build_figure(&groups, &plan.config)?;
    if let Some(path) = &plan.save_figure {
        figure.save(path)?;
    }
    render(&figure, &plan.output, &plan.options)?;
    Ok(())
}

fn run_render(args: RenderArgs, settings: &Settings) -> Result<()> {
    let x_range = args.ranges.x()?;
    let y_range = args.ranges.y()?;

    let mut figure = load_figure(&args.figure)?;
    if let Some(title) = args.title {
        figure.title = title;
    }
    if x_range.is_some() {
        figure.x_range = x_range;
    }
    if y_range.is_some() {
        figure.y_range = y_range;
    }

    render(&figure, &args.output, &render_options(settings, &args.size))?;
    Ok(())
}

fn load_figure(path: &Path) -> Result<Figure> {
    Figure::load(path).with_context(|| format!("failed to load figure {}", path.display()))
}
