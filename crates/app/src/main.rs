use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use directors_chair_core::{
    controls, propose_patch, upload, AgentPatchRequest, AppConfig, CameraAngle, CameraHeight,
    CameraRotation, ColorPalette, ConfigStore, ControlUpdate, FieldOfView, FiboPayload,
    GenerateAction, GenerationHistory, GenerationStatus, Lighting, PlaybackClock, RenderSession,
    RenderStatus, SceneConfiguration, StartOutcome,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> directors_chair_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Show { scene, gauges } => run_show(&scene, gauges),
        Commands::Options => run_options(),
        Commands::Render => run_render(&config).await,
        Commands::Generate { scene } => run_generate(&config, &scene).await,
        Commands::Patch { instruction, scene } => run_patch(&instruction, &scene),
    }
}

fn run_show(scene: &SceneArgs, gauges: bool) -> directors_chair_core::Result<()> {
    let store = build_store(scene)?;
    println!("{}", store.configuration().to_pretty_json()?);

    if gauges {
        let current = store.controls();
        print_gauge(
            "lens fov",
            &current.fov.to_string(),
            controls::fov_fraction(current.fov),
        );
        print_gauge(
            "rotation",
            &current.camera_rotation.to_string(),
            controls::compass_fraction(current.camera_rotation),
        );
    }
    Ok(())
}

fn print_gauge(label: &str, value: &str, fraction: f32) {
    const WIDTH: usize = 24;
    let filled = (fraction * WIDTH as f32).round() as usize;
    println!(
        "{label:<9} {value:>6} [{}{}] {:>3.0}%",
        "#".repeat(filled),
        ".".repeat(WIDTH - filled),
        fraction * 100.0
    );
}

fn run_patch(instruction: &str, scene: &SceneArgs) -> directors_chair_core::Result<()> {
    let mut store = build_store(scene)?;
    let request = AgentPatchRequest::new(store.configuration().clone(), instruction);
    let response = propose_patch(&request)?;

    let changed = response.apply_to(&mut store);
    tracing::info!(changed, revision = store.revision(), "agent patch applied");
    println!("{}", response.patch_summary);
    println!("{}", store.configuration().to_pretty_json()?);
    Ok(())
}

fn run_options() -> directors_chair_core::Result<()> {
    print_options("camera_angle", CameraAngle::ALL.iter().map(|v| v.as_str()));
    print_options("camera_height", CameraHeight::ALL.iter().map(|v| v.as_str()));
    print_options("lighting", Lighting::ALL.iter().map(|v| v.as_str()));
    print_options("color_palette", ColorPalette::ALL.iter().map(|v| v.as_str()));
    println!(
        "fov: {}..={} {}",
        FieldOfView::MIN,
        FieldOfView::MAX,
        FieldOfView::UNIT
    );
    println!(
        "camera_rotation: {}..={} {}",
        CameraRotation::MIN,
        CameraRotation::MAX,
        CameraRotation::UNIT
    );
    Ok(())
}

fn print_options<'a>(field: &str, values: impl Iterator<Item = &'a str>) {
    println!("{field}: {}", values.collect::<Vec<_>>().join(", "));
}

async fn run_render(config: &AppConfig) -> directors_chair_core::Result<()> {
    let mut session = RenderSession::new(config.render);
    let mut snapshots = session.subscribe()?;

    if session.start()? == StartOutcome::AlreadyRunning {
        return Ok(());
    }
    println!("[{}]", RenderStatus::Developing);

    let mut printed = 0;
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        for line in &snapshot.log_lines[printed..] {
            println!("> {line}");
        }
        printed = snapshot.log_lines.len();

        if snapshot.status == RenderStatus::Done {
            println!("[{}]", snapshot.status);
            for shot in &snapshot.results {
                println!("{:<16} {:>5}  ISO {}", shot.label, shot.lens, shot.iso);
            }
            return Ok(());
        }

        if snapshots.changed().await.is_err() {
            return Err("render session ended before finishing".into());
        }
    }
}

async fn run_generate(config: &AppConfig, scene: &SceneArgs) -> directors_chair_core::Result<()> {
    let store = build_store(scene)?;
    let scene = store.configuration();
    let mut action = GenerateAction::new(&config.generate);
    let mut history = GenerationHistory::new();

    if action.trigger(scene, &PlaybackClock::new())?.is_none() {
        return Ok(());
    }

    let payload = FiboPayload::from_configuration(scene, config.generate.seed);
    println!("{}", serde_json::to_string_pretty(&payload)?);

    let record = history.record(scene, GenerationStatus::Success)?;
    if let Some(url) = &record.generated_image_url {
        println!("generation {} -> {url}", record.uuid);
    }

    if let Some(ready_at) = action.ready_at() {
        tokio::time::sleep(ready_at).await;
        action.tick(&PlaybackClock::at(ready_at));
    }
    tracing::info!(busy = action.is_busy(), "generate finished");
    Ok(())
}

fn build_store(scene: &SceneArgs) -> directors_chair_core::Result<ConfigStore> {
    let initial = match &scene.scene {
        Some(path) => load_scene(path)?,
        None => SceneConfiguration::default(),
    };
    let mut store = ConfigStore::with_configuration(initial);

    for update in &scene.set {
        if !store.apply(*update) {
            tracing::debug!(field = update.field(), "value unchanged");
        }
    }
    if let Some(image) = &scene.image {
        store.set_reference_image(Some(upload::load_reference_image(image)?));
    }
    if scene.clear_image {
        store.set_reference_image(None);
    }

    tracing::info!(revision = store.revision(), "scene configured");
    Ok(store)
}

fn load_scene(path: &Path) -> directors_chair_core::Result<SceneConfiguration> {
    let raw = std::fs::read_to_string(path)?;
    SceneConfiguration::from_json(&raw)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Director's Chair camera and scene configurator", long_about = None)]
struct Cli {
    /// Optional JSON file overriding timings and generate settings.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the scene configuration as pretty JSON.
    Show {
        #[command(flatten)]
        scene: SceneArgs,

        /// Also print the lens and rotation dial positions.
        #[arg(long)]
        gauges: bool,
    },
    /// List the legal values of every control.
    Options,
    /// Play back the staged render and print the resulting shots.
    Render,
    /// Send the scene to the (mock) engine and record the generation.
    Generate {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Ask the (mock) agent to edit the scene from a plain-language instruction.
    Patch {
        /// What to change, e.g. "make the lighting more dramatic".
        instruction: String,

        #[command(flatten)]
        scene: SceneArgs,
    },
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Scene configuration JSON to start from instead of the defaults.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Control edit in `field=value` form, e.g. `fov=50`. Repeatable.
    #[arg(short, long = "set", value_name = "FIELD=VALUE")]
    set: Vec<ControlUpdate>,

    /// Image file to use as the reference image.
    #[arg(long, conflicts_with = "clear_image")]
    image: Option<PathBuf>,

    /// Drop the reference image carried by `--scene`.
    #[arg(long)]
    clear_image: bool,
}
