//! Genetic Art CLI - Evolve triangles towards a target image.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use genetic_art::{
    compute::{Renderer, SoftwareRenderer, TargetImage, evolution::export_best},
    schema::EvolutionConfig,
    EvolutionEngine,
};

struct Args {
    target: PathBuf,
    config: Option<PathBuf>,
    out_dir: PathBuf,
    snapshot_every: u64,
    log_every: u64,
    renderer: String,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <target-image> [config.json] [options]", program);
    eprintln!();
    eprintln!("Evolve semi-transparent triangles towards a target image.");
    eprintln!("Runs until a configured stop condition is met or the process is stopped.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  target-image          BMP or PNG matching the configured canvas size");
    eprintln!("  config.json           Run configuration (default: built-in defaults)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --out <dir>           Snapshot directory (default: snapshots)");
    eprintln!("  --snapshot-every <n>  Write the best candidate every n generations (default: 100, 0 = never)");
    eprintln!("  --log-every <n>       Print progress every n generations (default: 10)");
    eprintln!("  --renderer <name>     software (default) or skia");
    eprintln!("  --example             Print the default configuration and exit");
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut out_dir = PathBuf::from("snapshots");
    let mut snapshot_every = 100;
    let mut log_every = 10;
    let mut renderer = String::from("software");

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", name))
        };
        match arg.as_str() {
            "--out" => out_dir = PathBuf::from(value("--out")?),
            "--snapshot-every" => {
                snapshot_every = value("--snapshot-every")?
                    .parse()
                    .map_err(|e| format!("--snapshot-every: {}", e))?
            }
            "--log-every" => {
                log_every = value("--log-every")?
                    .parse()
                    .map_err(|e| format!("--log-every: {}", e))?
            }
            "--renderer" => renderer = value("--renderer")?,
            flag if flag.starts_with("--") => return Err(format!("Unknown option {}", flag)),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let target = positional
        .next()
        .ok_or_else(|| "Missing target image".to_string())?;
    let config = positional.next();
    if positional.next().is_some() {
        return Err("Too many arguments".to_string());
    }

    Ok(Args {
        target,
        config,
        out_dir,
        snapshot_every,
        log_every: log_every.max(1),
        renderer,
    })
}

fn make_renderer(name: &str, background: [u8; 3]) -> Result<Box<dyn Renderer>, String> {
    match name {
        "software" => Ok(Box::new(SoftwareRenderer::new(background))),
        #[cfg(feature = "skia")]
        "skia" => Ok(Box::new(genetic_art::compute::SkiaRenderer::new(background))),
        other => Err(format!(
            "Unknown renderer {} (skia requires the `skia` feature)",
            other
        )),
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config: EvolutionConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => EvolutionConfig::default(),
    };

    let target = TargetImage::load_with_size(&args.target, config.width, config.height)?;
    let renderer = make_renderer(&args.renderer, config.background)?;

    println!("Genetic Art");
    println!("===========");
    println!("Canvas: {}x{}", config.width, config.height);
    println!(
        "Population: {} genomes x {} triangles ({} elites)",
        config.population_size,
        config.triangle_count,
        config.elite_count()
    );
    println!("Renderer: {}", args.renderer);
    println!();

    let mut engine = EvolutionEngine::new(config, target, renderer)?;
    println!("Initial best fitness: {}", engine.best().fitness);

    let start = Instant::now();
    let stop_reason = loop {
        if let Some(reason) = engine.stop_reason() {
            break reason;
        }

        let report = engine.step()?;

        if report.generation % args.log_every == 0 {
            let elapsed = start.elapsed().as_secs_f32();
            println!(
                "  Generation {}: best={}, mean={:.0}, {:.1} gen/s",
                report.generation,
                report.best_fitness,
                report.mean_fitness,
                report.generation as f32 / elapsed
            );
        }

        if args.snapshot_every > 0 && report.generation % args.snapshot_every == 0 {
            let paths = export_best(&engine, &args.out_dir)?;
            log::info!("Snapshot written to {}", paths.image.display());
        }
    };

    let paths = export_best(&engine, &args.out_dir)?;
    println!();
    println!("Stopped: {:?}", stop_reason);
    println!("Generations: {}", engine.generation());
    println!("Best fitness: {}", engine.best().fitness);
    println!("Best image: {}", paths.image.display());
    Ok(())
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print_example_config();
        return;
    }

    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage(&args[0]);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(parsed) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_example_config() {
    let config = EvolutionConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
