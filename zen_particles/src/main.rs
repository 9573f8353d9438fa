//! zen_particles — interactive entry point.

use particle_morph::{Rgb, ShapeKind};
use std::io::{self, Write};
use zen_particles::app::{run, AppConfig, DetectorKind};

const MIN_PARTICLES: usize = 100;
const MAX_PARTICLES: usize = 200_000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Zen Particles — gesture-driven particle cloud         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard/mouse simulation  (use --features leap for hardware)");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut cfg = if args.iter().any(|a| a == "--quick") {
        println!("  Quick-start: 15000 particles, heart, #4facfe\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    if let Some(seed) = flag_value(&args, "--seed").and_then(|s| s.parse().ok()) {
        cfg.seed = Some(seed);
    }
    if args.iter().any(|a| a == "--no-camera") {
        cfg.detector = DetectorKind::Disabled;
    }

    println!();
    println!("  Opening window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn configure_interactively() -> AppConfig {
    let defaults = AppConfig::default();

    let particle_count = read_line("  Particles (default 15000): ")
        .trim().parse::<usize>().unwrap_or(defaults.particle_count)
        .clamp(MIN_PARTICLES, MAX_PARTICLES);

    println!("  Shape: heart  flower  saturn  buddha  fireworks  sphere");
    let initial_shape = match read_line("  Choice (default heart): ").trim() {
        "" => defaults.initial_shape,
        name => {
            let kind = ShapeKind::from_name(name);
            if !kind.name().eq_ignore_ascii_case(name) {
                println!("  ⚠  unknown shape, using {}", kind);
            }
            kind
        }
    };

    let color = loop {
        let input = read_line("  Colour #rrggbb (default #4facfe): ");
        let input = input.trim();
        if input.is_empty() { break defaults.color; }
        match input.parse::<Rgb>() {
            Ok(c)  => break c,
            Err(e) => println!("  ⚠  {}", e),
        }
    };

    AppConfig { particle_count, initial_shape, color, ..defaults }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
