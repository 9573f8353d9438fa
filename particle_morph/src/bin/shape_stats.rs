//! Print distribution statistics for every shape.
//!
//! ```text
//! shape_stats [COUNT] [--seed N]
//! ```

use particle_morph::{ShapeGenerator, ShapeKind, DEFAULT_PARTICLE_COUNT};

/// Value following `flag`, if any.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// `(count, seed)` from the command line.  The count may appear anywhere
/// except as the value of `--seed`.
fn parse_args(args: &[String]) -> (usize, Option<u64>) {
    let seed_at = args.iter().position(|a| a == "--seed").map(|i| i + 1);
    let seed = flag_value(args, "--seed").and_then(|s| s.parse::<u64>().ok());
    let count = args.iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != seed_at)
        .find_map(|(_, a)| a.parse::<usize>().ok())
        .unwrap_or(DEFAULT_PARTICLE_COUNT);
    (count, seed)
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (count, seed) = parse_args(&args);

    let mut gen = match seed {
        Some(s) => ShapeGenerator::seeded(s),
        None    => ShapeGenerator::new(),
    };

    println!("\n=== Particle shape statistics ({} points{}) ===\n",
        count, seed.map(|s| format!(", seed {}", s)).unwrap_or_default());
    println!("   {:<10} {:>22} {:>22} {:>22} {:>9} {:>9}",
        "shape", "x range", "y range", "z range", "mean |p|", "mean |y|");

    for kind in ShapeKind::ALL {
        let set = gen.generate(kind, count);
        let mut lo = [f32::MAX; 3];
        let mut hi = [f32::MIN; 3];
        let mut radius_sum = 0.0f64;
        let mut abs_y_sum  = 0.0f64;
        for p in set.points() {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
            radius_sum += (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt() as f64;
            abs_y_sum  += p[1].abs() as f64;
        }
        let n = set.len().max(1) as f64;
        let range = |a: usize| format!("[{:>8.3}, {:>8.3}]", lo[a], hi[a]);
        println!("   {:<10} {:>22} {:>22} {:>22} {:>9.3} {:>9.3}",
            kind.name(), range(0), range(1), range(2), radius_sum / n, abs_y_sum / n);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn count_before_or_after_seed() {
        assert_eq!(parse_args(&args(&["5000", "--seed", "3"])), (5000, Some(3)));
        assert_eq!(parse_args(&args(&["--seed", "3", "5000"])), (5000, Some(3)));
    }

    #[test]
    fn defaults_when_absent() {
        assert_eq!(parse_args(&args(&[])), (DEFAULT_PARTICLE_COUNT, None));
        assert_eq!(parse_args(&args(&["--seed", "42"])), (DEFAULT_PARTICLE_COUNT, Some(42)));
        assert_eq!(parse_args(&args(&["800"])), (800, None));
    }
}
