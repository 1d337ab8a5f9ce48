mod arena;
mod pipeline;
mod primality;
mod queue;
mod random;
mod stats;

use clap::{Parser, Subcommand};
use std::io::{self, BufWriter};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "primecount")]
#[command(about = "Concurrent prime counter - classify an integer stream across worker threads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Count primes in whitespace-separated integers read from stdin")]
    Count {
        #[arg(
            short,
            long,
            help = "Number of worker threads (defaults to available parallelism)"
        )]
        workers: Option<usize>,
        #[arg(
            short,
            long,
            default_value = "2",
            help = "Queue variation to use (1 = mutex reference, 2 = lock-free)"
        )]
        variation: u32,
        #[arg(
            short,
            long,
            default_value = "256",
            help = "Queue soft capacity before the producer backs off"
        )]
        capacity: usize,
        #[arg(
            long,
            default_value = "10000000",
            help = "Node arena capacity; must cover the whole input stream"
        )]
        arena: usize,
        #[arg(long, help = "Print memory/CPU usage and timing around the run")]
        stats: bool,
    },
    #[command(about = "Check the primality of the given integers")]
    Check {
        #[arg(required = true, allow_negative_numbers = true, help = "Integers to classify")]
        numbers: Vec<i64>,
    },
    #[command(about = "Generate random integers on stdout for piping into count")]
    Gen {
        #[arg(help = "How many integers to generate")]
        count: usize,
        #[arg(
            short,
            long,
            default_value = "1000000",
            help = "Exclusive upper bound for generated values"
        )]
        max: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Count {
            workers,
            variation,
            capacity,
            arena,
            stats,
        } => {
            let start = Instant::now();

            if stats {
                stats::print_usage("start");
            }

            let config = pipeline::Config {
                workers: workers.unwrap_or_else(pipeline::detect_workers),
                soft_capacity: capacity,
                arena_capacity: arena,
                variation,
            };

            let stdin = io::stdin();
            let total = pipeline::count_primes(stdin.lock(), &config);

            println!("{} total primes.", total);

            let duration_us = start.elapsed().as_micros();

            if stats {
                stats::print_usage("end");
                println!(
                    "Execution time: {}us ({:.2}ms)",
                    duration_us,
                    duration_us as f64 / 1000.0
                );
            }

            if let Err(e) = stats::log_execution(
                "count",
                &format!("workers={} capacity={}", config.workers, capacity),
                variation,
                duration_us,
            ) {
                eprintln!("Warning: Failed to log execution: {}", e);
            }
        }
        Commands::Check { numbers } => {
            for n in numbers {
                if primality::is_prime(n) {
                    println!("{} is prime", n);
                } else {
                    println!("{} is not prime", n);
                }
            }
        }
        Commands::Gen { count, max } => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            if let Err(e) = random::write_random_integers(&mut writer, count, max) {
                eprintln!("Error writing generated integers: {}", e);
                std::process::exit(1);
            }
        }
    }
}
