use chrono::Local;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

/// Resident set size of this process in MB, from /proc/self/status.
/// Returns None when the value cannot be read (non-Linux hosts).
pub fn memory_rss_mb() -> Option<f64> {
    let file = fs::File::open("/proc/self/status").ok()?;
    let reader = BufReader::new(file);

    for line in reader.lines().map_while(Result::ok) {
        // Format: "VmRSS:     12345 kB"
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb = rest.split_whitespace().next()?.parse::<f64>().ok()?;
            return Some(kb / 1024.0);
        }
    }
    None
}

/// Accumulated (user, system) CPU time of this process in seconds, from
/// fields 14 and 15 of /proc/self/stat. Assumes the conventional 100 Hz
/// clock tick.
pub fn cpu_times() -> Option<(f64, f64)> {
    const CLOCK_TICKS_PER_SEC: f64 = 100.0;

    let stat = fs::read_to_string("/proc/self/stat").ok()?;
    // The comm field (2) is parenthesized and may contain spaces; fields
    // are counted from after its closing paren
    let after_comm = &stat[stat.rfind(')')? + 1..];
    let mut fields = after_comm.split_whitespace();

    // after_comm starts at field 3; utime is field 14, stime field 15
    let utime = fields.nth(11)?.parse::<f64>().ok()?;
    let stime = fields.next()?.parse::<f64>().ok()?;

    Some((utime / CLOCK_TICKS_PER_SEC, stime / CLOCK_TICKS_PER_SEC))
}

/// Print the RSS and CPU usage lines, labeled with where in the run they
/// were sampled.
pub fn print_usage(label: &str) {
    match memory_rss_mb() {
        Some(rss) => println!("[{}] Memory used: {:.2} MB", label, rss),
        None => println!("[{}] Failed to get memory usage info", label),
    }
    match cpu_times() {
        Some((user, system)) => {
            println!(
                "[{}] CPU time: user {:.6} sec, system {:.6} sec",
                label, user, system
            );
        }
        None => println!("[{}] Failed to get CPU usage info", label),
    }
}

fn data_dir() -> PathBuf {
    let xdg_data_home = env::var("XDG_DATA_HOME")
        .ok()
        .and_then(|path| {
            if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            }
        })
        .or_else(|| {
            env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share"))
        })
        .expect("Could not determine data directory");

    xdg_data_home.join("primecount")
}

/// Append a timestamped record of a run to execution_log.txt in the data
/// directory.
pub fn log_execution(
    subcommand: &str,
    args: &str,
    variation: u32,
    duration_us: u128,
) -> std::io::Result<()> {
    let dir = data_dir();
    fs::create_dir_all(&dir)?;

    let log_path = dir.join("execution_log.txt");
    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    writeln!(
        file,
        "{} | {} | {} | v{} | {}us",
        timestamp, subcommand, args, variation, duration_us
    )?;

    Ok(())
}
