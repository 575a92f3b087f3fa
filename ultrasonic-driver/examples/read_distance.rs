use clap::Parser;
use tracing_subscriber::EnvFilter;
use ultrasonic_driver::{run_driver, DisplayRange, LinkConfig, SharedSeries};

/// Reads distances from an ultrasonic sensor over a serial port.
#[derive(Parser)]
#[command(disable_version_flag = true)]
struct Args {
    /// The device path to a serial port
    port: String,
    #[arg(long, default_value_t = 9600)]
    baud_rate: u32,
    /// Points kept in the display window
    #[arg(long, default_value_t = 100)]
    capacity: usize,
    #[arg(long, default_value_t = 0.)]
    min_range: f64,
    #[arg(long, default_value_t = 400.)]
    max_range: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = LinkConfig::new(&args.port).baud_rate(args.baud_rate);
    let range = DisplayRange::new(args.min_range, args.max_range);
    let series = SharedSeries::with_capacity(args.capacity);

    let (driver_threads, reading_rx) = match run_driver(&config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to open \"{}\". Error: {}", args.port, e);
            std::process::exit(1);
        }
    };

    for reading in reading_rx.iter() {
        let distance = reading.measurement.distance_cm;
        series.append(distance);

        let (first, last) = series.read(|s| s.sequence_window());
        let marker = if distance < range.min || distance > range.max {
            " (off scale)"
        } else {
            ""
        };
        println!(
            "{} {:8.2} cm{}  window [{}, {}]",
            reading.received_at.format("%H:%M:%S%.3f"),
            distance,
            marker,
            first,
            last
        );

        if let Some(stats) = series.read(|s| s.stats()) {
            if stats.count == args.capacity {
                println!(
                    "  avg {:.2} cm, min {:.2} cm, max {:.2} cm",
                    stats.mean, stats.min, stats.max
                );
            }
        }
    }

    drop(driver_threads);
}
