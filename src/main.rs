//! Keystream CSPRNG CLI
//!
//! Command-line front end for drawing random bytes from the generator,
//! inspecting its bookkeeping and comparing secrets in constant time.

use clap::{Parser, Subcommand};
use keystream_csprng::{
    compare::differs_exact, ChaChaKeystream, Clock, EntropySource, FileConfig, Generator,
    MockClock, OsEntropy, ScriptedEntropy, SystemClock,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

type CliGenerator = Generator<ChaChaKeystream, Box<dyn EntropySource>, Box<dyn Clock>>;

#[derive(Debug, Parser)]
#[command(name = "keystream-csprng", version, about = "Self-reseeding keystream CSPRNG")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hex seed bytes to use instead of OS entropy (reproducible output).
    #[arg(long, global = true)]
    seed_hex: Option<String>,

    /// Pin the clock to this many seconds past the epoch.
    #[arg(long, global = true)]
    fixed_time: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print random bytes as hex.
    Bytes {
        #[arg(default_value_t = 32)]
        count: usize,
    },
    /// Print one random 64-bit word.
    Word,
    /// Compare two hex strings in constant time.
    Compare { left: String, right: String },
    /// Write raw random bytes to stdout until interrupted.
    Stream {
        /// Stop after this many bytes.
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Draw bytes, then print generator statistics.
    Stats {
        #[arg(default_value_t = 0)]
        count: usize,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let generator = match build_generator(&cli, &config) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Keystream CSPRNG v{}", keystream_csprng::VERSION);

    match cli.command {
        Command::Bytes { count } => {
            let mut buf = vec![0u8; count];
            generator.fill(&mut buf);
            println!("{}", to_hex(&buf));
        }
        Command::Word => {
            println!("{:016x}", generator.next_word());
        }
        Command::Compare { left, right } => {
            let (left, right) = match (from_hex(&left), from_hex(&right)) {
                (Ok(l), Ok(r)) => (l, r),
                (Err(e), _) | (_, Err(e)) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            match differs_exact(&left, &right) {
                Ok(true) => {
                    println!("differ");
                    std::process::exit(1);
                }
                Ok(false) => println!("equal"),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(2);
                }
            }
        }
        Command::Stream { limit } => {
            #[cfg(feature = "metrics")]
            spawn_metrics_server(&generator, config.metrics.port);
            stream(&generator, limit);
        }
        Command::Stats { count } => {
            let mut buf = vec![0u8; count];
            generator.fill(&mut buf);
            match toml::to_string_pretty(&generator.stats()) {
                Ok(text) => print!("{}", text),
                Err(e) => warn!("Failed to render stats: {}", e),
            }
        }
    }
}

fn build_generator(cli: &Cli, config: &FileConfig) -> Result<CliGenerator, String> {
    let entropy: Box<dyn EntropySource> = match &cli.seed_hex {
        Some(hex) => {
            warn!("Using a fixed seed: output is reproducible and NOT secret");
            Box::new(ScriptedEntropy::new(from_hex(hex)?))
        }
        None => Box::new(OsEntropy),
    };
    let clock: Box<dyn Clock> = match cli.fixed_time {
        Some(secs) => Box::new(MockClock::new(secs)),
        None => Box::new(SystemClock),
    };

    Ok(Generator::with_config(
        ChaChaKeystream::default(),
        entropy,
        clock,
        config.generator.clone(),
    ))
}

fn stream(generator: &CliGenerator, limit: Option<u64>) {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut buf = [0u8; 4096];
    let mut written: u64 = 0;

    while running.load(Ordering::SeqCst) {
        let n = match limit {
            Some(limit) if written >= limit => break,
            Some(limit) => (limit - written).min(buf.len() as u64) as usize,
            None => buf.len(),
        };
        generator.fill(&mut buf[..n]);
        if let Err(e) = out.write_all(&buf[..n]) {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                warn!("Write failed: {}", e);
            }
            break;
        }
        written += n as u64;
    }

    let _ = out.flush();
    info!(
        "Wrote {} bytes. Reseed count: {}",
        written,
        generator.stats().reseeds
    );
}

#[cfg(feature = "metrics")]
fn spawn_metrics_server(generator: &Arc<CliGenerator>, port: u16) {
    use keystream_csprng::metrics::{
        MetricsRegistry, MetricsServer, MetricsServerConfig, MetricsSnapshot,
    };

    if port == 0 {
        return;
    }

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            return;
        }
    };
    let source_generator = Arc::clone(generator);
    let server = MetricsServer::new(
        MetricsServerConfig::with_port(port),
        registry,
        Arc::new(move || MetricsSnapshot::from_stats(&source_generator.stats())),
    );

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Failed to start metrics runtime: {}", e);
                return;
            }
        };
        if let Err(e) = runtime.block_on(server.run()) {
            warn!("Metrics server stopped: {}", e);
        }
    });
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(text: &str) -> Result<Vec<u8>, String> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(format!("odd-length hex string: {}", text));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at offset {}: {}", i, text))
        })
        .collect()
}
