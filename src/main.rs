use std::time::Duration;

use flashbench::clock::SystemClock;
use flashbench::display::{SdlSurface, Surface, WindowOptions, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use flashbench::logging::{self, LoggingConfig};
use flashbench::mqtt::{self, MqttSink};
use flashbench::pacer::{frame_duration_for, PacingStrategy};
use flashbench::report::{Fanout, JsonLinesSink, LogSink};
use flashbench::sequence::{self, Sequence, SequenceOptions};
use flashbench::{Error, Result};

#[derive(Debug, Clone)]
struct Options {
    window: WindowOptions,
    sequence: SequenceOptions,
    json: bool,
    mqtt: Option<String>,
    mqtt_topic: String,
    log_filter: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            window: WindowOptions::default(),
            sequence: SequenceOptions::default(),
            json: false,
            mqtt: None,
            mqtt_topic: mqtt::DEFAULT_TOPIC.to_string(),
            log_filter: None,
        }
    }
}

#[derive(Debug)]
enum Command {
    Run(Box<Options>),
    Help,
}

fn print_usage() {
    println!("Usage: flashbench [OPTIONS]");
    println!();
    println!("Runs the calibration sequence: black lead-in, three checkerboard modes,");
    println!("then flashing white dot rounds, each followed by a black interval.");
    println!();
    println!("Options:");
    println!("  --resolution WxH, -r WxH   Window size (default: current display mode)");
    println!("  --windowed                 Do not go fullscreen");
    println!(
        "                             ({}x{} unless --resolution is given)",
        DEFAULT_WIDTH, DEFAULT_HEIGHT
    );
    println!("  --vsync                    Sync presents to the display refresh");
    println!(
        "  --frequency HZ, -f HZ      Checkerboard mode frequency (default: {})",
        sequence::CHECKER_FREQUENCY_HZ
    );
    println!(
        "  --dot-frequency HZ         White dot frequency (default: {})",
        sequence::DOT_FREQUENCY_HZ
    );
    println!("  --flash-seconds S          Length of each checkerboard mode (default: 15)");
    println!("  --dot-seconds S            Length of each white dot mode (default: 15)");
    println!("  --lead-in-seconds S        Black screen before the first mode (default: 15)");
    println!("  --blank-seconds S          Black screen between modes (default: 10)");
    println!("  --dot-rounds N             Number of white dot modes (default: 3)");
    println!("  --hybrid-pacing            Sleep until just before each frame, then spin");
    println!("  --json                     Also print reports as JSON lines on stdout");
    println!("  --mqtt HOST[:PORT]         Also publish reports to an MQTT broker");
    println!(
        "  --mqtt-topic TOPIC         MQTT topic (default: {})",
        mqtt::DEFAULT_TOPIC
    );
    println!("  --log FILTER               Log filter, e.g. debug (default: RUST_LOG or info)");
    println!("  --help                     Show this help message");
    println!();
    println!("Keys: Escape skips the current mode, Q or closing the window quits.");
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| Error::invalid_argument(flag, ""))
}

fn parse_hz(flag: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| Error::invalid_argument(flag, raw))
}

fn parse_seconds(flag: &str, raw: &str) -> Result<Duration> {
    raw.parse::<f64>()
        .ok()
        .filter(|s| *s >= 0.0)
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .ok_or_else(|| Error::invalid_argument(flag, raw))
}

fn parse_resolution(flag: &str, raw: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = raw.split('x').collect();
    if let [w, h] = parts.as_slice() {
        if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
            if w > 0 && h > 0 {
                return Ok((w, h));
            }
        }
    }
    Err(Error::invalid_argument(flag, raw))
}

/// Parse command line arguments (without the program name)
fn parse_args(args: &[String]) -> Result<Command> {
    let mut options = Options::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" => return Ok(Command::Help),
            "--windowed" => options.window.fullscreen = false,
            "--vsync" => options.window.vsync = true,
            "--hybrid-pacing" => options.sequence.pacing = PacingStrategy::hybrid(),
            "--json" => options.json = true,
            "--resolution" | "-r" => {
                options.window.resolution = Some(parse_resolution(flag, value(args, i, flag)?)?);
                i += 1;
            },
            "--frequency" | "-f" => {
                options.sequence.checker_frequency_hz = parse_hz(flag, value(args, i, flag)?)?;
                i += 1;
            },
            "--dot-frequency" => {
                options.sequence.dot_frequency_hz = parse_hz(flag, value(args, i, flag)?)?;
                i += 1;
            },
            "--flash-seconds" => {
                options.sequence.checker_duration = parse_seconds(flag, value(args, i, flag)?)?;
                i += 1;
            },
            "--dot-seconds" => {
                options.sequence.dot_duration = parse_seconds(flag, value(args, i, flag)?)?;
                i += 1;
            },
            "--lead-in-seconds" => {
                options.sequence.lead_in = parse_seconds(flag, value(args, i, flag)?)?;
                i += 1;
            },
            "--blank-seconds" => {
                options.sequence.blank_duration = parse_seconds(flag, value(args, i, flag)?)?;
                i += 1;
            },
            "--dot-rounds" => {
                let raw = value(args, i, flag)?;
                options.sequence.dot_rounds = raw
                    .parse()
                    .map_err(|_| Error::invalid_argument(flag, raw))?;
                i += 1;
            },
            "--mqtt" => {
                options.mqtt = Some(value(args, i, flag)?.to_string());
                i += 1;
            },
            "--mqtt-topic" => {
                options.mqtt_topic = value(args, i, flag)?.to_string();
                i += 1;
            },
            "--log" => {
                options.log_filter = Some(value(args, i, flag)?.to_string());
                i += 1;
            },
            other => return Err(Error::invalid_argument("argument", other)),
        }
        i += 1;
    }

    if !options.window.fullscreen && options.window.resolution.is_none() {
        options.window.resolution = Some((DEFAULT_WIDTH, DEFAULT_HEIGHT));
    }

    Ok(Command::Run(Box::new(options)))
}

fn run(options: &Options) -> Result<()> {
    // Reject bad frequencies before a window ever opens
    frame_duration_for(options.sequence.checker_frequency_hz)?;
    frame_duration_for(options.sequence.dot_frequency_hz)?;

    let mut sinks = Fanout::new();
    sinks.push(Box::new(LogSink));
    if options.json {
        sinks.push(Box::new(JsonLinesSink::stdout()));
    }
    if let Some(broker) = &options.mqtt {
        let (host, port) = mqtt::parse_broker(broker)?;
        sinks.push(Box::new(MqttSink::connect(&host, port, &options.mqtt_topic)?));
    }

    let mut surface = SdlSurface::open(&options.window)?;
    let (width, height) = surface.size();

    let sequence = Sequence::standard(width, height, &options.sequence);
    log::info!(
        "=== flashbench === {}x{}, {} steps, {:.0}s total",
        width,
        height,
        sequence.steps().len(),
        sequence.total_duration().as_secs_f64()
    );

    let summary = sequence.run(&mut surface, &SystemClock, &mut sinks)?;
    log::info!(
        "done: {} completed, {} skipped{}",
        summary.completed,
        summary.skipped,
        if summary.quit { ", quit early" } else { "" }
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            print_usage();
            return;
        },
        Err(e) => {
            eprintln!("flashbench: {}", e);
            eprintln!("Use --help for command line options.");
            std::process::exit(2);
        },
    };

    logging::init_logging(LoggingConfig {
        filter: options.log_filter.clone(),
        ..LoggingConfig::default()
    });

    if let Err(e) = run(&options) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
