use clap::{App, Arg};
use colored::*;
use satpower::config::SimulationConfig;
use satpower::subsystems::payload::PayloadKind;
use satpower::subsystems::ActionOutcome;
use satpower::telemetry::{Severity, StatusEvent, TransmittedStatus};
use satpower::Spacecraft;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("satpower-sim")
        .version("0.1.0")
        .author("Space Systems Engineering Team")
        .about("🛰️  Spacecraft energy economy simulator - one battery, every subsystem paying for it")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("JSON simulation config (spacecraft, energy, mission sections)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("minutes")
                .short("m")
                .long("minutes")
                .value_name("MINUTES")
                .help("Simulated minutes to run")
                .takes_value(true)
                .validator(|v| match v.parse::<u32>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Minutes must be a non-negative integer".into()),
                }),
        )
        .arg(
            Arg::with_name("payload")
                .short("p")
                .long("payload")
                .value_name("PAYLOAD")
                .help("Payload type: \"SAR Radar\", \"Cloud Seeding Device\" or \"Ionospheric Particle Collector\"")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("panel-fault-at")
                .long("panel-fault-at")
                .value_name("MINUTE")
                .help("Solar panels stop charging from this minute on")
                .takes_value(true)
                .validator(|v| match v.parse::<u32>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Minute must be a non-negative integer".into()),
                }),
        )
        .arg(
            Arg::with_name("maneuver")
                .long("maneuver")
                .value_name("KM")
                .help("Perform an altitude maneuver to KM before the first step")
                .takes_value(true)
                .validator(|v| match v.parse::<f64>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Altitude must be a number".into()),
                }),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["text", "json"])
                .default_value("text"),
        )
        .get_matches();

    tracing_subscriber::fmt::init();

    let mut config = match matches.value_of("config") {
        Some(path) => SimulationConfig::load(Path::new(path))?,
        None => SimulationConfig::default(),
    };

    if let Some(minutes) = matches.value_of("minutes") {
        config.mission.minutes = minutes.parse()?;
    }
    if let Some(name) = matches.value_of("payload") {
        config.mission.payload = name.parse::<PayloadKind>()?;
    }
    if let Some(minute) = matches.value_of("panel-fault-at") {
        config.mission.panel_fault_at = Some(minute.parse()?);
    }
    if let Some(km) = matches.value_of("maneuver") {
        config.mission.maneuver_to_km = Some(km.parse()?);
    }
    let format = match matches.value_of("format") {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    };

    let mission = config.mission.clone();
    let mut craft = Spacecraft::builder(config.spacecraft)
        .config(config.energy)
        .with_default_power()
        .payload(mission.payload)
        .build()?;

    if format == OutputFormat::Text {
        println!("🛰️  {} ({})", craft.info().name, craft.info().mission);
        println!("================================");
    }

    if let Some(target_km) = mission.maneuver_to_km {
        let outcome = craft.maneuver_altitude(target_km);
        emit(&mut craft, format)?;

        let lower = craft.bus().ledger().lower_threshold();
        if outcome.is_committed() && craft.bus().charge_level() < lower {
            info!("battery low after maneuver, recovering charge");
            craft.recover_charge(mission.recovery_target, mission.recovery_max_minutes);
        }
    }

    if craft.activate_payload().is_rejected() {
        warn!("payload activation refused");
    }
    emit(&mut craft, format)?;

    for minute in 0..mission.minutes {
        let report = craft.step(1.0, mission.is_sunlight(minute), mission.is_charging(minute));
        if format == OutputFormat::Text {
            println!(
                "{} minute {:>4}  battery {:>6.2}%  mode {}",
                "⏱".dimmed(),
                minute + 1,
                report.level,
                report.mode
            );
        }
        if let ActionOutcome::Rejected { cost } = report.payload {
            warn!(minute, cost, "payload stopped for lack of energy");
        }
        emit(&mut craft, format)?;
    }

    craft.report_attitude();
    craft.payload_status();
    emit(&mut craft, format)?;

    let snapshot = craft.snapshot();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&snapshot)?),
        OutputFormat::Text => {
            println!("================================");
            println!("Final battery level: {:.2}% ({})", snapshot.ledger.level, snapshot.ledger.mode);
            println!(
                "Telemetry: {} messages, {} summaries, {:.4}% spent on transmission",
                snapshot.telemetry.messages_sent,
                snapshot.telemetry.flushes_completed,
                snapshot.telemetry.energy_spent
            );
            println!("Alerts raised: {}", snapshot.alerts_raised);
        }
    }

    Ok(())
}

fn emit(craft: &mut Spacecraft, format: OutputFormat) -> Result<(), serde_json::Error> {
    for status in craft.bus_mut().telemetry_mut().drain_transcript() {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&status)?),
            OutputFormat::Text => println!("{}", render(&status)),
        }
    }
    Ok(())
}

fn render(status: &TransmittedStatus) -> ColoredString {
    let line = format!("[Comms] ({} chars) {}", status.weight, status.event);
    let line = if status.charged {
        line
    } else {
        format!("{line}  [unpaid]")
    };

    match (&status.event, status.event.severity()) {
        (StatusEvent::Summary { .. }, _) => line.cyan(),
        (_, Severity::Alert) => line.red().bold(),
        (_, Severity::Caution) => line.yellow(),
        (_, Severity::Info) => line.normal(),
    }
}
