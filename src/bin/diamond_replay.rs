//! Offline replay
//!
//! Feeds a scenario of switch notifications through the controller and
//! reports the commands it issued.

use clap::Parser;
use diamond_te::config::ControllerConfig;
use diamond_te::controller::Controller;
use diamond_te::ofp::RecordingChannel;
use diamond_te::scenario::Scenario;
use diamond_te::sched::{ControlLoop, LoopTime};
use diamond_te::topo::CoreLink;
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "diamond_replay", about = "Replay switch notifications through the diamond TE controller")]
struct Args {
    /// Scenario JSON file
    #[arg(long)]
    scenario: PathBuf,
    /// Controller config JSON; reference configuration when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// RNG seed for best-effort path draws
    #[arg(long)]
    seed: Option<u64>,
    /// Stop at this time (milliseconds); defaults to the last scenario event
    #[arg(long)]
    until_ms: Option<u64>,
    /// Write issued commands, stats and link estimates here
    #[arg(long)]
    out_json: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ControllerConfig::from_path(path)?,
        None => ControllerConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let scenario = Scenario::from_path(&args.scenario)?;
    let until = args
        .until_ms
        .map(LoopTime::from_millis)
        .unwrap_or_else(|| scenario.end());

    let mut ctl = Controller::new(config, RecordingChannel::default())?;
    let mut lp: ControlLoop<Controller<RecordingChannel>> = ControlLoop::default();
    scenario.schedule_into(&mut lp);
    let dispatched = lp.run_until(until, &mut ctl);

    let links: Vec<_> = CoreLink::ALL
        .iter()
        .map(|&l| {
            let s = ctl.estimator().sample(l);
            json!({
                "link": l,
                "estimated_bitrate": s.estimated_bitrate,
                "capacity": s.capacity,
                "utilization": s.utilization(),
            })
        })
        .collect();

    println!(
        "done @ {}ms, events={}, ready={}, priority_flows={}, best_effort_flows={}, counter_requests={}",
        lp.now().as_millis(),
        dispatched,
        ctl.registry().is_ready(),
        ctl.stats.priority_flows,
        ctl.stats.best_effort_flows,
        ctl.channel.counter_requests().count(),
    );
    for l in CoreLink::ALL {
        println!(
            "link {} bitrate={} flows={}",
            l,
            ctl.bitrate(l),
            ctl.stats.flows_per_link[l.index()]
        );
    }

    if let Some(path) = &args.out_json {
        let out = json!({
            "stats": ctl.stats,
            "links": links,
            "commands": ctl.channel.sent,
        });
        std::fs::write(path, serde_json::to_string_pretty(&out)?)?;
    }
    Ok(())
}
