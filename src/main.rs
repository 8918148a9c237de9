use lbmhs::config::SimConfig;
use lbmhs::{FloatNum, Sim};
use log::{error, info, warn, LevelFilter};
use std::io::Write;
use std::process;

fn init_logging() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();
}

fn run() -> lbmhs::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            SimConfig::from_file(path)?
        }
        None => SimConfig::default(),
    };
    let dx = config.dx;

    let mut sim = Sim::init_sim_duct(config)?;
    let report = sim.simulate()?;
    if !report.converged {
        warn!("Results below are not converged");
    }

    let k = sim.permeability()?;
    println!("absperm = {:.6} um^2 = {:.6} mD", k.value, k.millidarcy);
    for (j, u) in sim.centre_profile()?.iter().enumerate() {
        println!("{:10.3} {:16.8e}", (j as FloatNum + 0.5) * dx, u);
    }
    Ok(())
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
