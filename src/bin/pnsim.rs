use anyhow::Context;
use pnsim::config::SimConfig;
use pnsim::driver::Simulation;
use pnsim::net::io;
use pnsim::options::Options;

fn main() -> anyhow::Result<()> {
    if std::env::var("PNSIM_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PNSIM_LOG")
            .write_style("PNSIM_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let env_flags = std::env::var("PNSIM_FLAGS").unwrap_or_default();
    let options = match Options::parse_from_env_and_args(&env_flags, &args) {
        Ok(options) => options,
        Err(err) => match err.downcast_ref::<clap::Error>() {
            Some(clap_err) => clap_err.exit(),
            None => anyhow::bail!("invalid PNSIM_FLAGS: {err}"),
        },
    };
    log::debug!("pnsim options: {:?}", options);

    let mut config = SimConfig::load_from_file(&options.config)?;
    config.apply(&options);

    let mut simulation = Simulation::from_config(&config)?;
    let report = simulation.run()?;
    println!("{report}");

    if let Some(path) = &options.output {
        io::write_json(path, &report)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
    }
    if let Some(path) = &options.dot {
        simulation
            .runner
            .net()
            .write_dot(path)
            .with_context(|| format!("Failed to write DOT to {:?}", path))?;
    }
    Ok(())
}
