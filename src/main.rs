use windwatch::alert::ZenityNotifier;
use windwatch::fetch::OpenMeteoClient;
use windwatch::pipeline::{self, Config};
use windwatch::LOCATIONS;

fn main() -> miette::Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let config = Config::default();
    let client = OpenMeteoClient::default();

    pipeline::run(&config, LOCATIONS, &client, &ZenityNotifier)?;

    log::info!("Weather data processing complete.");
    Ok(())
}
