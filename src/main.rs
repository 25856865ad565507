use hubcap::ui::output;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("HUBCAP_LOG", "warn"))
        .format_timestamp(None)
        .init();

    match hubcap::cli::run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            output::error(format!("{:#}", err));
            std::process::exit(1);
        }
    }
}
