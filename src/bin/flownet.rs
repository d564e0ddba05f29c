use std::error::Error;
use flownet::{Logger, cli::{App, Command, Run, Validate}};

fn main() -> Result<(), Box<dyn Error>> {
    let cli_spec_str = include_str!("flownet.cli");

    let cli_spec = clap::YamlLoader::load_from_str(cli_spec_str)?;
    let cli_app = clap::App::from_yaml(&cli_spec[0]);
    let app = App::from_clap(cli_app);

    let command: Result<Box<dyn Command>, Box<dyn Error>> = match app.subcommand_name() {
        Some("run") => Run::new_command(&app),
        Some("validate") => Ok(Validate::new_command(&app)),
        _ => unreachable!(),
    };

    let result = command.and_then(|mut command| {
        let mut logger = Logger::new(app.get_name());

        if let Some(level) = command.console_level() {
            logger = logger.with_console(level);
        }

        if let Some(dirname) = app.value_of("LOG_DIR") {
            logger = logger.with_explicit_directory(dirname);
        }

        if app.is_present("log") || app.is_present("LOG_DIR") {
            logger = logger.with_file(command.name_of_log_file(), log::LevelFilter::Debug);
        }

        logger.apply();

        command.run()
    });

    if let Err(err) = result {
        eprintln!("[ERROR] {}.", err);
        std::process::exit(-1)
    } else {
        std::process::exit(0)
    }
}
