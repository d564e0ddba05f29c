mod run;
mod validate;

use std::{str::FromStr, error::Error, fmt::Display};

pub use run::Run;
pub use validate::Validate;

pub trait Command {
    fn name_of_log_file(&self) -> String;

    fn console_level(&self) -> Option<log::LevelFilter> {
        None
    }

    fn run(&mut self) -> Result<(), Box<dyn Error>>;
}

/// Maps the number of `-v` occurrences to a log level.
pub(crate) fn verbosity_level(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

pub struct App<'a> {
    app_name: String,
    bin_name: Option<String>,
    cli_args: clap::ArgMatches<'a>,
}

impl<'a> App<'a> {
    pub fn from_clap<'b>(clap_app: clap::App<'a, 'b>) -> Self {
        let cli_app = clap_app
            .name(env!("CARGO_PKG_NAME"))
            .version(env!("CARGO_PKG_VERSION"))
            .author(env!("CARGO_PKG_AUTHORS"))
            .about(env!("CARGO_PKG_DESCRIPTION"));

        let app_name = cli_app.get_name().to_owned();
        let bin_name = cli_app.get_bin_name().map(|s| s.to_owned());
        let cli_args = cli_app.get_matches();

        Self { app_name, bin_name, cli_args }
    }

    pub fn get_name(&self) -> &str {
        self.app_name.as_str()
    }

    pub fn get_bin_name(&self) -> Option<&str> {
        self.bin_name.as_deref()
    }

    pub fn subcommand_name(&self) -> Option<&str> {
        self.cli_args.subcommand_name()
    }

    fn matches(&self) -> &clap::ArgMatches<'a> {
        self.cli_args.subcommand().1.unwrap_or(&self.cli_args)
    }

    pub fn value_of<S: AsRef<str>>(&self, key: S) -> Option<&str> {
        self.matches().value_of(key)
    }

    /// Parses the value of an optional argument.
    pub fn parsed_value_of<S, T>(&self, key: S) -> Result<Option<T>, String>
    where
        S: AsRef<str>,
        T: FromStr,
        T::Err: Display,
    {
        match self.value_of(&key) {
            Some(v) => v.parse::<T>().map(Some).map_err(|err| {
                format!("The argument '{}' isn't a valid value of {} ({})", v, key.as_ref(), err)
            }),
            None => Ok(None),
        }
    }

    pub fn occurrences_of<S: AsRef<str>>(&self, key: S) -> u64 {
        self.matches().occurrences_of(key)
    }

    pub fn is_present<S: AsRef<str>>(&self, key: S) -> bool {
        self.matches().is_present(key)
    }
}
