use std::{fs, path::PathBuf};
use fern::colors::{Color, ColoredLevelConfig};

/// Default directory of log files, relative to the current one.
pub const DEFAULT_LOG_DIR: &str = "log";

macro_rules! error_pre_log {
    ($lgr:expr,$($arg:tt)*) => (eprintln!("{}{}{}",
                                          $lgr.console_prefix(log::Level::Error),
                                          format_args!($($arg)*),
                                          $lgr.console_suffix()));
}

/// Builder of the global logger: a colored console sink and an
/// optional plain log file.
///
/// Errors occurring before the logger is applied can't be logged,
/// hence they are printed to stderr.
pub struct Logger {
    app_name:   String,
    dispatcher: Option<fern::Dispatch>,
    colors:     ColoredLevelConfig,
    directory:  Option<PathBuf>,
}

impl Logger {
    pub fn new<S: AsRef<str>>(app_name: S) -> Self {
        let app_name = app_name.as_ref().to_owned();
        let dispatcher = Some(fern::Dispatch::new());

        let colors = ColoredLevelConfig::new()
            .trace(Color::Blue)
            .debug(Color::Cyan)
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red);

        Self { app_name, dispatcher, colors, directory: None }
    }

    fn chain(&mut self, sink: fern::Dispatch) {
        if let Some(dispatcher) = self.dispatcher.take() {
            self.dispatcher = Some(dispatcher.chain(sink));
        } else {
            error_pre_log!(self, "Logger has already been applied");
        }
    }

    pub fn with_console(mut self, level: log::LevelFilter) -> Self {
        let colors = self.colors;

        let sink = fern::Dispatch::new()
            .format(move |out, message, record| match record.level() {
                log::Level::Info => out.finish(format_args!("{}.", message)),
                level @ log::Level::Error => out.finish(format_args!(
                    "[{}]\t\x1B[{}m{}.\x1B[0m",
                    colors.color(level),
                    colors.get_color(&level).to_fg_str(),
                    message
                )),
                level => out.finish(format_args!("[{}]\t{}.", colors.color(level), message)),
            })
            .level(level)
            .chain(std::io::stderr());

        self.chain(sink);
        self
    }

    /// Sets the directory of log files, creating it if necessary.
    pub fn with_explicit_directory<S: AsRef<str>>(mut self, dirname: S) -> Self {
        let path = PathBuf::from(dirname.as_ref());

        if path.is_dir() {
            self.directory = Some(path);
        } else if path.exists() {
            error_pre_log!(
                self,
                "Can't log into \"{}\", because it exists and isn't a directory.",
                path.display(),
            );
            self.directory = None;
        } else if let Err(err) = fs::create_dir_all(&path) {
            error_pre_log!(self, "Can't create \"{}\" directory: {}.", path.display(), err);
            self.directory = None;
        } else {
            self.directory = Some(path);
        }

        self
    }

    /// Adds a log file, truncated on open.  Unless a directory was set
    /// explicitly, logging to file requires [`DEFAULT_LOG_DIR`] to
    /// exist.
    pub fn with_file<S: AsRef<str>>(mut self, filename: S, level: log::LevelFilter) -> Self {
        if self.directory.is_none() {
            let path = PathBuf::from(DEFAULT_LOG_DIR);

            if path.is_dir() {
                self.directory = Some(path);
            } else {
                error_pre_log!(
                    self,
                    "Logging to file is disabled, because directory \"{}\" doesn't exist...\n\t\
                     Create this directory or run '{} --log-dir <LOG_DIR> ...'.",
                    DEFAULT_LOG_DIR,
                    self.app_name
                );
                return self
            }
        }

        let path = match self.directory.as_ref() {
            Some(directory) => directory.join(filename.as_ref()),
            None => return self,
        };

        match fs::OpenOptions::new().write(true).create(true).truncate(true).open(&path) {
            Ok(log_file) => {
                let sink = fern::Dispatch::new()
                    .format(move |out, message, record| {
                        out.finish(format_args!(
                            "[{}][{}] {}.",
                            record.target(),
                            record.level(),
                            message,
                        ))
                    })
                    .level(level)
                    .chain(log_file);

                self.chain(sink);
            }
            Err(err) => {
                error_pre_log!(self, "Can't open \"{}\": {}.", path.display(), err);
            }
        }

        self
    }

    pub fn get_directory(&self) -> Option<&PathBuf> {
        self.directory.as_ref()
    }

    pub fn apply(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.apply().unwrap_or_else(|err| error_pre_log!(self, "{}.", err));
        } else {
            error_pre_log!(self, "Logger can't be applied (probably it has already been applied).");
        }
    }

    fn console_prefix(&self, level: log::Level) -> String {
        format!("[{}]\t\x1B[{}m", self.colors.color(level), self.colors.get_color(&level).to_fg_str())
    }

    fn console_suffix(&self) -> &str {
        "\x1B[0m"
    }
}
