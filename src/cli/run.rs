use std::{path::PathBuf, error::Error};
use crate::{Network, Runner, VirtualTime};
use super::{App, Command, verbosity_level};

/// Horizon of a run, unless given on the command line or in the
/// network description.
pub const DEFAULT_HORIZON: f64 = 100.0;

pub struct Run {
    verbosity:  u64,
    main_path:  String,
    horizon:    Option<VirtualTime>,
    seed:       Option<u64>,
    output_dir: Option<PathBuf>,
}

impl Run {
    pub fn new_command(app: &App) -> Result<Box<dyn Command>, Box<dyn Error>> {
        let verbosity = app.occurrences_of("verbose");
        let main_path = app.value_of("MAIN_PATH").unwrap_or_else(|| unreachable!()).to_owned();

        let horizon = match app.parsed_value_of::<_, f64>("UNTIL")? {
            Some(v) if v >= 0.0 => VirtualTime::new(v),
            Some(v) => return Err(format!("Negative horizon {}", v).into()),
            None => None,
        };

        let seed = app.parsed_value_of("SEED")?;
        let output_dir = app.value_of("OUTPUT_DIR").map(PathBuf::from);

        Ok(Box::new(Self { verbosity, main_path, horizon, seed, output_dir }))
    }
}

impl Command for Run {
    fn name_of_log_file(&self) -> String {
        let mut path = PathBuf::from(&self.main_path);

        if path.set_extension("log") {
            if let Some(file_name) = path.file_name().and_then(|s| s.to_str()) {
                return file_name.to_owned()
            }
        }

        "flownet.log".to_owned()
    }

    fn console_level(&self) -> Option<log::LevelFilter> {
        Some(verbosity_level(self.verbosity))
    }

    fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let network = Network::from_file(&self.main_path)?;

        let seed = self.seed.or_else(|| network.get_default_seed()).unwrap_or(0);
        let horizon = self
            .horizon
            .or_else(|| network.get_default_horizon())
            .or_else(|| VirtualTime::new(DEFAULT_HORIZON))
            .unwrap_or(VirtualTime::ZERO);

        info!("Running \"{}\" until {} with seed {}", self.main_path, horizon, seed);

        let mut runner = Runner::new(network, seed);
        let result = runner.go(horizon);

        runner.teardown();
        result?;

        let recorder = runner.get_recorder();

        for series in recorder.series_names() {
            if let Some(summary) = recorder.summary(series) {
                println!("{:<32} {}", series, summary);
            }
        }

        if let Some(ref directory) = self.output_dir {
            recorder.write_csv(directory)?;
            info!("Series written to \"{}\"", directory.display());
        }

        println!("Stop at {} after {} event(s).", runner.now(), runner.get_num_events());

        Ok(())
    }
}
