use std::{path::Path, error::Error};
use crate::Network;
use super::{App, Command, verbosity_level};

/// Checks every network description matching a glob pattern.  A
/// directory stands for all YAML files it contains.
pub struct Validate {
    verbosity: u64,
    glob_path: String,
    do_abort:  bool,
}

impl Validate {
    pub fn new_command(app: &App) -> Box<dyn Command> {
        let verbosity = app.occurrences_of("verbose");
        let do_abort = app.is_present("abort");
        let glob_path = app.value_of("GLOB_PATH").unwrap_or_else(|| unreachable!());

        let glob_path = if Path::new(glob_path).is_dir() {
            format!("{}/*.yaml", glob_path.trim_end_matches('/'))
        } else {
            glob_path.to_owned()
        };

        Box::new(Self { verbosity, glob_path, do_abort })
    }
}

impl Command for Validate {
    fn name_of_log_file(&self) -> String {
        "flownet-validate.log".to_owned()
    }

    fn console_level(&self) -> Option<log::LevelFilter> {
        Some(verbosity_level(self.verbosity))
    }

    fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let mut num_files = 0;
        let mut num_bad_files = 0;

        for entry in glob::glob(&self.glob_path)? {
            match entry {
                Ok(ref path) => {
                    num_files += 1;

                    if self.verbosity >= 1 {
                        println!("> {}", path.display());
                    }

                    match Network::from_file(path) {
                        Ok(network) => {
                            if self.verbosity >= 2 {
                                println!("+++ {} node(s)", network.len());
                            }
                        }
                        Err(err) => {
                            eprintln!("!!! Invalid network in file '{}'...", path.display());

                            if self.do_abort {
                                println!("... Aborting on error.");
                                return Err(err)
                            } else {
                                eprintln!("[ERROR] {}.", err);
                                num_bad_files += 1;
                            }
                        }
                    }
                }
                Err(err) => {
                    eprintln!("??? Bad entry in path list: {}", err);
                }
            }
        }

        print!("... Done, {} file{} ", num_files, if num_files == 1 { "" } else { "s" });
        if num_bad_files > 0 {
            println!("({} bad file{}).", num_bad_files, if num_bad_files == 1 { "" } else { "s" });
        } else {
            println!("(no bad files).");
        }

        Ok(())
    }
}
