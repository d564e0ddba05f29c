use std::{
    collections::BTreeMap,
    fmt,
    fs,
    io::{self, Write},
    path::Path,
};
use crate::VirtualTime;

/// A sink durably recording named numeric observations.
pub trait Telemetry {
    fn record(&mut self, series: &str, time: VirtualTime, value: f64);
}

/// Descriptive statistics of a single series.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Summary {
    pub count:      usize,
    pub mean:       f64,
    pub min:        f64,
    pub max:        f64,
    /// Half-width of the 95% confidence interval of the mean (Student's
    /// t); zero for fewer than two observations.
    pub half_width: f64,
}

/// Two-sided 95% quantiles of Student's t distribution, indexed by
/// degrees of freedom minus one.
const T_975: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];

/// Quantile `t(0.975, df)`.  Past the table the Cornish-Fisher
/// expansion around the normal quantile is exact to three decimals.
fn t_quantile_975(df: usize) -> f64 {
    if df == 0 {
        return f64::INFINITY
    }

    if let Some(&t) = T_975.get(df - 1) {
        t
    } else {
        let z: f64 = 1.959_964;
        let n = df as f64;

        z + (z.powi(3) + z) / (4.0 * n)
            + (5.0 * z.powi(5) + 16.0 * z.powi(3) + 3.0 * z) / (96.0 * n * n)
    }
}

impl Summary {
    fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let half_width = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;

            t_quantile_975(count - 1) * (var / count as f64).sqrt()
        } else {
            0.0
        };

        Some(Summary { count, mean, min, max, half_width })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "n={} mean={:.4} (±{:.4}) min={:.4} max={:.4}",
            self.count, self.mean, self.half_width, self.min, self.max
        )
    }
}

/// In-memory [`Telemetry`] sink.
#[derive(Default, Debug)]
pub struct Recorder {
    series: BTreeMap<String, Vec<(VirtualTime, f64)>>,
}

impl Recorder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get<S: AsRef<str>>(&self, series: S) -> Option<&[(VirtualTime, f64)]> {
        self.series.get(series.as_ref()).map(|v| v.as_slice())
    }

    /// Values of a series, without timestamps.
    pub fn values<S: AsRef<str>>(&self, series: S) -> Vec<f64> {
        self.get(series).map(|obs| obs.iter().map(|&(_, v)| v).collect()).unwrap_or_default()
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|s| s.as_str())
    }

    pub fn summary<S: AsRef<str>>(&self, series: S) -> Option<Summary> {
        Summary::of(&self.values(series))
    }

    /// Writes each series to `<series>.csv` in `directory`, one
    /// `time,value` row per observation.
    pub fn write_csv<P: AsRef<Path>>(&self, directory: P) -> io::Result<()> {
        let directory = directory.as_ref();

        fs::create_dir_all(directory)?;

        for (name, observations) in self.series.iter() {
            let path = directory.join(format!("{}.csv", name));
            let mut file = io::BufWriter::new(fs::File::create(&path)?);

            writeln!(file, "time,value")?;
            for (time, value) in observations {
                writeln!(file, "{},{}", time.get(), value)?;
            }
            file.flush()?;

            debug!("Wrote {} observation(s) to \"{}\"", observations.len(), path.display());
        }

        Ok(())
    }
}

impl Telemetry for Recorder {
    fn record(&mut self, series: &str, time: VirtualTime, value: f64) {
        if let Some(observations) = self.series.get_mut(series) {
            observations.push((time, value));
        } else {
            self.series.insert(series.to_owned(), vec![(time, value)]);
        }
    }
}
