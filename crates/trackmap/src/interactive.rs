use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::warn;
use trackmap_core::model::validate_interval;
use trackmap_core::timestamps::parse_timestamp;
use trackmap_core::{execute, Config, RunError, RunParameters, RunRequest};

/// Prompt loop around the run boundary. Every run error is reported and the loop carries on;
/// only end of input or a "no" at the continue prompt stops it.
pub struct Session<R, W> {
    input: R,
    output: W,
    config: Config,
    api_key: String,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, config: Config, api_key: String) -> Self {
        Self {
            input,
            output,
            config,
            api_key,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n--trackmap--")?;

            let Some(request) = self.collect_request()? else {
                return Ok(());
            };

            match execute(&request, &self.config) {
                Ok(summary) => writeln!(
                    self.output,
                    "\nTrack map written to {} ({} points)",
                    summary.output_path.display(),
                    summary.point_count
                )?,
                Err(err) => {
                    warn!(error = %err, recoverable = err.is_recoverable(), "run aborted");
                    writeln!(self.output, "\n{}", describe(&err))?;
                }
            }

            match self.prompt("\nContinue? enter y to continue, n to quit: ")? {
                Some(answer) if answer.trim().eq_ignore_ascii_case("y") => continue,
                _ => {
                    writeln!(self.output, "Exiting")?;
                    return Ok(());
                }
            }
        }
    }

    fn collect_request(&mut self) -> io::Result<Option<RunRequest>> {
        let Some(source_path) = self.ask_source_path()? else {
            return Ok(None);
        };
        let Some(label) = self.prompt("\nDisplay label (e.g. phone number): ")? else {
            return Ok(None);
        };
        let Some((start, end)) = self.ask_window()? else {
            return Ok(None);
        };
        let Some(interval_ms) = self.ask_interval()? else {
            return Ok(None);
        };

        // window and interval were validated by the prompts above
        let parameters =
            RunParameters::new(self.api_key.clone(), interval_ms, label.trim(), start, end)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

        Ok(Some(RunRequest {
            source_path,
            output_path: self.config.output_file.clone(),
            parameters,
        }))
    }

    fn ask_source_path(&mut self) -> io::Result<Option<PathBuf>> {
        loop {
            let Some(raw) = self.prompt("\nPath to the samples table: ")? else {
                return Ok(None);
            };
            let cleaned = raw.trim().replace('"', "");
            if Path::new(&cleaned).is_file() {
                return Ok(Some(PathBuf::from(cleaned)));
            }
            writeln!(self.output, "File not found, enter an existing path.")?;
        }
    }

    fn ask_window(&mut self) -> io::Result<Option<(NaiveDateTime, NaiveDateTime)>> {
        loop {
            let Some(start) = self.prompt("\nStart time (e.g. 2024-9-1 9:00:00): ")? else {
                return Ok(None);
            };
            let Some(end) = self.prompt("\nEnd time (e.g. 2024-9-30 10:00:00): ")? else {
                return Ok(None);
            };

            match (parse_timestamp(&start), parse_timestamp(&end)) {
                (Some(start), Some(end)) if start < end => return Ok(Some((start, end))),
                (Some(_), Some(_)) => {
                    writeln!(self.output, "Start time must be before end time, try again.")?;
                }
                _ => {
                    writeln!(
                        self.output,
                        "Unrecognized time, use the format YYYY-MM-DD HH:MM:SS."
                    )?;
                }
            }
        }
    }

    fn ask_interval(&mut self) -> io::Result<Option<u32>> {
        loop {
            let Some(raw) = self.prompt("\nInterval between points (ms): ")? else {
                return Ok(None);
            };
            match raw.trim().parse::<u32>().ok().map(validate_interval) {
                Some(Ok(interval_ms)) => return Ok(Some(interval_ms)),
                _ => {
                    writeln!(
                        self.output,
                        "Interval must be a whole number greater than 0 and less than 10000."
                    )?;
                }
            }
        }
    }

    /// `None` at end of input.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

fn describe(err: &RunError) -> String {
    match err {
        RunError::EmptyResult { start, end } => {
            format!("No points between {start} and {end}; nothing was written.")
        }
        other if other.is_recoverable() => format!("{other}; nothing was written."),
        other => format!("Error: {other}"),
    }
}
