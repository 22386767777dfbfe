use chrono::Local;
use csv::Writer;
use log::{LevelFilter, info};
use ndarray::Array2;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io;
use std::path::Path;

/// log file name stamped with the local time, e.g. `wallpaper_2024-05-01_12-00-00.log`
pub fn stamped_log_name(prefix: &str) -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("{}_{}.log", prefix, date_and_time)
}

/// Sets up the global logger: terminal and/or file. A logger that is already set stays in place.
pub fn init_logger(level: LevelFilter, log_to_console: bool, log_to_file: Option<&str>) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if log_to_console {
        loggers.push(TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    if let Some(filename) = log_to_file {
        if let Ok(file) = File::create(filename) {
            loggers.push(WriteLogger::new(level, Config::default(), file));
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

/// Writes an evaluated grid row by row, the header names the columns `c0..c{width-1}`.
pub fn save_grid_to_csv(grid: &Array2<f64>, filename: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(filename.as_ref())?;
    let mut writer = Writer::from_writer(file);

    let headers: Vec<String> = (0..grid.ncols()).map(|j| format!("c{}", j)).collect();
    writer.write_record(&headers)?;

    for row in grid.rows() {
        writer.write_record(row.iter().map(|val| val.to_string()))?;
    }

    writer.flush()?;
    info!(
        "saved {}x{} grid to {}",
        grid.nrows(),
        grid.ncols(),
        filename.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_save_grid_to_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        let grid = array![[1.0, 2.5, -3.0], [f64::NAN, 0.125, 4.0]];
        save_grid_to_csv(&grid, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["c0", "c1", "c2"]);
        let rows: Vec<Vec<f64>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|v| v.parse::<f64>().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_relative_eq!(rows[0][1], 2.5);
        assert_relative_eq!(rows[1][2], 4.0);
        assert!(rows[1][0].is_nan());
    }

    #[test]
    fn test_stamped_log_name() {
        let name = stamped_log_name("wallpaper");
        assert!(name.starts_with("wallpaper_"));
        assert!(name.ends_with(".log"));
    }
}
