// Error types for glucoday

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum GlucodayError {
    // Errors while loading record dumps
    #[snafu(display("Invalid data file: {path}"))]
    InvalidDataFile { path: String },
    #[snafu(display("Error reading data file"))]
    DataFileIOError { source: io::Error },
    #[snafu(display("Error parsing data file"))]
    DataFileParseError { source: serde_json::Error },

    // Errors returned by record sources
    #[snafu(display("Could not fetch {entity}: {reason}"))]
    FetchError { entity: String, reason: String },
    #[snafu(display("Could not start the fetch runtime"))]
    RuntimeError { source: io::Error },

    // Day selection errors
    #[snafu(display("Unknown timezone: {name}"))]
    UnknownTimezone { name: String },
    #[snafu(display("Invalid date: {input}"))]
    InvalidDate { input: String },
    #[snafu(display("Could not resolve local midnight for {date} in {timezone}"))]
    UnresolvableDayBoundary { date: String, timezone: String },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },

    // Errors for the chart writer
    #[snafu(display("Error writing chart file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing chart data"))]
    ChartSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
}
