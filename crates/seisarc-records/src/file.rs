//! Record source for files and stdin

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

use chrono::{DateTime, Utc};
use tracing::error;

use crate::codec::{self, RecordCodec};
use crate::error::{RecordError, Result};
use crate::record::Record;

const DEFAULT_RECORD_TYPE: &str = "binary";

/// Per-stream time window; unset fields fall back to the global window.
#[derive(Debug, Clone, Copy, Default)]
struct TimeWindowFilter {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

/// Pull-based record reader over a file or stdin (`-`).
///
/// The record codec is selected from the file extension; records outside
/// the subscribed streams or their time windows are dropped. Windows are
/// inclusive at the start and exclusive at the end.
pub struct FileSource {
    name: String,
    input: Option<Box<dyn BufRead + Send>>,
    codec: Option<Box<dyn RecordCodec>>,
    filters: HashMap<String, TimeWindowFilter>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    close_requested: bool,
}

impl FileSource {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            input: None,
            codec: None,
            filters: HashMap::new(),
            start_time: None,
            end_time: None,
            close_requested: false,
        }
    }

    pub fn from_source(name: &str) -> Result<Self> {
        let mut source = Self::new();
        source.set_source(name)?;
        Ok(source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open `name` (stdin when `-`) and select the codec from its
    /// extension. Unknown extensions keep the default `binary` type; an
    /// extension whose codec is not registered leaves the source without a
    /// codec and `next_record` yields nothing.
    pub fn set_source(&mut self, name: &str) -> Result<()> {
        self.name = name.to_string();
        self.close_requested = false;
        self.input = None;

        let mut record_type = DEFAULT_RECORD_TYPE;

        if name == "-" {
            self.set_record_type(record_type);
            self.input = Some(Box::new(BufReader::new(io::stdin())));
            return Ok(());
        }

        if let Some(position) = name.rfind('.') {
            record_type = match &name[position + 1..] {
                "xml" => "xml",
                "bin" | "binary" => "binary",
                "json" => "json",
                "mseed" => "mseed",
                "ah" => "ah",
                _ => record_type,
            };
        }
        self.set_record_type(record_type);

        let file = File::open(name)?;
        self.input = Some(Box::new(BufReader::new(file)));
        Ok(())
    }

    /// Select the record codec by type name.
    pub fn set_record_type(&mut self, name: &str) -> bool {
        match codec::find(name) {
            Some(codec) => {
                self.codec = Some(codec);
                true
            }
            None => {
                error!("{}", RecordError::UnknownRecordType(name.to_string()));
                self.codec = None;
                false
            }
        }
    }

    /// Subscribe a stream with no window of its own.
    pub fn add_stream(&mut self, network: &str, station: &str, location: &str, channel: &str) {
        let id = stream_id(network, station, location, channel);
        self.filters.insert(id, TimeWindowFilter::default());
    }

    /// Subscribe a stream with its own time window, overriding the global
    /// window for this stream.
    pub fn add_stream_window(
        &mut self,
        network: &str,
        station: &str,
        location: &str,
        channel: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) {
        let id = stream_id(network, station, location, channel);
        self.filters.insert(
            id,
            TimeWindowFilter {
                start: Some(start),
                end: Some(end),
            },
        );
    }

    pub fn set_start_time(&mut self, time: DateTime<Utc>) {
        self.start_time = Some(time);
    }

    pub fn set_end_time(&mut self, time: DateTime<Utc>) {
        self.end_time = Some(time);
    }

    /// Request the source to stop; the next `next_record` observes the flag,
    /// releases the input and clears the stream subscriptions.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    /// Pull the next record passing the stream and time-window filters.
    /// `None` signals end of stream, a read error, or a completed close
    /// request.
    pub fn next_record(&mut self) -> Option<Record> {
        if self.close_requested {
            self.input = None;
            self.filters.clear();
            self.close_requested = false;
            return None;
        }

        let input = self.input.as_mut()?;
        let codec = self.codec.as_mut()?;

        while !self.close_requested {
            let record = match codec.read_record(input.as_mut()) {
                Ok(Some(record)) => record,
                Ok(None) => return None,
                Err(e) => {
                    error!("file read error: {}", e);
                    return None;
                }
            };

            if !self.filters.is_empty() {
                // Not subscribed
                let Some(filter) = self.filters.get(&record.stream_id()) else {
                    continue;
                };

                if let Some(start) = filter.start.or(self.start_time) {
                    if record.end_time() < start {
                        continue;
                    }
                }
                if let Some(end) = filter.end.or(self.end_time) {
                    if record.start_time >= end {
                        continue;
                    }
                }
            } else {
                if let Some(start) = self.start_time {
                    if record.end_time() < start {
                        continue;
                    }
                }
                if let Some(end) = self.end_time {
                    if record.start_time >= end {
                        continue;
                    }
                }
            }

            return Some(record);
        }

        None
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new()
    }
}

fn stream_id(network: &str, station: &str, location: &str, channel: &str) -> String {
    format!("{}.{}.{}.{}", network, station, location, channel)
}
