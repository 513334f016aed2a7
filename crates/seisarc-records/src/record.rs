use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One contiguous block of samples from a single data stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub start_time: DateTime<Utc>,
    /// Samples per second.
    pub sampling_rate: f64,
    pub samples: Vec<f64>,
}

impl Record {
    /// Stream identifier in `NET.STA.LOC.CHA` form.
    pub fn stream_id(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }

    /// Time of the sample following the last one in this record.
    pub fn end_time(&self) -> DateTime<Utc> {
        if self.sampling_rate <= 0.0 {
            return self.start_time;
        }
        let span = self.samples.len() as f64 / self.sampling_rate;
        self.start_time + Duration::microseconds((span * 1_000_000.0) as i64)
    }
}
