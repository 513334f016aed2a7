//! Record codecs and the process-wide codec factory
//!
//! Codecs turn a byte stream into records one at a time. The factory maps
//! record-type names to codec constructors; `binary` and `json` ship with
//! this crate, further names (e.g. the wire formats of external
//! acquisition systems) can be registered by the application.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{RecordError, Result};
use crate::record::Record;

/// A streaming record encoder/decoder.
pub trait RecordCodec: Send {
    /// Read one record; `Ok(None)` signals a clean end of stream.
    fn read_record(&mut self, input: &mut dyn BufRead) -> Result<Option<Record>>;

    /// Append one record to `output`.
    fn write_record(&mut self, output: &mut dyn Write, record: &Record) -> Result<()>;
}

pub type CodecFactory = fn() -> Box<dyn RecordCodec>;

static REGISTRY: Lazy<RwLock<HashMap<String, CodecFactory>>> = Lazy::new(|| {
    let mut map: HashMap<String, CodecFactory> = HashMap::new();
    map.insert("binary".to_string(), || Box::new(BinaryCodec));
    map.insert("json".to_string(), || Box::new(JsonCodec));
    RwLock::new(map)
});

/// Register a codec under a record-type name.
pub fn register(name: &str, factory: CodecFactory) {
    REGISTRY.write().insert(name.to_string(), factory);
}

/// Construct the codec registered under `name`.
pub fn find(name: &str) -> Option<Box<dyn RecordCodec>> {
    REGISTRY.read().get(name).map(|factory| factory())
}

/// Length-delimited binary framing via bincode.
pub struct BinaryCodec;

impl RecordCodec for BinaryCodec {
    fn read_record(&mut self, input: &mut dyn BufRead) -> Result<Option<Record>> {
        if input.fill_buf()?.is_empty() {
            return Ok(None);
        }
        bincode::deserialize_from(input)
            .map(Some)
            .map_err(|e| RecordError::Decode(e.to_string()))
    }

    fn write_record(&mut self, output: &mut dyn Write, record: &Record) -> Result<()> {
        bincode::serialize_into(output, record).map_err(|e| RecordError::Decode(e.to_string()))
    }
}

/// One JSON document per line.
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
    fn read_record(&mut self, input: &mut dyn BufRead) -> Result<Option<Record>> {
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if line.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(line.trim())
                .map(Some)
                .map_err(|e| RecordError::Decode(e.to_string()));
        }
    }

    fn write_record(&mut self, output: &mut dyn Write, record: &Record) -> Result<()> {
        let rendered =
            serde_json::to_string(record).map_err(|e| RecordError::Decode(e.to_string()))?;
        writeln!(output, "{}", rendered)?;
        Ok(())
    }
}
