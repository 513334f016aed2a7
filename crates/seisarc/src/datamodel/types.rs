//! Value types embedded in domain classes

use seisarc_core::error::Result;
use seisarc_core::{Hints, TimeValue};

use crate::serializer::{NestedAttribute, RowSerializer};

/// A measured value with an optional symmetric uncertainty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RealQuantity {
    pub value: f64,
    pub uncertainty: Option<f64>,
}

impl RealQuantity {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            uncertainty: None,
        }
    }
}

impl NestedAttribute for RealQuantity {
    fn type_name() -> &'static str {
        "RealQuantity"
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()> {
        ser.value("value", &mut self.value, Hints::NONE)?;
        ser.optional("uncertainty", &mut self.uncertainty, Hints::NONE)?;
        Ok(())
    }
}

/// A point in time with an optional uncertainty in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeQuantity {
    pub value: TimeValue,
    pub uncertainty: Option<f64>,
}

impl TimeQuantity {
    pub fn new(value: TimeValue) -> Self {
        Self {
            value,
            uncertainty: None,
        }
    }
}

impl Default for TimeQuantity {
    fn default() -> Self {
        Self {
            value: TimeValue::UNIX_EPOCH,
            uncertainty: None,
        }
    }
}

impl NestedAttribute for TimeQuantity {
    fn type_name() -> &'static str {
        "TimeQuantity"
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()> {
        ser.value("value", &mut self.value, Hints::SPLIT_TIME)?;
        ser.optional("uncertainty", &mut self.uncertainty, Hints::NONE)?;
        Ok(())
    }
}

/// Provenance of an object: who created it, when.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreationInfo {
    pub agency_id: Option<String>,
    pub author: Option<String>,
    pub creation_time: Option<TimeValue>,
}

impl NestedAttribute for CreationInfo {
    fn type_name() -> &'static str {
        "CreationInfo"
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()> {
        ser.optional("agencyID", &mut self.agency_id, Hints::NONE)?;
        ser.optional("author", &mut self.author, Hints::NONE)?;
        ser.optional(
            "creationTime",
            &mut self.creation_time,
            Hints::SPLIT_TIME,
        )?;
        Ok(())
    }
}

/// Identifier of a seismic data stream: network, station, location and
/// channel codes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaveformStreamId {
    pub network_code: String,
    pub station_code: String,
    pub location_code: String,
    pub channel_code: String,
}

impl WaveformStreamId {
    pub fn new(
        network: impl Into<String>,
        station: impl Into<String>,
        location: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            network_code: network.into(),
            station_code: station.into(),
            location_code: location.into(),
            channel_code: channel.into(),
        }
    }
}

impl NestedAttribute for WaveformStreamId {
    fn type_name() -> &'static str {
        "WaveformStreamID"
    }

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()> {
        ser.value("networkCode", &mut self.network_code, Hints::NONE)?;
        ser.value("stationCode", &mut self.station_code, Hints::NONE)?;
        ser.value("locationCode", &mut self.location_code, Hints::NONE)?;
        ser.value("channelCode", &mut self.channel_code, Hints::NONE)?;
        Ok(())
    }
}
