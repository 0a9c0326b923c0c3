//! Raw frame decoding.
//!
//! A [`FramePacket`] is one copy of iRacing's variable buffer plus the schema
//! describing where each variable lives. [`TelemetryFrame`] pairs a packet
//! with the session YAML that was current when it was captured and exposes it
//! through [`TelemetrySnapshot`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{TelemetrySnapshot, vars};
use crate::session::{Driver, ResultPosition, Session, SessionInfo};
use crate::{Result, StandingsError};

/// Supported telemetry data types.
/// Maps to iRacing SDK's irsdk_VarType enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum VariableType {
    /// 8-bit character (irsdk_char)
    Char,
    /// Boolean value (irsdk_bool)
    Bool,
    /// 32-bit signed integer (irsdk_int)
    Int32,
    /// 32-bit bitfield (irsdk_bitField)
    BitField,
    /// 32-bit floating point (irsdk_float)
    Float32,
    /// 64-bit floating point (irsdk_double)
    Float64,
}

impl VariableType {
    /// Size in bytes, matching irsdk_VarTypeBytes.
    pub const fn size(&self) -> usize {
        match self {
            VariableType::Char | VariableType::Bool => 1,
            VariableType::Int32 | VariableType::BitField | VariableType::Float32 => 4,
            VariableType::Float64 => 8,
        }
    }
}

/// Information about a specific telemetry variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct VariableInfo {
    /// Variable name as defined by iRacing
    pub name: String,
    /// Data type of the variable
    pub data_type: VariableType,
    /// Byte offset within the telemetry frame
    pub offset: usize,
    /// Number of elements (1 for scalar, 64 for the CarIdx arrays)
    pub count: usize,
}

/// Where each variable lives inside a frame buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct VariableSchema {
    /// Variable metadata by name
    pub variables: HashMap<String, VariableInfo>,
    /// Total size of a telemetry frame in bytes
    pub frame_size: usize,
}

impl VariableSchema {
    /// Create a new VariableSchema with validation.
    pub fn new(variables: HashMap<String, VariableInfo>, frame_size: usize) -> Result<Self> {
        let schema = Self { variables, frame_size };
        schema.validate()?;
        Ok(schema)
    }

    /// Lay variables out back to back in the order given.
    pub fn packed<'a>(layout: impl IntoIterator<Item = (&'a str, VariableType, usize)>) -> Self {
        let mut variables = HashMap::new();
        let mut offset = 0;
        for (name, data_type, count) in layout {
            variables.insert(name.to_string(), VariableInfo { name: name.to_string(), data_type, offset, count });
            offset += data_type.size() * count;
        }
        Self { variables, frame_size: offset }
    }

    /// Validate the schema for consistency.
    pub fn validate(&self) -> Result<()> {
        for (name, var_info) in &self.variables {
            if var_info.count == 0 {
                return Err(StandingsError::parse_error(
                    "Schema validation",
                    format!("Variable '{}' has count of 0", name),
                ));
            }

            if var_info.name != *name {
                return Err(StandingsError::parse_error(
                    "Schema validation",
                    format!("Variable map key '{}' doesn't match info name '{}'", name, var_info.name),
                ));
            }

            let end_offset = var_info
                .data_type
                .size()
                .checked_mul(var_info.count)
                .and_then(|len| len.checked_add(var_info.offset));
            if end_offset.is_none_or(|end| end > self.frame_size) {
                return Err(StandingsError::Memory { offset: var_info.offset });
            }
        }

        Ok(())
    }

    pub fn get_variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.get(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }
}

/// One captured telemetry buffer.
#[derive(Debug, Clone)]
pub struct FramePacket {
    /// Telemetry data buffer (zero-copy via Arc)
    pub data: Arc<[u8]>,

    /// Monotonic frame counter
    pub tick: u32,

    /// Session info update counter at capture time
    pub session_version: u32,

    /// Variable schema for field access
    pub schema: Arc<VariableSchema>,
}

impl FramePacket {
    pub fn new(data: Vec<u8>, tick: u32, session_version: u32, schema: Arc<VariableSchema>) -> Self {
        Self { data: data.into(), tick, session_version, schema }
    }
}

/// Types that can be decoded from a frame buffer.
pub trait VarData: Sized {
    /// Decode a single element of `data_type` at `offset`.
    fn read(data: &[u8], data_type: VariableType, offset: usize) -> Result<Self>;

    /// Decode the variable described by `info`.
    fn from_bytes(data: &[u8], info: &VariableInfo) -> Result<Self> {
        Self::read(data, info.data_type, info.offset)
    }
}

fn expect_type(actual: VariableType, expected: VariableType) -> Result<()> {
    if actual != expected {
        return Err(StandingsError::TypeConversion {
            details: format!("Expected {:?}, got {:?}", expected, actual),
        });
    }
    Ok(())
}

fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    let end = offset.checked_add(N).ok_or(StandingsError::Memory { offset })?;
    data.get(offset..end)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(StandingsError::Memory { offset })
}

macro_rules! impl_le_var_data {
    ($ty:ty, $variant:ident) => {
        impl VarData for $ty {
            fn read(data: &[u8], data_type: VariableType, offset: usize) -> Result<Self> {
                expect_type(data_type, VariableType::$variant)?;
                Ok(<$ty>::from_le_bytes(read_bytes(data, offset)?))
            }
        }
    };
}

impl_le_var_data!(i32, Int32);
impl_le_var_data!(f32, Float32);
impl_le_var_data!(f64, Float64);

impl VarData for bool {
    fn read(data: &[u8], data_type: VariableType, offset: usize) -> Result<Self> {
        expect_type(data_type, VariableType::Bool)?;
        let [byte] = read_bytes::<1>(data, offset)?;
        Ok(byte != 0)
    }
}

impl<T: VarData> VarData for Vec<T> {
    fn read(data: &[u8], data_type: VariableType, offset: usize) -> Result<Self> {
        T::read(data, data_type, offset).map(|value| vec![value])
    }

    fn from_bytes(data: &[u8], info: &VariableInfo) -> Result<Self> {
        let element_size = info.data_type.size();
        (0..info.count)
            .map(|i| {
                let offset = i
                    .checked_mul(element_size)
                    .and_then(|rel| rel.checked_add(info.offset))
                    .ok_or(StandingsError::Memory { offset: info.offset })?;
                T::read(data, info.data_type, offset)
            })
            .collect()
    }
}

/// A decoded telemetry tick with the session info that accompanied it.
#[derive(Debug, Clone)]
pub struct TelemetryFrame {
    packet: Arc<FramePacket>,
    session: Option<Arc<SessionInfo>>,
}

impl TelemetryFrame {
    pub fn new(packet: Arc<FramePacket>, session: Option<Arc<SessionInfo>>) -> Self {
        Self { packet, session }
    }

    pub fn tick(&self) -> u32 {
        self.packet.tick
    }

    pub fn session_info(&self) -> Option<&SessionInfo> {
        self.session.as_deref()
    }

    /// Typed lookup by variable name.
    pub fn try_get<T: VarData>(&self, name: &str) -> Result<T> {
        let info = self
            .packet
            .schema
            .get_variable(name)
            .ok_or_else(|| StandingsError::FieldNotFound { field: name.to_string() })?;
        T::from_bytes(&self.packet.data, info)
    }

    /// Typed lookup that treats any failure as an absent value.
    pub fn get<T: VarData>(&self, name: &str) -> Option<T> {
        match self.try_get(name) {
            Ok(value) => Some(value),
            Err(e) => {
                trace!(variable = name, tick = self.packet.tick, "Variable unavailable: {}", e);
                None
            }
        }
    }
}

impl TelemetrySnapshot for TelemetryFrame {
    fn player_car_idx(&self) -> Option<usize> {
        self.get::<i32>(vars::PLAYER_CAR_IDX)
            .and_then(|idx| usize::try_from(idx).ok())
            .or_else(|| {
                let idx = self.session.as_deref()?.driver_info.as_ref()?.driver_car_idx?;
                usize::try_from(idx).ok()
            })
    }

    fn car_idx_position(&self) -> Option<Vec<i32>> {
        self.get(vars::CAR_IDX_POSITION)
    }

    fn car_idx_class_position(&self) -> Option<Vec<i32>> {
        self.get(vars::CAR_IDX_CLASS_POSITION)
    }

    fn car_idx_last_lap_time(&self) -> Option<Vec<f32>> {
        self.get(vars::CAR_IDX_LAST_LAP_TIME)
    }

    fn car_idx_best_lap_time(&self) -> Option<Vec<f32>> {
        self.get(vars::CAR_IDX_BEST_LAP_TIME)
    }

    fn car_idx_lap(&self) -> Option<Vec<i32>> {
        self.get(vars::CAR_IDX_LAP)
    }

    fn car_idx_lap_dist_pct(&self) -> Option<Vec<f32>> {
        self.get(vars::CAR_IDX_LAP_DIST_PCT)
    }

    fn car_idx_on_pit_road(&self) -> Option<Vec<bool>> {
        self.get(vars::CAR_IDX_ON_PIT_ROAD)
    }

    fn session_time(&self) -> Option<f64> {
        self.get(vars::SESSION_TIME)
    }

    fn session_time_total(&self) -> Option<f64> {
        self.get(vars::SESSION_TIME_TOTAL)
    }

    fn session_laps_remain(&self) -> Option<i32> {
        self.get(vars::SESSION_LAPS_REMAIN_EX)
    }

    fn drivers(&self) -> &[Driver] {
        self.session.as_deref().map(SessionInfo::drivers).unwrap_or(&[])
    }

    fn sessions(&self) -> &[Session] {
        self.session.as_deref().map(|info| info.session_info.sessions.as_slice()).unwrap_or(&[])
    }

    fn current_session_num(&self) -> Option<i32> {
        self.session.as_deref().map(|info| info.session_info.current_session_num)
    }

    fn qualify_results(&self) -> &[ResultPosition] {
        self.session.as_deref().map(SessionInfo::qualify_results).unwrap_or(&[])
    }
}
