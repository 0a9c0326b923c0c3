//! Shared fixtures: a four-car session YAML and a frame writer.

#![allow(dead_code)]

use std::sync::Arc;

use pitwall_standings::telemetry::vars;
use pitwall_standings::{FramePacket, VariableSchema, VariableType};

/// Pace car in slot 0, player in slot 1, one qualifying session and a 12-lap race.
pub const SESSION_YAML: &str = "---
WeekendInfo:
 TrackName: spa 2024 bench
 TrackDisplayName: Circuit de Spa-Francorchamps
 TrackLength: 6.93 km
SessionInfo:
 CurrentSessionNum: 1
 Sessions:
 - SessionNum: 0
   SessionLaps: unlimited
   SessionTime: 600.0000 sec
   SessionType: Lone Qualify
   SessionName: QUALIFY
   ResultsPositions:
   - Position: 1
     ClassPosition: 0
     CarIdx: 2
     Lap: 3
     FastestTime: 137.5120
     LastTime: 137.9000
   - Position: 2
     ClassPosition: 1
     CarIdx: 1
     Lap: 3
     FastestTime: 137.8800
     LastTime: 138.0100
   ResultsFastestLap:
   - CarIdx: 2
     FastestLap: 3
     FastestTime: 137.5120
 - SessionNum: 1
   SessionLaps: 12
   SessionTime: unlimited
   SessionType: Race
   SessionName: RACE
   ResultsPositions:
   ResultsFastestLap:
   - CarIdx: 255
     FastestLap: 0
     FastestTime: -1.0000
DriverInfo:
 DriverCarIdx: 1
 PaceCarIdx: 0
 Drivers:
 - CarIdx: 0
   UserName: Pace Car
   AbbrevName: Car, Pace
   Initials: PC
   CarNumber: \"0\"
   CarClassID: 11
   CarClassColor: 0xffffff
   CarClassEstLapTime: 150.0000
   CarIsPaceCar: 1
   IRating: 0
   LicString: R 0.00
   IsSpectator: 0
 - CarIdx: 1
   UserName: Sean O'Brien
   AbbrevName: O'Brien, S
   Initials: SO
   TeamName: Sean O'Brien
   CarNumber: \"12\"
   CarClassID: 4029
   CarClassColor: 0xffda59
   CarClassEstLapTime: 140.0000
   CarIsPaceCar: 0
   IRating: 2710
   LicString: A 3.41
   IsSpectator: 0
 - CarIdx: 2
   UserName: Mika Virtanen
   AbbrevName: Virtanen, M
   Initials: MV
   TeamName: Mika Virtanen
   CarNumber: \"7\"
   CarClassID: 4029
   CarClassColor: 0xffda59
   CarClassEstLapTime: 140.0000
   CarIsPaceCar: 0
   IRating: 3105
   LicString: A 4.02
   IsSpectator: 0
 - CarIdx: 3
   UserName: Lucia Ferraro
   AbbrevName: Ferraro, L
   Initials: LF
   TeamName: Lucia Ferraro
   CarNumber: \"33\"
   CarClassID: 4029
   CarClassColor: 0xffda59
   CarClassEstLapTime: 140.0000
   CarIsPaceCar: 0
   IRating: 1890
   LicString: B 2.75
   IsSpectator: 0
";

/// Appends variables back to back, mirroring [`VariableSchema::packed`].
#[derive(Default)]
pub struct FrameWriter {
    layout: Vec<(&'static str, VariableType, usize)>,
    data: Vec<u8>,
}

impl FrameWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn i32s(mut self, name: &'static str, values: &[i32]) -> Self {
        self.layout.push((name, VariableType::Int32, values.len()));
        values.iter().for_each(|v| self.data.extend_from_slice(&v.to_le_bytes()));
        self
    }

    pub fn f32s(mut self, name: &'static str, values: &[f32]) -> Self {
        self.layout.push((name, VariableType::Float32, values.len()));
        values.iter().for_each(|v| self.data.extend_from_slice(&v.to_le_bytes()));
        self
    }

    pub fn bools(mut self, name: &'static str, values: &[bool]) -> Self {
        self.layout.push((name, VariableType::Bool, values.len()));
        self.data.extend(values.iter().map(|&v| u8::from(v)));
        self
    }

    pub fn f64(mut self, name: &'static str, value: f64) -> Self {
        self.layout.push((name, VariableType::Float64, 1));
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn finish(self, tick: u32, session_version: u32) -> FramePacket {
        let schema = VariableSchema::packed(self.layout);
        FramePacket::new(self.data, tick, session_version, Arc::new(schema))
    }
}

/// Mid-race frame: player (slot 1) running P2 on lap 3, slot 3 in the pits.
pub fn race_frame(tick: u32) -> FrameWriter {
    race_frame_with_pits(tick, [false, false, false, true])
}

pub fn race_frame_with_pits(tick: u32, on_pit_road: [bool; 4]) -> FrameWriter {
    FrameWriter::new()
        .i32s(vars::PLAYER_CAR_IDX, &[1])
        .i32s(vars::CAR_IDX_POSITION, &[0, 2, 1, 3])
        .i32s(vars::CAR_IDX_CLASS_POSITION, &[0, 2, 1, 3])
        .i32s(vars::CAR_IDX_LAP, &[-1, 3, 3, 2])
        .f32s(vars::CAR_IDX_LAP_DIST_PCT, &[-1.0, 0.40, 0.55, 0.30])
        .f32s(vars::CAR_IDX_LAST_LAP_TIME, &[-1.0, 138.25, 137.5, 141.0625])
        .f32s(vars::CAR_IDX_BEST_LAP_TIME, &[-1.0, 137.25, 137.5, 139.0])
        .bools(vars::CAR_IDX_ON_PIT_ROAD, &on_pit_road)
        .f64(vars::SESSION_TIME, 1234.5 + f64::from(tick) / 60.0)
        .f64(vars::SESSION_TIME_TOTAL, 604800.0)
        .i32s(vars::SESSION_LAPS_REMAIN_EX, &[9])
}
