use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One administration time taken from a schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time: NaiveTime,
    /// Day offset the time applies to; `None` means every day.
    pub day: Option<u8>,
}

impl ScheduleEntry {
    /// Parse the `hora` / `dia` cells of a row.
    ///
    /// An empty or malformed time yields `None` (the row is ignored). A
    /// malformed day is treated as "every day".
    pub fn parse(hora: &str, dia: &str) -> Option<Self> {
        let (hh, mm) = hora.trim().split_once(':')?;
        let time = NaiveTime::from_hms_opt(hh.trim().parse().ok()?, mm.trim().parse().ok()?, 0)?;
        let day = dia.trim().parse::<u8>().ok();
        Some(Self { time, day })
    }
}
