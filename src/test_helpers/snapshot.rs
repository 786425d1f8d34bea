use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::ExceedanceRecord;

/// Column layout written by `write_snapshot`.
pub const SNAPSHOT_HEADERS: [&str; 10] = [
    "PERMIT_NUMBER",
    "PF_NAME",
    "COUNTY_NAME",
    "PARAMETER",
    "NON_COMPLIANCE_DATE",
    "SAMPLE_VALUE",
    "PERMIT_VALUE",
    "UNIT_OF_MEASURE",
    "Percent_Over_Limit",
    "Severity",
];

/// Writes `records` to `path` as a snapshot CSV.
pub fn write_snapshot(path: &Path, records: &[ExceedanceRecord]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(SNAPSHOT_HEADERS).unwrap();
    for r in records {
        let pct = r.percent_over_limit.map(|p| p.to_string()).unwrap_or_default();
        writer
            .write_record([
                r.permit.as_str(),
                r.facility.as_str(),
                r.county.as_str(),
                r.parameter.as_str(),
                r.non_compliance_date.as_str(),
                r.sample_value.as_str(),
                r.permit_value.as_deref().unwrap_or_default(),
                r.unit.as_deref().unwrap_or_default(),
                pct.as_str(),
                r.severity.as_str(),
            ])
            .unwrap();
    }
    writer.flush().unwrap();
}

/// Midnight at the start of the given day.
pub fn at_midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(0, 0, 0).unwrap()
}
