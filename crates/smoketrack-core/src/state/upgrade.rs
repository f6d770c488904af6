//! Schema upgrades for persisted tracker records.
//!
//! Upgrades run once at load time on the raw JSON value, before it is
//! deserialized, and leave a fully populated record at [`CURRENT_VERSION`].
//! Records written before the `version` field existed are classified by the
//! fields they carry.
//!
//! | version | shape                                              |
//! |---------|----------------------------------------------------|
//! | 1       | targets, count, sums, lastSmokeAt                  |
//! | 2       | + smokeLog                                         |
//! | 3       | + runLog, currentRunStartMs                        |

use serde_json::{json, Map, Value};

use super::record::StateRecord;
use super::CURRENT_VERSION;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Largest `count` a pre-log record may carry. Backfilling allocates one
/// entry per event, so anything above this is treated as corrupt.
pub const MAX_BACKFILL_ENTRIES: u64 = 100_000;

/// Upgrade a raw persisted value and deserialize it.
///
/// # Errors
/// Returns an error if the value is not an object, its fields have the
/// wrong types after default-filling, or a legacy `count` exceeds
/// [`MAX_BACKFILL_ENTRIES`].
pub fn upgrade(mut raw: Value) -> Result<StateRecord, serde_json::Error> {
    if let Some(obj) = raw.as_object_mut() {
        let current_version = detect_version(obj);

        if current_version > CURRENT_VERSION {
            tracing::warn!(
                version = current_version,
                "record was written by a newer version; loading known fields only"
            );
        }
        if current_version < 3 {
            check_backfill_size(obj)?;
        }
        if current_version < 1 {
            upgrade_v1(obj);
        }
        if current_version < 2 {
            upgrade_v2(obj);
        }
        if current_version < 3 {
            reconcile_smoke_log(obj);
            upgrade_v3(obj);
        }
        if current_version < CURRENT_VERSION {
            tracing::info!(from = current_version, to = CURRENT_VERSION, "upgraded tracker record");
        }
        fill_defaults(obj);
    }
    serde_json::from_value(raw)
}

/// Read the stored version, or infer it from the fields present.
fn detect_version(obj: &Map<String, Value>) -> u32 {
    if let Some(v) = obj.get("version").and_then(Value::as_u64) {
        return u32::try_from(v).unwrap_or(u32::MAX);
    }
    if obj.contains_key("runLog") {
        3
    } else if obj.contains_key("smokeLog") {
        2
    } else if obj.contains_key("count") {
        1
    } else {
        0
    }
}

fn set_version(obj: &mut Map<String, Value>, version: u32) {
    obj.insert("version".into(), json!(version));
}

fn check_backfill_size(obj: &Map<String, Value>) -> Result<(), serde_json::Error> {
    let count = obj.get("count").and_then(Value::as_f64).unwrap_or(0.0);
    if count > MAX_BACKFILL_ENTRIES as f64 {
        return Err(<serde_json::Error as serde::de::Error>::custom(format!(
            "count {count} exceeds {MAX_BACKFILL_ENTRIES} events"
        )));
    }
    Ok(())
}

/// `count` as a whole number; absent or invalid reads as 0.
fn stored_count(obj: &Map<String, Value>) -> u64 {
    match obj.get("count").and_then(Value::as_f64) {
        Some(c) if c.is_finite() && c >= 0.0 => c.round() as u64,
        _ => 0,
    }
}

fn stored_f64(obj: &Map<String, Value>, key: &str) -> f64 {
    obj.get(key).and_then(Value::as_f64).unwrap_or(0.0).max(0.0)
}

/// Upgrade v1: baseline aggregates only.
fn upgrade_v1(obj: &mut Map<String, Value>) {
    for key in ["count", "minutesSum", "puffsSum"] {
        obj.entry(key).or_insert(json!(0));
    }
    for key in ["targetMinutes", "targetPuffs", "lastSmokeAt"] {
        obj.entry(key).or_insert(Value::Null);
    }
    set_version(obj, 1);
}

/// Upgrade v2: add the smoking event log.
fn upgrade_v2(obj: &mut Map<String, Value>) {
    let slot = obj.entry("smokeLog").or_insert_with(|| json!([]));
    if !slot.is_array() {
        *slot = json!([]);
    }
    set_version(obj, 2);
}

/// Bring a pre-v3 smoking log in line with `count`.
///
/// Some older builds reset the aggregates but kept the log, so a log longer
/// than `count` keeps only its most recent `count` entries. A shorter log
/// (including none at all) is backfilled with older synthetic entries whose
/// gaps and puffs make up what the aggregates hold beyond the logged events.
fn reconcile_smoke_log(obj: &mut Map<String, Value>) {
    let count = stored_count(obj);
    let mut log = match obj.remove("smokeLog") {
        Some(Value::Array(log)) => log,
        _ => Vec::new(),
    };
    let len = log.len() as u64;

    if len > count {
        let surplus = log.len() - count as usize;
        log.drain(..surplus);
        tracing::warn!(dropped = surplus, kept = count, "trimmed smoking log to recorded count");
    } else if len < count {
        let mut filled = if log.is_empty() {
            backfill_smoke_log(obj, count)
        } else {
            backfill_before(obj, &log, count - len)
        };
        if !filled.is_empty() {
            tracing::warn!(entries = filled.len(), "backfilled smoking log for legacy record");
        }
        filled.append(&mut log);
        log = filled;
    }
    obj.insert("smokeLog".into(), Value::Array(log));
}

/// `count` entries spaced evenly back from `lastSmokeAt` so the gaps sum to
/// `minutesSum`, with puffs spread as evenly as possible over `puffsSum`.
fn backfill_smoke_log(obj: &Map<String, Value>, count: u64) -> Vec<Value> {
    let Some(last) = obj.get("lastSmokeAt").and_then(Value::as_f64) else {
        return Vec::new();
    };
    let minutes_sum = stored_f64(obj, "minutesSum");
    let puffs_total = stored_f64(obj, "puffsSum").round() as u64;
    let gap_ms = if count > 1 {
        minutes_sum * MS_PER_MINUTE / (count - 1) as f64
    } else {
        0.0
    };
    synthesize(count, last, gap_ms, puffs_total)
}

/// `missing` entries ending one gap before the oldest logged entry. The
/// minutes not already spanned by the log and the puffs not already logged
/// are shared among them.
fn backfill_before(obj: &Map<String, Value>, log: &[Value], missing: u64) -> Vec<Value> {
    let stamps: Vec<f64> = log
        .iter()
        .filter_map(|e| e.get("timestamp").and_then(Value::as_f64))
        .collect();
    let oldest = stamps.iter().copied().reduce(f64::min);
    let newest = stamps.iter().copied().reduce(f64::max);
    let (Some(oldest), Some(newest)) = (oldest, newest) else {
        return Vec::new();
    };

    let spanned = (newest - oldest) / MS_PER_MINUTE;
    let gap_ms = (stored_f64(obj, "minutesSum") - spanned).max(0.0) * MS_PER_MINUTE / missing as f64;
    let logged_puffs: f64 = log
        .iter()
        .filter_map(|e| e.get("intensity").and_then(Value::as_f64))
        .sum();
    let puffs_left = (stored_f64(obj, "puffsSum") - logged_puffs).max(0.0).round() as u64;

    synthesize(missing, oldest - gap_ms, gap_ms, puffs_left)
}

fn synthesize(n: u64, newest: f64, gap_ms: f64, puffs_total: u64) -> Vec<Value> {
    if n == 0 {
        return Vec::new();
    }
    let base_puffs = puffs_total / n;
    let extra = puffs_total % n;

    (0..n)
        .map(|i| {
            let steps_back = (n - 1 - i) as f64;
            let timestamp = (newest - steps_back * gap_ms).round() as i64;
            let intensity = base_puffs + u64::from(i < extra);
            json!({
                "timestamp": timestamp,
                "intensity": intensity,
                "backfilled": true,
            })
        })
        .collect()
}

/// Upgrade v3: add the activity run log and the active-run marker.
fn upgrade_v3(obj: &mut Map<String, Value>) {
    obj.entry("runLog").or_insert_with(|| json!([]));
    obj.entry("currentRunStartMs").or_insert(Value::Null);
    set_version(obj, 3);
}

fn fill_defaults(obj: &mut Map<String, Value>) {
    for key in ["count", "minutesSum", "puffsSum"] {
        let slot = obj.entry(key).or_insert(json!(0));
        if slot.is_null() {
            *slot = json!(0);
        }
    }
    for key in ["smokeLog", "runLog"] {
        let slot = obj.entry(key).or_insert_with(|| json!([]));
        if slot.is_null() {
            *slot = json!([]);
        }
    }
    // Legacy stores wrote integral counts as floats.
    if let Some(count) = obj.get("count").and_then(Value::as_f64) {
        if count.is_finite() && count >= 0.0 {
            obj.insert("count".into(), json!(count.round() as u64));
        }
    }
    if let Some(last) = obj.get("lastSmokeAt").and_then(Value::as_f64) {
        obj.insert("lastSmokeAt".into(), json!(last.round() as i64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_becomes_default_record() {
        let record = upgrade(json!({})).unwrap();
        assert_eq!(record, StateRecord::default());
    }

    #[test]
    fn legacy_record_is_backfilled() {
        let raw = json!({
            "targetMinutes": 60,
            "targetPuffs": null,
            "count": 3,
            "minutesSum": 90.0,
            "puffsSum": 20,
            "lastSmokeAt": 10_800_000
        });
        let record = upgrade(raw).unwrap();

        assert_eq!(record.version, CURRENT_VERSION);
        assert_eq!(record.target_minutes, Some(60));
        assert_eq!(record.count, 3);
        assert_eq!(record.smoke_log.len(), 3);
        assert!(record.smoke_log.iter().all(|e| e.backfilled));

        let stamps: Vec<i64> = record.smoke_log.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![5_400_000, 8_100_000, 10_800_000]);

        let puffs: Vec<u32> = record.smoke_log.iter().map(|e| e.intensity).collect();
        assert_eq!(puffs, vec![7, 7, 6]);

        assert!(record.run_log.is_empty());
        assert_eq!(record.current_run_start_ms, None);
    }

    #[test]
    fn legacy_record_without_last_timestamp_gets_empty_log() {
        let record = upgrade(json!({ "count": 0, "minutesSum": 0, "puffsSum": 0, "lastSmokeAt": null })).unwrap();
        assert!(record.smoke_log.is_empty());
    }

    #[test]
    fn v2_record_keeps_log_and_gains_runs() {
        let raw = json!({
            "count": 1,
            "minutesSum": 0,
            "puffsSum": 4,
            "lastSmokeAt": 1000,
            "smokeLog": [{ "timestamp": 1000, "intensity": 4 }]
        });
        let record = upgrade(raw).unwrap();
        assert_eq!(record.smoke_log.len(), 1);
        assert!(!record.smoke_log[0].backfilled);
        assert!(record.run_log.is_empty());
        assert_eq!(record.version, 3);
    }

    #[test]
    fn longer_log_keeps_most_recent_entries() {
        let raw = json!({
            "count": 1,
            "minutesSum": 0,
            "puffsSum": 4,
            "lastSmokeAt": 5000,
            "smokeLog": [
                { "timestamp": 1000, "intensity": 8 },
                { "timestamp": 2000, "intensity": 8 },
                { "timestamp": 5000, "intensity": 4 }
            ]
        });
        let record = upgrade(raw).unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.smoke_log.len(), 1);
        assert_eq!(record.smoke_log[0].timestamp, 5000);
        assert_eq!(record.smoke_log[0].intensity, 4);
    }

    #[test]
    fn reset_aggregates_drop_the_whole_log() {
        let raw = json!({
            "count": 0,
            "minutesSum": 0,
            "puffsSum": 0,
            "lastSmokeAt": null,
            "smokeLog": [{ "timestamp": 1000, "intensity": 8 }]
        });
        let record = upgrade(raw).unwrap();
        assert!(record.smoke_log.is_empty());
    }

    #[test]
    fn shorter_log_is_backfilled_before_oldest_entry() {
        let raw = json!({
            "count": 3,
            "minutesSum": 90,
            "puffsSum": 20,
            "lastSmokeAt": 10_800_000,
            "smokeLog": [{ "timestamp": 10_800_000, "intensity": 6 }]
        });
        let record = upgrade(raw).unwrap();
        assert_eq!(record.count, 3);
        assert_eq!(record.smoke_log.len(), 3);

        let stamps: Vec<i64> = record.smoke_log.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![5_400_000, 8_100_000, 10_800_000]);
        let puffs: Vec<u32> = record.smoke_log.iter().map(|e| e.intensity).collect();
        assert_eq!(puffs, vec![7, 7, 6]);
        let backfilled: Vec<bool> = record.smoke_log.iter().map(|e| e.backfilled).collect();
        assert_eq!(backfilled, vec![true, true, false]);
    }

    #[test]
    fn shorter_log_only_fills_unspanned_minutes() {
        // The two logged events already span 60 of the 90 minutes.
        let raw = json!({
            "count": 3,
            "minutesSum": 90,
            "puffsSum": 30,
            "lastSmokeAt": 7_200_000,
            "smokeLog": [
                { "timestamp": 3_600_000, "intensity": 10 },
                { "timestamp": 7_200_000, "intensity": 10 }
            ]
        });
        let record = upgrade(raw).unwrap();
        assert_eq!(record.smoke_log.len(), 3);
        assert_eq!(record.smoke_log[0].timestamp, 1_800_000);
        assert_eq!(record.smoke_log[0].intensity, 10);
        assert!(record.smoke_log[0].backfilled);
    }

    #[test]
    fn empty_v2_log_is_backfilled_from_last_timestamp() {
        let raw = json!({
            "count": 2,
            "minutesSum": 30,
            "puffsSum": 10,
            "lastSmokeAt": 1_800_000,
            "smokeLog": []
        });
        let record = upgrade(raw).unwrap();
        let stamps: Vec<i64> = record.smoke_log.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![0, 1_800_000]);
        assert!(record.smoke_log.iter().all(|e| e.backfilled));
    }

    #[test]
    fn oversized_legacy_count_is_rejected() {
        let raw = json!({ "count": 1e12, "minutesSum": 0, "puffsSum": 0, "lastSmokeAt": 0 });
        assert!(upgrade(raw).is_err());

        let raw = json!({ "count": MAX_BACKFILL_ENTRIES, "lastSmokeAt": 0 });
        assert_eq!(upgrade(raw).unwrap().smoke_log.len() as u64, MAX_BACKFILL_ENTRIES);
    }

    #[test]
    fn upgrade_is_idempotent() {
        let raw = json!({ "count": 2, "minutesSum": 30, "puffsSum": 10, "lastSmokeAt": 1_800_000 });
        let once = upgrade(raw).unwrap();
        let twice = upgrade(serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn null_aggregates_are_default_filled() {
        let raw = json!({ "version": 3, "count": null, "smokeLog": null, "runLog": [] });
        let record = upgrade(raw).unwrap();
        assert_eq!(record.count, 0);
        assert!(record.smoke_log.is_empty());
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(upgrade(json!([1, 2, 3])).is_err());
        assert!(upgrade(json!("hello")).is_err());
    }
}
