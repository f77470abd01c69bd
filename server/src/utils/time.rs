//! 时间工具函数
//!
//! 所有持久化时间戳统一为 Unix millis (i64)，
//! "今日" 边界按服务器本地时区的零点计算。

use chrono::{Local, TimeZone};
use shared::Timestamp;

/// 当前时间 (Unix millis)
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// 今日零点 (本地时区) 的 Unix millis
///
/// DST gap fallback: 如果本地零点不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn today_start_millis() -> Timestamp {
    let today = Local::now().date_naive();
    let midnight = today.and_hms_opt(0, 0, 0).expect("00:00:00 is always valid");
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
}
