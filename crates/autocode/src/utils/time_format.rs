use chrono::{Local, Utc};

/// 当前本地时间，格式 `%Y-%m-%d %H:%M:%S`
pub fn now_standard_string() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 当前时间的纳秒时间戳，用作回收站子目录名
pub fn now_nanos_string() -> String {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000)
        .to_string()
}
