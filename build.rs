use chrono::{TimeZone, Utc};

fn main() {
    // 构建时间，SOURCE_DATE_EPOCH 优先（可复现构建）
    let built_at = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    println!(
        "cargo:rustc-env=BUILD_TIME={}",
        built_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
}
