//! 区間計測 (`ANKI_VOCAB_PROFILE=1` で有効)
//!
//! 区間ごとに `PROFILE label=... ms=...` を stderr に出し、
//! ラベル別の回数と合計時間を実行終了時の集計用に保持する。
use std::collections::BTreeMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

const PROFILE_ENV: &str = "ANKI_VOCAB_PROFILE";

#[cfg(test)]
use std::sync::atomic::{AtomicI8, AtomicUsize, Ordering};

#[cfg(test)]
static ENABLED_OVERRIDE: AtomicI8 = AtomicI8::new(-1);
#[cfg(test)]
static LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

static TOTALS: Mutex<BTreeMap<&'static str, StageTotal>> = Mutex::new(BTreeMap::new());

/// ラベル別の累計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTotal {
    pub count: u32,
    pub total: Duration,
}

/// プロファイルログが有効かを返す。
pub fn enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    #[cfg(test)]
    {
        let override_value = ENABLED_OVERRIDE.load(Ordering::SeqCst);
        if override_value >= 0 {
            return override_value == 1;
        }
    }
    *ENABLED.get_or_init(|| {
        std::env::var(PROFILE_ENV)
            .ok()
            .map(|value| value.trim().to_ascii_lowercase())
            .is_some_and(|value| matches!(value.as_str(), "1" | "true" | "yes" | "on"))
    })
}

/// 区間計測用タイマー。
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// 単語などの付加情報付きで経過時間を記録する。
    pub fn log_with(self, extra: &str) {
        record(self.label, self.start.elapsed(), extra);
    }
}

fn record(label: &'static str, elapsed: Duration, extra: &str) {
    if !enabled() {
        return;
    }

    #[cfg(test)]
    {
        LOG_COUNT.fetch_add(1, Ordering::SeqCst);
    }

    add_total(label, elapsed);

    if extra.is_empty() {
        eprintln!("PROFILE label={} ms={}", label, elapsed.as_millis());
    } else {
        eprintln!(
            "PROFILE label={} ms={} {}",
            label,
            elapsed.as_millis(),
            extra
        );
    }
}

fn add_total(label: &'static str, elapsed: Duration) {
    if let Ok(mut totals) = TOTALS.lock() {
        let stage = totals.entry(label).or_default();
        stage.count += 1;
        stage.total += elapsed;
    }
}

/// これまでに記録したラベル別の累計
pub fn totals() -> Vec<(&'static str, StageTotal)> {
    TOTALS
        .lock()
        .map(|totals| totals.iter().map(|(k, v)| (*k, *v)).collect())
        .unwrap_or_default()
}

/// 累計を stderr に出す。無効時は何もしない。
pub fn print_summary() {
    if !enabled() {
        return;
    }
    for (label, stage) in totals() {
        eprintln!(
            "PROFILE summary label={} count={} total_ms={}",
            label,
            stage.count,
            stage.total.as_millis()
        );
    }
}

#[cfg(test)]
pub fn set_enabled_override(value: bool) {
    ENABLED_OVERRIDE.store(if value { 1 } else { 0 }, Ordering::SeqCst);
}

#[cfg(test)]
pub fn clear_enabled_override() {
    ENABLED_OVERRIDE.store(-1, Ordering::SeqCst);
}

#[cfg(test)]
pub fn log_count() -> usize {
    LOG_COUNT.load(Ordering::SeqCst)
}

/// 上書き設定を触るテストを直列化するためのロック
#[cfg(test)]
pub fn override_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
