//! Default process metrics.
//!
//! On Linux values come from `/proc/self`; elsewhere only the start time is
//! exposed. Read failures drop the affected family from that scrape instead
//! of failing the whole render.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::metrics::family::{Desc, MetricFamily, MetricKind};
use crate::metrics::labels;
use crate::metrics::registry::Collector;

// USER_HZ is fixed at 100 for every Linux ABI we build for.
#[cfg(target_os = "linux")]
const CLOCK_TICKS_PER_SEC: f64 = 100.0;

const CPU_USER: &str = "process_cpu_user_seconds_total";
const CPU_SYSTEM: &str = "process_cpu_system_seconds_total";
const CPU_TOTAL: &str = "process_cpu_seconds_total";
const START_TIME: &str = "process_start_time_seconds";
const RESIDENT: &str = "process_resident_memory_bytes";
const VIRTUAL: &str = "process_virtual_memory_bytes";
const HEAP: &str = "process_heap_bytes";
const OPEN_FDS: &str = "process_open_fds";
const MAX_FDS: &str = "process_max_fds";

pub struct ProcessCollector {
    prefix: String,
    start_time: f64,
}

impl ProcessCollector {
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            start_time: process_start_time(),
        }
    }

    /// Prepend `prefix` to every family name. Fails if the result is not a
    /// valid metric name.
    pub fn with_prefix(prefix: &str) -> Result<Self> {
        if !prefix.is_empty() {
            labels::validate_metric_name(prefix)?;
        }
        Ok(Self {
            prefix: prefix.to_string(),
            start_time: process_start_time(),
        })
    }

    fn name(&self, base: &str) -> String {
        format!("{}{}", self.prefix, base)
    }

    fn table() -> Vec<(&'static str, &'static str, MetricKind)> {
        let mut t = vec![(
            START_TIME,
            "Start time of the process since unix epoch in seconds.",
            MetricKind::Gauge,
        )];
        if cfg!(target_os = "linux") {
            t.extend([
                (CPU_USER, "Total user CPU time spent in seconds.", MetricKind::Counter),
                (CPU_SYSTEM, "Total system CPU time spent in seconds.", MetricKind::Counter),
                (
                    CPU_TOTAL,
                    "Total user and system CPU time spent in seconds.",
                    MetricKind::Counter,
                ),
                (RESIDENT, "Resident memory size in bytes.", MetricKind::Gauge),
                (VIRTUAL, "Virtual memory size in bytes.", MetricKind::Gauge),
                (HEAP, "Process heap size in bytes.", MetricKind::Gauge),
                (OPEN_FDS, "Number of open file descriptors.", MetricKind::Gauge),
                (MAX_FDS, "Maximum number of open file descriptors.", MetricKind::Gauge),
            ]);
        }
        t
    }

    fn desc(&self, base: &str) -> Desc {
        Self::table()
            .into_iter()
            .find(|(n, _, _)| *n == base)
            .map(|(n, help, kind)| Desc {
                name: self.name(n),
                help: help.to_string(),
                kind,
            })
            .unwrap_or_else(|| Desc {
                name: self.name(base),
                help: String::new(),
                kind: MetricKind::Gauge,
            })
    }

    fn family(&self, base: &str, value: f64) -> MetricFamily {
        let d = self.desc(base);
        match d.kind {
            MetricKind::Counter => MetricFamily::counter(d.name, d.help, value),
            MetricKind::Gauge => MetricFamily::gauge(d.name, d.help, value),
        }
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for ProcessCollector {
    fn describe(&self) -> Vec<Desc> {
        Self::table().into_iter().map(|(n, _, _)| self.desc(n)).collect()
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut out = Vec::new();

        #[cfg(target_os = "linux")]
        {
            match std::fs::read_to_string("/proc/self/stat") {
                Ok(s) => match linux::parse_stat(&s) {
                    Some(st) => {
                        let user = st.utime as f64 / CLOCK_TICKS_PER_SEC;
                        let system = st.stime as f64 / CLOCK_TICKS_PER_SEC;
                        out.push(self.family(CPU_USER, user));
                        out.push(self.family(CPU_SYSTEM, system));
                        out.push(self.family(CPU_TOTAL, user + system));
                    }
                    None => tracing::debug!("unrecognized /proc/self/stat layout"),
                },
                Err(e) => tracing::debug!(error = %e, "read /proc/self/stat failed"),
            }
        }

        out.push(self.family(START_TIME, self.start_time));

        #[cfg(target_os = "linux")]
        {
            match std::fs::read_to_string("/proc/self/status") {
                Ok(s) => {
                    let mem = linux::parse_status(&s);
                    if let Some(v) = mem.rss_bytes {
                        out.push(self.family(RESIDENT, v as f64));
                    }
                    if let Some(v) = mem.vsize_bytes {
                        out.push(self.family(VIRTUAL, v as f64));
                    }
                    if let Some(v) = mem.data_bytes {
                        out.push(self.family(HEAP, v as f64));
                    }
                }
                Err(e) => tracing::debug!(error = %e, "read /proc/self/status failed"),
            }

            match std::fs::read_dir("/proc/self/fd") {
                Ok(dir) => out.push(self.family(OPEN_FDS, dir.count() as f64)),
                Err(e) => tracing::debug!(error = %e, "read /proc/self/fd failed"),
            }

            match std::fs::read_to_string("/proc/self/limits") {
                Ok(s) => {
                    if let Some(v) = linux::parse_max_open_files(&s) {
                        out.push(self.family(MAX_FDS, v as f64));
                    }
                }
                Err(e) => tracing::debug!(error = %e, "read /proc/self/limits failed"),
            }
        }

        Ok(out)
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Boot time plus the process start offset from `/proc`; collector
/// construction time when either is unavailable.
fn process_start_time() -> f64 {
    #[cfg(target_os = "linux")]
    {
        let stat = std::fs::read_to_string("/proc/self/stat");
        let sys = std::fs::read_to_string("/proc/stat");
        match (stat, sys) {
            (Ok(stat), Ok(sys)) => {
                let start = linux::parse_stat(&stat)
                    .zip(linux::parse_btime(&sys))
                    .map(|(st, btime)| {
                        linux::start_time_secs(btime, st.starttime, CLOCK_TICKS_PER_SEC)
                    });
                if let Some(v) = start {
                    return v;
                }
                tracing::debug!("unrecognized /proc start time layout");
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!(error = %e, "read process start time failed");
            }
        }
    }
    now_secs()
}

#[cfg(any(target_os = "linux", test))]
mod linux {
    pub struct Stat {
        pub utime: u64,
        pub stime: u64,
        /// Clock ticks after boot.
        pub starttime: u64,
    }

    /// `utime`, `stime` and `starttime` are fields 14, 15 and 22; `comm`
    /// (field 2) may contain spaces and parens, so split after its closing
    /// paren.
    pub fn parse_stat(s: &str) -> Option<Stat> {
        let rest = &s[s.rfind(')')? + 1..];
        // rest starts at field 3 (state).
        let fields: Vec<&str> = rest.split_whitespace().collect();
        Some(Stat {
            utime: fields.get(11)?.parse().ok()?,
            stime: fields.get(12)?.parse().ok()?,
            starttime: fields.get(19)?.parse().ok()?,
        })
    }

    /// `btime` line of `/proc/stat`: boot time in seconds since the epoch.
    pub fn parse_btime(s: &str) -> Option<u64> {
        s.lines()
            .find_map(|l| l.strip_prefix("btime "))
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn start_time_secs(btime: u64, starttime: u64, ticks_per_sec: f64) -> f64 {
        btime as f64 + starttime as f64 / ticks_per_sec
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    pub struct Mem {
        pub rss_bytes: Option<u64>,
        pub vsize_bytes: Option<u64>,
        pub data_bytes: Option<u64>,
    }

    pub fn parse_status(s: &str) -> Mem {
        let mut mem = Mem::default();
        for line in s.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let slot = match key {
                "VmRSS" => &mut mem.rss_bytes,
                "VmSize" => &mut mem.vsize_bytes,
                "VmData" => &mut mem.data_bytes,
                _ => continue,
            };
            *slot = parse_kb(rest);
        }
        mem
    }

    fn parse_kb(rest: &str) -> Option<u64> {
        let mut it = rest.split_whitespace();
        let n: u64 = it.next()?.parse().ok()?;
        match it.next() {
            Some("kB") => Some(n * 1024),
            None => Some(n),
            _ => None,
        }
    }

    pub fn parse_max_open_files(s: &str) -> Option<u64> {
        let line = s.lines().find(|l| l.starts_with("Max open files"))?;
        let soft = line["Max open files".len()..].split_whitespace().next()?;
        soft.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::linux;

    #[test]
    fn stat_skips_comm_with_spaces() {
        let s = "4242 (my (odd) proc) S 1 4242 4242 0 -1 4194560 1200 0 0 0 250 75 0 0 20 0 4 0 1234 0 0";
        let st = linux::parse_stat(s).unwrap();
        assert_eq!(st.utime, 250);
        assert_eq!(st.stime, 75);
    }

    #[test]
    fn start_time_from_boot_time_and_ticks() {
        let stat = "4242 (reqmeter) S 1 4242 4242 0 -1 4194560 1200 0 0 0 250 75 0 0 20 0 4 0 1234 0 0";
        let sys = "cpu  10 20 30 40\nintr 1 2 3\nbtime 1700000000\nprocesses 42\n";

        let st = linux::parse_stat(stat).unwrap();
        assert_eq!(st.starttime, 1234);
        let btime = linux::parse_btime(sys).unwrap();
        assert_eq!(btime, 1_700_000_000);
        let start = linux::start_time_secs(btime, st.starttime, 100.0);
        assert!((start - 1_700_000_012.34).abs() < 1e-3);
    }

    #[test]
    fn btime_missing_is_none() {
        assert!(linux::parse_btime("cpu  1 2 3\nprocesses 42\n").is_none());
    }

    #[test]
    fn stat_truncated_is_none() {
        assert!(linux::parse_stat("1 (x) S 1 2").is_none());
    }

    #[test]
    fn status_memory_in_bytes() {
        let s = "Name:\treqmeter\nVmSize:\t  20480 kB\nVmRSS:\t    4096 kB\nVmData:\t 1024 kB\n";
        let mem = linux::parse_status(s);
        assert_eq!(mem.vsize_bytes, Some(20480 * 1024));
        assert_eq!(mem.rss_bytes, Some(4096 * 1024));
        assert_eq!(mem.data_bytes, Some(1024 * 1024));
    }

    #[test]
    fn limits_soft_open_files() {
        let s = "Limit                     Soft Limit           Hard Limit           Units     \n\
                 Max cpu time              unlimited            unlimited            seconds   \n\
                 Max open files            1024                 524288               files     \n";
        assert_eq!(linux::parse_max_open_files(s), Some(1024));
    }
}
