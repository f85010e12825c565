use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 批次工作的一個階段：耗時與當下的記憶體用量 (沒有 sysinfo 時為 None)
#[derive(Debug, Clone)]
pub struct PhaseSample {
    pub phase: String,
    pub duration: Duration,
    pub memory_mb: Option<u64>,
    pub cpu_usage: Option<f32>,
}

#[cfg(feature = "cli")]
struct ProcessProbe {
    system: sysinfo::System,
    pid: sysinfo::Pid,
}

#[cfg(feature = "cli")]
impl ProcessProbe {
    fn attach() -> Option<Self> {
        match sysinfo::get_current_pid() {
            Ok(pid) => Some(Self {
                system: sysinfo::System::new(),
                pid,
            }),
            Err(e) => {
                tracing::warn!("⚠️ Process stats unavailable: {}", e);
                None
            }
        }
    }

    fn sample(&mut self) -> Option<(u64, f32)> {
        self.system.refresh_processes(
            sysinfo::ProcessesToUpdate::Some(&[self.pid]),
            true,
        );
        let process = self.system.process(self.pid)?;
        Some((process.memory() / 1024 / 1024, process.cpu_usage()))
    }
}

#[cfg(not(feature = "cli"))]
struct ProcessProbe;

#[cfg(not(feature = "cli"))]
impl ProcessProbe {
    fn attach() -> Option<Self> {
        None
    }

    fn sample(&mut self) -> Option<(u64, f32)> {
        None
    }
}

struct PhaseState {
    probe: Option<ProcessProbe>,
    last_mark: Instant,
    samples: Vec<PhaseSample>,
}

/// 記錄 refresh 各階段 (extract / transform / load) 的耗時
pub struct PhaseMonitor {
    enabled: bool,
    started: Instant,
    state: Mutex<PhaseState>,
}

impl PhaseMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        let probe = if enabled { ProcessProbe::attach() } else { None };

        Self {
            enabled,
            started: now,
            state: Mutex::new(PhaseState {
                probe,
                last_mark: now,
                samples: Vec::new(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 結束一個階段並記錄；停用時什麼都不做
    pub fn mark(&self, phase: &str) {
        if !self.enabled {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        let now = Instant::now();
        let duration = now.duration_since(state.last_mark);
        state.last_mark = now;
        let usage = state.probe.as_mut().and_then(ProcessProbe::sample);

        let sample = PhaseSample {
            phase: phase.to_string(),
            duration,
            memory_mb: usage.map(|(memory, _)| memory),
            cpu_usage: usage.map(|(_, cpu)| cpu),
        };

        match (sample.memory_mb, sample.cpu_usage) {
            (Some(memory), Some(cpu)) => tracing::info!(
                "📊 {} took {:?} - CPU: {:.1}%, Memory: {}MB",
                phase,
                duration,
                cpu,
                memory
            ),
            _ => tracing::info!("📊 {} took {:?}", phase, duration),
        }
        state.samples.push(sample);
    }

    pub fn samples(&self) -> Vec<PhaseSample> {
        self.state
            .lock()
            .map(|state| state.samples.clone())
            .unwrap_or_default()
    }

    pub fn log_summary(&self) {
        if !self.enabled {
            return;
        }
        let samples = self.samples();
        let peak = samples.iter().filter_map(|s| s.memory_mb).max();
        let slowest = samples.iter().max_by_key(|s| s.duration);

        tracing::info!(
            "📊 Total {:?}, slowest phase: {}, peak memory: {}",
            self.started.elapsed(),
            slowest.map(|s| s.phase.as_str()).unwrap_or("-"),
            peak.map(|mb| format!("{}MB", mb)).unwrap_or_else(|| "n/a".to_string())
        );
    }
}

impl Default for PhaseMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
