//! Acquisition and Maintenance Workers
//!
//! The blocking probe read happens here, on a dedicated thread, outside
//! every lock. The engine only ever sees finished samples, so a slow or
//! wedged probe can never stall a reader or the maintenance tick.
//!
//! Pacing is deadline-based rather than sleep-based: each cycle sleeps
//! until the next multiple of the sampling interval, so the cadence does
//! not drift by the duration of the read itself. If the thread falls more
//! than one full interval behind (debugger, system suspend) it
//! resynchronizes instead of burst-firing the backlog.
//!
//! There is no shutdown path. Both workers run for the process lifetime,
//! which is the device model this engine serves.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::monitor::ClimateMonitor;
use crate::traits::ClimateProbe;

/// Spawn the acquisition worker for `probe`.
///
/// Reads at the interval from the engine's [`MonitorConfig`]; failed
/// reads are logged and skipped, the cadence holds either way.
///
/// [`MonitorConfig`]: crate::processor::MonitorConfig
pub fn spawn_acquisition<P>(
    monitor: Arc<ClimateMonitor>,
    probe: P,
) -> io::Result<JoinHandle<()>>
where
    P: ClimateProbe + Send + 'static,
{
    // A zero interval would spin; clamp to something merely aggressive
    let interval = Duration::from_millis(monitor.config().sample_interval_ms.max(1));
    thread::Builder::new()
        .name("vg-acquire".into())
        .spawn(move || acquisition_loop(&monitor, probe, interval))
}

fn acquisition_loop<P: ClimateProbe>(
    monitor: &ClimateMonitor,
    mut probe: P,
    interval: Duration,
) {
    let mut deadline = Instant::now() + interval;
    loop {
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        deadline += interval;
        if deadline < Instant::now() {
            deadline = Instant::now() + interval;
        }

        match probe.read() {
            Ok(sample) => monitor.ingest(sample),
            Err(err) => log::warn!("probe read failed: {err}"),
        }
    }
}

/// Spawn the maintenance driver, calling
/// [`tick`](ClimateMonitor::tick) every `period`.
///
/// Anything from a quarter second to a second keeps the advice cache and
/// the adaptive log on schedule; drift does not matter here.
pub fn spawn_maintenance(
    monitor: Arc<ClimateMonitor>,
    period: Duration,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("vg-maintain".into()).spawn(move || loop {
        thread::sleep(period);
        monitor.tick();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ProbeError, ProbeResult};
    use crate::processor::MonitorConfig;
    use crate::traits::RawSample;

    /// Probe that fails every third read and drifts slightly otherwise.
    struct ScriptedProbe {
        reads: u32,
    }

    impl ClimateProbe for ScriptedProbe {
        fn read(&mut self) -> ProbeResult<RawSample> {
            self.reads += 1;
            if self.reads % 3 == 0 {
                return Err(ProbeError::NotReady);
            }
            Ok(RawSample::new(21.0 + 0.01 * self.reads as f32, 48.0))
        }
    }

    #[test]
    fn acquisition_feeds_the_monitor() {
        let monitor = Arc::new(ClimateMonitor::new(MonitorConfig {
            sample_interval_ms: 5,
            ..MonitorConfig::default()
        }));

        let handle = spawn_acquisition(Arc::clone(&monitor), ScriptedProbe { reads: 0 });
        assert!(handle.is_ok());

        // A few intervals are plenty for several successful reads
        thread::sleep(Duration::from_millis(80));

        let snap = monitor.snapshot();
        assert!(snap.temperature_c.is_some());
        assert!(snap.humidity_pct.is_some());
        assert!(snap.abs_humidity.is_some());
    }

    #[test]
    fn maintenance_ticks_without_samples() {
        let monitor = Arc::new(ClimateMonitor::new(MonitorConfig::default()));
        let handle = spawn_maintenance(Arc::clone(&monitor), Duration::from_millis(5));
        assert!(handle.is_ok());

        thread::sleep(Duration::from_millis(30));
        // Nothing was ever ingested: advice stays pending, engine stays
        // healthy
        assert_eq!(monitor.snapshot().advice_severity.code(), 0);
    }
}
