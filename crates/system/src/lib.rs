pub mod memory;

pub use memory::{to_megabytes, HeapUsage};

use dash_core::MemoryStats;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, info};

/// Host capability that can report heap usage.
///
/// Implementations return `None` when a particular reading cannot be taken;
/// that is an expected outcome, not a failure.
pub trait MemorySource: Send + std::fmt::Debug {
    fn read(&mut self) -> Option<HeapUsage>;
}

/// Memory figures for the current process, read through `sysinfo`.
///
/// `used` is the resident set, `total` the virtual size and `limit` the
/// machine's physical memory.
#[derive(Debug)]
pub struct SysinfoMemory {
    sys: System,
    pid: Pid,
}

impl SysinfoMemory {
    /// `None` on platforms `sysinfo` cannot introspect.
    pub fn new() -> Option<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return None;
        }
        let pid = sysinfo::get_current_pid().ok()?;
        Some(Self {
            sys: System::new(),
            pid,
        })
    }
}

impl MemorySource for SysinfoMemory {
    fn read(&mut self) -> Option<HeapUsage> {
        self.sys.refresh_memory();
        self.sys
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);

        let process = self.sys.process(self.pid)?;
        Some(HeapUsage {
            used:  process.memory(),
            total: process.virtual_memory(),
            limit: self.sys.total_memory(),
        })
    }
}

/// Periodic memory sampler over an optional [`MemorySource`].
///
/// Whether a source exists is decided once, at construction.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    source: Option<Box<dyn MemorySource>>,
}

impl MemoryProbe {
    pub fn new(source: Option<Box<dyn MemorySource>>) -> Self {
        Self { source }
    }

    /// A probe with no capability; every sample is unavailable.
    pub fn unavailable() -> Self {
        Self { source: None }
    }

    /// Use the process memory figures if this platform exposes them.
    pub fn detect() -> Self {
        match SysinfoMemory::new() {
            Some(source) => {
                info!("Memory introspection available");
                Self::new(Some(Box::new(source)))
            }
            None => {
                info!("Memory introspection unavailable on this platform");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    /// Take a reading in megabytes, or `None` when there is no capability
    /// or the source could not produce one.
    pub fn sample_now(&mut self) -> Option<MemoryStats> {
        let usage = self.source.as_mut()?.read();
        if usage.is_none() {
            debug!("Memory source returned no reading");
        }
        usage.map(|u| MemoryStats {
            used:  to_megabytes(u.used),
            total: to_megabytes(u.total),
            limit: to_megabytes(u.limit),
        })
    }
}
