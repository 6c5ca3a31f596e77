const MIB: u64 = 1 << 20;

/// Raw heap figures in bytes, as reported by a [`MemorySource`](crate::MemorySource).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeapUsage {
    /// Bytes currently in use.
    pub used: u64,
    /// Bytes reserved from the OS.
    pub total: u64,
    /// Upper bound the heap may grow to.
    pub limit: u64,
}

/// Convert bytes to whole megabytes, rounding to nearest.
pub fn to_megabytes(bytes: u64) -> u64 {
    (bytes + MIB / 2) / MIB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn megabytes_round_to_nearest() {
        assert_eq!(to_megabytes(0), 0);
        assert_eq!(to_megabytes(MIB / 2 - 1), 0);
        assert_eq!(to_megabytes(MIB / 2), 1);
        assert_eq!(to_megabytes(150 * MIB + 10), 150);
    }
}
