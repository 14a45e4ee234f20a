//! Cache eviction for the sample buffer.
//!
//! Each target gets the mechanism it actually has. The implementation used by
//! the binary is picked at compile time through [`PlatformCacheController`].

use std::io;

/// Requests that a memory range be evicted from every CPU cache level.
///
/// Eviction is advisory. An `Err` only means the request was refused and the
/// caller may keep going with warm caches.
pub trait CacheController: core::fmt::Debug {
    fn flush(&self, region: &[u8]) -> io::Result<()>;
}

/// Best-effort flush of an integer buffer. Failures are logged and dropped.
pub fn flush_region<C>(controller: &C, buffer: &[i32])
where
    C: CacheController + ?Sized,
{
    let len = core::mem::size_of_val(buffer);
    // `i32` has no padding, so viewing it as bytes is sound.
    let region = unsafe { core::slice::from_raw_parts(buffer.as_ptr().cast::<u8>(), len) };
    if let Err(e) = controller.flush(region) {
        tracing::debug!(error = %e, bytes = len, "cache flush refused");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheController;
impl CacheController for NoopCacheController {
    fn flush(&self, _region: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

/// `cacheflush(start, end, flags)` private ARM syscall.
#[cfg(all(target_os = "linux", target_arch = "arm"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct ArmSyscallCacheController;
#[cfg(all(target_os = "linux", target_arch = "arm"))]
impl ArmSyscallCacheController {
    /// `__ARM_NR_BASE + 2` under EABI.
    const NR_CACHEFLUSH: libc::c_long = 0x0f_0002;
}
#[cfg(all(target_os = "linux", target_arch = "arm"))]
impl CacheController for ArmSyscallCacheController {
    fn flush(&self, region: &[u8]) -> io::Result<()> {
        let start = region.as_ptr();
        let end = start.wrapping_add(region.len());
        let ret = unsafe { libc::syscall(Self::NR_CACHEFLUSH, start, end, 0) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(target_arch = "x86_64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ClflushCacheController;
#[cfg(target_arch = "x86_64")]
impl ClflushCacheController {
    const LINE_LEN: usize = 64;
}
#[cfg(target_arch = "x86_64")]
impl CacheController for ClflushCacheController {
    fn flush(&self, region: &[u8]) -> io::Result<()> {
        use core::arch::x86_64::{_mm_clflush, _mm_mfence};
        if region.is_empty() {
            return Ok(());
        }
        let end = region.as_ptr() as usize + region.len();
        let start = region.as_ptr() as usize & !(Self::LINE_LEN - 1);
        for addr in (start..end).step_by(Self::LINE_LEN) {
            // Every line touched here overlaps `region`, so it is mapped.
            unsafe { _mm_clflush(addr as *const u8) };
        }
        unsafe { _mm_mfence() };
        Ok(())
    }
}

/// `dc civac` by virtual address; Linux enables it at EL0.
#[cfg(target_arch = "aarch64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DcCivacCacheController;
#[cfg(target_arch = "aarch64")]
impl DcCivacCacheController {
    fn line_len() -> usize {
        let ctr: u64;
        unsafe {
            core::arch::asm!("mrs {0}, ctr_el0", out(reg) ctr, options(nomem, nostack, preserves_flags));
        }
        // DminLine: log2 of the smallest data line, in words.
        4 << ((ctr >> 16) & 0xf)
    }
}
#[cfg(target_arch = "aarch64")]
impl CacheController for DcCivacCacheController {
    fn flush(&self, region: &[u8]) -> io::Result<()> {
        if region.is_empty() {
            return Ok(());
        }
        let line_len = Self::line_len();
        let end = region.as_ptr() as usize + region.len();
        let start = region.as_ptr() as usize & !(line_len - 1);
        for addr in (start..end).step_by(line_len) {
            unsafe {
                core::arch::asm!("dc civac, {0}", in(reg) addr, options(nostack, preserves_flags));
            }
        }
        unsafe {
            core::arch::asm!("dsb ish", "isb", options(nostack, preserves_flags));
        }
        Ok(())
    }
}

#[cfg(all(target_os = "linux", target_arch = "arm"))]
pub type PlatformCacheController = ArmSyscallCacheController;
#[cfg(target_arch = "x86_64")]
pub type PlatformCacheController = ClflushCacheController;
#[cfg(target_arch = "aarch64")]
pub type PlatformCacheController = DcCivacCacheController;
#[cfg(not(any(
    all(target_os = "linux", target_arch = "arm"),
    target_arch = "x86_64",
    target_arch = "aarch64"
)))]
pub type PlatformCacheController = NoopCacheController;

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, Default)]
    struct Recording {
        bytes: Cell<usize>,
        refuse: bool,
    }
    impl CacheController for Recording {
        fn flush(&self, region: &[u8]) -> io::Result<()> {
            self.bytes.set(region.len());
            if self.refuse {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            Ok(())
        }
    }

    #[test]
    fn flushes_whole_buffer_in_bytes() {
        let controller = Recording::default();
        let buffer = vec![0_i32; 1000];
        flush_region(&controller, &buffer);
        assert_eq!(controller.bytes.get(), 4000);
    }

    #[test]
    fn refusal_is_not_fatal() {
        let controller = Recording {
            refuse: true,
            ..Default::default()
        };
        let buffer = vec![0_i32; 16];
        flush_region(&controller, &buffer);
        assert_eq!(controller.bytes.get(), 64);
    }

    #[test]
    fn platform_controller_leaves_data_intact() {
        let buffer: Vec<i32> = (0..4096).collect();
        flush_region(&PlatformCacheController::default(), &buffer);
        flush_region(&PlatformCacheController::default(), &buffer[3..17]);
        flush_region(&PlatformCacheController::default(), &[]);
        assert!(buffer.iter().enumerate().all(|(i, &v)| v == i as i32));
    }

    #[test]
    fn noop_always_succeeds() {
        assert!(NoopCacheController.flush(&[1, 2, 3]).is_ok());
    }
}
