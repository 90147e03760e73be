/*!
 * Arena
 * Scope-owning handle for the anonymous mapping backing a pool
 */

use std::num::NonZeroUsize;
use std::ptr::NonNull;

use log::error;
use nix::sys::mman::{mmap_anonymous, munmap, MapFlags, ProtFlags};
use nix::unistd::{sysconf, SysconfVar};

use super::types::{PoolError, PoolResult};
use crate::core::types::Size;

/// One contiguous read/write mapping, acquired at pool creation and released
/// exactly once when the handle drops. The handle is the sole owner of the
/// region; nothing else ever unmaps it.
pub(crate) struct Arena {
    base: NonNull<u8>,
    len: Size,
}

// The arena exclusively owns its mapping, so moving it across threads is
// sound. No Sync: concurrent access still requires external locking.
unsafe impl Send for Arena {}

impl Arena {
    /// Map `len` bytes of anonymous read/write memory.
    pub fn map(len: Size) -> PoolResult<Self> {
        let length = NonZeroUsize::new(len)
            .ok_or(PoolError::InvalidArgument("arena length must be nonzero"))?;

        let base = unsafe {
            mmap_anonymous(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_PRIVATE | MapFlags::MAP_ANONYMOUS,
            )?
        };

        Ok(Self {
            base: base.cast(),
            len,
        })
    }

    pub fn base_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    pub fn len(&self) -> Size {
        self.len
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // Releasing on every exit path is the whole point of this handle;
        // a failed munmap leaves nothing to recover, so log and move on.
        if let Err(errno) = unsafe { munmap(self.base.cast(), self.len) } {
            error!("failed to unmap {} byte arena: {}", self.len, errno);
        }
    }
}

/// System page size, used to round pool capacities up at creation.
pub(crate) fn page_size() -> Size {
    sysconf(SysconfVar::PAGE_SIZE)
        .ok()
        .flatten()
        .map(|v| v as Size)
        .unwrap_or(4096)
}
