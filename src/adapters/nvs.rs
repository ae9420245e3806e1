//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] for the ThermoGuard settings record.
//!
//! A blob only replaces the previous one once `nvs_commit()` succeeds, so
//! a failed save leaves the old record readable.  Host builds keep blobs
//! in a map keyed by `(namespace, key)` with the same contract.

use crate::app::ports::{StorageError, StoragePort};
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_ERR_NVS_INVALID_LENGTH, ESP_ERR_NVS_NEW_VERSION_FOUND, ESP_ERR_NVS_NO_FREE_PAGES,
    ESP_ERR_NVS_NOT_ENOUGH_SPACE, ESP_ERR_NVS_NOT_FOUND, ESP_OK, esp_err_t, nvs_close,
    nvs_commit, nvs_flash_erase, nvs_flash_init, nvs_get_blob, nvs_handle_t,
    nvs_open, nvs_open_mode_t_NVS_READONLY, nvs_open_mode_t_NVS_READWRITE, nvs_set_blob,
};

#[cfg(target_os = "espidf")]
use log::warn;

/// NVS limits namespace and key names to 15 characters plus NUL.
const NVS_NAME_BUF: usize = 16;

pub struct NvsAdapter {
    /// False when flash init failed; every operation then reports `IoError`.
    available: bool,
    #[cfg(not(target_os = "espidf"))]
    blobs: HashMap<(String, String), Vec<u8>>,
}

impl NvsAdapter {
    /// Bring up the NVS partition.  A full or outdated partition is
    /// erased and initialised again, losing the stored record.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        init_flash().map_err(|e| {
            warn!("NvsAdapter: flash init failed ({})", e);
            StorageError::IoError
        })?;

        info!(
            "NvsAdapter: {} backend ready",
            if cfg!(target_os = "espidf") { "flash" } else { "in-memory" }
        );
        Ok(Self::with_availability(true))
    }

    /// Stand-in used when [`new`](Self::new) failed.  The device keeps
    /// running on defaults and nothing is persisted this session.
    pub fn unavailable() -> Self {
        Self::with_availability(false)
    }

    fn with_availability(available: bool) -> Self {
        Self {
            available,
            #[cfg(not(target_os = "espidf"))]
            blobs: HashMap::new(),
        }
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::IoError)
        }
    }
}

// ── ESP-IDF plumbing ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn esp_check(ret: esp_err_t) -> Result<(), esp_err_t> {
    if ret == ESP_OK { Ok(()) } else { Err(ret) }
}

#[cfg(target_os = "espidf")]
fn init_flash() -> Result<(), esp_err_t> {
    // SAFETY: called once from the main task before any other NVS access.
    unsafe {
        let ret = nvs_flash_init();
        if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
            || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
        {
            warn!("NvsAdapter: partition needs erase, stored settings are lost");
            esp_check(nvs_flash_erase())?;
            return esp_check(nvs_flash_init());
        }
        esp_check(ret)
    }
}

/// Open namespace handle, closed on drop.
#[cfg(target_os = "espidf")]
struct NvsHandle(nvs_handle_t);

#[cfg(target_os = "espidf")]
impl NvsHandle {
    fn open(namespace: &str, write: bool) -> Result<Self, esp_err_t> {
        let ns_buf = nul_terminated(namespace);
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut raw: nvs_handle_t = 0;
        // SAFETY: `ns_buf` is NUL-terminated and `raw` is a valid out-pointer.
        esp_check(unsafe { nvs_open(ns_buf.as_ptr().cast(), mode, &mut raw) })?;
        Ok(Self(raw))
    }

    fn raw(&self) -> nvs_handle_t {
        self.0
    }

    fn commit(&self) -> Result<(), esp_err_t> {
        // SAFETY: the handle is open for the lifetime of `self`.
        esp_check(unsafe { nvs_commit(self.0) })
    }
}

#[cfg(target_os = "espidf")]
impl Drop for NvsHandle {
    fn drop(&mut self) {
        // SAFETY: opened in `open`, closed exactly once here.
        unsafe { nvs_close(self.0) }
    }
}

/// Copy `name` into a NUL-terminated buffer, truncating to the NVS limit.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn nul_terminated(name: &str) -> [u8; NVS_NAME_BUF] {
    let mut buf = [0u8; NVS_NAME_BUF];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NVS_NAME_BUF - 1);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

// ── StoragePort ───────────────────────────────────────────────

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        self.ensure_available()?;

        #[cfg(not(target_os = "espidf"))]
        {
            let data = self
                .blobs
                .get(&(namespace.to_owned(), key.to_owned()))
                .ok_or(StorageError::NotFound)?;
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            Ok(data.len())
        }

        #[cfg(target_os = "espidf")]
        {
            let mut read = || -> Result<usize, esp_err_t> {
                let handle = NvsHandle::open(namespace, false)?;
                let key_buf = nul_terminated(key);
                let mut size = buf.len();
                // SAFETY: `buf` holds `size` writable bytes.
                let ret = unsafe {
                    nvs_get_blob(
                        handle.raw(),
                        key_buf.as_ptr().cast(),
                        buf.as_mut_ptr().cast(),
                        &mut size,
                    )
                };
                // Oversized blob: `size` is the stored length, buf untouched.
                if ret == ESP_ERR_NVS_INVALID_LENGTH as esp_err_t {
                    return Ok(size);
                }
                esp_check(ret).map(|()| size)
            };
            read().map_err(|e| {
                if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t {
                    StorageError::NotFound
                } else {
                    warn!("NvsAdapter: read {}/{} failed ({})", namespace, key, e);
                    StorageError::IoError
                }
            })
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.ensure_available()?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.blobs
                .insert((namespace.to_owned(), key.to_owned()), data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let write = || -> Result<(), esp_err_t> {
                let handle = NvsHandle::open(namespace, true)?;
                let key_buf = nul_terminated(key);
                // SAFETY: `data` is valid for `data.len()` bytes.
                esp_check(unsafe {
                    nvs_set_blob(
                        handle.raw(),
                        key_buf.as_ptr().cast(),
                        data.as_ptr().cast(),
                        data.len(),
                    )
                })?;
                handle.commit()
            };
            write().map_err(|e| {
                warn!("NvsAdapter: write {}/{} failed ({})", namespace, key, e);
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE as esp_err_t {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }
}
