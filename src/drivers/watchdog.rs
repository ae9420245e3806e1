//! Control-loop watchdog on top of the ESP-IDF task watchdog (TWDT).
//!
//! If the loop wedges (stuck I²C transaction, blocked console) the board
//! panics and reboots, and boot drives both relays to released.  A
//! relay therefore never stays energised past the deadline without a
//! live controller behind it.
//!
//! On the host the watchdog only counts feeds.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset,
};
use log::{info, warn};

/// Default reset deadline for the control loop.
pub const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    armed: bool,
    timeout_ms: u32,
    feeds: core::cell::Cell<u64>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    pub fn new() -> Self {
        Self::with_timeout(WATCHDOG_TIMEOUT_MS)
    }

    /// Subscribe the calling task with a `timeout_ms` deadline.  A
    /// subscription failure is logged and leaves the watchdog disarmed.
    pub fn with_timeout(timeout_ms: u32) -> Self {
        let armed = arm(timeout_ms);
        if armed {
            info!("Watchdog: armed, {} ms deadline", timeout_ms);
        } else {
            warn!("Watchdog: not armed, loop stalls will not reset the board");
        }
        Self {
            armed,
            timeout_ms,
            feeds: core::cell::Cell::new(0),
        }
    }

    /// Call once per loop pass, at least every [`timeout_ms`](Self::timeout_ms).
    pub fn feed(&self) {
        if !self.armed {
            return;
        }
        #[cfg(target_os = "espidf")]
        // SAFETY: the calling task was subscribed in `arm`.
        unsafe {
            esp_task_wdt_reset();
        }
        self.feeds.set(self.feeds.get().wrapping_add(1));
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn feed_count(&self) -> u64 {
        self.feeds.get()
    }
}

#[cfg(target_os = "espidf")]
fn arm(timeout_ms: u32) -> bool {
    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: plain FFI calls; `cfg` outlives the reconfigure call.
    unsafe {
        // Fails harmlessly when the TWDT is already running with this config.
        let ret = esp_task_wdt_reconfigure(&cfg);
        if ret != ESP_OK {
            warn!("Watchdog: reconfigure returned {}", ret);
        }
        let ret = esp_task_wdt_add(core::ptr::null_mut());
        if ret != ESP_OK {
            warn!("Watchdog: subscribe failed ({})", ret);
        }
        ret == ESP_OK
    }
}

#[cfg(not(target_os = "espidf"))]
fn arm(_timeout_ms: u32) -> bool {
    true
}
