//! Robot serial-link adapter.
//!
//! Implements [`DevicePort`] over the robot's UART plus its wake line.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: raw ESP-IDF UART and GPIO driver calls.
//! - **all other targets**: simulation stub that never answers, which the
//!   engine reads as a sleeping robot.

use log::{debug, info};

use crate::app::ports::DevicePort;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// How long a poll waits for the robot's reply.
pub const REPLY_TIMEOUT_MS: u32 = 60;

#[cfg(target_os = "espidf")]
const UART_RX_BUF: i32 = 256;

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialInitError {
    UartConfigFailed(i32),
    UartPinFailed(i32),
    UartInstallFailed(i32),
    WakeGpioFailed(i32),
}

impl core::fmt::Display for SerialInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UartConfigFailed(rc) => write!(f, "UART param config failed (rc={})", rc),
            Self::UartPinFailed(rc) => write!(f, "UART pin routing failed (rc={})", rc),
            Self::UartInstallFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
            Self::WakeGpioFailed(rc) => write!(f, "wake GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for SerialInitError {}

// ── Adapter ───────────────────────────────────────────────────

/// The robot's Open Interface port.
pub struct RobotLink {
    bytes_written: u64,
    #[cfg(not(target_os = "espidf"))]
    wake_pulses: u32,
}

impl RobotLink {
    /// Configure the UART and the wake line.  Call once from `main()`.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, SerialInitError> {
        // SAFETY: called once from main() before the event loop; the UART
        // number and GPIOs are reserved for the robot in `pins`.
        unsafe {
            init_uart()?;
            init_wake_line()?;
        }
        info!(
            "serial: UART{} @ {} baud, wake on GPIO{}",
            pins::ROBOT_UART_NUM,
            pins::ROBOT_UART_BAUD,
            pins::ROBOT_WAKE_GPIO
        );
        Ok(Self { bytes_written: 0 })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, SerialInitError> {
        info!("serial(sim): robot link simulated, no replies");
        Ok(Self {
            bytes_written: 0,
            wake_pulses: 0,
        })
    }

    /// Bytes written since startup (polls and commands).
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_write(&mut self, data: &[u8]) {
        // SAFETY: the driver was installed in new(); the buffer outlives the call.
        let rc = unsafe { uart_write_bytes(pins::ROBOT_UART_NUM, data.as_ptr().cast(), data.len()) };
        if rc < 0 {
            log::warn!("serial: write of {} bytes failed (rc={})", data.len(), rc);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_write(&mut self, data: &[u8]) {
        debug!("serial(sim): tx {:02x?}", data);
    }

    #[cfg(target_os = "espidf")]
    fn platform_read(&mut self, buf: &mut [u8]) -> usize {
        let mut total = 0;
        while total < buf.len() {
            let rest = &mut buf[total..];
            // SAFETY: `rest` is a live mutable slice of exactly `rest.len()` bytes.
            let rc = unsafe {
                uart_read_bytes(
                    pins::ROBOT_UART_NUM,
                    rest.as_mut_ptr().cast(),
                    rest.len() as u32,
                    ms_to_ticks(REPLY_TIMEOUT_MS),
                )
            };
            if rc <= 0 {
                break;
            }
            total += rc as usize;
        }
        total
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_read(&mut self, _buf: &mut [u8]) -> usize {
        0
    }

    #[cfg(target_os = "espidf")]
    fn platform_wake(&mut self, ms: u32) {
        // SAFETY: the wake GPIO was configured as an output in new().
        unsafe { gpio_set_level(pins::ROBOT_WAKE_GPIO, 0) };
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
        unsafe { gpio_set_level(pins::ROBOT_WAKE_GPIO, 1) };
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_wake(&mut self, ms: u32) {
        self.wake_pulses += 1;
        debug!("serial(sim): wake pulse {}ms", ms);
    }
}

impl DevicePort for RobotLink {
    fn query(&mut self, request: &[u8], response: &mut [u8]) -> usize {
        // Drop stale bytes from an earlier, late reply so they cannot
        // prefix this one.
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: driver installed in new().
            unsafe { uart_flush_input(pins::ROBOT_UART_NUM) };
        }
        self.platform_write(request);
        self.bytes_written += request.len() as u64;
        self.platform_read(response)
    }

    fn write_byte(&mut self, byte: u8) {
        self.platform_write(&[byte]);
        self.bytes_written += 1;
    }

    fn pulse_wake(&mut self, ms: u32) {
        info!("serial: wake pulse ({}ms)", ms);
        self.platform_wake(ms);
    }
}

// ── ESP-IDF init ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn ms_to_ticks(ms: u32) -> TickType_t {
    (ms * configTICK_RATE_HZ / 1000).max(1)
}

#[cfg(target_os = "espidf")]
unsafe fn init_uart() -> Result<(), SerialInitError> {
    let cfg = uart_config_t {
        baud_rate: pins::ROBOT_UART_BAUD as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { uart_param_config(pins::ROBOT_UART_NUM, &cfg) };
    if ret != ESP_OK as i32 { return Err(SerialInitError::UartConfigFailed(ret)); }

    let ret = unsafe {
        uart_set_pin(pins::ROBOT_UART_NUM, pins::ROBOT_UART_TX_GPIO, pins::ROBOT_UART_RX_GPIO, -1, -1)
    };
    if ret != ESP_OK as i32 { return Err(SerialInitError::UartPinFailed(ret)); }

    let ret = unsafe {
        uart_driver_install(pins::ROBOT_UART_NUM, UART_RX_BUF, 0, 0, core::ptr::null_mut(), 0)
    };
    if ret != ESP_OK as i32 { return Err(SerialInitError::UartInstallFailed(ret)); }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_wake_line() -> Result<(), SerialInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ROBOT_WAKE_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT_OD,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(SerialInitError::WakeGpioFailed(ret)); }
    // Idle high; the robot wakes on a falling edge.
    unsafe { gpio_set_level(pins::ROBOT_WAKE_GPIO, 1) };
    Ok(())
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn simulated_robot_never_answers() {
        let mut link = RobotLink::new().unwrap();
        let mut buf = [0u8; 32];
        assert_eq!(link.query(&[149, 1, 21], &mut buf), 0);
        link.write_byte(128);
        link.pulse_wake(100);
        assert_eq!(link.bytes_written(), 4);
        assert_eq!(link.wake_pulses, 1);
    }
}
