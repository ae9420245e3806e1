//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `console`  | RemoteChannel      | UART console (stdin/out) |
//! | `hardware` | SensorPort         | MLX90614 over I²C        |
//! |            | ActuatorPort       | Relay GPIOs              |
//! | `log_sink` | NotificationSink   | Serial log output        |
//! | `nvs`      | StoragePort        | NVS / in-memory store    |
//! | `time`     | Clock              | ESP32 system timer       |

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
