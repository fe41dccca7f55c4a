//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to               |
//! |----------------|--------------------|---------------------------|
//! | `hardware`     | ActuatorPort       | LEDC servos, laser GPIO   |
//! |                | InputPort          | Dial ADC, switch GPIO     |
//! | `log_sink`     | EventSink          | Serial log output         |
//! | `time`         | Clock              | ESP32 system timer        |

pub mod hardware;
pub mod log_sink;
pub mod time;
