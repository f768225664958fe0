//! SwitchBot application status codes
//!
//! Every response envelope carries a `statusCode`. `100` means success; the
//! codes below are the documented device-level failures. Any other value is
//! passed through to the caller untouched.

/// Application status code of success
pub const SUCCESS: i32 = 100;

/// Known application status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 100: request succeeded
    Success,
    /// 151: device type does not support the request
    DeviceTypeError,
    /// 152: device ID not found
    DeviceNotFound,
    /// 160: command not supported by this device type
    CommandNotSupported,
    /// 161: device offline (BLE devices need a hub)
    DeviceOffline,
    /// 171: hub device offline
    HubOffline,
    /// 190: device internal error, usually an invalid command or parameter
    DeviceInternalError,
}

impl StatusCode {
    /// All known codes
    pub const ALL: [StatusCode; 7] = [
        StatusCode::Success,
        StatusCode::DeviceTypeError,
        StatusCode::DeviceNotFound,
        StatusCode::CommandNotSupported,
        StatusCode::DeviceOffline,
        StatusCode::HubOffline,
        StatusCode::DeviceInternalError,
    ];

    /// Look up a known code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            100 => Some(Self::Success),
            151 => Some(Self::DeviceTypeError),
            152 => Some(Self::DeviceNotFound),
            160 => Some(Self::CommandNotSupported),
            161 => Some(Self::DeviceOffline),
            171 => Some(Self::HubOffline),
            190 => Some(Self::DeviceInternalError),
            _ => None,
        }
    }

    /// Numeric value
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::DeviceTypeError => 151,
            Self::DeviceNotFound => 152,
            Self::CommandNotSupported => 160,
            Self::DeviceOffline => 161,
            Self::HubOffline => 171,
            Self::DeviceInternalError => 190,
        }
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::DeviceTypeError => "device type error",
            Self::DeviceNotFound => "device not found",
            Self::CommandNotSupported => "command is not supported",
            Self::DeviceOffline => "device offline",
            Self::HubOffline => "hub device offline",
            Self::DeviceInternalError => "device internal error or invalid command format",
        }
    }

    /// Check if this code must be raised as an error
    pub fn is_known_error(self) -> bool {
        self != Self::Success
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// Check if an envelope status code is a known error
pub fn is_known_error_code(code: i32) -> bool {
    StatusCode::from_code(code).is_some_and(StatusCode::is_known_error)
}
