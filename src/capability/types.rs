//! Value types shared by every board's capability surface.

use crate::error::{HarnessError, HarnessResult};
use crate::protocol::address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// LE address type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    Public = 0,
    Private = 1,
    Unknown = 2,
}

impl AddressType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Public),
            1 => Some(Self::Private),
            2 => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Bluetooth device address in canonical `XX:XX:XX:XX:XX:XX` form.
///
/// Equality ignores the type tag: several boards omit it in their replies.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Bdaddr {
    addr: String,
    addr_type: AddressType,
}

impl Bdaddr {
    /// Validate and normalise an address.
    ///
    /// # Errors
    ///
    /// `HarnessError::InvalidArgument` unless `addr` is six colon-separated
    /// hex octets.
    pub fn new(addr: &str, addr_type: AddressType) -> HarnessResult<Self> {
        if !address::is_colon_form(addr) {
            return Err(HarnessError::invalid_argument(format!(
                "invalid Bluetooth address {addr:?}"
            )));
        }
        Ok(Self {
            addr: address::to_canonical(addr),
            addr_type,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn addr_type(&self) -> AddressType {
        self.addr_type
    }
}

impl PartialEq for Bdaddr {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl fmt::Display for Bdaddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.addr, self.addr_type)
    }
}

/// One BLE link as tracked by the framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BleSession {
    pub session_id: u32,
    pub bdaddr: Bdaddr,
}

/// Advertising report, parsed format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub addr: String,
    pub addr_type: AddressType,
    /// Signal strength in dBm (negative).
    pub rssi: i16,
    pub flag: u8,
    pub name: Option<String>,
}

/// Advertising report, raw advertising data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRawResult {
    pub addr: String,
    pub addr_type: AddressType,
    pub rssi: i16,
    pub raw_data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanResultFormat {
    #[default]
    Default = 0,
    RawData = 1,
}

impl ScanResultFormat {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Scan results in the format that was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResults {
    Parsed(Vec<ScanResult>),
    Raw(Vec<ScanRawResult>),
}

impl ScanResults {
    pub fn len(&self) -> usize {
        match self {
            Self::Parsed(r) => r.len(),
            Self::Raw(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanType {
    Passive = 0,
    Active = 1,
}

impl ScanType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Passive),
            1 => Some(Self::Active),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanParameters {
    pub scan_type: ScanType,
    /// 0x0004..=0x4000
    pub interval: u16,
    /// 0x0004..=0x4000
    pub window: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParameters {
    pub interval: u16,
    pub latency: u16,
    pub supervision_timeout: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredConnectionParameters {
    /// 0x0006..=0x0C80
    pub min_interval: u16,
    /// 0x0006..=0x0C80
    pub max_interval: u16,
    /// 0x0000..=0x01F3
    pub latency: u16,
    /// 0x000A..=0x0C80
    pub supervision_timeout: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdvertisingType {
    /// Connectable undirected
    #[default]
    Ind = 0,
    /// Connectable high duty cycle directed
    DirectIndHigh = 1,
    /// Scannable undirected
    ScanInd = 2,
    /// Non connectable undirected
    NonConnInd = 3,
    /// Connectable low duty cycle directed
    DirectIndLow = 4,
}

impl AdvertisingType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdvFilterPolicy {
    /// Scan and connection requests from all devices
    #[default]
    Any = 0,
    /// Scan requests only from the white list
    ScanRequests = 1,
    /// Connection requests only from the white list
    ConnectionRequests = 2,
    /// Both only from the white list
    Both = 3,
}

impl AdvFilterPolicy {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisingParameters {
    pub adv_type: AdvertisingType,
    /// 0x0020..=0x4000
    pub interval_min: u16,
    /// 0x0020..=0x4000
    pub interval_max: u16,
    /// 0x0000..=0x3FFF
    pub timeout: u16,
    pub filter_policy: AdvFilterPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GattService {
    pub uuid: String,
    pub is_primary: bool,
    pub start_handle: u16,
    pub end_handle: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GattCharacteristic {
    pub uuid: String,
    pub handle: u16,
    pub properties: CharProperties,
}

/// Characteristic properties bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharProperties(pub u8);

impl CharProperties {
    pub const BROADCAST: Self = Self(0x01);
    pub const READ: Self = Self(0x02);
    pub const WRITE_WITHOUT_RESPONSE: Self = Self(0x04);
    pub const WRITE: Self = Self(0x08);
    pub const NOTIFY: Self = Self(0x10);
    pub const INDICATE: Self = Self(0x20);
    pub const AUTHENTICATED_SIGNED_WRITES: Self = Self(0x40);
    pub const EXTENDED_PROPERTIES: Self = Self(0x80);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CharProperties {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Attribute permissions bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttPermissions(pub u16);

impl AttPermissions {
    pub const READ: Self = Self(0x0001);
    pub const READ_ENCRYPTED: Self = Self(0x0002);
    pub const READ_ENCRYPTED_MITM: Self = Self(0x0004);
    pub const READ_AUTHORIZATION: Self = Self(0x0008);
    pub const WRITE: Self = Self(0x0010);
    pub const WRITE_ENCRYPTED: Self = Self(0x0020);
    pub const WRITE_ENCRYPTED_MITM: Self = Self(0x0040);
    pub const WRITE_AUTHORIZATION: Self = Self(0x0080);
    pub const WRITE_SIGNED: Self = Self(0x0100);
    pub const WRITE_SIGNED_MITM: Self = Self(0x0200);

    pub fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for AttPermissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A characteristic staged for the local GATT database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicDefinition {
    pub uuid: String,
    pub properties: CharProperties,
    pub permissions: AttPermissions,
    pub max_length: u16,
    pub variable_length: bool,
    pub value: Vec<u8>,
}

/// A descriptor staged for the local GATT database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorDefinition {
    pub uuid: String,
    pub permissions: AttPermissions,
    pub max_length: u16,
    pub variable_length: bool,
    pub value: Vec<u8>,
}

/// Commit or drop the staged GATT database elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSetup {
    Commit = 0,
    Discard = 1,
}

impl ProfileSetup {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Per-element result of a profile setup: status code and assigned handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSetupEntry {
    pub status: u32,
    pub handle: Option<u32>,
}

/// Write received by the local GATT server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattWriteRequest {
    pub session_id: u32,
    pub handle: u16,
    pub offset: u16,
    pub value: Vec<u8>,
    pub need_rsp: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpioDirection {
    Output = 0,
    Input = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpioPull {
    Up = 0,
    Down = 1,
    None = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpioLevel {
    Low = 0,
    High = 1,
}

impl GpioLevel {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Low),
            1 => Some(Self::High),
            _ => None,
        }
    }
}

/// A GPIO edge reported by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioEvent {
    pub gpio: u8,
    pub level: GpioLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bdaddr_normalises_case() {
        let addr = Bdaddr::new("20:fa:bb:00:01:80", AddressType::Public).unwrap();
        assert_eq!(addr.addr(), "20:FA:BB:00:01:80");
        assert_eq!(addr.addr_type(), AddressType::Public);
    }

    #[test]
    fn test_bdaddr_rejects_malformed() {
        let err = Bdaddr::new("20FABB000180", AddressType::Public).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidArgument(_)));
        assert!(Bdaddr::new("20:FA:BB:00:01", AddressType::Public).is_err());
    }

    #[test]
    fn test_bdaddr_equality_ignores_type() {
        let a = Bdaddr::new("20:FA:BB:00:01:80", AddressType::Public).unwrap();
        let b = Bdaddr::new("20:fa:bb:00:01:80", AddressType::Unknown).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_flag_sets_combine() {
        let props = CharProperties::READ | CharProperties::NOTIFY;
        assert_eq!(props.bits(), 0x12);
        assert!(props.contains(CharProperties::NOTIFY));
        assert!(!props.contains(CharProperties::WRITE));

        let perms = AttPermissions::READ | AttPermissions::WRITE;
        assert_eq!(perms.bits(), 0x0011);
    }

    #[test]
    fn test_codes() {
        assert_eq!(AddressType::from_code(1), Some(AddressType::Private));
        assert_eq!(AddressType::from_code(3), None);
        assert_eq!(AdvertisingType::DirectIndLow.code(), 4);
        assert_eq!(ScanResultFormat::RawData.code(), 1);
        assert_eq!(GpioLevel::from_code(1), Some(GpioLevel::High));
    }
}
