//! BLE sessions, GAP, GATT and the BC Smart channel.

use super::types::{
    AdvertisingParameters, Bdaddr, BleSession, CharacteristicDefinition, ConnectionParameters,
    DescriptorDefinition, GattCharacteristic, GattService, GattWriteRequest,
    PreferredConnectionParameters, ProfileSetup, ProfileSetupEntry, ScanParameters,
    ScanResultFormat, ScanResults,
};
use super::{unsupported, BoardHandle};
use std::time::Duration;

/// Local address and session bookkeeping.
pub trait BleApi: BoardHandle {
    fn local_address(&mut self) -> Option<Bdaddr>;

    fn create_session(&mut self, bdaddr: &Bdaddr) -> Option<BleSession>;

    fn delete_session(&mut self, session_id: u32) -> bool;

    fn session_id_for(&mut self, bdaddr: &Bdaddr) -> Option<u32>;

    fn sessions(&mut self) -> Option<Vec<BleSession>>;
}

/// Advertising, scanning and connection management.
pub trait GapApi: BoardHandle {
    /// Start or stop advertising, optionally replacing the advertising and
    /// scan response payloads first.
    fn set_advertising_enable(
        &mut self,
        _enable: bool,
        _adv_data: Option<&[u8]>,
        _scan_resp_data: Option<&[u8]>,
    ) -> bool {
        unsupported(self.model(), "set_advertising_enable");
        false
    }

    fn set_advertising_parameters(&mut self, _params: &AdvertisingParameters) -> bool {
        unsupported(self.model(), "set_advertising_parameters");
        false
    }

    fn set_preferred_connection_parameters(
        &mut self,
        _params: &PreferredConnectionParameters,
    ) -> bool {
        unsupported(self.model(), "set_preferred_connection_parameters");
        false
    }

    /// Scan for `duration_s` seconds.
    fn scan(&mut self, _duration_s: u32, _format: ScanResultFormat) -> Option<ScanResults> {
        unsupported(self.model(), "scan");
        None
    }

    fn set_scan_parameters(&mut self, _params: &ScanParameters) -> bool {
        unsupported(self.model(), "set_scan_parameters");
        false
    }

    fn scan_parameters(&mut self) -> Option<ScanParameters> {
        unsupported(self.model(), "scan_parameters");
        None
    }

    fn set_connection_parameters(
        &mut self,
        _session_id: u32,
        _params: &ConnectionParameters,
    ) -> bool {
        unsupported(self.model(), "set_connection_parameters");
        false
    }

    /// Session id and parameters of the current connection.
    fn connection_parameters(&mut self) -> Option<(u32, ConnectionParameters)> {
        unsupported(self.model(), "connection_parameters");
        None
    }

    fn connect(&mut self, _session_id: u32, _max_attempts: u32) -> bool {
        unsupported(self.model(), "connect");
        false
    }

    fn wait_for_connection(&mut self, _timeout: Duration) -> bool {
        unsupported(self.model(), "wait_for_connection");
        false
    }

    fn disconnect(&mut self, _session_id: u32) -> bool {
        unsupported(self.model(), "disconnect");
        false
    }

    fn wait_for_disconnection(&mut self, _session_id: u32, _timeout: Duration) -> bool {
        unsupported(self.model(), "wait_for_disconnection");
        false
    }

    fn is_connected(&mut self, _session_id: u32) -> Option<bool> {
        unsupported(self.model(), "is_connected");
        None
    }
}

/// GATT client and server primitives.
///
/// Request/response pairs come in two halves: the side that sends a request
/// and the side that waits for it. Boards whose firmware acknowledges a
/// request on its own report the manual half as trivially successful.
pub trait GattApi: BoardHandle {
    fn local_mtu(&mut self) -> Option<u16> {
        unsupported(self.model(), "local_mtu");
        None
    }

    fn exchanged_mtu(&mut self, _session_id: u32) -> Option<u16> {
        unsupported(self.model(), "exchanged_mtu");
        None
    }

    fn discover_primary_services(&mut self, _session_id: u32) -> Option<Vec<GattService>> {
        unsupported(self.model(), "discover_primary_services");
        None
    }

    fn discover_characteristics(&mut self, _session_id: u32) -> Option<Vec<GattCharacteristic>> {
        unsupported(self.model(), "discover_characteristics");
        None
    }

    /// Stage a service; committed by [`GattApi::profile_setup`].
    fn add_service(&mut self, _uuid: &str, _is_primary: bool) -> bool {
        unsupported(self.model(), "add_service");
        false
    }

    /// Add a primary service immediately and return its handle.
    fn add_primary_service(&mut self, _uuid: &str) -> Option<u16> {
        unsupported(self.model(), "add_primary_service");
        None
    }

    fn add_characteristic(&mut self, _definition: &CharacteristicDefinition) -> bool {
        unsupported(self.model(), "add_characteristic");
        false
    }

    fn add_descriptor(&mut self, _definition: &DescriptorDefinition) -> bool {
        unsupported(self.model(), "add_descriptor");
        false
    }

    fn profile_setup(&mut self, _action: ProfileSetup) -> Option<Vec<ProfileSetupEntry>> {
        unsupported(self.model(), "profile_setup");
        None
    }

    fn read_request(&mut self, _session_id: u32, _handle: u16) -> bool {
        unsupported(self.model(), "read_request");
        false
    }

    fn wait_for_read_request(&mut self, _session_id: u32, _handle: u16, _timeout: Duration) -> bool {
        unsupported(self.model(), "wait_for_read_request");
        false
    }

    fn read_response(
        &mut self,
        _session_id: u32,
        _handle: u16,
        _accept: bool,
        _value: &[u8],
        _offset: u16,
    ) -> bool {
        unsupported(self.model(), "read_response");
        false
    }

    fn wait_for_read_response(
        &mut self,
        _session_id: u32,
        _handle: u16,
        _timeout: Duration,
    ) -> Option<Vec<u8>> {
        unsupported(self.model(), "wait_for_read_response");
        None
    }

    fn write_request(
        &mut self,
        _session_id: u32,
        _handle: u16,
        _value: &[u8],
        _need_rsp: bool,
    ) -> bool {
        unsupported(self.model(), "write_request");
        false
    }

    fn wait_for_write_request(
        &mut self,
        _session_id: u32,
        _handle: u16,
        _timeout: Duration,
    ) -> Option<GattWriteRequest> {
        unsupported(self.model(), "wait_for_write_request");
        None
    }

    fn write_response(&mut self, _session_id: u32, _handle: u16, _accept: bool) -> bool {
        unsupported(self.model(), "write_response");
        false
    }

    fn wait_for_write_response(
        &mut self,
        _session_id: u32,
        _handle: u16,
        _timeout: Duration,
    ) -> bool {
        unsupported(self.model(), "wait_for_write_response");
        false
    }

    fn notification_request(&mut self, _session_id: u32, _handle: u16, _value: &[u8]) -> bool {
        unsupported(self.model(), "notification_request");
        false
    }

    fn wait_for_notification(
        &mut self,
        _session_id: u32,
        _handle: u16,
        _timeout: Duration,
    ) -> Option<Vec<u8>> {
        unsupported(self.model(), "wait_for_notification");
        None
    }

    fn indication_request(&mut self, _session_id: u32, _handle: u16, _value: &[u8]) -> bool {
        unsupported(self.model(), "indication_request");
        false
    }

    fn wait_for_indication(
        &mut self,
        _session_id: u32,
        _handle: u16,
        _timeout: Duration,
    ) -> Option<Vec<u8>> {
        unsupported(self.model(), "wait_for_indication");
        None
    }

    /// Confirm a received indication.
    fn indication_response(&mut self, _session_id: u32, _handle: u16) -> bool {
        unsupported(self.model(), "indication_response");
        false
    }

    fn wait_for_indication_response(
        &mut self,
        _session_id: u32,
        _handle: u16,
        _timeout: Duration,
    ) -> bool {
        unsupported(self.model(), "wait_for_indication_response");
        false
    }
}

/// UUIDs of the BC Smart profile.
pub const BC_SMART_SERVICE_UUID: &str = "BC2F4CC6-AAEF-4351-9034-D66268E328F0";
pub const BC_SMART_CHAR_DATA_UUID: &str = "06D1E5E7-79AD-4A71-8FAA-373789F7D93C";
pub const BC_SMART_CHAR_COMMAND_UUID: &str = "818AE306-9C5B-448D-B51A-7ADD6A5D314D";

/// BC Smart data and command channel, server and client roles.
pub trait BcSmartApi: BoardHandle {
    fn server_send_data(&mut self, _session_id: u32, _data: &[u8]) -> bool {
        unsupported(self.model(), "server_send_data");
        false
    }

    /// Concatenated payload of every data packet received in `timeout`.
    fn server_wait_for_data(&mut self, _session_id: u32, _timeout: Duration) -> Option<Vec<u8>> {
        unsupported(self.model(), "server_wait_for_data");
        None
    }

    fn server_wait_for_command(&mut self, _session_id: u32, _timeout: Duration) -> Option<String> {
        unsupported(self.model(), "server_wait_for_command");
        None
    }

    fn client_send_data(&mut self, _session_id: u32, _data: &[u8]) -> bool {
        unsupported(self.model(), "client_send_data");
        false
    }

    fn client_wait_for_data(&mut self, _session_id: u32, _timeout: Duration) -> Option<Vec<u8>> {
        unsupported(self.model(), "client_wait_for_data");
        None
    }

    fn client_send_command(&mut self, _session_id: u32, _command: &str) -> bool {
        unsupported(self.model(), "client_send_command");
        false
    }

    fn client_wait_for_command_response(
        &mut self,
        _session_id: u32,
        _timeout: Duration,
    ) -> Option<Vec<String>> {
        unsupported(self.model(), "client_wait_for_command_response");
        None
    }
}
